pub mod errors;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use log::{debug, info};
use crate::manager_data::errors::LoadError;

/// In-memory table holding the header and every row of a CSV file as text, unmodified
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Reads a table from CSV formatted input. The first record is the header.
    ///
    /// A record with a field count differing from the header fails the whole read.
    ///
    /// # Arguments
    ///
    /// * 'reader' - source of CSV data
    pub fn from_reader<R: Read>(reader: R) -> Result<Table, LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<String>>();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(Table { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns the index of the named column
    ///
    /// # Arguments
    ///
    /// * 'name' - column name as given in the header
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Returns a table holding the first n rows
    ///
    /// # Arguments
    ///
    /// * 'n' - max number of rows to keep
    pub fn head(&self, n: usize) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Returns the values of a column parsed as numbers, missing values as None
    ///
    /// # Arguments
    ///
    /// * 'index' - column index
    pub fn numeric_column(&self, index: usize) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| parse_number(&r[index])).collect()
    }

    /// Returns the indices of all numeric columns, i.e. columns where every non-empty
    /// cell parses as a number
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.headers.len())
            .filter(|&i| {
                self.rows.iter().all(|r| {
                    let cell = r[i].trim();
                    cell.is_empty() || cell.parse::<f64>().is_ok()
                })
            })
            .collect()
    }
}

/// Parses a cell as a number. Empty cells and NaN are missing values.
///
/// # Arguments
///
/// * 'cell' - the cell text
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Reads a CSV file into a table
///
/// # Arguments
///
/// * 'path' - path to the CSV file
pub fn read_table(path: &Path) -> Result<Table, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.display().to_string()));
    }
    let file = File::open(path)?;

    Table::from_reader(file)
}

/// Cache of one table file, holding either the loaded table or nothing.
///
/// The file is read on the first load and on the first load after an invalidation,
/// all other loads return the cached table.
pub struct TableCache {
    path: PathBuf,
    table: Option<Rc<Table>>,
    reads: usize,
}

impl TableCache {
    /// Returns a new, empty cache for the given file
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the CSV file
    pub fn new<P: Into<PathBuf>>(path: P) -> TableCache {
        Self { path: path.into(), table: None, reads: 0 }
    }

    /// Returns the cached table, reading it from disk if the cache is empty
    ///
    pub fn load(&mut self) -> Result<Rc<Table>, LoadError> {
        if let Some(table) = &self.table {
            debug!("Table cache hit for {}", self.path.display());
            return Ok(Rc::clone(table));
        }

        self.reads += 1;
        let table = Rc::new(read_table(&self.path)?);
        info!("Loaded {} rows and {} columns from {}", table.len(), table.headers().len(), self.path.display());
        self.table = Some(Rc::clone(&table));

        Ok(table)
    }

    /// Empties the cache so that the next load reads from disk
    ///
    pub fn invalidate(&mut self) {
        if self.table.take().is_some() {
            debug!("Table cache invalidated for {}", self.path.display());
        }
    }

    /// Returns the number of times the file has been read from disk
    pub fn reads(&self) -> usize {
        self.reads
    }
}

#[cfg(test)]
pub(crate) fn table_from(csv: &str) -> Table {
    Table::from_reader(csv.as_bytes()).unwrap()
}
