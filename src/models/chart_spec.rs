use serde::Serialize;

/// Bar chart of one value per category
#[derive(Serialize, Clone, Debug)]
pub struct BarChartSpec {
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub category_label: String,
    pub value_label: String,
    pub color: String,
}

/// A drawn cell of a correlation heatmap
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HeatmapCell {
    pub row: usize,
    pub col: usize,
    pub value: Option<f64>,
}

/// Correlation heatmap.
///
/// `matrix` holds the full correlation matrix, `cells` only the cells left after
/// masking the upper triangle including the diagonal.
#[derive(Serialize, Clone, Debug)]
pub struct HeatmapSpec {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
    pub cells: Vec<HeatmapCell>,
    pub color_scale: Vec<(f64, String)>,
    pub center: f64,
    pub vmin: f64,
    pub vmax: f64,
    pub square: bool,
    pub line_width: f64,
    pub colorbar_shrink: f64,
}

impl HeatmapSpec {
    /// Returns the matrix with masked cells set to None
    pub fn masked_matrix(&self) -> Vec<Vec<Option<f64>>> {
        let n = self.columns.len();
        let mut masked = vec![vec![None; n]; n];
        for cell in &self.cells {
            masked[cell.row][cell.col] = cell.value;
        }
        masked
    }
}
