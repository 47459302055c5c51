use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("data file not found: {0}")]
    NotFound(String),
    #[error("error reading data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed data file: {0}")]
    Csv(#[from] csv::Error),
}
