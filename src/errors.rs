use std::fmt;
use std::fmt::Formatter;
use crate::manager_data::errors::LoadError;
use crate::manager_model::errors::ModelError;

/// Error depicting errors that occur while loading the configuration
///
#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self {
        ConfigError(e.to_string())
    }
}

/// Error depicting errors that occur while building charts
///
#[derive(Debug)]
pub enum ChartError {
    MissingColumn(String),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::MissingColumn(c) => write!(f, "ChartError::MissingColumn: {}", c),
        }
    }
}

/// Error depicting errors that occur while building maps
///
#[derive(Debug)]
pub enum MapError {
    MissingColumn(String),
    Coordinate { row: usize, value: String },
    Date { row: usize, value: String },
    UnknownDate(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MapError::MissingColumn(c) => write!(f, "MapError::MissingColumn: {}", c),
            MapError::Coordinate { row, value } =>
                write!(f, "MapError::Coordinate: row {} has invalid coordinate '{}'", row, value),
            MapError::Date { row, value } =>
                write!(f, "MapError::Date: row {} has invalid date '{}'", row, value),
            MapError::UnknownDate(d) => write!(f, "MapError::UnknownDate: {}", d),
        }
    }
}

/// Error depicting errors that occur in the prediction path
///
#[derive(Debug)]
pub enum PredictionError {
    InvalidInput { field: &'static str, value: String },
    Model(String),
    Label(String),
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PredictionError::InvalidInput { field, value } =>
                write!(f, "PredictionError::InvalidInput: {} = '{}' is not a valid number", field, value),
            PredictionError::Model(e) => write!(f, "PredictionError::Model: {}", e),
            PredictionError::Label(l) => write!(f, "PredictionError::Label: '{}' is not an integer label", l),
        }
    }
}
impl From<ModelError> for PredictionError {
    fn from(e: ModelError) -> Self {
        PredictionError::Model(e.to_string())
    }
}

/// Top level error for one dashboard interaction, any failure halts rendering of the page
///
#[derive(Debug)]
pub enum DashboardError {
    Load(String),
    Chart(String),
    Map(String),
    Model(String),
    Prediction(String),
    Image(String),
    Render(String),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Load(e) => write!(f, "DashboardError::Load: {}", e),
            DashboardError::Chart(e) => write!(f, "DashboardError::Chart: {}", e),
            DashboardError::Map(e) => write!(f, "DashboardError::Map: {}", e),
            DashboardError::Model(e) => write!(f, "DashboardError::Model: {}", e),
            DashboardError::Prediction(e) => write!(f, "DashboardError::Prediction: {}", e),
            DashboardError::Image(e) => write!(f, "DashboardError::Image: {}", e),
            DashboardError::Render(e) => write!(f, "DashboardError::Render: {}", e),
        }
    }
}
impl std::error::Error for DashboardError {}
impl From<LoadError> for DashboardError {
    fn from(e: LoadError) -> Self { DashboardError::Load(e.to_string()) }
}
impl From<ChartError> for DashboardError {
    fn from(e: ChartError) -> Self { DashboardError::Chart(e.to_string()) }
}
impl From<MapError> for DashboardError {
    fn from(e: MapError) -> Self { DashboardError::Map(e.to_string()) }
}
impl From<ModelError> for DashboardError {
    fn from(e: ModelError) -> Self { DashboardError::Model(e.to_string()) }
}
impl From<PredictionError> for DashboardError {
    fn from(e: PredictionError) -> Self { DashboardError::Prediction(e.to_string()) }
}
impl From<serde_json::Error> for DashboardError {
    fn from(e: serde_json::Error) -> Self { DashboardError::Render(e.to_string()) }
}

/// Error depicting errors that occur while initializing the dashboard
///
pub struct RainviewInitError(pub String);

impl fmt::Display for RainviewInitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RainviewInitError: {}", self.0)
    }
}
impl fmt::Debug for RainviewInitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RainviewInitError: {}", self.0)
    }
}
impl std::error::Error for RainviewInitError {}
impl From<ConfigError> for RainviewInitError {
    fn from(e: ConfigError) -> Self {
        RainviewInitError(e.to_string())
    }
}
impl From<anyhow::Error> for RainviewInitError {
    fn from(e: anyhow::Error) -> Self {
        RainviewInitError(e.to_string())
    }
}
