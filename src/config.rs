use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;
use crate::models::prediction_input::PredictionInput;
use crate::models::weather_record::MapFeature;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Files {
    pub data_file: String,
    pub map_data_file: String,
    pub image_file: String,
    pub model_file: String,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            data_file: "data/aus_clean_data.csv".to_string(),
            map_data_file: "data/aus_clean_map_data.csv".to_string(),
            image_file: "data/aus_climate.jpg".to_string(),
            model_file: "models/rf_model.json".to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct General {
    pub log_path: Option<String>,
    pub log_level: LevelFilter,
    pub log_to_stderr: bool,
}

impl Default for General {
    fn default() -> Self {
        Self { log_path: None, log_level: LevelFilter::Info, log_to_stderr: true }
    }
}

/// Sidebar toggles, one per dashboard section
#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Sidebar {
    pub show_data: bool,
    pub show_correlations: bool,
    pub show_max_temp: bool,
    pub show_min_temp: bool,
    pub show_rainfall: bool,
    pub show_temp_map: bool,
    pub show_rainfall_timeseries_map: bool,
    pub predict: bool,
}

impl Sidebar {
    /// Returns true if any section is toggled on
    pub fn any(&self) -> bool {
        self.toggles().iter().any(|t| *t)
    }
}

/// Date and feature selection of the snapshot map
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SnapshotMap {
    pub date: Option<String>,
    pub features: Vec<MapFeature>,
}

impl Default for SnapshotMap {
    fn default() -> Self {
        Self { date: None, features: vec![MapFeature::MinTemp] }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct HeatmapParameters {
    pub use_local_extrema: bool,
}

impl Default for HeatmapParameters {
    fn default() -> Self {
        Self { use_local_extrema: true }
    }
}

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct Config {
    pub files: Files,
    pub general: General,
    pub sidebar: Sidebar,
    pub snapshot_map: SnapshotMap,
    pub heatmap: HeatmapParameters,
    pub prediction: PredictionInput,
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.files.data_file, "data/aus_clean_data.csv");
        assert_eq!(config.files.model_file, "models/rf_model.json");
        assert_eq!(config.general.log_level, LevelFilter::Info);
        assert!(!config.sidebar.any());
        assert_eq!(config.snapshot_map.features, vec![MapFeature::MinTemp]);
        assert!(config.heatmap.use_local_extrema);
        assert_eq!(config.prediction, PredictionInput::default());
    }

    #[test]
    fn reads_sections() {
        let toml = r#"
            [files]
            data_file = "weather.csv"

            [general]
            log_level = "debug"
            log_to_stderr = false

            [sidebar]
            show_temp_map = true
            predict = true

            [snapshot_map]
            date = "2017-06-01"
            features = ["Temp9am", "Rainfall"]

            [prediction]
            Humidity3pm = "80"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.files.data_file, "weather.csv");
        assert_eq!(config.files.map_data_file, "data/aus_clean_map_data.csv");
        assert_eq!(config.general.log_level, LevelFilter::Debug);
        assert!(config.sidebar.show_temp_map && config.sidebar.predict && !config.sidebar.show_data);
        assert_eq!(config.snapshot_map.date.as_deref(), Some("2017-06-01"));
        assert_eq!(config.snapshot_map.features, vec![MapFeature::Temp9am, MapFeature::Rainfall]);
        assert_eq!(config.prediction.humidity_3pm, "80");
        assert_eq!(config.prediction.location_cat, "3");
    }

    #[test]
    fn unknown_feature_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[snapshot_map]\nfeatures = [\"Humidity3pm\"]");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_config_error() {
        assert!(load_config("/nonexistent/rainview/config.toml").is_err());
    }
}
