use serde::{Deserialize, Serialize};
use crate::errors::PredictionError;

/// Column order expected by the rain model
pub const PREDICTION_COLUMNS: [&str; 17] = [
    "Location_cat", "MinTemp", "MaxTemp", "Rainfall",
    "Evaporation", "Sunshine", "WindGustDir_cat",
    "WindGustSpeed", "Humidity9am", "Humidity3pm",
    "Pressure9am", "Pressure3pm", "Cloud9am", "Cloud3pm",
    "Temp9am", "Temp3pm", "RainToday_cat",
];

/// Free text prediction inputs as entered by the user, keyed by model column name
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PredictionInput {
    #[serde(rename = "Location_cat")]
    pub location_cat: String,
    #[serde(rename = "MinTemp")]
    pub min_temp: String,
    #[serde(rename = "MaxTemp")]
    pub max_temp: String,
    #[serde(rename = "Rainfall")]
    pub rainfall: String,
    #[serde(rename = "Evaporation")]
    pub evaporation: String,
    #[serde(rename = "Sunshine")]
    pub sunshine: String,
    #[serde(rename = "WindGustDir_cat")]
    pub wind_gust_dir_cat: String,
    #[serde(rename = "WindGustSpeed")]
    pub wind_gust_speed: String,
    #[serde(rename = "Humidity9am")]
    pub humidity_9am: String,
    #[serde(rename = "Humidity3pm")]
    pub humidity_3pm: String,
    #[serde(rename = "Pressure9am")]
    pub pressure_9am: String,
    #[serde(rename = "Pressure3pm")]
    pub pressure_3pm: String,
    #[serde(rename = "Cloud9am")]
    pub cloud_9am: String,
    #[serde(rename = "Cloud3pm")]
    pub cloud_3pm: String,
    #[serde(rename = "Temp9am")]
    pub temp_9am: String,
    #[serde(rename = "Temp3pm")]
    pub temp_3pm: String,
    #[serde(rename = "RainToday_cat")]
    pub rain_today_cat: String,
}

impl Default for PredictionInput {
    fn default() -> Self {
        Self {
            location_cat: "3".to_string(),
            min_temp: "13".to_string(),
            max_temp: "22".to_string(),
            rainfall: "0.6".to_string(),
            evaporation: "5.4".to_string(),
            sunshine: "7.6".to_string(),
            wind_gust_dir_cat: "13".to_string(),
            wind_gust_speed: "44".to_string(),
            humidity_9am: "70".to_string(),
            humidity_3pm: "22".to_string(),
            pressure_9am: "1007".to_string(),
            pressure_3pm: "1007".to_string(),
            cloud_9am: "8.0".to_string(),
            cloud_3pm: "21.5".to_string(),
            temp_9am: "16.5".to_string(),
            temp_3pm: "21.0".to_string(),
            rain_today_cat: "0".to_string(),
        }
    }
}

impl PredictionInput {
    /// Returns the inputs as (column, text) pairs in model column order
    pub fn fields(&self) -> [(&'static str, &str); 17] {
        [
            (PREDICTION_COLUMNS[0], self.location_cat.as_str()),
            (PREDICTION_COLUMNS[1], self.min_temp.as_str()),
            (PREDICTION_COLUMNS[2], self.max_temp.as_str()),
            (PREDICTION_COLUMNS[3], self.rainfall.as_str()),
            (PREDICTION_COLUMNS[4], self.evaporation.as_str()),
            (PREDICTION_COLUMNS[5], self.sunshine.as_str()),
            (PREDICTION_COLUMNS[6], self.wind_gust_dir_cat.as_str()),
            (PREDICTION_COLUMNS[7], self.wind_gust_speed.as_str()),
            (PREDICTION_COLUMNS[8], self.humidity_9am.as_str()),
            (PREDICTION_COLUMNS[9], self.humidity_3pm.as_str()),
            (PREDICTION_COLUMNS[10], self.pressure_9am.as_str()),
            (PREDICTION_COLUMNS[11], self.pressure_3pm.as_str()),
            (PREDICTION_COLUMNS[12], self.cloud_9am.as_str()),
            (PREDICTION_COLUMNS[13], self.cloud_3pm.as_str()),
            (PREDICTION_COLUMNS[14], self.temp_9am.as_str()),
            (PREDICTION_COLUMNS[15], self.temp_3pm.as_str()),
            (PREDICTION_COLUMNS[16], self.rain_today_cat.as_str()),
        ]
    }

    /// Validates the free text inputs and returns a typed prediction row.
    ///
    /// Categorical codes must be non-negative integers, every other field a finite number.
    pub fn validate(&self) -> Result<PredictionRow, PredictionError> {
        Ok(PredictionRow {
            location_cat: parse_code(PREDICTION_COLUMNS[0], &self.location_cat)?,
            min_temp: parse_number(PREDICTION_COLUMNS[1], &self.min_temp)?,
            max_temp: parse_number(PREDICTION_COLUMNS[2], &self.max_temp)?,
            rainfall: parse_number(PREDICTION_COLUMNS[3], &self.rainfall)?,
            evaporation: parse_number(PREDICTION_COLUMNS[4], &self.evaporation)?,
            sunshine: parse_number(PREDICTION_COLUMNS[5], &self.sunshine)?,
            wind_gust_dir_cat: parse_code(PREDICTION_COLUMNS[6], &self.wind_gust_dir_cat)?,
            wind_gust_speed: parse_number(PREDICTION_COLUMNS[7], &self.wind_gust_speed)?,
            humidity_9am: parse_number(PREDICTION_COLUMNS[8], &self.humidity_9am)?,
            humidity_3pm: parse_number(PREDICTION_COLUMNS[9], &self.humidity_3pm)?,
            pressure_9am: parse_number(PREDICTION_COLUMNS[10], &self.pressure_9am)?,
            pressure_3pm: parse_number(PREDICTION_COLUMNS[11], &self.pressure_3pm)?,
            cloud_9am: parse_number(PREDICTION_COLUMNS[12], &self.cloud_9am)?,
            cloud_3pm: parse_number(PREDICTION_COLUMNS[13], &self.cloud_3pm)?,
            temp_9am: parse_number(PREDICTION_COLUMNS[14], &self.temp_9am)?,
            temp_3pm: parse_number(PREDICTION_COLUMNS[15], &self.temp_3pm)?,
            rain_today_cat: parse_code(PREDICTION_COLUMNS[16], &self.rain_today_cat)?,
        })
    }
}

/// Validated single row input to the rain model
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PredictionRow {
    pub location_cat: u32,
    pub min_temp: f64,
    pub max_temp: f64,
    pub rainfall: f64,
    pub evaporation: f64,
    pub sunshine: f64,
    pub wind_gust_dir_cat: u32,
    pub wind_gust_speed: f64,
    pub humidity_9am: f64,
    pub humidity_3pm: f64,
    pub pressure_9am: f64,
    pub pressure_3pm: f64,
    pub cloud_9am: f64,
    pub cloud_3pm: f64,
    pub temp_9am: f64,
    pub temp_3pm: f64,
    pub rain_today_cat: u32,
}

impl PredictionRow {
    /// Returns the feature vector in model column order
    pub fn features(&self) -> [f64; 17] {
        [
            self.location_cat as f64,
            self.min_temp,
            self.max_temp,
            self.rainfall,
            self.evaporation,
            self.sunshine,
            self.wind_gust_dir_cat as f64,
            self.wind_gust_speed,
            self.humidity_9am,
            self.humidity_3pm,
            self.pressure_9am,
            self.pressure_3pm,
            self.cloud_9am,
            self.cloud_3pm,
            self.temp_9am,
            self.temp_3pm,
            self.rain_today_cat as f64,
        ]
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, PredictionError> {
    value.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PredictionError::InvalidInput { field, value: value.to_string() })
}

fn parse_code(field: &'static str, value: &str) -> Result<u32, PredictionError> {
    value.trim()
        .parse::<u32>()
        .map_err(|_| PredictionError::InvalidInput { field, value: value.to_string() })
}
