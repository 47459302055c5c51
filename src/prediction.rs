use std::fmt;
use log::info;
use crate::errors::PredictionError;
use crate::manager_model::Classifier;
use crate::models::prediction_input::{PredictionInput, PredictionRow};

/// Binary rain forecast derived from the model label
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RainTomorrow {
    NoRain,
    Rain,
}

impl RainTomorrow {
    /// 0 means no rain, any other label means rain
    pub fn from_label(label: i64) -> RainTomorrow {
        if label == 0 { RainTomorrow::NoRain } else { RainTomorrow::Rain }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            RainTomorrow::NoRain => "It will not rain tomorrow!",
            RainTomorrow::Rain => "It will rain tomorrow!",
        }
    }
}

impl fmt::Display for RainTomorrow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RainTomorrow::NoRain => write!(f, "no rain tomorrow"),
            RainTomorrow::Rain => write!(f, "rain tomorrow"),
        }
    }
}

/// Result of one prediction, including the row that was passed to the model
#[derive(Clone, Debug)]
pub struct PredictionOutcome {
    pub row: PredictionRow,
    pub rain_tomorrow: RainTomorrow,
}

/// Validates the inputs, runs the classifier on the resulting row and returns the outcome.
///
/// Invalid inputs are rejected before the classifier is called.
///
/// # Arguments
///
/// * 'input' - the free text inputs
/// * 'model' - the classifier to predict with
pub fn get_prediction(input: &PredictionInput, model: &dyn Classifier) -> Result<PredictionOutcome, PredictionError> {
    let row = input.validate()?;
    let label = model.predict(&row)?;
    let label = coerce_label(&label)?;
    let rain_tomorrow = RainTomorrow::from_label(label);
    info!("Predicted label {}: {}", label, rain_tomorrow);

    Ok(PredictionOutcome { row, rain_tomorrow })
}

/// Coerces a model label to an integer, whole floating point labels such as "1.0" included
///
/// # Arguments
///
/// * 'label' - the label as returned by the model
fn coerce_label(label: &str) -> Result<i64, PredictionError> {
    let trimmed = label.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }

    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(PredictionError::Label(label.to_string())),
    }
}
