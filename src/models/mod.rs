pub mod chart_spec;
pub mod forest;
pub mod map_spec;
pub mod prediction_input;
pub mod weather_record;
