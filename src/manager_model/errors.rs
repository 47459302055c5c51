use thiserror::Error;

#[derive(Error, Debug)]
#[error("error in rain model: {0}")]
pub struct ModelError(pub String);
impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> ModelError {
        ModelError(format!("json document error: {}", e))
    }
}
impl From<std::io::Error> for ModelError {
    fn from(e: std::io::Error) -> ModelError {
        ModelError(format!("model artifact read error: {}", e))
    }
}
impl From<&str> for ModelError {
    fn from(e: &str) -> ModelError {
        ModelError(e.to_string())
    }
}
