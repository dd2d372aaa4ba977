use kingdoms_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid hand: {0}")]
    InvalidHand(#[from] CoreError),
    #[error("io error: {0}")]
    Io(String),
    #[error("serialize error: {0}")]
    Serialize(String),
}

impl From<std::io::Error> for SearchError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}
