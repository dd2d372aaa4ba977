use kingdoms_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("sample has an empty sequence")]
    EmptySequence,
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("invalid training config: {0}")]
    InvalidConfig(String),
    #[error("influence model has no parameters to train")]
    EmptyModel,
    #[error("no valid training samples ({skipped} skipped)")]
    NoValidSamples { skipped: usize },
}
