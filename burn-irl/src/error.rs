use std::path::PathBuf;

use burn::record::RecorderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IrlError>;

#[derive(Error, Debug)]
pub enum IrlError {
    #[error("transition batch field `{field}` has length {actual}, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{0} batch is empty")]
    EmptyBatch(&'static str),
    #[error("no expert policy for environment {env} at {}", path.display())]
    ExpertNotFound { env: String, path: PathBuf },
    #[error("recorder failure: {0}")]
    Record(#[from] RecorderError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("unable to read tensor data: {0}")]
    Tensor(String),
}
