use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("No classifier configured for this evaluator")]
    UninitializedClassifier,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid evaluator state: {0}")]
    InvalidState(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Failed to parse stream data: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;
