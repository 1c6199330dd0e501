use crate::domain::session::Step;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Cannot {action} during the {step} step")]
    InvalidTransition { action: &'static str, step: Step },
    #[error("Payment modal is closed")]
    ModalClosed,
    #[error("{message}")]
    RateLimited { wait_seconds: u64, message: String },
    #[error("{0}")]
    InitiationError(String),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, GateError>;
