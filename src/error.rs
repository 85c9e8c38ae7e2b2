use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("Nothing to generate: {0}")]
    NothingToGenerate(String),

    #[error("Invalid period template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid school data: {0}")]
    InvalidData(String),

    #[error("Template not found: {0}")]
    UnknownTemplate(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TimetableError>;
