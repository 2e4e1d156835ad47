use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyAdaptError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Atomic Write Error: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Layout Parsing Error: {0}")]
    Layout(String),
}

pub type KaResult<T> = Result<T, KeyAdaptError>;
