use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScienceError {
    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    ApiError(String, String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("incomplete record for {doi}: {reason}")]
    Incomplete { doi: String, reason: String },

    #[error("cannot render deposit: {0}")]
    Render(String),

    #[error(transparent)]
    Core(#[from] xrefmig_core::CoreError),
}

pub type Result<T> = std::result::Result<T, ScienceError>;
