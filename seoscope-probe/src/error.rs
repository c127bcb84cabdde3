use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid probe target: {0}")]
    InvalidTarget(String),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
