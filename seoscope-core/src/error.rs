use thiserror::Error;

/// Failures of the external authority scorer. Always fatal to a request.
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("scorer credential (OPR_API_KEY) is missing")]
    MissingCredential,

    #[error("scorer request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("scorer answered with HTTP {status}")]
    Upstream { status: u16 },

    #[error("malformed scorer response: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("store task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("corrupt record for {domain}: {reason}")]
    CorruptRecord { domain: String, reason: String },

    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("OPR_API_KEY is required unless synthetic scoring is enabled")]
    MissingApiKey,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything that can stop the resolution pipeline.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("domain is required")]
    MissingDomain,

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
