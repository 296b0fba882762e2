//! Error types for Lifelens

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A domain repository read failed. Aggregation is fail-fast: any one
    /// failing read aborts the whole snapshot load and no partial snapshot
    /// is ever returned.
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
