//! Error types for redress.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Upstream fetch failed. Callers fall back to an empty result set;
    /// the next scheduled or user-triggered run retries naturally.
    #[error("data unavailable: {0}")]
    Unavailable(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(String),

    /// The consuming context was torn down mid-run; partial results are
    /// discarded, never applied.
    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
