//! Error types for the stats scraper.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ScrapeError`].
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Network failure or non-success status for a page.
    #[error("fetch {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Expected markup (stats table, navigation list) missing or malformed.
    #[error("parse error: {0}")]
    Parse(String),

    /// A numeric field could not be parsed once its formatting was stripped.
    #[error("cannot coerce {column} value {value:?} to a number")]
    Coercion { column: String, value: String },

    /// Destination missing or not writable.
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization of a dataset failed.
    #[error("writing {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: arrow::error::ArrowError,
    },
}

impl ScrapeError {
    pub fn parse(msg: impl Into<String>) -> Self {
        ScrapeError::Parse(msg.into())
    }

    pub fn coercion(column: impl Into<String>, value: impl Into<String>) -> Self {
        ScrapeError::Coercion {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short stage label used in the run summary.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Fetch { .. } => "fetch",
            ScrapeError::Parse(_) => "parse",
            ScrapeError::Coercion { .. } => "coercion",
            ScrapeError::Io { .. } | ScrapeError::Write { .. } => "io",
        }
    }
}
