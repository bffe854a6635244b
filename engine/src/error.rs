//! Error types
//!
//! Definition loading errors are fatal at startup. Per-entity errors are
//! surfaced to the caller. Dangling trait codes are never errors; they are
//! logged and skipped where they are found.

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of engine failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Load,
    UnknownClass,
    UnknownTrait,
    InvalidEntity,
}

/// Failure while reading trait/class definitions or engine configuration
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed record #{index}: {reason}")]
    Malformed { index: usize, reason: String },
}

impl LoadError {
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        LoadError::Malformed {
            index,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Load
    }
}

/// Caller-facing errors raised while granting or removing traits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraitError {
    #[error("unknown character class '{0}'")]
    UnknownClass(String),

    #[error("unknown trait '{0}'")]
    UnknownTrait(String),

    #[error("invalid entity: {0}")]
    InvalidEntity(String),
}

impl TraitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TraitError::UnknownClass(_) => ErrorKind::UnknownClass,
            TraitError::UnknownTrait(_) => ErrorKind::UnknownTrait,
            TraitError::InvalidEntity(_) => ErrorKind::InvalidEntity,
        }
    }
}

/// Failure while exporting or importing a host world snapshot
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encoding error: {0}")]
    Binary(#[from] bincode::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported export version: {0}")]
    UnsupportedVersion(u8),
}
