use std::path::Path;

use thiserror::Error;

/// Convenient result alias used throughout the crate.
pub type Result<T, E = HmmError> = std::result::Result<T, E>;

/// Errors raised by model construction and Viterbi decoding.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HmmError {
    /// Model parameters are malformed or mutually inconsistent.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// An observation symbol is not part of the configured alphabet.
    #[error("unknown observation symbol '{0}'")]
    UnknownSymbol(char),

    /// Decoding requires at least one observation.
    #[error("observation sequence is empty")]
    EmptySequence,
}

impl HmmError {
    /// Create an `InvalidModel` error from anything string-like.
    pub fn invalid_model(msg: impl Into<String>) -> Self {
        HmmError::InvalidModel(msg.into())
    }
}

/// Errors raised while reading sequence files.
#[derive(Debug, Error)]
pub enum FastaError {
    /// The file could not be opened or parsed as FASTA.
    #[error("failed to read FASTA file {path}: {reason}")]
    Read { path: String, reason: String },

    /// The file parsed cleanly but held no records.
    #[error("FASTA file {path} contains no sequences")]
    Empty { path: String },
}

impl FastaError {
    pub(crate) fn read(path: &Path, reason: impl Into<String>) -> Self {
        FastaError::Read {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn empty(path: &Path) -> Self {
        FastaError::Empty {
            path: path.display().to_string(),
        }
    }
}
