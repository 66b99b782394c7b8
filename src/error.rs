//! Error types.  The simulation itself cannot fail; only configuration and
//! the host terminal can.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArcadeError {
    #[error("invalid {field}: {message}")]
    InvalidConfig { field: &'static str, message: String },

    #[error("terminal I/O error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArcadeError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig { field, message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, ArcadeError>;
