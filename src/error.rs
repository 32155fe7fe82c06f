//!
//! Error types for locating and dispatching a code block.
//!
//! Timeouts and cancellations of a running block are not errors: they come back as a normal
//! `RunResult` with exit code 124 or 130. Everything here means no block output exists.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The document contains no terminated fenced block
    #[error("no fenced code block found")]
    NoBlockFound,

    /// Blocks exist but none could be chosen for the cursor
    #[error("unable to select code block")]
    NoBlockSelectable,

    /// The block's language tag has no backend; carries the tag as written
    #[error("unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    /// An sql block was requested but no external command is configured
    #[error("sql execution unsupported without runblock.sql_cmd")]
    SqlUnsupported,

    /// The configured external command could not be tokenized into a program
    #[error("invalid command {command:?}: {reason}")]
    InvalidCommand { command: String, reason: String },

    /// Every shell candidate was missing from the host
    #[error("no shell found to run block (tried: {})", .tried.join(", "))]
    NoShellFound { tried: Vec<String> },

    /// A process or I/O failure that prevented execution from producing output
    #[error("execution failed: {source}")]
    ExecutionFailure {
        #[source]
        source: io::Error,
    },

    /// Reading the source document failed
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The caller cancelled before anything was executed
    #[error("run canceled")]
    Cancelled,
}

impl Error {
    /// True for errors caused by the caller's configuration rather than the document or host
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLanguage { .. } | Self::SqlUnsupported | Self::InvalidCommand { .. }
        )
    }
}
