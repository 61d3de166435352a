//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors (e.g., [`ScanError`], [`ExportError`]) for detailed handling
//! - Only scan, export and invocation failures abort a run; the rest are
//!   logged and the run carries on
//!
//! # Example
//!
//! ```ignore
//! use music_catalog::error::{Result, ResultExt};
//!
//! fn run(root: &Path) -> Result<()> {
//!     let scan = scanner::scan_catalog(root)?;  // ScanError auto-converts
//!     std::fs::create_dir_all("output").with_context("creating output directory")?;
//!     Ok(())
//! }
//! ```

use crate::config::ConfigError;
use crate::enrichment::EnrichmentError;
use crate::export::ExportError;
use crate::metadata::{TagReadError, TagWriteError};
use crate::organizer::FileOpError;
use crate::scanner::ScanError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scan root missing or unreadable
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Metadata read error
    #[error(transparent)]
    TagRead(#[from] TagReadError),

    /// Tag write-back error
    #[error(transparent)]
    TagWrite(#[from] TagWriteError),

    /// Lookup error
    #[error("Enrichment error: {0}")]
    Enrichment(#[from] EnrichmentError),

    /// File organization error
    #[error("Organization error: {0}")]
    FileOp(#[from] FileOpError),

    /// Export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid command-line settings
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error ends the run rather than a single item.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Scan(_) | Self::Export(_) | Self::InvalidArgument(_) => true,
            Self::Io(_)
            | Self::TagRead(_)
            | Self::TagWrite(_)
            | Self::Enrichment(_)
            | Self::FileOp(_)
            | Self::Config(_) => false,
            Self::WithContext { source, .. } => source.is_fatal(),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}
