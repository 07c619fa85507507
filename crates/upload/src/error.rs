//! Error types for archive assembly and upload.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for upload operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while packaging or shipping test results.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Failed to add an entry to the archive or to finish it.
    #[error("Archive error: {message}")]
    #[diagnostic(
        code(buildpulse::upload::archive),
        help("Check that the file exists and is readable")
    )]
    Archive {
        /// The error message
        message: String,
        /// The file being archived, if any
        path: Option<PathBuf>,
        /// The underlying source error
        #[source]
        source: Option<std::io::Error>,
    },

    /// The object store rejected the upload.
    #[error("Upload to {bucket}/{key} failed: {message}")]
    #[diagnostic(
        code(buildpulse::upload::upload),
        help(
            "Check BUILDPULSE_ACCESS_KEY_ID and BUILDPULSE_SECRET_ACCESS_KEY, and that the account ID is correct"
        )
    )]
    Upload {
        /// Destination bucket
        bucket: String,
        /// Destination object key
        key: String,
        /// The error message
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(buildpulse::upload::io))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an archive error without an underlying I/O cause.
    #[must_use]
    pub fn archive(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Archive {
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create an archive error caused by an I/O failure on `path`.
    #[must_use]
    pub fn archive_io(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Archive {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    /// Create an upload error.
    #[must_use]
    pub fn upload(
        bucket: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Upload {
            bucket: bucket.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}
