//! Error types for release packaging operations.
//!
//! Covers I/O failures, archive encoder errors, and validation errors that
//! can occur when writing archives and checksum files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors arising from release packaging operations.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// An I/O operation failed (reading the binary, writing an archive).
    #[error("I/O error during packaging: {0}")]
    Io(#[from] std::io::Error),

    /// The zip encoder failed.
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The binary to package does not exist or is not a regular file.
    #[error("release binary not found: {}", .0.display())]
    MissingBinary(PathBuf),

    /// A checksum file or digest value failed validation.
    #[error("invalid checksum data: {0}")]
    Checksum(#[from] super::error::ArtefactError),
}
