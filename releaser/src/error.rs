//! Error types for the release tool.
//!
//! This module defines semantic error variants that tell the user which step
//! failed and, where possible, how to recover. Lower layers keep their own
//! error enums ([`ArtefactError`], [`PackagingError`]) and are wrapped here.

use crate::artefact::error::ArtefactError;
use crate::artefact::packaging_error::PackagingError;
use camino::Utf8PathBuf;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while building, packaging, or publishing a release.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file or a resolved setting is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// The crate manifest could not be read or parsed.
    #[error("invalid manifest {path}: {reason}")]
    InvalidManifest {
        /// Path of the manifest.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// No release version was given and none could be read from the manifest.
    #[error("cannot determine release version: {reason}; pass --version explicitly")]
    VersionUnresolved {
        /// Why the manifest did not yield a version.
        reason: String,
    },

    /// A value failed domain validation.
    #[error(transparent)]
    Artefact(#[from] ArtefactError),

    /// Writing archives or checksum files failed.
    #[error(transparent)]
    Packaging(#[from] PackagingError),

    /// An external program could not be started.
    #[error("failed to run {program}: {source}; is it installed and on PATH?")]
    CommandSpawn {
        /// The program that could not be started.
        program: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// A required step exited unsuccessfully.
    #[error("{step} failed (`{command}`, {}): {stderr}", exit_code_text(*code))]
    CommandFailed {
        /// Human-readable description of the step.
        step: String,
        /// The command line that was run.
        command: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// An external program did not finish within its deadline.
    #[error("`{command}` timed out after {} seconds", timeout.as_secs())]
    CommandTimedOut {
        /// The command line that was run.
        command: String,
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// Cargo reported success but the expected binary is missing.
    #[error("build output not found at {path}; check the binary name and target directory")]
    BuildOutputMissing {
        /// Where the binary was expected.
        path: Utf8PathBuf,
    },

    /// A release asset required for publishing is missing.
    #[error("release asset {} not found; run `client-release build` first", path.display())]
    MissingArtefact {
        /// Where the asset was expected.
        path: PathBuf,
    },

    /// The built binary links against shared libraries.
    #[error("{path} is dynamically linked against: {}", libraries.join(", "))]
    NotStatic {
        /// Path of the offending binary.
        path: Utf8PathBuf,
        /// Shared libraries reported by `ldd`.
        libraries: Vec<String>,
    },

    /// One or more checksum entries did not verify.
    #[error("{failures} checksum entr{} failed verification in {}", if *failures == 1 { "y" } else { "ies" }, path.display())]
    VerificationFailed {
        /// Number of entries that failed.
        failures: usize,
        /// The checksum file that was checked.
        path: PathBuf,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

fn exit_code_text(code: Option<i32>) -> String {
    code.map_or_else(
        || "terminated by signal".to_owned(),
        |c| format!("exit code {c}"),
    )
}

/// Result type alias using [`ReleaseError`].
pub type Result<T> = std::result::Result<T, ReleaseError>;
