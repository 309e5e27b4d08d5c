//! Checksum verification with `sha256sum -c` semantics.
//!
//! Every entry in a checksum file is resolved relative to the file's own
//! directory, re-hashed, and classified. Verification never stops at the
//! first failure so the report lists every problem at once.

use super::checksums::{ChecksumEntry, ChecksumFile};
use super::packaging::compute_sha256;
use super::packaging_error::PackagingError;
use super::sha256_digest::Sha256Digest;
use std::fmt;
use std::fs;
use std::path::Path;

/// Outcome for a single checksum entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// The file exists and its digest matches.
    Ok,
    /// The file exists but hashes to a different digest.
    Mismatch {
        /// Digest computed from the file on disk.
        actual: Sha256Digest,
    },
    /// The file named in the checksum file does not exist.
    Missing,
    /// The file exists but could not be read.
    Unreadable {
        /// The I/O error encountered while hashing.
        reason: String,
    },
}

/// Verification outcome for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    /// The checksum entry that was checked.
    pub entry: ChecksumEntry,
    /// What was found on disk.
    pub status: EntryStatus,
}

impl fmt::Display for EntryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            EntryStatus::Ok => write!(f, "{}: OK", self.entry.filename),
            EntryStatus::Mismatch { .. } => write!(f, "{}: FAILED", self.entry.filename),
            EntryStatus::Missing | EntryStatus::Unreadable { .. } => {
                write!(f, "{}: FAILED open or read", self.entry.filename)
            }
        }
    }
}

/// The result of verifying a whole checksum file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Per-entry outcomes in file order.
    pub entries: Vec<EntryReport>,
}

impl VerificationReport {
    /// Whether every entry verified successfully.
    ///
    /// An empty report is not considered a pass: a checksum file with no
    /// entries verifies nothing.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| e.status == EntryStatus::Ok)
    }

    /// Entries that did not verify.
    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| e.status != EntryStatus::Ok)
    }
}

/// Verify every entry of `checksum_path` against files in the same directory.
///
/// # Errors
///
/// Returns [`PackagingError::Io`] if the checksum file cannot be read or
/// [`PackagingError::Checksum`] if it is malformed. Problems with the listed
/// files are reported per entry.
pub fn verify_checksum_file(checksum_path: &Path) -> Result<VerificationReport, PackagingError> {
    let contents = fs::read_to_string(checksum_path)?;
    let file = ChecksumFile::parse(&contents)?;
    let base = checksum_path.parent().unwrap_or_else(|| Path::new("."));
    Ok(verify_entries(base, &file))
}

/// Verify parsed checksum entries relative to `base`.
#[must_use]
pub fn verify_entries(base: &Path, file: &ChecksumFile) -> VerificationReport {
    let entries = file
        .entries()
        .iter()
        .map(|entry| {
            let path = base.join(&entry.filename);
            let status = if path.is_file() {
                classify(&entry.digest, compute_sha256(&path))
            } else {
                EntryStatus::Missing
            };
            EntryReport {
                entry: entry.clone(),
                status,
            }
        })
        .collect();

    VerificationReport { entries }
}

/// Compare a hashing result with the expected digest.
fn classify(expected: &Sha256Digest, hashed: Result<Sha256Digest, PackagingError>) -> EntryStatus {
    match hashed {
        Ok(actual) if actual == *expected => EntryStatus::Ok,
        Ok(actual) => EntryStatus::Mismatch { actual },
        Err(err) => EntryStatus::Unreadable {
            reason: err.to_string(),
        },
    }
}
