//! Release artefact naming, packaging, and checksum handling.
//!
//! # Sub-modules
//!
//! - [`checksums`] - `sha256sum`-format checksum files.
//! - [`error`] - Semantic error types for validation failures.
//! - [`naming`] - Release asset naming policy (`ArtefactName`).
//! - [`packaging`] - Archive creation and checksum emission.
//! - [`packaging_error`] - Error types for packaging operations.
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`target`] - Static target triple validation (`TargetTriple`).
//! - [`verification`] - Checksum verification reports.
//! - [`version`] - Semantic release version (`ReleaseVersion`).

pub mod checksums;
pub mod error;
pub mod naming;
pub mod packaging;
pub mod packaging_error;
pub mod sha256_digest;
pub mod target;
pub mod verification;
pub mod version;
