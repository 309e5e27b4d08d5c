//! Artefact naming policy for release assets.
//!
//! Every published asset shares the stem
//! `<binary>-<version>-<os>-<arch>-static`. The raw binary is published under
//! the bare stem, the archives append `.tar.gz` and `.zip`, and the checksum
//! file appends `.sha256`.

use super::error::{ArtefactError, Result};
use super::target::TargetTriple;
use super::version::ReleaseVersion;
use std::fmt;

/// Suffix marking the binary as statically linked.
const STATIC_SUFFIX: &str = "static";

/// Extension of the gzip-compressed tarball.
const TAR_GZ_EXTENSION: &str = ".tar.gz";

/// Extension of the zip archive.
const ZIP_EXTENSION: &str = ".zip";

/// Extension of the checksum file.
const CHECKSUM_EXTENSION: &str = ".sha256";

/// The name of the compiled executable, as produced by cargo.
///
/// # Examples
///
/// ```
/// use client_release::artefact::naming::BinaryName;
///
/// let name: BinaryName = "nexus-network".try_into().expect("valid name");
/// assert_eq!(name.as_str(), "nexus-network");
/// assert!(BinaryName::try_from("bin/evil").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryName(String);

impl BinaryName {
    /// Return the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for BinaryName {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        let invalid = |reason: &str| ArtefactError::InvalidBinaryName {
            value: value.to_owned(),
            reason: reason.to_owned(),
        };
        if value.is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if value.starts_with('.') {
            return Err(invalid("name must not start with '.'"));
        }
        if value.contains(['/', '\\']) {
            return Err(invalid("name must not contain path separators"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(invalid("name must not contain whitespace"));
        }
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for BinaryName {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl fmt::Display for BinaryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully-qualified release asset name.
///
/// # Examples
///
/// ```
/// use client_release::artefact::naming::ArtefactName;
///
/// let name = ArtefactName::new(
///     "nexus-network".try_into().expect("valid name"),
///     "0.8.4".try_into().expect("valid version"),
///     "x86_64-unknown-linux-musl".try_into().expect("valid target"),
/// );
/// assert_eq!(
///     name.tar_gz_file(),
///     "nexus-network-0.8.4-linux-x86_64-static.tar.gz"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactName {
    binary: BinaryName,
    version: ReleaseVersion,
    target: TargetTriple,
}

impl ArtefactName {
    /// Create an artefact name from validated components.
    #[must_use]
    pub fn new(binary: BinaryName, version: ReleaseVersion, target: TargetTriple) -> Self {
        Self {
            binary,
            version,
            target,
        }
    }

    /// Return the binary name component.
    #[must_use]
    pub fn binary(&self) -> &BinaryName {
        &self.binary
    }

    /// Return the version component.
    #[must_use]
    pub fn version(&self) -> &ReleaseVersion {
        &self.version
    }

    /// Return the target triple component.
    #[must_use]
    pub fn target(&self) -> &TargetTriple {
        &self.target
    }

    /// The shared stem, which is also the published binary's filename.
    #[must_use]
    pub fn stem(&self) -> String {
        self.to_string()
    }

    /// Filename of the standalone binary in the releases directory.
    #[must_use]
    pub fn binary_file(&self) -> String {
        self.stem()
    }

    /// Filename of the `.tar.gz` archive.
    #[must_use]
    pub fn tar_gz_file(&self) -> String {
        format!("{self}{TAR_GZ_EXTENSION}")
    }

    /// Filename of the `.zip` archive.
    #[must_use]
    pub fn zip_file(&self) -> String {
        format!("{self}{ZIP_EXTENSION}")
    }

    /// Filename of the `sha256sum`-format checksum file.
    #[must_use]
    pub fn checksum_file(&self) -> String {
        format!("{self}{CHECKSUM_EXTENSION}")
    }
}

impl fmt::Display for ArtefactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{STATIC_SUFFIX}",
            self.binary,
            self.version,
            self.target.platform_label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn sample_name() -> ArtefactName {
        ArtefactName::new(
            BinaryName::try_from("nexus-network").expect("valid name"),
            ReleaseVersion::try_from("0.8.4").expect("valid version"),
            TargetTriple::try_from("x86_64-unknown-linux-musl").expect("valid target"),
        )
    }

    #[rstest]
    fn stem_matches_release_convention(sample_name: ArtefactName) {
        assert_eq!(sample_name.stem(), "nexus-network-0.8.4-linux-x86_64-static");
        assert_eq!(sample_name.binary_file(), sample_name.stem());
    }

    #[rstest]
    fn derived_filenames_share_stem(sample_name: ArtefactName) {
        assert_eq!(
            sample_name.tar_gz_file(),
            "nexus-network-0.8.4-linux-x86_64-static.tar.gz"
        );
        assert_eq!(
            sample_name.zip_file(),
            "nexus-network-0.8.4-linux-x86_64-static.zip"
        );
        assert_eq!(
            sample_name.checksum_file(),
            "nexus-network-0.8.4-linux-x86_64-static.sha256"
        );
    }

    #[rstest]
    fn tag_prefix_does_not_leak_into_names() {
        let name = ArtefactName::new(
            BinaryName::try_from("cli").expect("valid"),
            ReleaseVersion::try_from("v1.0.0").expect("valid"),
            TargetTriple::try_from("aarch64-unknown-linux-musl").expect("valid"),
        );
        assert_eq!(name.stem(), "cli-1.0.0-linux-aarch64-static");
    }

    #[rstest]
    #[case::empty("")]
    #[case::hidden(".cli")]
    #[case::separator("a/b")]
    #[case::backslash("a\\b")]
    #[case::space("my cli")]
    fn binary_name_rejects_unsafe_values(#[case] value: &str) {
        assert!(BinaryName::try_from(value).is_err());
    }
}
