//! Release version newtype.
//!
//! Wraps a [`semver::Version`] so that artefact names and git tags are always
//! derived from a validated version. A leading `v` is tolerated on input and
//! stripped; the tag form re-adds it.

use super::error::{ArtefactError, Result};
use std::fmt;

/// Prefix prepended to the version to form the release tag.
const TAG_PREFIX: &str = "v";

/// A validated semantic release version.
///
/// # Examples
///
/// ```
/// use client_release::artefact::version::ReleaseVersion;
///
/// let version: ReleaseVersion = "v0.8.4".try_into().expect("valid version");
/// assert_eq!(version.to_string(), "0.8.4");
/// assert_eq!(version.tag(), "v0.8.4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseVersion(semver::Version);

impl ReleaseVersion {
    /// Return the git tag for this version (`v<version>`).
    #[must_use]
    pub fn tag(&self) -> String {
        format!("{TAG_PREFIX}{}", self.0)
    }

    /// Whether this version carries a pre-release component (`1.0.0-rc.1`).
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }
}

impl TryFrom<&str> for ReleaseVersion {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let bare = trimmed.strip_prefix(TAG_PREFIX).unwrap_or(trimmed);
        semver::Version::parse(bare)
            .map(Self)
            .map_err(|e| ArtefactError::InvalidVersion {
                value: value.to_owned(),
                reason: e.to_string(),
            })
    }
}

impl TryFrom<String> for ReleaseVersion {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::bare("1.4.0", "1.4.0", "v1.4.0")]
    #[case::prefixed("v1.4.0", "1.4.0", "v1.4.0")]
    #[case::padded("  0.9.12 ", "0.9.12", "v0.9.12")]
    #[case::prerelease("2.0.0-rc.1", "2.0.0-rc.1", "v2.0.0-rc.1")]
    fn parses_and_derives_tag(#[case] input: &str, #[case] display: &str, #[case] tag: &str) {
        let version = ReleaseVersion::try_from(input).expect("valid version");
        assert_eq!(version.to_string(), display);
        assert_eq!(version.tag(), tag);
    }

    #[rstest]
    #[case::empty("")]
    #[case::two_components("1.4")]
    #[case::letters("latest")]
    #[case::double_prefix("vv1.0.0")]
    fn rejects_invalid_versions(#[case] input: &str) {
        let err = ReleaseVersion::try_from(input).expect_err("version should be rejected");
        assert!(matches!(err, ArtefactError::InvalidVersion { .. }));
    }

    #[test]
    fn detects_prerelease() {
        let rc = ReleaseVersion::try_from("1.0.0-beta.2").expect("valid");
        let stable = ReleaseVersion::try_from("1.0.0").expect("valid");
        assert!(rc.is_prerelease());
        assert!(!stable.is_prerelease());
    }
}
