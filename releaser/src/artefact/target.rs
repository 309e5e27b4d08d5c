//! Target triple validation for static release builds.
//!
//! Only musl targets produce fully static binaries with the static C runtime
//! flags, so any other triple is rejected at construction time.

use super::error::{ArtefactError, Result};
use serde::Serialize;
use std::fmt;

/// The supported target triples for static release builds.
const SUPPORTED_TARGETS: &[&str] = &["x86_64-unknown-linux-musl", "aarch64-unknown-linux-musl"];

/// The default target when none is configured.
pub const DEFAULT_TARGET: &str = "x86_64-unknown-linux-musl";

/// A validated target triple from the supported static set.
///
/// # Examples
///
/// ```
/// use client_release::artefact::target::TargetTriple;
///
/// let triple: TargetTriple = "x86_64-unknown-linux-musl"
///     .try_into()
///     .expect("valid target triple");
/// assert_eq!(triple.platform_label(), "linux-x86_64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TargetTriple(String);

impl TargetTriple {
    /// Return the triple as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the full list of supported target triples.
    #[must_use]
    pub fn supported() -> &'static [&'static str] {
        SUPPORTED_TARGETS
    }

    /// Return the `<os>-<arch>` label used in artefact names.
    ///
    /// The triple is `<arch>-<vendor>-<os>-<env>`; the label drops vendor
    /// and environment.
    #[must_use]
    pub fn platform_label(&self) -> String {
        let mut parts = self.0.split('-');
        let arch = parts.next().unwrap_or_default();
        let os = parts.nth(1).unwrap_or_default();
        format!("{os}-{arch}")
    }
}

impl Default for TargetTriple {
    fn default() -> Self {
        Self(DEFAULT_TARGET.to_owned())
    }
}

impl TryFrom<&str> for TargetTriple {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        if SUPPORTED_TARGETS.contains(&value) {
            Ok(Self(value.to_owned()))
        } else {
            Err(ArtefactError::UnsupportedTarget {
                value: value.to_owned(),
                expected: SUPPORTED_TARGETS.join(", "),
            })
        }
    }
}

impl TryFrom<String> for TargetTriple {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl AsRef<str> for TargetTriple {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn accepts_all_supported_targets() {
        for target in SUPPORTED_TARGETS {
            let triple = TargetTriple::try_from(*target);
            assert!(triple.is_ok(), "expected {target} to be accepted");
        }
    }

    #[rstest]
    #[case::glibc("x86_64-unknown-linux-gnu")]
    #[case::darwin("aarch64-apple-darwin")]
    #[case::empty("")]
    fn rejects_non_static_targets(#[case] value: &str) {
        let err = TargetTriple::try_from(value).expect_err("target should be rejected");
        assert!(
            matches!(err, ArtefactError::UnsupportedTarget { .. }),
            "expected UnsupportedTarget, got {err:?}"
        );
    }

    #[rstest]
    #[case::x86("x86_64-unknown-linux-musl", "linux-x86_64")]
    #[case::arm("aarch64-unknown-linux-musl", "linux-aarch64")]
    fn platform_label_drops_vendor_and_env(#[case] triple: &str, #[case] label: &str) {
        let t = TargetTriple::try_from(triple).expect("valid");
        assert_eq!(t.platform_label(), label);
    }

    #[test]
    fn default_is_x86_64_musl() {
        assert_eq!(TargetTriple::default().as_str(), DEFAULT_TARGET);
    }
}
