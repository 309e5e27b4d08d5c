//! SHA-256 digest newtype for release checksums.
//!
//! A digest is stored in the form `sha256sum` prints it: 64 lowercase
//! hexadecimal characters.

use super::error::{ArtefactError, Result};
use std::fmt;
use std::fmt::Write as _;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// Length in bytes of a raw SHA-256 digest.
const DIGEST_BYTE_LEN: usize = 32;

/// A validated hex-encoded SHA-256 digest string.
///
/// # Examples
///
/// ```
/// use client_release::artefact::sha256_digest::Sha256Digest;
///
/// let hex = "a".repeat(64);
/// let digest: Sha256Digest = hex.as_str().try_into().expect("valid digest");
/// assert_eq!(digest.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Encode raw digest bytes as lowercase hex.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidSha256Digest`] unless exactly 32 bytes
    /// are supplied.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != DIGEST_BYTE_LEN {
            return Err(ArtefactError::InvalidSha256Digest {
                reason: format!("expected {DIGEST_BYTE_LEN} bytes, got {}", bytes.len()),
            });
        }
        let hex = bytes
            .iter()
            .fold(String::with_capacity(DIGEST_HEX_LEN), |mut acc, byte| {
                let _ = write!(acc, "{byte:02x}");
                acc
            });
        Ok(Self(hex))
    }

    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        validate_sha256(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        validate_sha256(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is a well-formed hex-encoded SHA-256 digest.
fn validate_sha256(value: &str) -> Result<()> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(ArtefactError::InvalidSha256Digest {
            reason: format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.len()
            ),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ArtefactError::InvalidSha256Digest {
            reason: format!("non-hex character '{bad}'"),
        });
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ArtefactError::InvalidSha256Digest {
            reason: "digest must be lowercase".to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn accepts_valid_sixty_four_char_hex() {
        let digest = Sha256Digest::try_from("0123456789abcdef".repeat(4));
        assert!(digest.is_ok());
    }

    #[rstest]
    #[case::too_short("abcdef".to_owned())]
    #[case::too_long("a".repeat(65))]
    #[case::non_hex(format!("{}g", "a".repeat(63)))]
    #[case::uppercase("A".repeat(64))]
    fn rejects_malformed_digests(#[case] value: String) {
        let err = Sha256Digest::try_from(value).expect_err("digest should be rejected");
        assert!(matches!(err, ArtefactError::InvalidSha256Digest { .. }));
    }

    #[test]
    fn from_bytes_encodes_lowercase_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[31] = 0x0f;
        let digest = Sha256Digest::from_bytes(&bytes).expect("32 bytes");
        assert!(digest.as_str().starts_with("ab00"));
        assert!(digest.as_str().ends_with("0f"));
        assert_eq!(digest.as_str().len(), 64);
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        assert!(Sha256Digest::from_bytes(&[0u8; 20]).is_err());
    }
}
