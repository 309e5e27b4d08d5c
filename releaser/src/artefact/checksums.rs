//! `sha256sum`-compatible checksum files.
//!
//! The rendered form is byte-for-byte what `sha256sum a b c > file` writes in
//! text mode: one `<digest>  <filename>` line per entry, each terminated by a
//! newline. Parsing also accepts the binary-mode `<digest> *<filename>` form so
//! files produced with `sha256sum -b` can be verified.

use super::error::{ArtefactError, Result};
use super::sha256_digest::Sha256Digest;
use std::fmt;

/// Separator written between digest and filename (text mode).
const TEXT_MODE_SEPARATOR: &str = "  ";

/// Separator `sha256sum -b` writes between digest and filename.
const BINARY_MODE_SEPARATOR: &str = " *";

/// A single `<digest>  <filename>` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    /// Digest of the file contents.
    pub digest: Sha256Digest,
    /// Filename relative to the checksum file's directory.
    pub filename: String,
}

impl fmt::Display for ChecksumEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{TEXT_MODE_SEPARATOR}{}", self.digest, self.filename)
    }
}

/// An ordered collection of checksum entries.
///
/// # Examples
///
/// ```
/// use client_release::artefact::checksums::{ChecksumEntry, ChecksumFile};
///
/// let mut file = ChecksumFile::default();
/// file.push(ChecksumEntry {
///     digest: "a".repeat(64).try_into().expect("valid digest"),
///     filename: "cli.zip".to_owned(),
/// });
/// let rendered = file.render();
/// assert_eq!(rendered, format!("{}  cli.zip\n", "a".repeat(64)));
/// assert_eq!(ChecksumFile::parse(&rendered).expect("parses"), file);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumFile {
    entries: Vec<ChecksumEntry>,
}

impl ChecksumFile {
    /// Append an entry, preserving insertion order.
    pub fn push(&mut self, entry: ChecksumEntry) {
        self.entries.push(entry);
    }

    /// Return the entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[ChecksumEntry] {
        &self.entries
    }

    /// Look up the digest recorded for `filename`.
    #[must_use]
    pub fn digest_for(&self, filename: &str) -> Option<&Sha256Digest> {
        self.entries
            .iter()
            .find(|entry| entry.filename == filename)
            .map(|entry| &entry.digest)
    }

    /// Render the file in `sha256sum` text-mode format.
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{entry}\n"))
            .collect()
    }

    /// Parse `sha256sum` output.
    ///
    /// Blank lines are skipped. Comment lines are not part of the format and
    /// are rejected like any other malformed line.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::MalformedChecksumLine`] naming the first
    /// offending line.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut file = Self::default();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            file.push(parse_line(index + 1, line)?);
        }
        Ok(file)
    }
}

fn parse_line(line_no: usize, line: &str) -> Result<ChecksumEntry> {
    let malformed = |reason: String| ArtefactError::MalformedChecksumLine {
        line: line_no,
        reason,
    };

    let (digest, rest) = line
        .split_at_checked(64)
        .ok_or_else(|| malformed("line is shorter than a SHA-256 digest".to_owned()))?;

    let filename = rest
        .strip_prefix(TEXT_MODE_SEPARATOR)
        .or_else(|| rest.strip_prefix(BINARY_MODE_SEPARATOR))
        .ok_or_else(|| malformed("expected two-character separator after digest".to_owned()))?;

    if filename.is_empty() {
        return Err(malformed("missing filename".to_owned()));
    }

    // sha256sum -c accepts either case.
    let digest =
        Sha256Digest::try_from(digest.to_ascii_lowercase()).map_err(|e| malformed(e.to_string()))?;

    Ok(ChecksumEntry {
        digest,
        filename: filename.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn digest(c: char) -> Sha256Digest {
        Sha256Digest::try_from(c.to_string().repeat(64)).expect("valid digest")
    }

    #[test]
    fn render_matches_sha256sum_text_mode() {
        let mut file = ChecksumFile::default();
        file.push(ChecksumEntry {
            digest: digest('a'),
            filename: "cli-1.0.0-linux-x86_64-static".to_owned(),
        });
        file.push(ChecksumEntry {
            digest: digest('b'),
            filename: "cli-1.0.0-linux-x86_64-static.tar.gz".to_owned(),
        });

        let expected = format!(
            "{}  cli-1.0.0-linux-x86_64-static\n{}  cli-1.0.0-linux-x86_64-static.tar.gz\n",
            "a".repeat(64),
            "b".repeat(64)
        );
        assert_eq!(file.render(), expected);
    }

    #[test]
    fn empty_file_renders_empty() {
        assert_eq!(ChecksumFile::default().render(), "");
    }

    #[test]
    fn parse_accepts_binary_mode_and_blank_lines() {
        let contents = format!("\n{} *cli.zip\n\n", "c".repeat(64));
        let file = ChecksumFile::parse(&contents).expect("parses");
        assert_eq!(file.entries().len(), 1);
        assert_eq!(file.digest_for("cli.zip"), Some(&digest('c')));
    }

    #[test]
    fn parse_keeps_filenames_with_spaces() {
        let contents = format!("{}  my release.zip\n", "d".repeat(64));
        let file = ChecksumFile::parse(&contents).expect("parses");
        assert!(file.digest_for("my release.zip").is_some());
    }

    #[rstest]
    #[case::short_line("abc  file", 1)]
    #[case::single_space(&format!("{} file", "a".repeat(64)), 1)]
    #[case::missing_name(&format!("{}  ", "a".repeat(64)), 1)]
    #[case::non_hex_digest(&format!("{}  file", "g".repeat(64)), 1)]
    #[case::second_line(&format!("{}  ok\nbroken", "a".repeat(64)), 2)]
    fn parse_reports_offending_line(#[case] contents: &str, #[case] expected_line: usize) {
        let err = ChecksumFile::parse(contents).expect_err("should reject");
        assert!(
            matches!(err, ArtefactError::MalformedChecksumLine { line, .. } if line == expected_line),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn parse_normalises_uppercase_digests() {
        let contents = format!("{}  cli.zip\n", "E".repeat(64));
        let file = ChecksumFile::parse(&contents).expect("parses");
        assert_eq!(file.digest_for("cli.zip"), Some(&digest('e')));
        assert_eq!(file.render(), format!("{}  cli.zip\n", "e".repeat(64)));
    }

    #[test]
    fn parse_rejects_multibyte_boundary_without_panicking() {
        let contents = format!("{}é  file", "a".repeat(63));
        assert!(ChecksumFile::parse(&contents).is_err());
    }
}
