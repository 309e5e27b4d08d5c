//! GitHub release step planning via the `gh` CLI.
//!
//! Authentication and repository detection are left to `gh` itself; an
//! explicit `--repo` is only passed when configured.

use crate::exec::{Invocation, Step};
use camino::Utf8Path;
use std::time::Duration;

/// Timeout for `gh` operations (10 minutes); uploads can be slow.
pub const GH_TIMEOUT: Duration = Duration::from_secs(600);

/// Release notes source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseNotes<'a> {
    /// Notes read by `gh` from a Markdown file.
    File(&'a Utf8Path),
    /// Inline notes.
    Text(String),
}

impl ReleaseNotes<'_> {
    /// Notes used when no notes file is configured.
    #[must_use]
    pub fn default_for(binary: &str, tag: &str, checksum_file: &str) -> Self {
        Self::Text(format!(
            "Statically linked {binary} {tag} for Linux.\n\n\
             Verify downloads with `sha256sum -c {checksum_file}`."
        ))
    }
}

/// Inputs for the GitHub half of a release.
#[derive(Debug, Clone)]
pub struct GithubRelease<'a> {
    /// Tag the release is attached to.
    pub tag: &'a str,
    /// Release title.
    pub title: String,
    /// Files to upload, in order.
    pub assets: &'a [String],
    /// Release notes.
    pub notes: ReleaseNotes<'a>,
    /// `OWNER/REPO`, when `gh` should not infer it.
    pub repo: Option<&'a str>,
    /// Create the release as a draft.
    pub draft: bool,
    /// Mark the release as a pre-release.
    pub prerelease: bool,
}

impl GithubRelease<'_> {
    fn gh(&self, args: &[&str]) -> Invocation {
        let cmd = Invocation::new("gh")
            .args(args.iter().copied())
            .timeout(GH_TIMEOUT);
        match self.repo {
            Some(repo) => cmd.args(["--repo", repo]),
            None => cmd,
        }
    }
}

/// Best-effort deletion of an existing release for the tag.
///
/// Only the release is deleted; the tag is handled by the git steps.
#[must_use]
pub fn delete_release_step(release: &GithubRelease<'_>) -> Step {
    Step::best_effort(
        format!("delete existing GitHub release {}", release.tag),
        release.gh(&["release", "delete", release.tag, "--yes"]),
    )
}

/// Create the release and upload every asset.
#[must_use]
pub fn create_release_step(release: &GithubRelease<'_>) -> Step {
    let mut cmd = Invocation::new("gh")
        .args(["release", "create", release.tag])
        .args(release.assets.iter().map(String::as_str))
        .args(["--title", release.title.as_str()])
        .timeout(GH_TIMEOUT);

    cmd = match &release.notes {
        ReleaseNotes::File(path) => cmd.args(["--notes-file", path.as_str()]),
        ReleaseNotes::Text(text) => cmd.args(["--notes", text.as_str()]),
    };

    if let Some(repo) = release.repo {
        cmd = cmd.args(["--repo", repo]);
    }
    if release.draft {
        cmd = cmd.arg("--draft");
    }
    if release.prerelease {
        cmd = cmd.arg("--prerelease");
    }

    Step::required(format!("create GitHub release {}", release.tag), cmd)
}
