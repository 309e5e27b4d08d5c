//! Git step planning for publishing a release.
//!
//! The release commit carries the artefacts themselves, so publishing is a
//! sequence of index, commit, tag, and push operations. Clean-up of a prior
//! release of the same tag is kept separate so it can be left out of
//! fresh-mode runs. All git commands share a 5-minute deadline to avoid
//! hangs on network issues.

use crate::exec::{Invocation, Step};
use std::time::Duration;

/// Timeout for git operations (5 minutes).
pub const GIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Inputs for the git half of a release.
#[derive(Debug, Clone)]
pub struct GitRelease<'a> {
    /// Tag to create, e.g. `v1.4.0`.
    pub tag: &'a str,
    /// Remote to push to.
    pub remote: &'a str,
    /// Directory holding release assets; stale entries are untracked.
    pub releases_dir: &'a str,
    /// Files to stage in the release commit, in order.
    pub files: &'a [String],
}

impl GitRelease<'_> {
    /// The message used for both the commit and the annotated tag.
    #[must_use]
    pub fn message(&self) -> String {
        format!("Release {}", self.tag)
    }
}

fn git<I, S>(args: I) -> Invocation
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Invocation::new("git").args(args).timeout(GIT_TIMEOUT)
}

/// Best-effort removal of any existing local and remote tag.
///
/// Either may legitimately be absent, so failures are tolerated.
#[must_use]
pub fn tag_cleanup_steps(release: &GitRelease<'_>) -> Vec<Step> {
    vec![
        Step::best_effort(
            format!("delete local tag {}", release.tag),
            git(["tag", "-d", release.tag]),
        ),
        Step::best_effort(
            format!("delete remote tag {} on {}", release.tag, release.remote),
            git([
                "push".to_owned(),
                release.remote.to_owned(),
                format!(":refs/tags/{}", release.tag),
            ]),
        ),
    ]
}

/// Untrack everything under the releases directory.
///
/// Artefacts from earlier versions drop out of the index; the current ones
/// are re-added by [`commit_steps`]. Files on disk are left alone.
#[must_use]
pub fn untrack_releases_step(release: &GitRelease<'_>) -> Step {
    Step::best_effort(
        format!("untrack stale artefacts in {}", release.releases_dir),
        git([
            "rm",
            "-r",
            "-q",
            "--cached",
            "--ignore-unmatch",
            "--",
            release.releases_dir,
        ]),
    )
}

/// Stage, commit, tag, and push the release.
///
/// `git add -f` is used because release directories are commonly ignored.
/// The commit is skipped when nothing is staged, so re-running a release of
/// unchanged artefacts does not fail on an empty commit.
#[must_use]
pub fn commit_steps(release: &GitRelease<'_>) -> Vec<Step> {
    let message = release.message();

    let add = git(["add", "-f", "--"]).args(release.files.iter().map(String::as_str));
    let commit = Step::required(
        format!("commit release {}", release.tag),
        git(["commit", "-m", message.as_str()]),
    )
    .skip_if(git(["diff", "--cached", "--quiet"]));

    vec![
        Step::required("stage release artefacts", add),
        commit,
        Step::required(
            format!("create tag {}", release.tag),
            git(["tag", "-a", release.tag, "-m", message.as_str()]),
        ),
        Step::required(
            format!("push commit to {}", release.remote),
            git(["push", release.remote, "HEAD"]),
        ),
        Step::required(
            format!("push tag {} to {}", release.tag, release.remote),
            git(["push", release.remote, release.tag]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::Requirement;
    use rstest::{fixture, rstest};

    #[fixture]
    fn files() -> Vec<String> {
        vec![
            "releases/cli-1.0.0-linux-x86_64-static".to_owned(),
            "releases/cli-1.0.0-linux-x86_64-static.tar.gz".to_owned(),
            "Cargo.toml".to_owned(),
        ]
    }

    fn release(files: &[String]) -> GitRelease<'_> {
        GitRelease {
            tag: "v1.0.0",
            remote: "origin",
            releases_dir: "releases",
            files,
        }
    }

    fn rendered(steps: &[Step]) -> Vec<String> {
        steps.iter().map(|s| s.invocation.to_string()).collect()
    }

    #[rstest]
    fn tag_cleanup_is_best_effort(files: Vec<String>) {
        let steps = tag_cleanup_steps(&release(&files));
        assert_eq!(
            rendered(&steps),
            vec!["git tag -d v1.0.0", "git push origin :refs/tags/v1.0.0"]
        );
        assert!(steps.iter().all(|s| s.requirement == Requirement::BestEffort));
    }

    #[rstest]
    fn untrack_targets_releases_dir(files: Vec<String>) {
        let step = untrack_releases_step(&release(&files));
        assert_eq!(
            step.invocation.to_string(),
            "git rm -r -q --cached --ignore-unmatch -- releases"
        );
        assert_eq!(step.requirement, Requirement::BestEffort);
    }

    #[rstest]
    fn commit_steps_run_in_order(files: Vec<String>) {
        let steps = commit_steps(&release(&files));
        assert_eq!(
            rendered(&steps),
            vec![
                concat!(
                    "git add -f -- releases/cli-1.0.0-linux-x86_64-static ",
                    "releases/cli-1.0.0-linux-x86_64-static.tar.gz Cargo.toml"
                ),
                "git commit -m 'Release v1.0.0'",
                "git tag -a v1.0.0 -m 'Release v1.0.0'",
                "git push origin HEAD",
                "git push origin v1.0.0",
            ]
        );
        assert!(steps.iter().all(|s| s.requirement == Requirement::Required));
        assert!(steps.iter().all(|s| s.invocation.deadline() == GIT_TIMEOUT));
    }

    #[rstest]
    fn commit_is_skipped_when_index_is_clean(files: Vec<String>) {
        let steps = commit_steps(&release(&files));
        let probe = steps
            .get(1)
            .and_then(|s| s.skip_if.as_ref())
            .map(ToString::to_string);
        assert_eq!(probe.as_deref(), Some("git diff --cached --quiet"));
    }
}
