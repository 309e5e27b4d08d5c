//! Release pipeline orchestration.
//!
//! Each command is first planned as an ordered list of [`Action`]s and then
//! executed. The same plan drives `--dry-run` output and the real run, so the
//! printed plan is exactly what would happen. Execution stops at the first
//! failing required action; best-effort actions log and continue.

use crate::artefact::checksums::ChecksumFile;
use crate::artefact::naming::ArtefactName;
use crate::artefact::packaging::{PackageParams, ReleaseArtefacts, package_release};
use crate::artefact::verification::{VerificationReport, verify_checksum_file};
use crate::artefact::version::ReleaseVersion;
use crate::builder::{BuildConfig, Builder};
use crate::config::ReleaseConfig;
use crate::error::{ReleaseError, Result};
use crate::exec::{CommandExecutor, Step, StepOutcome, run_step};
use crate::git::{GitRelease, commit_steps, tag_cleanup_steps, untrack_releases_step};
use crate::github::{GithubRelease, ReleaseNotes, create_release_step, delete_release_step};
use crate::linkage::verify_static;
use crate::toolchain::plan_toolchain_steps;
use camino::Utf8PathBuf;
use clap::ValueEnum;
use log::info;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// How publishing treats an existing tag and release for the same version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PublishMode {
    /// Delete any existing tag and GitHub release first, so re-running a
    /// release for the same version succeeds.
    #[default]
    Replace,
    /// Assume the tag and release do not exist yet; re-running fails at the
    /// tag step.
    Fresh,
}

impl fmt::Display for PublishMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => f.write_str("replace"),
            Self::Fresh => f.write_str("fresh"),
        }
    }
}

/// Everything a pipeline run needs to know about the release.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    /// Resolved configuration.
    pub config: ReleaseConfig,
    /// Artefact naming for this version and target.
    pub name: ArtefactName,
    /// Log verbosity, forwarded to cargo.
    pub verbosity: u8,
}

impl ReleaseContext {
    /// Combine configuration and the resolved version.
    #[must_use]
    pub fn new(config: ReleaseConfig, version: ReleaseVersion, verbosity: u8) -> Self {
        let name = ArtefactName::new(config.binary.clone(), version, config.target.clone());
        Self {
            config,
            name,
            verbosity,
        }
    }

    /// The release version.
    #[must_use]
    pub fn version(&self) -> &ReleaseVersion {
        self.name.version()
    }

    /// The git tag for this release.
    #[must_use]
    pub fn tag(&self) -> String {
        self.version().tag()
    }

    /// Asset paths inside the releases directory.
    #[must_use]
    pub fn artefacts(&self) -> ReleaseArtefacts {
        ReleaseArtefacts::expected(&self.name, self.config.releases_dir.as_std_path())
    }

    /// A builder for the configured client crate.
    #[must_use]
    pub fn builder(&self) -> Builder {
        Builder::new(BuildConfig::from_release(&self.config, self.verbosity))
    }
}

/// Options for `build`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Skip `rustup target add` and the linker install.
    pub skip_toolchain: bool,
}

/// Options for `publish`.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Publish existing artefacts instead of rebuilding.
    pub skip_build: bool,
    /// Tag and release handling.
    pub mode: PublishMode,
    /// Notes file overriding the configured one.
    pub notes_file: Option<Utf8PathBuf>,
    /// Create the GitHub release as a draft.
    pub draft: bool,
}

/// A single planned unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run an external command.
    Command(Step),
    /// Copy the compiled binary into the releases directory.
    CopyBinary {
        /// Cargo's output path.
        from: Utf8PathBuf,
        /// Versioned destination.
        to: PathBuf,
    },
    /// Check the copied binary with `ldd`.
    VerifyStatic(Utf8PathBuf),
    /// Write archives and the checksum file.
    Package,
    /// Fail unless every release asset already exists.
    RequireAssets(Vec<PathBuf>),
}

impl Action {
    /// Short human-readable description.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Command(step) => step.description.clone(),
            Self::CopyBinary { from, to } => format!("copy {from} to {}", to.display()),
            Self::VerifyStatic(path) => format!("verify {path} is statically linked"),
            Self::Package => "write .tar.gz and .zip archives and checksum file".to_owned(),
            Self::RequireAssets(paths) => format!("check {} release assets exist", paths.len()),
        }
    }
}

/// Outcome of each action, in order.
pub type StepLog = Vec<(String, StepOutcome)>;

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Asset paths.
    pub artefacts: ReleaseArtefacts,
    /// Contents of the checksum file.
    pub checksums: ChecksumFile,
    /// Per-action outcomes.
    pub steps: StepLog,
}

/// Result of a successful publish.
#[derive(Debug, Clone)]
pub struct PublishReport {
    /// The published tag.
    pub tag: String,
    /// Mode the release ran in.
    pub mode: PublishMode,
    /// Uploaded assets.
    pub artefacts: ReleaseArtefacts,
    /// Per-action outcomes.
    pub steps: StepLog,
}

/// Plan a static build, packaging included.
#[must_use]
pub fn plan_build(ctx: &ReleaseContext, options: BuildOptions) -> Vec<Action> {
    let mut actions = Vec::new();
    if !options.skip_toolchain {
        actions.extend(plan_toolchain_steps(&ctx.config).into_iter().map(Action::Command));
    }

    let builder = ctx.builder();
    let artefacts = ctx.artefacts();
    actions.push(Action::Command(builder.build_step()));
    actions.push(Action::CopyBinary {
        from: builder.binary_path(),
        to: artefacts.binary.clone(),
    });
    if ctx.config.verify_static {
        actions.push(Action::VerifyStatic(
            ctx.config.releases_dir.join(ctx.name.binary_file()),
        ));
    }
    actions.push(Action::Package);
    actions
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Plan a release: optional build, git commit/tag/push, GitHub release.
#[must_use]
pub fn plan_publish(ctx: &ReleaseContext, options: &PublishOptions) -> Vec<Action> {
    let artefacts = ctx.artefacts();
    let assets = Vec::from(artefacts.upload_order().map(path_string));

    let mut actions = if options.skip_build {
        vec![Action::RequireAssets(Vec::from(
            artefacts.upload_order().map(Path::to_path_buf),
        ))]
    } else {
        plan_build(ctx, BuildOptions::default())
    };

    let tag = ctx.tag();
    let staged: Vec<String> = assets
        .iter()
        .cloned()
        .chain(ctx.config.metadata_files.iter().map(ToString::to_string))
        .collect();
    let git = GitRelease {
        tag: &tag,
        remote: &ctx.config.remote,
        releases_dir: ctx.config.releases_dir.as_str(),
        files: &staged,
    };

    let notes = match options.notes_file.as_deref().or(ctx.config.notes_file.as_deref()) {
        Some(path) => ReleaseNotes::File(path),
        None => ReleaseNotes::default_for(
            ctx.name.binary().as_str(),
            &tag,
            &ctx.name.checksum_file(),
        ),
    };
    let github = GithubRelease {
        tag: &tag,
        title: format!("{} {tag}", ctx.name.binary()),
        assets: &assets,
        notes,
        repo: ctx.config.repo.as_deref(),
        draft: options.draft,
        prerelease: ctx.version().is_prerelease(),
    };

    let replace = options.mode == PublishMode::Replace;
    let mut steps = Vec::new();
    if replace {
        steps.extend(tag_cleanup_steps(&git));
    }
    steps.push(untrack_releases_step(&git));
    steps.extend(commit_steps(&git));
    if replace {
        steps.push(delete_release_step(&github));
    }
    steps.push(create_release_step(&github));

    actions.extend(steps.into_iter().map(Action::Command));
    actions
}

/// Execute planned actions in order.
///
/// # Errors
///
/// Returns the first error from a required action; later actions do not
/// run.
pub fn execute(
    executor: &dyn CommandExecutor,
    ctx: &ReleaseContext,
    actions: &[Action],
) -> Result<StepLog> {
    let mut log = Vec::with_capacity(actions.len());
    for action in actions {
        let outcome = execute_action(executor, ctx, action)?;
        log.push((action.describe(), outcome));
    }
    Ok(log)
}

fn execute_action(
    executor: &dyn CommandExecutor,
    ctx: &ReleaseContext,
    action: &Action,
) -> Result<StepOutcome> {
    match action {
        Action::Command(step) => return run_step(executor, step),
        Action::CopyBinary { .. } => {
            ctx.builder()
                .copy_to_releases(&ctx.name, &ctx.config.releases_dir)?;
        }
        Action::VerifyStatic(path) => {
            info!("verifying static linkage of {path}");
            verify_static(executor, path)?;
        }
        Action::Package => {
            package_release(&PackageParams {
                name: ctx.name.clone(),
                releases_dir: ctx.config.releases_dir.clone().into_std_path_buf(),
            })?;
        }
        Action::RequireAssets(paths) => {
            if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
                return Err(ReleaseError::MissingArtefact {
                    path: missing.clone(),
                });
            }
        }
    }
    Ok(StepOutcome::Succeeded)
}

fn read_checksums(path: &Path) -> Result<ChecksumFile> {
    let contents = fs::read_to_string(path)?;
    Ok(ChecksumFile::parse(&contents)?)
}

/// Build, verify, and package the static binary.
///
/// # Errors
///
/// Returns the first failing action's error.
pub fn run_build(
    executor: &dyn CommandExecutor,
    ctx: &ReleaseContext,
    options: BuildOptions,
) -> Result<BuildReport> {
    let steps = execute(executor, ctx, &plan_build(ctx, options))?;
    let artefacts = ctx.artefacts();
    let checksums = read_checksums(&artefacts.checksums)?;
    Ok(BuildReport {
        artefacts,
        checksums,
        steps,
    })
}

/// Build (unless skipped) and publish the release.
///
/// # Errors
///
/// Returns [`ReleaseError::MissingArtefact`] if `skip_build` is set and an
/// asset is absent, or the first failing required action's error.
pub fn run_publish(
    executor: &dyn CommandExecutor,
    ctx: &ReleaseContext,
    options: &PublishOptions,
) -> Result<PublishReport> {
    let steps = execute(executor, ctx, &plan_publish(ctx, options))?;
    Ok(PublishReport {
        tag: ctx.tag(),
        mode: options.mode,
        artefacts: ctx.artefacts(),
        steps,
    })
}

/// Check the release's checksum file against the assets beside it.
///
/// # Errors
///
/// Returns an error if the checksum file cannot be read or parsed. Entry
/// failures are reported in the returned report.
pub fn run_verify(ctx: &ReleaseContext) -> Result<VerificationReport> {
    let path = ctx.artefacts().checksums;
    info!("verifying {}", path.display());
    Ok(verify_checksum_file(&path)?)
}

/// Turn a verification report into an error if any entry failed.
///
/// # Errors
///
/// Returns [`ReleaseError::VerificationFailed`] when the report is not a
/// success; an empty checksum file counts as a failure.
pub fn ensure_verified(report: &VerificationReport, checksum_file: &Path) -> Result<()> {
    if report.is_success() {
        return Ok(());
    }
    Err(ReleaseError::VerificationFailed {
        failures: report.failures().count().max(1),
        path: checksum_file.to_path_buf(),
    })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
