//! CLI argument definitions for the release tool.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::config::ConfigOverrides;
use crate::pipeline::{BuildOptions, PublishMode, PublishOptions};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Build, package, and publish static client binaries.
#[derive(Parser, Debug)]
#[command(name = "client-release")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build, package, and publish static client binaries.\n\n",
    "The client is compiled for a musl target with a statically linked C ",
    "runtime, packaged as a bare binary, a .tar.gz, and a .zip, and described ",
    "by a sha256sum-compatible checksum file. `publish` commits the artefacts, ",
    "tags the release, pushes, and creates a GitHub release with every asset ",
    "attached.\n\n",
    "Settings are read from release.toml when present; see --config.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Build and package the version in Cargo.toml:\n",
    "    $ client-release build\n\n",
    "  Preview a release without running anything:\n",
    "    $ client-release --dry-run publish --version 0.8.4\n\n",
    "  Re-publish existing artefacts, replacing the tag and release:\n",
    "    $ client-release publish --skip-build\n\n",
    "  Check downloaded artefacts:\n",
    "    $ client-release verify --version 0.8.4\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file [default: ./release.toml if present].
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Print the planned steps and exit without running anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,

    /// Target triple to build for.
    #[arg(long, global = true, value_name = "TRIPLE")]
    pub target: Option<String>,

    /// Directory receiving release assets.
    #[arg(long, global = true, value_name = "DIR")]
    pub releases_dir: Option<Utf8PathBuf>,

    /// Cargo feature to enable (can be repeated; replaces configured features).
    #[arg(short = 'F', long = "feature", global = true, value_name = "NAME")]
    pub features: Vec<String>,

    /// Number of parallel cargo build jobs.
    #[arg(short, long, global = true, value_name = "N")]
    pub jobs: Option<usize>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the static binary and write archives and checksums.
    Build(BuildArgs),

    /// Commit, tag, and push the artefacts and create a GitHub release.
    Publish(PublishArgs),

    /// Verify release artefacts against their checksum file.
    Verify(VerifyArgs),
}

/// Arguments for the build command.
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Release version [default: package.version from the manifest].
    #[arg(long = "version", value_name = "VERSION")]
    pub release_version: Option<String>,

    /// Skip `rustup target add` and the linker package install.
    #[arg(long)]
    pub skip_toolchain: bool,

    /// Print the build summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the publish command.
#[derive(Args, Debug, Clone, Default)]
pub struct PublishArgs {
    /// Release version [default: package.version from the manifest].
    #[arg(long = "version", value_name = "VERSION")]
    pub release_version: Option<String>,

    /// Publish the artefacts already in the releases directory.
    #[arg(long)]
    pub skip_build: bool,

    /// How to treat an existing tag and release for this version.
    #[arg(long, value_enum, default_value_t = PublishMode::Replace)]
    pub mode: PublishMode,

    /// Markdown file with release notes.
    #[arg(long, value_name = "FILE")]
    pub notes_file: Option<Utf8PathBuf>,

    /// Create the GitHub release as a draft.
    #[arg(long)]
    pub draft: bool,

    /// Git remote to push to.
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// GitHub repository as OWNER/REPO [default: inferred by gh].
    #[arg(long, value_name = "OWNER/REPO")]
    pub repo: Option<String>,
}

/// Arguments for the verify command.
#[derive(Args, Debug, Clone, Default)]
pub struct VerifyArgs {
    /// Release version [default: package.version from the manifest].
    #[arg(long = "version", value_name = "VERSION")]
    pub release_version: Option<String>,
}

impl Command {
    /// The explicitly requested release version, if any.
    #[must_use]
    pub fn release_version(&self) -> Option<&str> {
        match self {
            Self::Build(args) => args.release_version.as_deref(),
            Self::Publish(args) => args.release_version.as_deref(),
            Self::Verify(args) => args.release_version.as_deref(),
        }
    }
}

impl Cli {
    /// Configuration overrides taken from the command line.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        let (remote, repo) = match &self.command {
            Command::Publish(args) => (args.remote.clone(), args.repo.clone()),
            Command::Build(_) | Command::Verify(_) => (None, None),
        };
        ConfigOverrides {
            target: self.global.target.clone(),
            releases_dir: self.global.releases_dir.clone(),
            features: self.global.features.clone(),
            remote,
            repo,
            jobs: self.global.jobs,
        }
    }
}

impl BuildArgs {
    /// Pipeline options for `build`.
    #[must_use]
    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            skip_toolchain: self.skip_toolchain,
        }
    }
}

impl PublishArgs {
    /// Pipeline options for `publish`.
    #[must_use]
    pub fn options(&self) -> PublishOptions {
        PublishOptions {
            skip_build: self.skip_build,
            mode: self.mode,
            notes_file: self.notes_file.clone(),
            draft: self.draft,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
