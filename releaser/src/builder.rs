//! Cargo build orchestration for the static client binary.
//!
//! This module builds the client in release mode for the musl target with a
//! statically linked C runtime, then copies the result into the releases
//! directory under its versioned artefact name.

use crate::artefact::naming::ArtefactName;
use crate::config::ReleaseConfig;
use crate::error::{ReleaseError, Result};
use crate::exec::{Invocation, Step};
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Deadline for a release build (60 minutes).
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

const DEFAULT_MANIFEST: &str = "Cargo.toml";

/// Configuration for the build process.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Executable produced by cargo.
    pub binary: String,
    /// Compilation target triple.
    pub target: String,
    /// Cargo package to select, if any.
    pub package: Option<String>,
    /// Client crate manifest.
    pub manifest_path: Utf8PathBuf,
    /// Features to enable.
    pub features: Vec<String>,
    /// `RUSTFLAGS` for the build.
    pub rustflags: String,
    /// Directory for build artifacts.
    pub target_dir: Utf8PathBuf,
    /// Number of parallel build jobs (None for cargo default).
    pub jobs: Option<usize>,
    /// Whether to pass `-v` to cargo.
    pub verbose: bool,
}

impl BuildConfig {
    /// Derive build settings from the resolved release configuration.
    #[must_use]
    pub fn from_release(config: &ReleaseConfig, verbosity: u8) -> Self {
        Self {
            binary: config.binary.as_str().to_owned(),
            target: config.target.as_str().to_owned(),
            package: config.package.clone(),
            manifest_path: config.manifest_path.clone(),
            features: config.features.clone(),
            rustflags: config.rustflags.clone(),
            target_dir: config.target_dir.clone(),
            jobs: config.jobs,
            verbose: verbosity > 0,
        }
    }
}

/// Builder for compiling the client binary.
#[derive(Debug, Clone)]
pub struct Builder {
    config: BuildConfig,
}

impl Builder {
    /// Create a new builder with the given configuration.
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// The `cargo build` command line for the static binary.
    ///
    /// `CARGO_TARGET_DIR` is always exported so the output location does not
    /// depend on which workspace the manifest belongs to.
    #[must_use]
    pub fn build_invocation(&self) -> Invocation {
        let config = &self.config;
        let mut cmd = Invocation::new("cargo")
            .args(["build", "--release", "--target", config.target.as_str()])
            .timeout(BUILD_TIMEOUT);

        if !config.features.is_empty() {
            cmd = cmd.args(["--features".to_owned(), config.features.join(",")]);
        }

        if let Some(package) = &config.package {
            cmd = cmd.args(["-p", package.as_str()]);
        }

        if config.manifest_path.as_str() != DEFAULT_MANIFEST {
            cmd = cmd.args(["--manifest-path", config.manifest_path.as_str()]);
        }

        if let Some(jobs) = config.jobs {
            cmd = cmd.args(["-j".to_owned(), jobs.to_string()]);
        }

        if config.verbose {
            cmd = cmd.arg("-v");
        }

        cmd.env("RUSTFLAGS", config.rustflags.as_str())
            .env("CARGO_TARGET_DIR", config.target_dir.as_str())
    }

    /// The build as a required step.
    #[must_use]
    pub fn build_step(&self) -> Step {
        Step::required(
            format!("build {} for {}", self.config.binary, self.config.target),
            self.build_invocation(),
        )
    }

    /// Where cargo writes the compiled binary.
    #[must_use]
    pub fn binary_path(&self) -> Utf8PathBuf {
        self.config
            .target_dir
            .join(&self.config.target)
            .join("release")
            .join(&self.config.binary)
    }

    /// Copy the compiled binary into `releases_dir` under its artefact name.
    ///
    /// `fs::copy` carries the permission bits across, so the copy stays
    /// executable.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::BuildOutputMissing`] if cargo produced no
    /// binary, or an I/O error if the copy fails.
    pub fn copy_to_releases(&self, name: &ArtefactName, releases_dir: &Utf8Path) -> Result<PathBuf> {
        let source = self.binary_path();
        if !source.is_file() {
            return Err(ReleaseError::BuildOutputMissing { path: source });
        }

        fs::create_dir_all(releases_dir)?;
        let dest = releases_dir.join(name.binary_file());
        info!("copying {source} to {dest}");
        fs::copy(&source, &dest)?;
        Ok(dest.into_std_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artefact::naming::BinaryName;
    use crate::artefact::target::TargetTriple;
    use crate::artefact::version::ReleaseVersion;
    use crate::test_utils::sample_config;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn builder() -> Builder {
        Builder::new(BuildConfig::from_release(&sample_config(), 0))
    }

    fn env_value<'a>(invocation: &'a Invocation, key: &str) -> Option<&'a str> {
        invocation
            .env_vars()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[rstest]
    fn default_invocation_matches_release_build(builder: Builder) {
        let cmd = builder.build_invocation();
        assert_eq!(cmd.program(), "cargo");
        assert_eq!(
            cmd.arg_list(),
            ["build", "--release", "--target", "x86_64-unknown-linux-musl"]
        );
        assert_eq!(
            env_value(&cmd, "RUSTFLAGS"),
            Some("-C target-feature=+crt-static")
        );
        assert_eq!(env_value(&cmd, "CARGO_TARGET_DIR"), Some("target"));
        assert_eq!(cmd.deadline(), BUILD_TIMEOUT);
    }

    #[test]
    fn optional_flags_are_appended() {
        let mut config = sample_config();
        config.features = vec!["build_proto".to_owned(), "jemalloc".to_owned()];
        config.package = Some("nexus-cli".to_owned());
        config.manifest_path = Utf8PathBuf::from("clients/cli/Cargo.toml");
        config.jobs = Some(4);
        let builder = Builder::new(BuildConfig::from_release(&config, 1));

        let rendered = builder.build_invocation().to_string();
        assert!(rendered.ends_with(concat!(
            "cargo build --release --target x86_64-unknown-linux-musl ",
            "--features build_proto,jemalloc -p nexus-cli ",
            "--manifest-path clients/cli/Cargo.toml -j 4 -v"
        )));
    }

    #[rstest]
    fn binary_path_uses_target_triple(builder: Builder) {
        assert_eq!(
            builder.binary_path(),
            Utf8PathBuf::from("target/x86_64-unknown-linux-musl/release/nexus-network")
        );
    }

    #[test]
    fn copy_to_releases_renames_binary_and_keeps_it_executable() {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 path");
        let mut config = sample_config();
        config.target_dir = root.join("target");
        let builder = Builder::new(BuildConfig::from_release(&config, 0));

        let built = builder.binary_path();
        fs::create_dir_all(built.parent().expect("has parent")).expect("mkdir");
        fs::write(&built, b"static").expect("write binary");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&built, fs::Permissions::from_mode(0o755)).expect("chmod");
        }

        let name = ArtefactName::new(
            BinaryName::try_from("nexus-network").expect("valid name"),
            ReleaseVersion::try_from("0.8.4").expect("valid version"),
            TargetTriple::default(),
        );
        let releases = root.join("releases");
        let dest = builder
            .copy_to_releases(&name, &releases)
            .expect("copy succeeds");

        assert_eq!(
            dest,
            releases
                .join("nexus-network-0.8.4-linux-x86_64-static")
                .into_std_path_buf()
        );
        assert_eq!(fs::read(&dest).expect("read copy"), b"static");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dest).expect("stat copy").permissions().mode();
            assert_ne!(mode & 0o111, 0, "copy lost the executable bit: {mode:o}");
        }
    }

    #[rstest]
    fn copy_to_releases_reports_missing_output(builder: Builder) {
        let dir = TempDir::new().expect("temp dir");
        let releases = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 path");
        let name = ArtefactName::new(
            BinaryName::try_from("nexus-network").expect("valid name"),
            ReleaseVersion::try_from("0.8.4").expect("valid version"),
            TargetTriple::default(),
        );

        let err = builder
            .copy_to_releases(&name, &releases)
            .expect_err("nothing was built");
        assert!(matches!(err, ReleaseError::BuildOutputMissing { .. }));
    }
}
