//! Release configuration.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults matching the static musl release flow.
//! 2. An optional `release.toml` file.
//! 3. Command-line overrides.
//!
//! The binary name and the release version fall back to the client crate's
//! `Cargo.toml` when not set explicitly.

use crate::artefact::naming::BinaryName;
use crate::artefact::target::TargetTriple;
use crate::artefact::version::ReleaseVersion;
use crate::error::{ReleaseError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;

/// Config file looked up in the current directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "release.toml";

/// Flags that force the C runtime to be linked statically.
pub const DEFAULT_RUSTFLAGS: &str = "-C target-feature=+crt-static";

/// Package providing the musl linker wrapper on Debian-based hosts.
pub const DEFAULT_LINKER_PACKAGE: &str = "musl-tools";

/// The on-disk shape of `release.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Name of the executable cargo produces.
    pub binary: Option<String>,
    /// Cargo package to build (`-p`).
    pub package: Option<String>,
    /// Path to the client crate's `Cargo.toml`.
    pub manifest_path: Option<Utf8PathBuf>,
    /// Target triple.
    pub target: Option<String>,
    /// Cargo features to enable.
    pub features: Option<Vec<String>>,
    /// `RUSTFLAGS` for the build.
    pub rustflags: Option<String>,
    /// Cargo target directory.
    pub target_dir: Option<Utf8PathBuf>,
    /// Directory receiving release assets.
    pub releases_dir: Option<Utf8PathBuf>,
    /// System package providing the static linker; empty disables install.
    pub linker_package: Option<String>,
    /// Command prefix used to install `linker_package`.
    pub install_command: Option<Vec<String>>,
    /// Command whose success shows the linker is already present.
    pub linker_probe: Option<Vec<String>>,
    /// Whether to check the binary with `ldd` after building.
    pub verify_static: Option<bool>,
    /// Extra files to stage alongside the artefacts in the release commit.
    pub metadata_files: Option<Vec<Utf8PathBuf>>,
    /// Git remote to push to.
    pub remote: Option<String>,
    /// `OWNER/REPO` passed to `gh --repo`.
    pub repo: Option<String>,
    /// Markdown file used as release notes.
    pub notes_file: Option<Utf8PathBuf>,
    /// Parallel cargo jobs.
    pub jobs: Option<usize>,
}

impl FileConfig {
    /// Parse `release.toml` contents.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::InvalidConfig`] on malformed TOML or unknown
    /// keys.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ReleaseError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    /// Load the config file.
    ///
    /// An explicit path must exist. Without one, `release.toml` in the
    /// current directory is used if present, otherwise defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::ConfigRead`] if an explicit file cannot be
    /// read, or a parse error.
    pub fn load(explicit: Option<&Utf8Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_owned(),
            None => {
                let default = Utf8PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    debug!("no {DEFAULT_CONFIG_FILE} found; using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        debug!("loading configuration from {path}");
        let contents = std::fs::read_to_string(&path).map_err(|source| {
            ReleaseError::ConfigRead {
                path: path.clone(),
                source,
            }
        })?;
        Self::parse(&contents)
    }
}

/// Command-line overrides applied on top of the file config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Target triple override.
    pub target: Option<String>,
    /// Releases directory override.
    pub releases_dir: Option<Utf8PathBuf>,
    /// Feature list override; empty keeps the configured features.
    pub features: Vec<String>,
    /// Git remote override.
    pub remote: Option<String>,
    /// GitHub repository override.
    pub repo: Option<String>,
    /// Parallel jobs override.
    pub jobs: Option<usize>,
}

/// Fully resolved release settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Executable name.
    pub binary: BinaryName,
    /// Cargo package to build, if not the manifest's own.
    pub package: Option<String>,
    /// Client crate manifest.
    pub manifest_path: Utf8PathBuf,
    /// Build target.
    pub target: TargetTriple,
    /// Cargo features.
    pub features: Vec<String>,
    /// `RUSTFLAGS` value.
    pub rustflags: String,
    /// Cargo target directory (exported as `CARGO_TARGET_DIR`).
    pub target_dir: Utf8PathBuf,
    /// Release asset directory.
    pub releases_dir: Utf8PathBuf,
    /// Static linker package, if one should be installed.
    pub linker_package: Option<String>,
    /// Install command prefix.
    pub install_command: Vec<String>,
    /// Linker presence probe.
    pub linker_probe: Vec<String>,
    /// Whether to verify static linkage.
    pub verify_static: bool,
    /// Additional files staged in the release commit.
    pub metadata_files: Vec<Utf8PathBuf>,
    /// Git remote.
    pub remote: String,
    /// GitHub repository for `gh --repo`.
    pub repo: Option<String>,
    /// Release notes file.
    pub notes_file: Option<Utf8PathBuf>,
    /// Parallel cargo jobs.
    pub jobs: Option<usize>,
}

impl ReleaseConfig {
    /// Merge defaults, file settings, and overrides.
    ///
    /// The manifest is only read when the binary name is not configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a value fails validation, if the install command
    /// is empty while a linker package is configured, or if the binary name
    /// cannot be determined.
    pub fn resolve(file: FileConfig, overrides: ConfigOverrides) -> Result<Self> {
        let manifest_path = file
            .manifest_path
            .unwrap_or_else(|| Utf8PathBuf::from("Cargo.toml"));

        let binary = match file.binary {
            Some(name) => BinaryName::try_from(name)?,
            None => BinaryName::try_from(read_manifest_binary(&manifest_path)?)?,
        };

        let target = match overrides.target.or(file.target) {
            Some(t) => TargetTriple::try_from(t)?,
            None => TargetTriple::default(),
        };

        let features = if overrides.features.is_empty() {
            file.features.unwrap_or_default()
        } else {
            overrides.features
        };

        let linker_package = match file.linker_package {
            Some(pkg) if pkg.trim().is_empty() => None,
            Some(pkg) => Some(pkg),
            None => Some(DEFAULT_LINKER_PACKAGE.to_owned()),
        };

        let install_command = file
            .install_command
            .unwrap_or_else(|| to_strings(&["apt-get", "install", "-y"]));
        if linker_package.is_some() && install_command.is_empty() {
            return Err(ReleaseError::InvalidConfig {
                reason: "install_command must not be empty when linker_package is set".to_owned(),
            });
        }

        let linker_probe = file
            .linker_probe
            .unwrap_or_else(|| to_strings(&["musl-gcc", "--version"]));

        let metadata_files = file
            .metadata_files
            .unwrap_or_else(|| vec![manifest_path.clone()]);

        Ok(Self {
            binary,
            package: file.package,
            target,
            features,
            rustflags: file
                .rustflags
                .unwrap_or_else(|| DEFAULT_RUSTFLAGS.to_owned()),
            target_dir: file
                .target_dir
                .unwrap_or_else(|| Utf8PathBuf::from("target")),
            releases_dir: overrides
                .releases_dir
                .or(file.releases_dir)
                .unwrap_or_else(|| Utf8PathBuf::from("releases")),
            linker_package,
            install_command,
            linker_probe,
            verify_static: file.verify_static.unwrap_or(true),
            metadata_files,
            remote: overrides
                .remote
                .or(file.remote)
                .unwrap_or_else(|| "origin".to_owned()),
            repo: overrides.repo.or(file.repo),
            notes_file: file.notes_file,
            jobs: overrides.jobs.or(file.jobs),
            manifest_path,
        })
    }

    /// Determine the release version from the CLI or the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::VersionUnresolved`] when no explicit version
    /// is given and the manifest lacks a literal `[package].version`, or an
    /// [`ArtefactError`](crate::artefact::error::ArtefactError) if the value
    /// is not semver.
    pub fn resolve_version(&self, explicit: Option<&str>) -> Result<ReleaseVersion> {
        if let Some(version) = explicit {
            return Ok(ReleaseVersion::try_from(version)?);
        }
        let table = read_manifest(&self.manifest_path)?;
        let version = manifest_version(&table)?;
        debug!("release version {version} read from {}", self.manifest_path);
        Ok(ReleaseVersion::try_from(version)?)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|&s| s.to_owned()).collect()
}

fn read_manifest(path: &Utf8Path) -> Result<toml::Table> {
    let contents = std::fs::read_to_string(path).map_err(|e| ReleaseError::InvalidManifest {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;
    contents
        .parse::<toml::Table>()
        .map_err(|e| ReleaseError::InvalidManifest {
            path: path.to_owned(),
            reason: format!("TOML parse error: {e}"),
        })
}

/// Read the executable name: the first `[[bin]]` entry, else the package name.
fn read_manifest_binary(path: &Utf8Path) -> Result<String> {
    let table = read_manifest(path)?;
    manifest_binary(&table).ok_or_else(|| ReleaseError::InvalidConfig {
        reason: format!("no `binary` configured and {path} names no [[bin]] or [package]"),
    })
}

fn manifest_binary(table: &toml::Table) -> Option<String> {
    let from_bin = table
        .get("bin")
        .and_then(toml::Value::as_array)
        .and_then(|bins| bins.first())
        .and_then(|bin| bin.get("name"))
        .and_then(toml::Value::as_str);

    let from_package = || {
        table
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(toml::Value::as_str)
    };

    from_bin.or_else(from_package).map(str::to_owned)
}

fn manifest_version(table: &toml::Table) -> Result<String> {
    let version = table
        .get("package")
        .and_then(|p| p.get("version"))
        .ok_or_else(|| ReleaseError::VersionUnresolved {
            reason: "manifest has no package.version".to_owned(),
        })?;

    version
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| ReleaseError::VersionUnresolved {
            reason: "package.version is inherited from the workspace".to_owned(),
        })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
