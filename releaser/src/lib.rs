//! Static client release library.
//!
//! This crate builds a statically linked client binary for a musl target,
//! packages it with a `sha256sum`-compatible checksum file, and publishes
//! it as a tagged GitHub release. It is used by the `client-release` CLI
//! binary and can be driven programmatically with any
//! [`exec::CommandExecutor`].
//!
//! # Modules
//!
//! - [`artefact`] - Artefact naming, packaging, checksums, and verification
//! - [`builder`] - Cargo build orchestration for the static binary
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - `release.toml` loading and resolution
//! - [`error`] - Semantic error types with recovery hints
//! - [`exec`] - External command steps, timeouts, and failure policy
//! - [`git`] - Release commit, tag, and push steps
//! - [`github`] - GitHub release steps via `gh`
//! - [`linkage`] - Static linkage verification via `ldd`
//! - [`logging`] - Logger initialisation
//! - [`output`] - Human and JSON summaries
//! - [`pipeline`] - Build, publish, and verify orchestration
//! - [`toolchain`] - Rust target and static linker installation

pub mod artefact;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod git;
pub mod github;
pub mod linkage;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod toolchain;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
