//! Toolchain preparation for static builds.
//!
//! A musl build needs the Rust standard library for the target and a C
//! toolchain able to link statically. Both are installed as steps so they
//! show up in dry-run plans and run through the same executor as everything
//! else.

use crate::config::ReleaseConfig;
use crate::exec::{Invocation, Step};

/// Plan the steps that make the static target buildable.
///
/// The linker package install is skipped when the configured probe (by
/// default `musl-gcc --version`) already succeeds, so hosts without root
/// access work as long as the linker is present.
#[must_use]
pub fn plan_toolchain_steps(config: &ReleaseConfig) -> Vec<Step> {
    let mut steps = vec![Step::required(
        format!("add Rust target {}", config.target),
        Invocation::new("rustup").args(["target", "add", config.target.as_str()]),
    )];

    if let Some(package) = &config.linker_package {
        if let Some(step) = linker_install_step(config, package) {
            steps.push(step);
        }
    }

    steps
}

fn linker_install_step(config: &ReleaseConfig, package: &str) -> Option<Step> {
    let (program, args) = config.install_command.split_first()?;
    let install = Step::required(
        format!("install static linker package {package}"),
        Invocation::new(program.as_str())
            .args(args.iter().map(String::as_str))
            .arg(package),
    );

    Some(match config.linker_probe.split_first() {
        Some((probe, probe_args)) => {
            install.skip_if(Invocation::new(probe.as_str()).args(probe_args.iter().map(String::as_str)))
        }
        None => install,
    })
}
