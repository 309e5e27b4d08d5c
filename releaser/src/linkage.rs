//! Static linkage verification.
//!
//! A binary built with `+crt-static` for musl should carry no dynamic
//! dependencies. `ldd` reports this either as "not a dynamic executable"
//! (glibc's ldd, exiting non-zero) or "statically linked" (musl's ldd), so
//! the exit status alone is not a reliable signal and the text is inspected
//! instead.

use crate::error::{ReleaseError, Result};
use crate::exec::{CommandExecutor, Invocation};
use camino::Utf8Path;
use log::{debug, info};

const STATIC_MARKERS: &[&str] = &["not a dynamic executable", "statically linked"];

/// Result of inspecting `ldd` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Linkage {
    /// No shared libraries are required.
    Static,
    /// The listed shared libraries are required at run time.
    Dynamic(Vec<String>),
}

/// Classify combined `ldd` output.
#[must_use]
pub fn classify_ldd(output: &str) -> Linkage {
    if STATIC_MARKERS.iter().any(|marker| output.contains(marker)) {
        return Linkage::Static;
    }

    let libraries = output
        .lines()
        .map(str::trim)
        .filter_map(library_name)
        .map(str::to_owned)
        .collect();
    Linkage::Dynamic(libraries)
}

/// Pull the library name out of a single `ldd` line.
///
/// Lines look like `libc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x...)`,
/// `linux-vdso.so.1 (0x...)` or `/lib64/ld-linux-x86-64.so.2 (0x...)`.
fn library_name(line: &str) -> Option<&str> {
    if line.is_empty() {
        return None;
    }
    if let Some((name, _)) = line.split_once("=>") {
        return Some(name.trim());
    }
    line.starts_with('/')
        .then(|| line.split_whitespace().next())
        .flatten()
}

/// Check that `binary` is statically linked.
///
/// # Errors
///
/// Returns [`ReleaseError::NotStatic`] listing the shared libraries if the
/// binary is dynamically linked, or the executor's error if `ldd` cannot be
/// run.
pub fn verify_static(executor: &dyn CommandExecutor, binary: &Utf8Path) -> Result<()> {
    let invocation = Invocation::new("ldd").arg(binary.as_str());
    debug!("$ {invocation}");
    let output = executor.run(&invocation)?;

    let text = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    match classify_ldd(&text) {
        Linkage::Static => {
            info!("{binary} is statically linked");
            Ok(())
        }
        Linkage::Dynamic(libraries) => Err(ReleaseError::NotStatic {
            path: binary.to_owned(),
            libraries,
        }),
    }
}
