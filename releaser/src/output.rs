//! Output formatting for the release CLI.
//!
//! Formatting is kept separate from execution so every summary can be tested
//! as a plain string. Progress goes to the log on stderr; only the final
//! summaries and dry-run plans are written through this module.

use crate::artefact::packaging::ReleaseArtefacts;
use crate::artefact::verification::VerificationReport;
use crate::error::{ReleaseError, Result};
use crate::exec::{Requirement, StepOutcome};
use crate::pipeline::{Action, BuildReport, PublishReport, ReleaseContext};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

/// Format a dry-run plan as a numbered list.
///
/// # Example
///
/// ```
/// use client_release::output::format_plan;
///
/// let text = format_plan("publish v1.0.0", &[]);
/// assert!(text.starts_with("Dry run - no commands will be executed"));
/// ```
#[must_use]
pub fn format_plan(title: &str, actions: &[Action]) -> String {
    let mut out = format!("Dry run - no commands will be executed\n\nPlan for {title}:\n");
    for (index, action) in actions.iter().enumerate() {
        let number = index + 1;
        match action {
            Action::Command(step) => {
                let marker = match step.requirement {
                    Requirement::Required => "",
                    Requirement::BestEffort => " (failure ignored)",
                };
                let _ = writeln!(out, "{number:>3}. {}{marker}", step.description);
                let _ = writeln!(out, "     $ {}", step.invocation);
                if let Some(probe) = &step.skip_if {
                    let _ = writeln!(out, "     skipped if `{probe}` succeeds");
                }
            }
            other => {
                let _ = writeln!(out, "{number:>3}. {}", other.describe());
            }
        }
    }
    out
}

/// Format the result of `build` for humans.
#[must_use]
pub fn format_build_human(ctx: &ReleaseContext, report: &BuildReport) -> String {
    let mut out = format!(
        "Built {} {} for {}\n\n",
        ctx.name.binary(),
        ctx.version(),
        ctx.name.target()
    );
    for path in report.artefacts.upload_order() {
        let _ = writeln!(out, "  {}", path.display());
    }
    out.push('\n');
    out.push_str(&report.checksums.render());
    out
}

#[derive(Debug, Serialize)]
struct ChecksumSummary<'a> {
    file: &'a str,
    sha256: &'a str,
}

#[derive(Debug, Serialize)]
struct BuildSummary<'a> {
    binary: &'a str,
    version: String,
    tag: String,
    target: &'a str,
    artefacts: &'a ReleaseArtefacts,
    checksums: Vec<ChecksumSummary<'a>>,
}

/// Format the result of `build` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_build_json(ctx: &ReleaseContext, report: &BuildReport) -> Result<String> {
    let summary = BuildSummary {
        binary: ctx.name.binary().as_str(),
        version: ctx.version().to_string(),
        tag: ctx.tag(),
        target: ctx.name.target().as_str(),
        artefacts: &report.artefacts,
        checksums: report
            .checksums
            .entries()
            .iter()
            .map(|e| ChecksumSummary {
                file: &e.filename,
                sha256: e.digest.as_str(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&summary).map_err(|e| ReleaseError::WriteFailed {
        source: std::io::Error::other(e),
    })
}

/// Format the result of `publish`.
///
/// Skipped and tolerated steps are called out so a clean re-run is easy to
/// tell apart from a first release.
#[must_use]
pub fn format_publish(report: &PublishReport) -> String {
    let mut out = format!("Published {} ({} mode)\n", report.tag, report.mode);
    for (description, outcome) in &report.steps {
        match outcome {
            StepOutcome::Succeeded => {}
            StepOutcome::Skipped => {
                let _ = writeln!(out, "  skipped: {description}");
            }
            StepOutcome::Tolerated { reason } => {
                let _ = writeln!(out, "  ignored failure: {description}: {reason}");
            }
        }
    }
    out.push_str("\nUploaded:\n");
    for path in report.artefacts.upload_order() {
        let _ = writeln!(out, "  {}", path.display());
    }
    out
}

/// Format a verification report in `sha256sum -c` style.
#[must_use]
pub fn format_verification(report: &VerificationReport) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        let _ = writeln!(out, "{entry}");
    }
    let failures = report.failures().count();
    if failures > 0 {
        let _ = writeln!(
            out,
            "WARNING: {failures} computed checksum{} did NOT match",
            if failures == 1 { "" } else { "s" }
        );
    }
    out
}

/// Write text to the given stream.
///
/// # Errors
///
/// Returns [`ReleaseError::WriteFailed`] if the write fails.
pub fn write_output(out: &mut dyn Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|()| if text.ends_with('\n') { Ok(()) } else { out.write_all(b"\n") })
        .map_err(|source| ReleaseError::WriteFailed { source })
}
