//! External command execution.
//!
//! Every external effect of a release (rustup, cargo, git, gh, ldd) is an
//! [`Invocation`] run through a [`CommandExecutor`]. Invocations are grouped
//! into [`Step`]s which carry a [`Requirement`]: required steps abort the run
//! on failure, best-effort steps log a warning and continue. This mirrors a
//! shell script run under `set -e` where a few clean-up commands are suffixed
//! with `|| true`.

use crate::error::{ReleaseError, Result};
use log::{debug, info, warn};
use std::fmt;
use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Default deadline for short-lived commands (5 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A single external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    timeout: Duration,
}

impl Invocation {
    /// Create an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Override the deadline after which the child is killed.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument list.
    #[must_use]
    pub fn arg_list(&self) -> &[String] {
        &self.args
    }

    /// Environment overrides.
    #[must_use]
    pub fn env_vars(&self) -> &[(String, String)] {
        &self.env
    }

    /// The configured deadline.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Display for Invocation {
    /// Render as a copy-pasteable shell command line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={} ", shell_quote(value))?;
        }
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// Quote `word` for a POSIX shell if it contains anything beyond a safe set.
fn shell_quote(word: &str) -> String {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || "-_./:=+@,%".contains(c);
    if !word.is_empty() && word.chars().all(is_safe) {
        word.to_owned()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Whether a failing step aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Failure aborts the run.
    Required,
    /// Failure is logged and ignored; used for clean-slate preconditions
    /// such as deleting a tag that may not exist.
    BestEffort,
}

/// A described, ordered unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Human-readable summary shown in logs and dry-run plans.
    pub description: String,
    /// The command to run.
    pub invocation: Invocation,
    /// Failure policy.
    pub requirement: Requirement,
    /// Probe whose success means the step is unnecessary.
    pub skip_if: Option<Invocation>,
}

impl Step {
    /// A step whose failure aborts the run.
    #[must_use]
    pub fn required(description: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            description: description.into(),
            invocation,
            requirement: Requirement::Required,
            skip_if: None,
        }
    }

    /// A step whose failure is tolerated.
    #[must_use]
    pub fn best_effort(description: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            description: description.into(),
            invocation,
            requirement: Requirement::BestEffort,
            skip_if: None,
        }
    }

    /// Skip this step when `probe` exits successfully.
    #[must_use]
    pub fn skip_if(mut self, probe: Invocation) -> Self {
        self.skip_if = Some(probe);
        self
    }
}

/// What happened when a step was run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The command exited successfully.
    Succeeded,
    /// The skip probe succeeded so the command was not run.
    Skipped,
    /// A best-effort command failed; the reason is kept for reporting.
    Tolerated {
        /// Why the command failed.
        reason: String,
    },
}

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs an invocation and returns its captured output.
    ///
    /// A non-zero exit is reported through [`Output::status`], not as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::CommandSpawn`] if the program cannot be
    /// started and [`ReleaseError::CommandTimedOut`] if it exceeds its
    /// deadline.
    fn run(&self, invocation: &Invocation) -> Result<Output>;
}

/// Executes commands on the host system.
///
/// Output pipes are drained on background threads so that chatty children
/// such as `cargo build` cannot block on a full pipe while the deadline is
/// being waited on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, invocation: &Invocation) -> Result<Output> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|source| ReleaseError::CommandSpawn {
            program: invocation.program.clone(),
            source,
        })?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        match child.wait_timeout(invocation.timeout)? {
            Some(status) => Ok(Output {
                status,
                stdout: collect(stdout),
                stderr: collect(stderr),
            }),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(ReleaseError::CommandTimedOut {
                    command: invocation.to_string(),
                    timeout: invocation.timeout,
                })
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Return trimmed stderr, falling back to stdout, then a placeholder.
#[must_use]
pub fn failure_message(output: &Output) -> String {
    [&output.stderr, &output.stdout]
        .into_iter()
        .map(|bytes| String::from_utf8_lossy(bytes).trim().to_owned())
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| "no output".to_owned())
}

/// Returns true if the invocation runs and exits successfully.
pub fn probe_succeeds(executor: &dyn CommandExecutor, invocation: &Invocation) -> bool {
    executor
        .run(invocation)
        .is_ok_and(|output| output.status.success())
}

/// Captured stdout then stderr, trimmed, or `None` if both are empty.
///
/// [`run_step`] logs this at debug level, so `-v` shows what the child printed.
#[must_use]
pub fn captured_text(output: &Output) -> Option<String> {
    let text = [&output.stdout, &output.stderr]
        .into_iter()
        .map(|bytes| String::from_utf8_lossy(bytes).trim_end().to_owned())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!text.is_empty()).then_some(text)
}

/// Run one step, honouring its skip probe and failure policy.
///
/// # Errors
///
/// Returns an error only for required steps: [`ReleaseError::CommandFailed`]
/// on a non-zero exit, or the executor's spawn/timeout error.
pub fn run_step(executor: &dyn CommandExecutor, step: &Step) -> Result<StepOutcome> {
    if let Some(probe) = &step.skip_if {
        if probe_succeeds(executor, probe) {
            info!("skipping: {} (`{probe}` succeeded)", step.description);
            return Ok(StepOutcome::Skipped);
        }
    }

    info!("{}", step.description);
    debug!("$ {}", step.invocation);

    let result = executor.run(&step.invocation);
    if let Some(text) = result.as_ref().ok().and_then(captured_text) {
        debug!("output of {}:\n{text}", step.description);
    }
    match (result, step.requirement) {
        (Ok(output), _) if output.status.success() => Ok(StepOutcome::Succeeded),
        (Ok(output), Requirement::Required) => Err(ReleaseError::CommandFailed {
            step: step.description.clone(),
            command: step.invocation.to_string(),
            code: output.status.code(),
            stderr: failure_message(&output),
        }),
        (Ok(output), Requirement::BestEffort) => {
            let reason = failure_message(&output);
            warn!("ignoring failure of {}: {reason}", step.description);
            Ok(StepOutcome::Tolerated { reason })
        }
        (Err(err), Requirement::Required) => Err(err),
        (Err(err), Requirement::BestEffort) => {
            let reason = err.to_string();
            warn!("ignoring failure of {}: {reason}", step.description);
            Ok(StepOutcome::Tolerated { reason })
        }
    }
}

/// Run steps in order, stopping at the first required failure.
///
/// # Errors
///
/// Returns the first required step's error; later steps are not run.
pub fn run_steps(
    executor: &dyn CommandExecutor,
    steps: &[Step],
) -> Result<Vec<(String, StepOutcome)>> {
    steps
        .iter()
        .map(|step| run_step(executor, step).map(|outcome| (step.description.clone(), outcome)))
        .collect()
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
