//! Shared test utilities: scripted command execution.
//!
//! Available to unit tests and, through the `test-support` feature, to the
//! behaviour suites under `tests/`.

use crate::artefact::naming::BinaryName;
use crate::artefact::target::TargetTriple;
use crate::config::{DEFAULT_LINKER_PACKAGE, DEFAULT_RUSTFLAGS, ReleaseConfig};
use crate::error::{ReleaseError, Result};
use crate::exec::{CommandExecutor, Invocation};
use camino::Utf8PathBuf;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code.unsigned_abs())
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a successful command `Output` with the given stdout.
#[must_use]
pub fn stdout_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given exit code and stderr.
#[must_use]
pub fn failure_output(code: i32, stderr: &str) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// A resolved configuration for the `nexus-network` client with defaults.
///
/// # Panics
///
/// Never in practice; the fixed binary name is valid.
#[must_use]
pub fn sample_config() -> ReleaseConfig {
    let to_vec = |items: &[&str]| items.iter().map(|&s| s.to_owned()).collect();
    ReleaseConfig {
        binary: BinaryName::try_from("nexus-network").expect("valid binary name"),
        package: None,
        manifest_path: Utf8PathBuf::from("Cargo.toml"),
        target: TargetTriple::default(),
        features: Vec::new(),
        rustflags: DEFAULT_RUSTFLAGS.to_owned(),
        target_dir: Utf8PathBuf::from("target"),
        releases_dir: Utf8PathBuf::from("releases"),
        linker_package: Some(DEFAULT_LINKER_PACKAGE.to_owned()),
        install_command: to_vec(&["apt-get", "install", "-y"]),
        linker_probe: to_vec(&["musl-gcc", "--version"]),
        verify_static: true,
        metadata_files: vec![Utf8PathBuf::from("Cargo.toml")],
        remote: "origin".to_owned(),
        repo: None,
        notes_file: None,
        jobs: None,
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program expected to run (e.g., "git").
    pub cmd: String,
    /// The arguments expected to be passed.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

impl ExpectedCall {
    /// Expect `cmd args...` and answer with `result`.
    #[must_use]
    pub fn new(cmd: &str, args: &[&str], result: Result<Output>) -> Self {
        Self {
            cmd: cmd.to_owned(),
            args: args.iter().map(|&a| a.to_owned()).collect(),
            result,
        }
    }

    /// Expect `cmd args...` and answer with a successful empty output.
    #[must_use]
    pub fn ok(cmd: &str, args: &[&str]) -> Self {
        Self::new(cmd, args, Ok(success_output()))
    }

    /// Expect `cmd args...` and answer with a failing output.
    #[must_use]
    pub fn fail(cmd: &str, args: &[&str], stderr: &str) -> Self {
        Self::new(cmd, args, Ok(failure_output(1, stderr)))
    }
}

/// A scripted implementation of `CommandExecutor` for testing.
///
/// Expected invocations are consumed in order. Mismatches are recorded as
/// well as returned so that a mismatch inside a best-effort step, whose
/// error would otherwise be swallowed, still fails
/// [`StubExecutor::assert_finished`].
#[derive(Debug, Default)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    mismatches: RefCell<Vec<String>>,
    seen: RefCell<Vec<String>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            mismatches: RefCell::new(Vec::new()),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Every invocation received so far, rendered as command lines.
    #[must_use]
    pub fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }

    /// Asserts that every expected call was consumed and none mismatched.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls or recorded mismatches.
    pub fn assert_finished(&self) {
        let mismatches = self.mismatches.borrow();
        assert!(mismatches.is_empty(), "stub mismatches: {mismatches:#?}");
        let remaining: Vec<String> = self
            .expected
            .borrow()
            .iter()
            .map(|call| format!("{} {}", call.cmd, call.args.join(" ")))
            .collect();
        assert!(
            remaining.is_empty(),
            "expected further command invocations: {remaining:#?}"
        );
    }

    fn mismatch(&self, message: String) -> ReleaseError {
        self.mismatches.borrow_mut().push(message.clone());
        ReleaseError::StubMismatch { message }
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, invocation: &Invocation) -> Result<Output> {
        self.seen.borrow_mut().push(invocation.to_string());

        let Some(call) = self.expected.borrow_mut().pop_front() else {
            return Err(self.mismatch(format!("unexpected invocation `{invocation}`")));
        };

        if call.cmd != invocation.program() || call.args.as_slice() != invocation.arg_list() {
            return Err(self.mismatch(format!(
                "expected `{} {}`, got `{invocation}`",
                call.cmd,
                call.args.join(" ")
            )));
        }

        call.result
    }
}
