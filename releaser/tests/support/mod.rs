//! Test support utilities for release behavioural tests.
//!
//! [`SimulatedHost`] stands in for the toolchain, git, and `gh`. It keeps a
//! small model of local tags, remote tags, GitHub releases, and the git index
//! so scenarios can observe what a release run changed and can run the same
//! release twice.

use client_release::error::Result;
use client_release::exec::{CommandExecutor, Invocation};
use client_release::test_utils::{failure_output, stdout_output, success_output};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::process::Output;

/// Mutable state of the simulated repository and GitHub project.
#[derive(Debug, Default)]
pub struct HostState {
    /// Tags in the local repository.
    pub local_tags: BTreeSet<String>,
    /// Tags on the remote.
    pub remote_tags: BTreeSet<String>,
    /// Tags with a GitHub release.
    pub releases: BTreeSet<String>,
    /// Whether `git add` stages changes.
    pub working_tree_dirty: bool,
    /// Whether the index holds staged changes.
    pub staged: bool,
    /// Number of commits created.
    pub commits: usize,
    /// Whether pushing HEAD is rejected.
    pub reject_push: bool,
    /// Whether `ldd` reports shared libraries.
    pub dynamic_binary: bool,
    /// Every command line received.
    pub log: Vec<String>,
}

/// A `CommandExecutor` backed by [`HostState`].
#[derive(Debug, Default)]
pub struct SimulatedHost {
    state: RefCell<HostState>,
}

impl SimulatedHost {
    /// Run `f` with mutable access to the state.
    pub fn with_state<T>(&self, f: impl FnOnce(&mut HostState) -> T) -> T {
        f(&mut self.state.borrow_mut())
    }

    /// Commands received so far.
    pub fn log(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }
}

fn outcome(ok: bool, stderr: &str) -> Output {
    if ok {
        success_output()
    } else {
        failure_output(1, stderr)
    }
}

impl HostState {
    fn git(&mut self, args: &[&str]) -> Output {
        match args {
            ["tag", "-d", tag] => {
                let removed = self.local_tags.remove(*tag);
                outcome(removed, &format!("error: tag '{tag}' not found."))
            }
            ["push", _, refspec] if refspec.starts_with(":refs/tags/") => {
                let tag = refspec.trim_start_matches(":refs/tags/");
                let removed = self.remote_tags.remove(tag);
                outcome(removed, "error: remote ref does not exist")
            }
            ["rm", ..] => success_output(),
            ["add", ..] => {
                self.staged = self.working_tree_dirty;
                success_output()
            }
            ["diff", "--cached", "--quiet"] => outcome(!self.staged, ""),
            ["commit", ..] => {
                self.staged = false;
                self.working_tree_dirty = false;
                self.commits += 1;
                success_output()
            }
            ["tag", "-a", tag, ..] => {
                let added = self.local_tags.insert((*tag).to_owned());
                outcome(added, &format!("fatal: tag '{tag}' already exists"))
            }
            ["push", _, "HEAD"] => outcome(!self.reject_push, "! [rejected] HEAD -> main (fetch first)"),
            ["push", _, tag] => {
                let added = self.remote_tags.insert((*tag).to_owned());
                outcome(added, &format!("! [rejected] {tag} -> {tag} (already exists)"))
            }
            _ => failure_output(129, "unsupported git command"),
        }
    }

    fn gh(&mut self, args: &[&str]) -> Output {
        match args {
            ["release", "delete", tag, ..] => {
                let removed = self.releases.remove(*tag);
                outcome(removed, "release not found")
            }
            ["release", "create", tag, ..] => {
                let added = self.releases.insert((*tag).to_owned());
                outcome(added, "a release with the same tag name already exists")
            }
            _ => failure_output(1, "unsupported gh command"),
        }
    }

    fn ldd(&self) -> Output {
        if self.dynamic_binary {
            stdout_output("\tlibc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x00007f)\n")
        } else {
            failure_output(1, "\tnot a dynamic executable")
        }
    }
}

impl CommandExecutor for SimulatedHost {
    fn run(&self, invocation: &Invocation) -> Result<Output> {
        let mut state = self.state.borrow_mut();
        state.log.push(invocation.to_string());
        let args: Vec<&str> = invocation.arg_list().iter().map(String::as_str).collect();
        Ok(match invocation.program() {
            "git" => state.git(&args),
            "gh" => state.gh(&args),
            "ldd" => state.ldd(),
            _ => success_output(),
        })
    }
}
