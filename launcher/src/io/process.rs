//! Helpers for running child processes to completion.

use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument};
use wait_timeout::ChildExt;

use crate::core::types::DiagnosticPolicy;

/// How a child process ended.
#[derive(Debug)]
pub struct ChildExit {
    pub status: ExitStatus,
    pub timed_out: bool,
}

impl ChildExit {
    pub fn success(&self) -> bool {
        !self.timed_out && self.status.success()
    }

    /// Short human-readable description of a non-successful exit.
    pub fn describe(&self, timeout: Option<Duration>) -> String {
        if self.timed_out {
            return match timeout {
                Some(limit) => format!("timed out after {}s", limit.as_secs()),
                None => "timed out".to_string(),
            };
        }
        match (self.status.code(), signal_of(&self.status)) {
            (Some(code), _) => format!("exited with status {code}"),
            (None, Some(signal)) => format!("terminated by signal {signal}"),
            (None, None) => "terminated abnormally".to_string(),
        }
    }
}

/// Run a command to completion with stdin closed and output routed per `policy`.
///
/// With `DiagnosticPolicy::Discard` the child's stdout/stderr are attached to
/// the null device and never buffered. When `timeout` is `Some`, a child still
/// running at the deadline is killed and reported as timed out.
///
/// Nothing here logs above `debug`: whether a failure is worth reporting
/// depends on the attempt, so callers decide.
#[instrument(skip_all, fields(program = ?cmd.get_program(), policy = ?policy))]
pub fn run_to_completion(
    mut cmd: Command,
    policy: DiagnosticPolicy,
    timeout: Option<Duration>,
) -> Result<ChildExit> {
    cmd.stdin(Stdio::null());
    match policy {
        DiagnosticPolicy::Discard => {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        DiagnosticPolicy::Inherit => {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
    }

    debug!("spawning child process");
    let mut child = cmd.spawn().context("spawn command")?;

    let Some(limit) = timeout else {
        let status = child.wait().context("wait for command")?;
        debug!(exit_code = ?status.code(), "command finished");
        return Ok(ChildExit {
            status,
            timed_out: false,
        });
    };

    let mut timed_out = false;
    let status = match child.wait_timeout(limit).context("wait for command")? {
        Some(status) => status,
        None => {
            debug!(timeout_secs = limit.as_secs(), "command timed out, killing");
            timed_out = true;
            child.kill().context("kill command")?;
            child.wait().context("wait command after kill")?
        }
    };

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(ChildExit { status, timed_out })
}

/// Exit code the launcher should report for a finished child.
///
/// Normal exits pass through; a child killed by signal N maps to `128 + N`,
/// the shell convention.
pub fn exit_code_of(status: &ExitStatus) -> i32 {
    match (status.code(), signal_of(status)) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(unix)]
fn signal_of(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn reports_success() {
        let exit = run_to_completion(sh("exit 0"), DiagnosticPolicy::Discard, None).expect("run");
        assert!(exit.success());
    }

    #[test]
    fn reports_exit_status() {
        let exit = run_to_completion(sh("echo noisy >&2; exit 3"), DiagnosticPolicy::Discard, None)
            .expect("run");
        assert!(!exit.success());
        assert_eq!(exit.describe(None), "exited with status 3");
        assert_eq!(exit_code_of(&exit.status), 3);
    }

    #[test]
    fn kills_on_timeout() {
        let exit = run_to_completion(
            sh("sleep 5"),
            DiagnosticPolicy::Discard,
            Some(Duration::from_millis(100)),
        )
        .expect("run");
        assert!(exit.timed_out);
        assert!(!exit.success());
        assert!(exit.describe(Some(Duration::from_secs(1))).contains("timed out"));
    }

    #[test]
    fn signal_maps_to_shell_convention() {
        let exit =
            run_to_completion(sh("kill -TERM $$"), DiagnosticPolicy::Discard, None).expect("run");
        assert_eq!(exit_code_of(&exit.status), 128 + 15);
        assert_eq!(exit.describe(None), "terminated by signal 15");
    }

    #[test]
    fn spawn_failure_is_an_error() {
        let cmd = Command::new("/nonexistent/launcher-test-program");
        let err = run_to_completion(cmd, DiagnosticPolicy::Discard, None).unwrap_err();
        assert!(err.to_string().contains("spawn command"));
    }
}
