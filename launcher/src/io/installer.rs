//! Installer abstraction for dependency installation.
//!
//! The [`Installer`] trait decouples the fallback decision from the actual
//! package tool. Tests use scripted installers that return predetermined
//! outcomes without spawning processes.

use std::time::Duration;

use tracing::{debug, instrument};

use crate::core::command::CommandLine;
use crate::core::types::{AttemptOutcome, DiagnosticPolicy, InstallMode};
use crate::io::context::LaunchContext;
use crate::io::process::run_to_completion;
use crate::plan::BootstrapPlan;

/// Parameters for a single installer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub mode: InstallMode,
    pub command: CommandLine,
    pub diagnostics: DiagnosticPolicy,
    /// Maximum time to wait; `None` waits for completion.
    pub timeout: Option<Duration>,
}

impl InstallRequest {
    pub fn from_plan(plan: &BootstrapPlan, mode: InstallMode) -> Self {
        let step = plan.step(mode);
        Self {
            mode,
            command: step.command.clone(),
            diagnostics: step.diagnostics,
            timeout: plan.install_timeout(),
        }
    }
}

/// Abstraction over installation backends.
///
/// Implementations never fail outright: every problem, including being unable
/// to start the tool, is an [`AttemptOutcome::Failure`].
pub trait Installer {
    fn install(&self, request: &InstallRequest) -> AttemptOutcome;
}

/// Installer that spawns the configured command inside the launch context.
pub struct CommandInstaller<'a> {
    ctx: &'a LaunchContext,
}

impl<'a> CommandInstaller<'a> {
    pub fn new(ctx: &'a LaunchContext) -> Self {
        Self { ctx }
    }
}

impl Installer for CommandInstaller<'_> {
    #[instrument(skip_all, fields(mode = %request.mode))]
    fn install(&self, request: &InstallRequest) -> AttemptOutcome {
        debug!(command = %request.command, "running installer");
        let cmd = self.ctx.command(&request.command);
        match run_to_completion(cmd, request.diagnostics, request.timeout) {
            Ok(exit) if exit.success() => {
                debug!("installer succeeded");
                AttemptOutcome::Success
            }
            Ok(exit) => {
                let reason = format!(
                    "{} {}",
                    request.command.program,
                    exit.describe(request.timeout)
                );
                debug!(exit_code = ?exit.status.code(), timed_out = exit.timed_out, "installer failed");
                AttemptOutcome::Failure { reason }
            }
            Err(err) => {
                // The reason travels in the outcome; a fatal fallback prints it once.
                debug!(
                    err = %format!("{err:#}"),
                    program = %request.command.program,
                    "installer did not run"
                );
                AttemptOutcome::failure(format!(
                    "could not run {}: {err:#}",
                    request.command.program
                ))
            }
        }
    }
}
