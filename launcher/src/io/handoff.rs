//! One-way transfer of control to the target application.

use std::process::Command;

use tracing::{info, instrument};

use crate::core::command::CommandLine;
use crate::error::BootstrapError;
use crate::io::config::HandoffMode;
use crate::io::context::LaunchContext;
use crate::io::process::exit_code_of;

/// Final outcome of the launcher: the status it must exit with.
///
/// Only a handoff produces one, and the only thing to do with it is
/// [`Terminal::exit`].
#[must_use = "the launcher must exit with the target's status"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminal {
    code: i32,
}

impl Terminal {
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    pub fn code(self) -> i32 {
        self.code
    }

    /// End the launcher process with this status.
    pub fn exit(self) -> ! {
        std::process::exit(self.code)
    }
}

/// Abstraction over how the target is started.
pub trait Handoff {
    /// Start `target`. Implementations must not return before the target has
    /// finished (or, for `exec`, return at all on success).
    fn hand_off(&self, target: &CommandLine) -> Result<Terminal, BootstrapError>;
}

/// Starts the target as a real process inside the launch context.
pub struct ProcessHandoff<'a> {
    ctx: &'a LaunchContext,
    mode: HandoffMode,
}

impl<'a> ProcessHandoff<'a> {
    pub fn new(ctx: &'a LaunchContext, mode: HandoffMode) -> Self {
        Self { ctx, mode }
    }
}

impl Handoff for ProcessHandoff<'_> {
    #[instrument(skip_all, fields(mode = ?self.mode))]
    fn hand_off(&self, target: &CommandLine) -> Result<Terminal, BootstrapError> {
        info!(command = %target, "handing off to target");
        let cmd = self.ctx.command(target);
        match self.mode {
            HandoffMode::Exec => exec(cmd, target),
            HandoffMode::Spawn => spawn_and_wait(cmd, target),
        }
    }
}

#[cfg(unix)]
fn exec(mut cmd: Command, target: &CommandLine) -> Result<Terminal, BootstrapError> {
    use std::os::unix::process::CommandExt;

    // Only returns if the exec failed.
    let source = cmd.exec();
    Err(BootstrapError::LaunchFailed {
        program: target.program.clone(),
        source,
    })
}

#[cfg(not(unix))]
fn exec(cmd: Command, target: &CommandLine) -> Result<Terminal, BootstrapError> {
    spawn_and_wait(cmd, target)
}

fn spawn_and_wait(mut cmd: Command, target: &CommandLine) -> Result<Terminal, BootstrapError> {
    let status = cmd.status().map_err(|source| BootstrapError::LaunchFailed {
        program: target.program.clone(),
        source,
    })?;
    Ok(Terminal::new(exit_code_of(&status)))
}
