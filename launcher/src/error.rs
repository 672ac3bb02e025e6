//! Terminal failures of the bootstrap sequence.
//!
//! Plumbing errors (config, context resolution) travel as `anyhow::Error`.
//! The two ways the sequence itself can end without a handoff get their own
//! type so `main` can map them to stable exit codes.

use thiserror::Error;

use crate::exit_codes;

#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The fallback installation attempt failed. The target was not started.
    #[error("dependency installation failed: {reason}")]
    InstallFailed { reason: String },

    /// The target could not be started.
    #[error("failed to launch {program}")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl BootstrapError {
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::InstallFailed { .. } => exit_codes::INSTALL_FAILED,
            BootstrapError::LaunchFailed { .. } => exit_codes::LAUNCH_FAILED,
        }
    }
}

/// Exit code for any error surfaced to `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<BootstrapError>()
        .map_or(exit_codes::INVALID, BootstrapError::exit_code)
}
