//! Shared deterministic types for the bootstrap sequence.
//!
//! These types describe what happened during installation without touching
//! processes or the filesystem, so orchestration decisions can be tested in
//! isolation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Launcher lifecycle phase. Transitions are strictly one-directional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Resolving,
    Installing,
    Running,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Resolving => "resolving",
            Phase::Installing => "installing",
            Phase::Running => "running",
        };
        f.write_str(name)
    }
}

/// Installation policy for a single installer invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
    /// Primary attempt: avoids modifying environments the caller may not own.
    Constrained,
    /// Fallback attempt: the installer's default, unconstrained policy.
    Standard,
}

impl InstallMode {
    /// Output handling for this mode. Only the primary attempt is silenced.
    pub fn diagnostics(self) -> DiagnosticPolicy {
        match self {
            InstallMode::Constrained => DiagnosticPolicy::Discard,
            InstallMode::Standard => DiagnosticPolicy::Inherit,
        }
    }
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallMode::Constrained => "constrained",
            InstallMode::Standard => "standard",
        };
        f.write_str(name)
    }
}

/// What happens to a child's stdout/stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticPolicy {
    /// Output goes nowhere; the operator never sees it.
    Discard,
    /// Output is attached to the launcher's own streams.
    Inherit,
}

/// Result of one installation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure { reason: String },
}

impl AttemptOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        AttemptOutcome::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }
}

/// A finished installation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub mode: InstallMode,
    pub outcome: AttemptOutcome,
}

/// Summary of the installation phase when it succeeded.
///
/// `attempts` is in execution order and holds one entry (primary succeeded)
/// or two (primary failed, fallback succeeded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub attempts: Vec<Attempt>,
}

impl InstallReport {
    /// Mode of the attempt that satisfied the manifest.
    pub fn satisfied_by(&self) -> Option<InstallMode> {
        self.attempts
            .iter()
            .find(|attempt| attempt.outcome.is_success())
            .map(|attempt| attempt.mode)
    }

    pub fn used_fallback(&self) -> bool {
        self.attempts
            .iter()
            .any(|attempt| attempt.mode == InstallMode::Standard)
    }
}
