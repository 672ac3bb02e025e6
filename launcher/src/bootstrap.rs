//! Orchestration of the bootstrap sequence.
//!
//! `RESOLVING → INSTALLING → RUNNING`, strictly in that order. Installing has
//! one internal retry edge: a failed constrained attempt is followed by exactly
//! one standard attempt. Running is terminal.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::{debug, info, instrument, warn};

use crate::core::types::{Attempt, AttemptOutcome, InstallMode, InstallReport, Phase};
use crate::error::BootstrapError;
use crate::io::config::{CONFIG_FILE, load_config};
use crate::io::context::LaunchContext;
use crate::io::handoff::{Handoff, Terminal};
use crate::io::installer::{InstallRequest, Installer};
use crate::plan::{BootstrapPlan, build_plan};

/// Config file location: the explicit override, else `launcher.toml` in the base directory.
pub fn config_path(ctx: &LaunchContext, config_override: Option<&Path>) -> PathBuf {
    match config_override {
        Some(path) => path.to_path_buf(),
        None => ctx.resolve_path(Path::new(CONFIG_FILE)),
    }
}

/// Resolving phase: capture the context, load config, build the plan.
#[instrument(skip_all)]
pub fn resolve(
    base_dir_override: Option<&Path>,
    config_override: Option<&Path>,
) -> Result<(LaunchContext, BootstrapPlan)> {
    enter(Phase::Resolving);
    let ctx = LaunchContext::resolve(base_dir_override)?;
    let path = config_path(&ctx, config_override);
    // Only the implicit launcher.toml may be absent.
    if config_override.is_some() && !path.exists() {
        bail!("config file {} does not exist", path.display());
    }
    let cfg = load_config(&path)?;
    let plan = build_plan(&ctx, &cfg)?;
    debug!(base_dir = %plan.base_dir.display(), "plan resolved");
    Ok((ctx, plan))
}

/// Installing phase.
///
/// Runs the constrained attempt; on failure runs the standard attempt exactly
/// once. A failed fallback is returned as [`BootstrapError::InstallFailed`].
#[instrument(skip_all)]
pub fn install_dependencies<I: Installer>(
    installer: &I,
    plan: &BootstrapPlan,
) -> Result<InstallReport, BootstrapError> {
    let primary = installer.install(&InstallRequest::from_plan(plan, InstallMode::Constrained));
    let primary_ok = primary.is_success();
    let mut attempts = vec![Attempt {
        mode: InstallMode::Constrained,
        outcome: primary,
    }];
    if primary_ok {
        return Ok(InstallReport { attempts });
    }

    info!("constrained installation failed, retrying with standard installation");
    let fallback = installer.install(&InstallRequest::from_plan(plan, InstallMode::Standard));
    match fallback {
        AttemptOutcome::Success => {
            attempts.push(Attempt {
                mode: InstallMode::Standard,
                outcome: AttemptOutcome::Success,
            });
            Ok(InstallReport { attempts })
        }
        AttemptOutcome::Failure { reason } => {
            debug!(%reason, "standard installation failed");
            Err(BootstrapError::InstallFailed { reason })
        }
    }
}

/// Installing and running phases for a resolved plan.
///
/// Returns only once the handoff has produced a [`Terminal`]; with an `exec`
/// handoff a successful launch never returns at all.
pub fn run_bootstrap<I: Installer, H: Handoff>(
    plan: &BootstrapPlan,
    installer: &I,
    handoff: &H,
) -> Result<Terminal, BootstrapError> {
    enter(Phase::Installing);
    if !plan.manifest.exists() {
        warn!(manifest = %plan.manifest.display(), "dependency manifest not found");
    }
    let report = install_dependencies(installer, plan)?;
    info!(
        satisfied_by = ?report.satisfied_by(),
        used_fallback = report.used_fallback(),
        "dependencies installed"
    );

    enter(Phase::Running);
    handoff.hand_off(&plan.target)
}

fn enter(phase: Phase) {
    info!(%phase, "entering phase");
}
