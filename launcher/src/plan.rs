//! Resolution of the launch context and config into concrete commands.
//!
//! The plan is computed once, before anything runs. `launcher plan` prints it;
//! `launcher run` executes it.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use crate::core::command::CommandLine;
use crate::core::types::{DiagnosticPolicy, InstallMode};
use crate::io::config::{HandoffMode, InstallerConfig, LauncherConfig};
use crate::io::context::LaunchContext;

/// One installer invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallStep {
    pub mode: InstallMode,
    pub diagnostics: DiagnosticPolicy,
    pub command: CommandLine,
}

/// Everything the launcher will do, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapPlan {
    pub base_dir: PathBuf,
    pub manifest: PathBuf,
    pub entry_point: PathBuf,
    pub primary: InstallStep,
    pub fallback: InstallStep,
    pub target: CommandLine,
    pub handoff: HandoffMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_timeout_secs: Option<u64>,
}

impl BootstrapPlan {
    pub fn install_timeout(&self) -> Option<Duration> {
        self.install_timeout_secs.map(Duration::from_secs)
    }

    /// Step for the given mode.
    pub fn step(&self, mode: InstallMode) -> &InstallStep {
        match mode {
            InstallMode::Constrained => &self.primary,
            InstallMode::Standard => &self.fallback,
        }
    }

    /// Plain-text rendering, one line per field.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "base dir:    {}", self.base_dir.display());
        let _ = writeln!(out, "manifest:    {}", self.manifest.display());
        let _ = writeln!(out, "primary:     {}", self.primary.command);
        let _ = writeln!(out, "fallback:    {}", self.fallback.command);
        let _ = writeln!(out, "target:      {}", self.target);
        let handoff = match self.handoff {
            HandoffMode::Exec => "exec",
            HandoffMode::Spawn => "spawn",
        };
        let _ = writeln!(out, "handoff:     {handoff}");
        out
    }
}

/// Build the plan for `ctx` from `cfg`.
pub fn build_plan(ctx: &LaunchContext, cfg: &LauncherConfig) -> Result<BootstrapPlan> {
    cfg.validate()?;
    let manifest = ctx.resolve_path(&cfg.manifest);
    let entry_point = ctx.resolve_path(&cfg.entry_point);
    let manifest_arg = path_arg(&manifest).context("manifest path")?;
    let entry_arg = path_arg(&entry_point).context("entry point path")?;

    let primary = install_step(&cfg.installer, InstallMode::Constrained, &manifest_arg)?;
    let fallback = install_step(&cfg.installer, InstallMode::Standard, &manifest_arg)?;
    let target = CommandLine::from_base(&cfg.target.command, [entry_arg])
        .ok_or_else(|| anyhow!("target.command must be a non-empty array"))?;

    Ok(BootstrapPlan {
        base_dir: ctx.base_dir().to_path_buf(),
        manifest,
        entry_point,
        primary,
        fallback,
        target,
        handoff: cfg.handoff,
        install_timeout_secs: cfg.installer.timeout_secs,
    })
}

fn install_step(cfg: &InstallerConfig, mode: InstallMode, manifest: &str) -> Result<InstallStep> {
    let mode_args = match mode {
        InstallMode::Constrained => &cfg.constrained_args,
        InstallMode::Standard => &cfg.standard_args,
    };
    let mut extra: Vec<String> = mode_args.clone();
    extra.push(cfg.upgrade_flag.clone());
    extra.push(cfg.manifest_flag.clone());
    extra.push(manifest.to_string());

    let command = CommandLine::from_base(&cfg.command, extra)
        .ok_or_else(|| anyhow!("installer.command must be a non-empty array"))?;
    Ok(InstallStep {
        mode,
        diagnostics: mode.diagnostics(),
        command,
    })
}

fn path_arg(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("{} is not valid UTF-8", path.display()))
}
