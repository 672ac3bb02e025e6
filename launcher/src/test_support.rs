//! Test-only helpers: scripted installers, recording handoffs, temp base dirs.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::command::CommandLine;
use crate::core::types::{AttemptOutcome, InstallMode};
use crate::error::BootstrapError;
use crate::io::config::CONFIG_FILE;
use crate::io::handoff::{Handoff, Terminal};
use crate::io::installer::{InstallRequest, Installer};

/// Installer that replays queued outcomes and records every request.
///
/// Once the queue is empty every further call fails, so an unexpected extra
/// attempt shows up as a failure rather than a silent success.
pub struct ScriptedInstaller {
    outcomes: RefCell<VecDeque<AttemptOutcome>>,
    requests: RefCell<Vec<InstallRequest>>,
}

impl ScriptedInstaller {
    pub fn new(outcomes: Vec<AttemptOutcome>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<InstallRequest> {
        self.requests.borrow().clone()
    }

    pub fn modes(&self) -> Vec<InstallMode> {
        self.requests.borrow().iter().map(|r| r.mode).collect()
    }
}

impl Installer for ScriptedInstaller {
    fn install(&self, request: &InstallRequest) -> AttemptOutcome {
        self.requests.borrow_mut().push(request.clone());
        self.outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| AttemptOutcome::failure("no scripted outcome left"))
    }
}

/// Handoff that records the target instead of starting it.
pub struct RecordingHandoff {
    code: i32,
    targets: RefCell<Vec<CommandLine>>,
}

impl RecordingHandoff {
    pub fn new(code: i32) -> Self {
        Self {
            code,
            targets: RefCell::new(Vec::new()),
        }
    }

    pub fn targets(&self) -> Vec<CommandLine> {
        self.targets.borrow().clone()
    }
}

impl Handoff for RecordingHandoff {
    fn hand_off(&self, target: &CommandLine) -> Result<Terminal, BootstrapError> {
        self.targets.borrow_mut().push(target.clone());
        Ok(Terminal::new(self.code))
    }
}

/// Temporary base directory with helpers to lay out a deployment.
pub struct TestBase {
    dir: TempDir,
}

impl TestBase {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp base dir")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Write a shell script and mark it executable.
    pub fn write_script(&self, relative: &str, body: &str) -> Result<PathBuf> {
        let path = self.write(relative, &format!("#!/bin/sh\n{body}\n"))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .with_context(|| format!("chmod {}", path.display()))?;
        }
        Ok(path)
    }

    pub fn write_config(&self, toml: &str) -> Result<PathBuf> {
        self.write(CONFIG_FILE, toml)
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.join(relative);
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.join(relative).exists()
    }
}
