//! Launch context: the immutable snapshot every step is anchored on.
//!
//! Ambient process state (executable location, working directory, environment)
//! is read exactly once, in [`LaunchContext::resolve`]. Child processes are
//! configured from the snapshot rather than inheriting whatever the launcher's
//! process state happens to be later.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::core::command::CommandLine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchContext {
    base_dir: PathBuf,
    invocation_dir: Option<PathBuf>,
    env: Vec<(OsString, OsString)>,
}

impl LaunchContext {
    /// Capture the context for this process.
    ///
    /// The base directory is the directory holding the launcher executable,
    /// unless `base_dir_override` is given. Either way it is canonicalized, so
    /// the result is the same whatever directory the launcher was invoked from.
    #[instrument(skip_all)]
    pub fn resolve(base_dir_override: Option<&Path>) -> Result<Self> {
        let base_dir = match base_dir_override {
            Some(dir) => dir
                .canonicalize()
                .with_context(|| format!("resolve base directory {}", dir.display()))?,
            None => launcher_dir()?,
        };
        if !base_dir.is_dir() {
            return Err(anyhow!(
                "base directory {} is not a directory",
                base_dir.display()
            ));
        }
        let invocation_dir = std::env::current_dir().ok();
        debug!(
            base_dir = %base_dir.display(),
            invocation_dir = ?invocation_dir,
            "resolved launch context"
        );
        Ok(Self {
            base_dir,
            invocation_dir,
            env: std::env::vars_os().collect(),
        })
    }

    /// Build a context from explicit parts.
    pub fn new(
        base_dir: impl Into<PathBuf>,
        invocation_dir: Option<PathBuf>,
        env: Vec<(OsString, OsString)>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            invocation_dir,
            env,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Working directory of the caller at start. Diagnostic only.
    pub fn invocation_dir(&self) -> Option<&Path> {
        self.invocation_dir.as_deref()
    }

    pub fn env(&self) -> &[(OsString, OsString)] {
        &self.env
    }

    /// Resolve a path relative to the base directory.
    pub fn resolve_path(&self, relative: &Path) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// Prepare a child process anchored on this context: base directory as
    /// working directory and exactly the snapshotted environment, with `PWD`
    /// pointing at the base directory.
    pub fn command(&self, line: &CommandLine) -> Command {
        let mut cmd = Command::new(&line.program);
        cmd.args(&line.args)
            .current_dir(&self.base_dir)
            .env_clear()
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .env("PWD", &self.base_dir);
        cmd
    }
}

fn launcher_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locate launcher executable")?;
    let exe = exe
        .canonicalize()
        .with_context(|| format!("canonicalize {}", exe.display()))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("launcher executable {} has no parent", exe.display()))
}
