//! Launcher configuration stored beside the launcher as `launcher.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Conventional config file name, looked up in the base directory.
pub const CONFIG_FILE: &str = "launcher.toml";

/// Launcher configuration (TOML).
///
/// Every field has a default, so a deployment with no `launcher.toml` installs
/// `requirements.txt` with pip and runs `python3 app.py`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    /// Dependency manifest, relative to the base directory.
    pub manifest: PathBuf,

    /// Entry-point program, relative to the base directory.
    pub entry_point: PathBuf,

    /// How control is transferred to the target.
    pub handoff: HandoffMode,

    pub installer: InstallerConfig,

    pub target: TargetConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HandoffMode {
    /// Replace the launcher process (unix). Falls back to `spawn` elsewhere.
    #[default]
    Exec,
    /// Run the target as a child and exit with its status.
    Spawn,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Installer invocation (e.g. `["python3","-m","pip","install"]`).
    pub command: Vec<String>,

    /// Flag that precedes the manifest path.
    pub manifest_flag: String,

    /// Flag that makes the installer update already-installed packages.
    /// Always passed, on both attempts.
    pub upgrade_flag: String,

    /// Extra arguments for the primary, constrained attempt only.
    pub constrained_args: Vec<String>,

    /// Extra arguments for the fallback, standard attempt only.
    pub standard_args: Vec<String>,

    /// Per-attempt time limit. Unset means attempts run to completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "python3".to_string(),
                "-m".to_string(),
                "pip".to_string(),
                "install".to_string(),
            ],
            manifest_flag: "-r".to_string(),
            upgrade_flag: "--upgrade".to_string(),
            constrained_args: vec!["--break-system-packages".to_string()],
            standard_args: Vec::new(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    /// Program that runs the entry point; the entry point path is appended.
    pub command: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            command: vec!["python3".to_string()],
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("requirements.txt"),
            entry_point: PathBuf::from("app.py"),
            handoff: HandoffMode::default(),
            installer: InstallerConfig::default(),
            target: TargetConfig::default(),
        }
    }
}

impl LauncherConfig {
    pub fn validate(&self) -> Result<()> {
        validate_command("installer.command", &self.installer.command)?;
        validate_command("target.command", &self.target.command)?;
        validate_relative("manifest", &self.manifest)?;
        validate_relative("entry_point", &self.entry_point)?;
        if self.installer.manifest_flag.trim().is_empty() {
            return Err(anyhow!("installer.manifest_flag must not be empty"));
        }
        if self.installer.upgrade_flag.trim().is_empty() {
            return Err(anyhow!("installer.upgrade_flag must not be empty"));
        }
        if self.installer.constrained_args.is_empty() {
            return Err(anyhow!(
                "installer.constrained_args must not be empty (primary and fallback would be identical)"
            ));
        }
        if self.installer.timeout_secs == Some(0) {
            return Err(anyhow!("installer.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

fn validate_command(field: &str, command: &[String]) -> Result<()> {
    match command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(anyhow!("{field} must be a non-empty array")),
    }
}

fn validate_relative(field: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(anyhow!("{field} must not be empty"));
    }
    if path.is_absolute() {
        return Err(anyhow!(
            "{field} must be relative to the base directory, got {}",
            path.display()
        ));
    }
    Ok(())
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `LauncherConfig::default()`.
pub fn load_config(path: &Path) -> Result<LauncherConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        let cfg = LauncherConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: LauncherConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &LauncherConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join(CONFIG_FILE)).expect("load");
        assert_eq!(cfg, LauncherConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        let cfg = LauncherConfig::default();
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "entry_point = \"main.py\"\nhandoff = \"spawn\"\n\n[installer]\ntimeout_secs = 60\n",
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.entry_point, PathBuf::from("main.py"));
        assert_eq!(cfg.handoff, HandoffMode::Spawn);
        assert_eq!(cfg.installer.timeout_secs, Some(60));
        assert_eq!(cfg.manifest, PathBuf::from("requirements.txt"));
        assert_eq!(cfg.installer.command, InstallerConfig::default().command);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "entrypoint = \"main.py\"\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parse"));
    }

    #[test]
    fn validate_rejects_empty_commands() {
        let mut cfg = LauncherConfig::default();
        cfg.target.command = vec![" ".to_string()];
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("target.command"));

        let mut cfg = LauncherConfig::default();
        cfg.installer.command.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("installer.command"));
    }

    #[test]
    fn validate_rejects_absolute_paths() {
        let mut cfg = LauncherConfig::default();
        cfg.manifest = std::env::temp_dir().join("requirements.txt");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("manifest must be relative"));
    }

    #[test]
    fn validate_requires_constrained_args() {
        let mut cfg = LauncherConfig::default();
        cfg.installer.constrained_args.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("constrained_args"));
    }

    #[test]
    fn upgrade_cannot_be_switched_off() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[installer]\nupgrade = false\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("upgrade"), "{err:#}");

        let mut cfg = LauncherConfig::default();
        cfg.installer.upgrade_flag = " ".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("upgrade_flag"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut cfg = LauncherConfig::default();
        cfg.installer.timeout_secs = Some(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn invalid_file_reports_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[target]\ncommand = []\n").expect("write");
        let err = load_config(&path).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("invalid"));
        assert!(msg.contains("target.command"));
    }
}
