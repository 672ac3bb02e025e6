//! Bootstrap launcher.
//!
//! Installs the dependencies listed beside the launcher (constrained mode
//! first, standard mode as fallback) and then hands off to the entry point.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;

use launcher::bootstrap::{config_path, resolve, run_bootstrap};
use launcher::error::exit_code_for;
use launcher::io::config::{LauncherConfig, write_config};
use launcher::io::context::LaunchContext;
use launcher::io::handoff::{ProcessHandoff, Terminal};
use launcher::io::installer::CommandInstaller;
use launcher::logging;

#[derive(Parser)]
#[command(
    name = "launcher",
    version,
    about = "Install declared dependencies, then hand off to the entry point"
)]
struct Cli {
    /// Directory holding the manifest and entry point [default: the launcher's own directory]
    #[arg(long, global = true, env = "LAUNCHER_BASE_DIR", value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Config file [default: launcher.toml in the base directory]
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone)]
enum Command {
    /// Install dependencies and start the entry point (the default).
    Run,
    /// Print the resolved commands without running anything.
    Plan {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Write a default `launcher.toml` into the base directory.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    let result = match cli.command.clone().unwrap_or(Command::Run) {
        Command::Run => match cmd_run(&cli) {
            Ok(terminal) => terminal.exit(),
            Err(err) => Err(err),
        },
        Command::Plan { json } => cmd_plan(&cli, json),
        Command::Init { force } => cmd_init(&cli, force),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

fn cmd_run(cli: &Cli) -> Result<Terminal> {
    let (ctx, plan) = resolve(cli.base_dir.as_deref(), cli.config.as_deref())?;
    let installer = CommandInstaller::new(&ctx);
    let handoff = ProcessHandoff::new(&ctx, plan.handoff);
    Ok(run_bootstrap(&plan, &installer, &handoff)?)
}

fn cmd_plan(cli: &Cli, json: bool) -> Result<()> {
    let (_, plan) = resolve(cli.base_dir.as_deref(), cli.config.as_deref())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", plan.render_text());
    }
    Ok(())
}

fn cmd_init(cli: &Cli, force: bool) -> Result<()> {
    let ctx = LaunchContext::resolve(cli.base_dir.as_deref())?;
    let path = config_path(&ctx, cli.config.as_deref());
    write_default_config(&path, force)?;
    info!(path = %path.display(), "wrote config");
    println!("wrote {}", path.display());
    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    write_config(path, &LauncherConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults_to_no_command() {
        let cli = Cli::parse_from(["launcher"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_plan_json() {
        let cli = Cli::parse_from(["launcher", "plan", "--json"]);
        assert!(matches!(cli.command, Some(Command::Plan { json: true })));
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["launcher", "init", "--force", "--base-dir", "/srv/app"]);
        assert!(matches!(cli.command, Some(Command::Init { force: true })));
        assert_eq!(cli.base_dir, Some(PathBuf::from("/srv/app")));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("launcher.toml");
        write_default_config(&path, false).expect("first write");
        let err = write_default_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        write_default_config(&path, true).expect("forced write");
    }
}
