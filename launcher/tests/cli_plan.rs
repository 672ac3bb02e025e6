//! CLI tests for `launcher plan` and `launcher init`.

use std::process::Command;

use launcher::exit_codes;
use launcher::io::config::{CONFIG_FILE, LauncherConfig, load_config};
use launcher::test_support::TestBase;

fn launcher_at(base: &TestBase) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_launcher"));
    cmd.arg("--base-dir")
        .arg(base.path())
        .env_remove("LAUNCHER_BASE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn plan_prints_commands_without_running_them() {
    let base = TestBase::new().expect("base");
    base.write_config("[installer]\ncommand = [\"sh\", \"fake_pip.sh\"]\n")
        .expect("config");
    base.write_script("fake_pip.sh", "echo called >> calls.log")
        .expect("installer");

    let output = launcher_at(&base).arg("plan").output().expect("plan");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("primary:     sh fake_pip.sh --break-system-packages"));
    assert!(stdout.contains("fallback:    sh fake_pip.sh --upgrade -r"));
    assert!(stdout.contains("target:      python3"));
    assert!(!base.exists("calls.log"));
}

#[test]
fn plan_json_is_machine_readable() {
    let base = TestBase::new().expect("base");

    let output = launcher_at(&base)
        .args(["plan", "--json"])
        .output()
        .expect("plan");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["primary"]["mode"], "constrained");
    assert_eq!(value["primary"]["diagnostics"], "discard");
    assert_eq!(value["fallback"]["mode"], "standard");
    assert_eq!(value["fallback"]["diagnostics"], "inherit");
    let base_dir = base.path().canonicalize().expect("canonical");
    assert_eq!(value["base_dir"], base_dir.display().to_string());
}

#[test]
fn plan_is_the_same_from_any_cwd() {
    let base = TestBase::new().expect("base");
    let elsewhere = tempfile::tempdir().expect("tempdir");

    let here = launcher_at(&base)
        .arg("plan")
        .current_dir(base.path())
        .output()
        .expect("plan");
    let there = launcher_at(&base)
        .arg("plan")
        .current_dir(elsewhere.path())
        .output()
        .expect("plan");

    assert_eq!(here.stdout, there.stdout);
}

#[test]
fn init_writes_default_config_once() {
    let base = TestBase::new().expect("base");

    let first = launcher_at(&base).arg("init").output().expect("init");
    assert_eq!(first.status.code(), Some(exit_codes::OK));
    let cfg = load_config(&base.join(CONFIG_FILE)).expect("load");
    assert_eq!(cfg, LauncherConfig::default());

    let second = launcher_at(&base).arg("init").output().expect("init");
    assert_eq!(second.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&second.stderr).contains("already exists"));

    let forced = launcher_at(&base)
        .args(["init", "--force"])
        .output()
        .expect("init");
    assert_eq!(forced.status.code(), Some(exit_codes::OK));
}

#[test]
fn missing_base_dir_is_invalid() {
    let base = TestBase::new().expect("base");
    let output = Command::new(env!("CARGO_BIN_EXE_launcher"))
        .arg("--base-dir")
        .arg(base.join("missing"))
        .arg("plan")
        .output()
        .expect("plan");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("resolve base directory"));
}
