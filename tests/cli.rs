use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scrollshot_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scrollshot").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

#[test]
fn scrollshot_help_prints_usage() {
    let temp = TempDir::new().unwrap();
    scrollshot_cmd(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Multi-shot region capture with automatic scrolling",
        ))
        .stdout(predicate::str::contains("--scroll-key"));
}

#[test]
fn version_includes_git_hash_slot() {
    let temp = TempDir::new().unwrap();
    scrollshot_cmd(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("("));
}

#[test]
fn tiny_region_is_no_selection() {
    let temp = TempDir::new().unwrap();
    scrollshot_cmd(&temp)
        .env_remove("WAYLAND_DISPLAY")
        .args(["--region", "0,0 5x5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No selection"));
}

#[test]
fn malformed_region_is_rejected() {
    let temp = TempDir::new().unwrap();
    scrollshot_cmd(&temp)
        .args(["--region", "somewhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid geometry"));
}

#[test]
fn capture_requires_wayland_env() {
    let temp = TempDir::new().unwrap();
    scrollshot_cmd(&temp)
        .env_remove("WAYLAND_DISPLAY")
        .args(["--region", "0,0 800x600", "--count", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("WAYLAND_DISPLAY not set"));
}

#[test]
fn unknown_scroll_key_is_rejected() {
    let temp = TempDir::new().unwrap();
    scrollshot_cmd(&temp)
        .args(["--scroll", "key", "--scroll-key", "escape"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'escape'"));
}

#[test]
fn broken_config_is_reported() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("scrollshot");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[capture\n").unwrap();

    scrollshot_cmd(&temp)
        .env_remove("WAYLAND_DISPLAY")
        .args(["--region", "0,0 800x600"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}
