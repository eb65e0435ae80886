// CLI-level tests for the relayctl binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn relayctl() -> Command {
    Command::cargo_bin("relayctl").expect("binary builds")
}

#[test]
fn help_lists_the_command_surface() {
    relayctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("devices"))
        .stdout(predicate::str::contains("switch"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn config_init_then_show_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.toml");

    relayctl()
        .args(["--config", config.to_str().expect("utf8 path")])
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote starter config"));

    relayctl()
        .args(["--config", config.to_str().expect("utf8 path")])
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("living-room-plug"));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "# existing\n").expect("write config");

    relayctl()
        .args(["--config", config.to_str().expect("utf8 path")])
        .args(["config", "init"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn devices_list_on_empty_registry_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").expect("write config");

    relayctl()
        .args(["--config", config.to_str().expect("utf8 path")])
        .args(["devices", "list", "--output", "plain"])
        .assert()
        .success();
}

#[test]
fn unknown_device_exits_with_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").expect("write config");

    relayctl()
        .args(["--config", config.to_str().expect("utf8 path")])
        .args(["devices", "info", "nope"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn export_prometheus_with_no_devices_is_empty_and_ok() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").expect("write config");

    relayctl()
        .args(["--config", config.to_str().expect("utf8 path")])
        .args(["export", "prometheus"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
