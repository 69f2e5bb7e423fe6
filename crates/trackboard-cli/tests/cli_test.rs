use assert_cmd::Command;
use predicates::prelude::*;

fn trackboard() -> Command {
    let mut cmd = Command::cargo_bin("trackboard").unwrap();
    cmd.env_remove("MLFLOW_TRACKING_URI").env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_help_lists_commands() {
    trackboard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("--tracking-uri"));
}

#[test]
fn test_show_rejects_unknown_view() {
    trackboard()
        .args(["show", "dashboards", "--tracking-uri", "http://localhost:5000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_invalid_tracking_uri() {
    trackboard()
        .args(["show", "experiments", "--tracking-uri", "ftp://tracking.local"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn test_missing_tracking_uri() {
    trackboard()
        .args(["show", "experiments"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MLFLOW_TRACKING_URI is not set"));
}

#[test]
fn test_show_fails_when_service_unreachable() {
    trackboard()
        .args([
            "show",
            "experiments",
            "--tracking-uri",
            "http://127.0.0.1:9",
            "--timeout-secs",
            "1",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("tracking service unavailable"));
}

#[test]
fn test_serve_fails_when_service_unreachable() {
    trackboard()
        .args([
            "serve",
            "--port",
            "0",
            "--tracking-uri",
            "http://127.0.0.1:9",
            "--timeout-secs",
            "1",
        ])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicate::str::contains("tracking service unavailable"));
}
