//! Command-line behavior of the `eduquest` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the user's config, data and secrets
fn eduquest(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("eduquest").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data-home"))
        .env_remove("EDUQUEST_DATA_DIR")
        .env_remove("EDUQUEST_ADMIN_PASSWORD")
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(home.path().join("data"));
    cmd
}

fn registered() -> TempDir {
    let home = TempDir::new().unwrap();
    eduquest(&home)
        .args(["register", "Ana"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, Ana!"));
    home
}

#[test]
fn status_requires_registration() {
    let home = TempDir::new().unwrap();
    eduquest(&home)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nobody is registered yet"));
}

#[test]
fn catalog_views_require_registration() {
    let home = TempDir::new().unwrap();
    for args in [
        vec!["subjects"],
        vec!["exercises", "Math"],
        vec!["open", "m1"],
        vec!["tip", "Math"],
    ] {
        eduquest(&home)
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Nobody is registered yet"));
    }
}

#[test]
fn register_rejects_short_names() {
    let home = TempDir::new().unwrap();
    eduquest(&home).args(["register", " A "]).assert().failure();
}

#[test]
fn register_then_status() {
    let home = registered();
    eduquest(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana"))
        .stdout(predicate::str::contains("Points:          0"))
        .stdout(predicate::str::contains("0/3 (0%)"));
}

#[test]
fn complete_awards_points_once() {
    let home = registered();
    eduquest(&home)
        .args(["complete", "m2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+20 points"));
    eduquest(&home)
        .args(["complete", "m2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already completed today"));
    eduquest(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("1/3 (33%)"));
    eduquest(&home)
        .args(["complete", "nope"])
        .assert()
        .failure();
}

#[test]
fn lists_default_catalog() {
    let home = registered();
    eduquest(&home)
        .arg("subjects")
        .assert()
        .success()
        .stdout(predicate::str::contains("Math"))
        .stdout(predicate::str::contains("History"));
    eduquest(&home)
        .args(["exercises", "Math"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Linear Equations"));
}

#[test]
fn teacher_commands_need_the_password() {
    let home = registered();
    eduquest(&home)
        .env("EDUQUEST_ADMIN_PASSWORD", "teach")
        .args(["subject", "add", "Art", "--color", "rose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added subject"));

    eduquest(&home)
        .env("EDUQUEST_ADMIN_PASSWORD", "teach")
        .args(["subject", "remove", "Art", "--yes", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect password"));

    eduquest(&home)
        .arg("subjects")
        .assert()
        .success()
        .stdout(predicate::str::contains("Art"));

    eduquest(&home)
        .env("EDUQUEST_ADMIN_PASSWORD", "teach")
        .args(["subject", "remove", "Art", "--yes"])
        .assert()
        .success();
}

#[test]
fn exercise_add_rejects_unknown_subject() {
    let home = registered();
    eduquest(&home)
        .env("EDUQUEST_ADMIN_PASSWORD", "teach")
        .args([
            "exercise", "add", "--title", "Sketching", "--url", "https://example.com",
            "--subject", "Nowhere",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
