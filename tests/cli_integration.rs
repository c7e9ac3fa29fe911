//! Integration tests for the SecretStore CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Interactive prompts are bypassed with `SECRET_STORE_PASSWORD`, and
//! `HOME` points at a temp dir whose `.secretstore.toml` selects cheap
//! KDF parameters.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "Sup3rSecret!";

const FAST_CONFIG: &str = "\
argon2_memory_kib = 8192
argon2_iterations = 1
argon2_parallelism = 1
pbkdf2_iterations = 1000
";

/// Helper: get a Command pointing at the secretstore binary.
fn secretstore() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("secretstore").expect("binary should exist")
}

/// A scratch home directory with a fast config.
fn home() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child(".secretstore.toml").write_str(FAST_CONFIG).unwrap();
    tmp
}

/// Helper: a Command bound to `home`, its default store, and `password`.
fn cmd(home: &TempDir, password: &str) -> Command {
    cmd_with_store(home, password, &home.path().join("secrets.sqlite3.dat"))
}

/// Helper: like [`cmd`], with an explicit store file.
fn cmd_with_store(home: &TempDir, password: &str, store: &std::path::Path) -> Command {
    let mut cmd = secretstore();
    cmd.env("HOME", home.path())
        .env("SECRET_STORE_PASSWORD", password)
        .env_remove("SECRET_STORE_FILE")
        .env_remove("SECRET_EXPORT_FILE")
        .env_remove("SECRET_STORE_NEW_PASSWORD")
        .env_remove("SECRETSTORE_LOG")
        .arg("--store")
        .arg(store);
    cmd
}

#[test]
fn help_flag_shows_usage() {
    secretstore()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local encrypted secret vault"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("passwd"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("bank-login"));
}

#[test]
fn version_flag_shows_version() {
    secretstore()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("secretstore"));
}

#[test]
fn no_args_shows_help() {
    secretstore()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn set_then_get_prints_value() {
    let home = home();

    cmd(&home, PASSWORD)
        .args(["set", "email", "hunter2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Secret 'email' added"));

    cmd(&home, PASSWORD)
        .args(["get", "email"])
        .assert()
        .success()
        .stdout("hunter2\n");

    home.child("secrets.sqlite3.dat").assert(predicate::path::exists());
}

#[test]
fn set_reads_piped_stdin() {
    let home = home();

    cmd(&home, PASSWORD)
        .args(["set", "note"])
        .write_stdin("from stdin\n")
        .assert()
        .success();

    cmd(&home, PASSWORD)
        .args(["get", "note"])
        .assert()
        .success()
        .stdout("from stdin\n");
}

#[test]
fn get_with_wrong_password_fails() {
    let home = home();
    cmd(&home, PASSWORD).args(["set", "email", "hunter2"]).assert().success();

    cmd(&home, "wrong-password")
        .args(["get", "email"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn get_missing_label_fails() {
    let home = home();
    cmd(&home, PASSWORD).args(["set", "email", "hunter2"]).assert().success();

    cmd(&home, PASSWORD)
        .args(["get", "nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no secret labelled 'nothing'"));
}

#[test]
fn weak_password_cannot_create_vault() {
    let home = home();
    cmd(&home, "short")
        .args(["set", "email", "hunter2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("minimum 8 characters"));
}

#[test]
fn list_and_delete() {
    let home = home();
    cmd(&home, PASSWORD).args(["set", "email", "hunter2"]).assert().success();
    cmd(&home, PASSWORD).args(["set", "bank", "pw: Abc123"]).assert().success();

    cmd(&home, PASSWORD)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("email"))
        .stdout(predicate::str::contains("bank"));

    cmd(&home, PASSWORD)
        .args(["delete", "bank", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted secret 'bank'"));

    cmd(&home, PASSWORD)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("bank").not());
}

#[test]
fn passwd_rotates_master_password() {
    let home = home();
    cmd(&home, PASSWORD).args(["set", "email", "hunter2"]).assert().success();
    cmd(&home, PASSWORD).args(["set", "bank", "pw: Abc123"]).assert().success();

    cmd(&home, PASSWORD)
        .env("SECRET_STORE_NEW_PASSWORD", "NewPass123")
        .arg("passwd")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 secrets re-encrypted"));

    cmd(&home, PASSWORD).args(["get", "email"]).assert().failure();
    cmd(&home, "NewPass123")
        .args(["get", "bank"])
        .assert()
        .success()
        .stdout("pw: Abc123\n");
}

#[test]
fn export_then_import_into_new_store() {
    let home = home();
    cmd(&home, PASSWORD).args(["set", "email", "hunter2"]).assert().success();

    let export = home.child("export.json");
    cmd(&home, PASSWORD)
        .args(["export", "--output"])
        .arg(export.path())
        .assert()
        .success();
    let json = std::fs::read_to_string(export.path()).unwrap();
    assert!(json.contains("verification_salt"));
    assert!(!json.contains("hunter2"));

    let restored = home.path().join("restored.dat");
    cmd_with_store(&home, PASSWORD, &restored)
        .arg("import")
        .arg(export.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 secret(s)"));

    cmd_with_store(&home, PASSWORD, &restored)
        .args(["get", "email"])
        .assert()
        .success()
        .stdout("hunter2\n");
}

#[test]
fn import_with_wrong_password_leaves_no_store() {
    let home = home();
    cmd(&home, PASSWORD).args(["set", "email", "hunter2"]).assert().success();

    let export = home.child("export.json");
    cmd(&home, PASSWORD)
        .args(["export", "--output"])
        .arg(export.path())
        .assert()
        .success();

    let restored = home.child("restored.dat");
    cmd_with_store(&home, "wrong-password", restored.path())
        .arg("import")
        .arg(export.path())
        .assert()
        .failure();
    restored.assert(predicate::path::missing());
}

#[test]
fn bank_login_prints_selected_characters() {
    let home = home();
    cmd(&home, PASSWORD)
        .args(["set", "bank", "user: jdoe\npw: Abc123xyz"])
        .assert()
        .success();

    cmd(&home, PASSWORD)
        .args(["bank-login", "bank", "1", "3", "9"])
        .assert()
        .success()
        .stdout("A c z\n");
}

#[test]
fn completions_bash_mentions_binary() {
    secretstore()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secretstore"));
}
