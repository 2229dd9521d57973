use assert_cmd::Command;
use shelf_authz::TokenService;
use shelf_kernel::settings::DEV_JWT_SECRET;

const LEGACY_VARS: &[&str] = &[
    "JWT_SECRET_KEY",
    "JWT_EXPIRATION_TIME_IN_MILLIS",
    "DB_DSN",
    "MONGO_URI",
    "MONGO_DB_NAME",
];

/// The binary with configuration isolated from the host environment.
fn shelf() -> Command {
    let mut cmd = Command::cargo_bin("shelf").unwrap();
    cmd.env("SHELF_CONFIG_DIR", "/nonexistent/shelf-config")
        .env("SHELF_ENV", "local")
        .env_remove("SHELF_STORAGE__BACKEND")
        .env_remove("SHELF_AUTH__JWT_SECRET");
    for var in LEGACY_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn config_redacts_secrets() {
    let output = shelf().arg("config").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[REDACTED]"));
    assert!(!stdout.contains(DEV_JWT_SECRET));
}

#[test]
fn token_verifies_with_configured_secret() {
    let output = shelf()
        .args(["token", "--user-id", "42"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let token = String::from_utf8(output.stdout).unwrap();
    let tokens = TokenService::new(DEV_JWT_SECRET, 60_000);
    assert_eq!(tokens.verify(token.trim()).unwrap(), 42);
}

#[test]
fn token_honours_legacy_secret_variable() {
    let output = shelf()
        .env("JWT_SECRET_KEY", "legacy-secret")
        .args(["token", "--user-id", "7"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let token = String::from_utf8(output.stdout).unwrap();
    let tokens = TokenService::new("legacy-secret", 60_000);
    assert_eq!(tokens.verify(token.trim()).unwrap(), 7);
}

#[test]
fn migrate_memory_backend() {
    shelf().arg("migrate").assert().success();
}

#[test]
fn production_refuses_dev_secret() {
    shelf()
        .env("SHELF_ENV", "production")
        .arg("config")
        .assert()
        .failure();
}
