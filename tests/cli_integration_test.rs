//! Integration tests that drive the sqldoc binary against snapshot fixtures.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn get_binary_path() -> String {
    std::env::var("CARGO_BIN_EXE_sqldoc").unwrap_or_else(|_| "target/debug/sqldoc".to_string())
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn sqldoc() -> Command {
    let mut cmd = Command::new(get_binary_path());
    cmd.env_remove("DATABASE_URL").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_generate_unified_from_snapshot() {
    let dir = TempDir::new().unwrap();

    let output = sqldoc()
        .args([
            "generate",
            "--snapshot",
            fixture("shop.json").to_str().unwrap(),
            "--schemas",
            "public,audit",
            "--exclude",
            "schema_migrations",
            "--no-preview",
            "-o",
            dir.path().to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let content = fs::read_to_string(dir.path().join("schema.md")).unwrap();
    let orders = content.find("# `orders`").unwrap();
    let users = content.find("# `users`").unwrap();
    let events = content.find("# `events`").unwrap();
    assert!(orders < users && users < events);
    assert!(!content.contains("schema_migrations"));
    assert!(content.contains("| `user_id` | bigint | NOT NULL |  | FK | public.users.id |"));
    assert!(content.contains("| `email` | character varying | NOT NULL |  | UK |  |"));
    assert!(content.contains("| `payload` | jsonb |  |  |\n"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Documented 3 tables (1 excluded)"));
}

#[test]
fn test_generate_per_table_with_mermaid() {
    let dir = TempDir::new().unwrap();

    let status = sqldoc()
        .args([
            "--snapshot",
            fixture("shop.json").to_str().unwrap(),
            "--strategy",
            "per_table",
            "--mermaid",
            "--no-preview",
            "-o",
            dir.path().to_str().unwrap(),
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let orders = fs::read_to_string(dir.path().join("orders.md")).unwrap();
    assert!(orders.contains("```mermaid\nerDiagram\n\"public.orders\" {\n"));
    assert!(orders.contains("    bigint user_id FK\n"));
    assert!(orders.contains("    timestamp_with_time_zone placed_at\n"));
    assert!(orders.contains("\"public.orders\" o|--o| \"public.users\" : \"id\""));

    assert!(dir.path().join("users.md").exists());
    assert!(dir.path().join("schema_migrations.md").exists());
    assert!(!dir.path().join("events.md").exists());
    assert!(!dir.path().join("schema.md").exists());
}

#[test]
fn test_preview_goes_to_stdout_only() {
    let dir = TempDir::new().unwrap();

    let output = sqldoc()
        .args([
            "--snapshot",
            fixture("shop.json").to_str().unwrap(),
            "--filename",
            "db.md",
            "-o",
            dir.path().to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("orders"));
    assert!(stdout.contains(" │ "));
    // Piped output is not colorized
    assert!(!stdout.contains("\u{1b}["));

    let file = fs::read_to_string(dir.path().join("db.md")).unwrap();
    assert!(!file.contains(" │ "));
}

#[test]
fn test_config_file_drives_generation() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    let config = dir.path().join("sqldoc.yaml");
    fs::write(
        &config,
        format!(
            "database:\n  schemas: [audit]\ndocumentation:\n  directory: {}\n  filename: audit.md\n  stdout: false\n  constraints: false\n",
            docs.display()
        ),
    )
    .unwrap();

    let status = sqldoc()
        .args([
            "--config",
            config.to_str().unwrap(),
            "--snapshot",
            fixture("shop.json").to_str().unwrap(),
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let content = fs::read_to_string(docs.join("audit.md")).unwrap();
    assert!(content.starts_with("# `events`\n"));
    assert!(!content.contains("orders"));
}

#[test]
fn test_missing_database_url_fails() {
    let dir = TempDir::new().unwrap();

    let output = sqldoc()
        .args(["generate", "-o", dir.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no database URL found"));
}

#[test]
fn test_unsupported_database_scheme_fails() {
    let dir = TempDir::new().unwrap();

    let output = sqldoc()
        .args([
            "--database-url",
            "mysql://localhost/app",
            "-o",
            dir.path().to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported database URL scheme: mysql"));
}

#[test]
fn test_invalid_strategy_fails() {
    let output = sqldoc()
        .args([
            "--snapshot",
            fixture("shop.json").to_str().unwrap(),
            "--strategy",
            "split",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Valid options: unified, per_table"));
}

#[test]
fn test_init_writes_example_config_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sqldoc.yaml");

    let status = sqldoc()
        .args(["init", path.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("strategy: unified"));

    let output = sqldoc()
        .args(["init", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));

    let status = sqldoc()
        .args(["init", path.to_str().unwrap(), "--force"])
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn test_completions() {
    let output = sqldoc().args(["completions", "bash"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("sqldoc"));
}
