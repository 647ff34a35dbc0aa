//! Integration tests for the urlcache binary
//!
//! Every run points `--cache-dir` at a temporary directory so nothing
//! touches the user's real cache.

use std::process::Command;

use tempfile::TempDir;

/// Helper to run the CLI against a cache directory and capture output
fn run_cli(cache_dir: &TempDir, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_urlcache"))
        .arg("--cache-dir")
        .arg(cache_dir.path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute urlcache")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = Command::new(env!("CARGO_BIN_EXE_urlcache"))
        .arg("--help")
        .output()
        .expect("Failed to execute urlcache");
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("urlcache"), "Help should mention urlcache");
    assert!(stdout.contains("resolve"), "Help should mention resolve");
}

#[test]
fn test_key_prints_md5_and_extension() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&dir, &["key", "The quick brown fox jumps over the lazy dog.txt"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!(
            "{}.txt",
            urlcache::cache::key::digest_hex("The quick brown fox jumps over the lazy dog.txt")
        )
    );
}

#[test]
fn test_key_without_extension_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&dir, &["key", "https://example.com/page"]);
    assert!(!output.status.success());
}

#[test]
fn test_put_value_then_get_value() {
    let dir = TempDir::new().unwrap();

    let put = run_cli(&dir, &["put-value", "motd", "hello there"]);
    assert!(put.status.success());
    assert!(dir.path().join("rest--value--motd").exists());

    let get = run_cli(&dir, &["get-value", "motd"]);
    assert!(get.status.success());
    assert_eq!(get.stdout, b"hello there");
}

#[test]
fn test_get_value_with_zero_ttl_is_absent() {
    let dir = TempDir::new().unwrap();
    run_cli(&dir, &["put-value", "motd", "hello"]);

    let get = run_cli(&dir, &["--ttl", "0", "get-value", "motd"]);

    assert!(!get.status.success());
    assert!(get.stdout.is_empty());
}

#[test]
fn test_get_response_allow_stale() {
    let dir = TempDir::new().unwrap();
    run_cli(&dir, &["put-response", "posts", "latest", "[1,2,3]"]);

    let fresh_only = run_cli(&dir, &["--ttl", "0", "get-response", "posts", "latest"]);
    assert!(!fresh_only.status.success());

    let stale = run_cli(
        &dir,
        &["--ttl", "0", "get-response", "posts", "latest", "--allow-stale"],
    );
    assert!(stale.status.success());
    assert_eq!(stale.stdout, b"[1,2,3]");
}

#[test]
fn test_put_empty_value_is_rejected() {
    let dir = TempDir::new().unwrap();
    let put = run_cli(&dir, &["put-value", "motd", ""]);
    assert!(!put.status.success());
    assert!(!dir.path().join("rest--value--motd").exists());
}

#[test]
fn test_resolve_uncacheable_url_prints_it_unchanged() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&dir, &["resolve", "https://example.com/page"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "https://example.com/page");
}

#[test]
fn test_resolve_unreachable_url_falls_back_to_original() {
    let dir = TempDir::new().unwrap();
    let url = "http://127.0.0.1:1/logo.png";
    let output = run_cli(&dir, &["resolve", url]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), url);
}

#[test]
fn test_rust_log_enables_debug_output() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_urlcache"))
        .arg("--cache-dir")
        .arg(dir.path())
        .args(["resolve", "https://example.com/page"])
        .env("RUST_LOG", "debug")
        .output()
        .expect("Failed to execute urlcache");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not caching resource"), "stderr: {stderr}");
}

#[test]
fn test_default_log_level_hides_debug_output() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&dir, &["resolve", "https://example.com/page"]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("not caching resource"), "stderr: {stderr}");
}

#[test]
fn test_missing_config_file_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&dir, &["--config", "/nonexistent/urlcache.json", "get-value", "x"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config"), "stderr: {stderr}");
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use urlcache::cli::{Cli, Command};

    #[test]
    fn test_cli_put_response_args() {
        let cli = Cli::parse_from(["urlcache", "put-response", "users", "42", "{}"]);
        assert_eq!(
            cli.command,
            Command::PutResponse {
                method: "users".to_string(),
                slug: "42".to_string(),
                payload: "{}".to_string(),
            }
        );
    }

    #[test]
    fn test_cli_base_url_override() {
        let cli = Cli::parse_from([
            "urlcache",
            "--base-url",
            "https://cdn.example.com/c",
            "resolve",
            "https://example.com/logo.png",
        ]);
        assert_eq!(cli.base_url.as_deref(), Some("https://cdn.example.com/c"));
    }
}
