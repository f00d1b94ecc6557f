use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn get_binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test executable name
    path.pop(); // Remove 'deps' directory
    path.push("makoto");
    path
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .current_dir(dir)
        .env("MAKOTO_DATA_DIR", dir.join("data"))
        .env_remove("MAKOTO_COMMENT_LIMIT")
        .env_remove("MAKOTO_PREVIEW_LIMIT")
        .env_remove("MAKOTO_STRICT_COMMENT")
        .output()
        .expect("Failed to execute binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_version_flag() {
    let temp = TempDir::new().unwrap();
    let output = run_in(temp.path(), &["--version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("makoto {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_version_command() {
    let temp = TempDir::new().unwrap();
    let output = run_in(temp.path(), &["version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_comment_respects_limit() {
    let temp = TempDir::new().unwrap();
    let output = run_in(temp.path(), &["comment", "--limit", "5", "abc", "de", "f"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "abc\n");
}

#[test]
fn test_comment_caption_placeholder() {
    let temp = TempDir::new().unwrap();
    let output = run_in(temp.path(), &["comment", "--caption", "  ", ""]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "コメントなし");
}

#[test]
fn test_preview_json() {
    let temp = TempDir::new().unwrap();
    let output = run_in(temp.path(), &["preview", "--json", "--limit", "6", "abc", "defg"]);
    assert!(output.status.success());
    let preview: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(preview["text"], "abc\nde");
    assert_eq!(preview["hasMore"], true);
}

#[test]
fn test_validate_reports_errors() {
    let temp = TempDir::new().unwrap();
    let valid = temp.path().join("store.json");
    fs::write(
        &valid,
        r#"{"storeName":"まこと","prefecture":"大阪府","category":"ソープ"}"#,
    )
    .unwrap();
    let output = run_in(temp.path(), &["validate", "store", "store.json"]);
    assert!(output.status.success());

    let invalid = temp.path().join("bad.json");
    fs::write(&invalid, r#"{"storeName":"","prefecture":"大阪府","category":"ソープ"}"#).unwrap();
    let output = run_in(temp.path(), &["validate", "store", "bad.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_bookmark_toggle_and_clear() {
    let temp = TempDir::new().unwrap();

    assert!(run_in(temp.path(), &["bookmark", "toggle", "s-1"]).status.success());
    assert!(run_in(temp.path(), &["bookmark", "toggle", "s-2"]).status.success());
    let listed = stdout(&run_in(temp.path(), &["bookmark", "list"]));
    assert_eq!(listed.lines().collect::<Vec<_>>(), vec!["s-1", "s-2"]);

    // survey bookmarks are kept apart
    let surveys = stdout(&run_in(temp.path(), &["bookmark", "list", "--kind", "survey"]));
    assert!(surveys.contains("No bookmarks"));

    let cleared = run_in(temp.path(), &["bookmark", "clear"]);
    assert!(cleared.status.success());
    assert!(stdout(&cleared).contains("Cleared store-bookmarks"));
    let listed = stdout(&run_in(temp.path(), &["bookmark", "list"]));
    assert!(listed.contains("No bookmarks"));
}

#[test]
fn test_track_fails_without_server() {
    let temp = TempDir::new().unwrap();
    let output = Command::new(get_binary_path())
        .args([
            "track",
            "--store-id",
            "s-1",
            "--link-type",
            "line",
            "--target-url",
            "https://line.me/x",
        ])
        .current_dir(temp.path())
        .env("MAKOTO_DATA_DIR", temp.path())
        .env("MAKOTO_API_BASE_URL", "http://127.0.0.1:9")
        .output()
        .expect("Failed to execute binary");
    assert!(!output.status.success());
}
