use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn askbase_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("askbase");
    path
}

const KNOWLEDGE: &str = "Canada welcomes thousands of international students every single year. \
                         Applicants must demonstrate sufficient settlement funds before arrival. \
                         Express Entry manages applications for three skilled worker programs.";

/// Builds a workspace with a knowledge base document, a policy document, and
/// a config whose embedding key points at an environment variable that is
/// guaranteed to be unset. No test here can reach the network.
fn setup_test_env() -> (TempDir, PathBuf) {
    setup_with_knowledge(KNOWLEDGE)
}

fn setup_with_knowledge(knowledge: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    fs::write(root.join("knowledge.txt"), knowledge).unwrap();
    fs::write(
        config_dir.join("policy.md"),
        "You are a helpful immigration advisor.",
    )
    .unwrap();

    let config_content = format!(
        r#"[source]
path = "{}/knowledge.txt"

[policy]
path = "{}/config/policy.md"

[embedding]
provider = "openai"
model = "text-embedding-3-small"
api_key_env = "ASKBASE_TEST_NO_SUCH_KEY"
"#,
        root.display(),
        root.display()
    );

    let config_path = config_dir.join("askbase.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_askbase(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = askbase_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .env_remove("ASKBASE_TEST_NO_SUCH_KEY")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run askbase binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_chunks_reports_statistics() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_askbase(&config_path, &["chunks"]);
    assert!(success, "chunks failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("knowledge.txt"));
    assert!(stdout.contains("characters:"));
    assert!(
        stdout.contains("chunks:     1"),
        "Expected exactly one chunk, got: {}",
        stdout
    );
    assert!(stdout.contains("shortest:"));
    assert!(stdout.contains("average:"));
}

#[test]
fn test_chunks_empty_document() {
    let (_tmp, config_path) = setup_with_knowledge("");

    let (stdout, stderr, success) = run_askbase(&config_path, &["chunks"]);
    assert!(success, "chunks failed: stdout={}, stderr={}", stdout, stderr);
    assert!(
        stdout.contains("chunks:     0"),
        "Empty document should produce zero chunks, got: {}",
        stdout
    );
    assert!(
        !stdout.contains("shortest:"),
        "Length stats should be skipped for zero chunks, got: {}",
        stdout
    );
}

#[test]
fn test_chunks_missing_document() {
    let (tmp, config_path) = setup_test_env();
    fs::remove_file(tmp.path().join("knowledge.txt")).unwrap();

    let (_, stderr, success) = run_askbase(&config_path, &["chunks"]);
    assert!(!success, "Missing knowledge base should fail");
    assert!(
        stderr.contains("failed to read"),
        "Should report the read failure, got: {}",
        stderr
    );
}

#[test]
fn test_unknown_provider_rejected() {
    let (_tmp, config_path) = setup_test_env();
    let config = fs::read_to_string(&config_path).unwrap();
    fs::write(&config_path, config.replace("openai", "cohere")).unwrap();

    let (_, stderr, success) = run_askbase(&config_path, &["chunks"]);
    assert!(!success, "Unknown provider should fail at config load");
    assert!(
        stderr.contains("Unknown embedding provider"),
        "Should name the bad provider, got: {}",
        stderr
    );
}

#[test]
fn test_oversized_overlap_rejected() {
    let (_tmp, config_path) = setup_test_env();
    let mut config = fs::read_to_string(&config_path).unwrap();
    config.push_str("\n[chunking]\nchunk_size = 100\noverlap = 100\n");
    fs::write(&config_path, config).unwrap();

    let (_, stderr, success) = run_askbase(&config_path, &["chunks"]);
    assert!(!success, "overlap >= chunk_size should fail at config load");
    assert!(
        stderr.contains("overlap"),
        "Should mention the overlap, got: {}",
        stderr
    );
}

#[test]
fn test_missing_config_file() {
    let (_tmp, config_path) = setup_test_env();
    let missing = config_path.with_file_name("nope.toml");

    let (_, stderr, success) = run_askbase(&missing, &["chunks"]);
    assert!(!success, "Missing config file should fail");
    assert!(
        stderr.contains("Failed to read config file"),
        "Should report the config path, got: {}",
        stderr
    );
}

#[test]
fn test_ask_without_api_key() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_askbase(&config_path, &["ask", "Do I need a study permit?"]);
    assert!(!success, "ask without an API key should fail");
    assert!(
        stderr.contains("ASKBASE_TEST_NO_SUCH_KEY environment variable not set"),
        "Should name the missing variable, got: {}",
        stderr
    );
}

#[test]
fn test_ask_with_too_short_document() {
    // 32 characters: the single window it yields falls under the 50-char
    // floor, so no chunk survives and startup must fail.
    let (_tmp, config_path) = setup_with_knowledge("Processing times vary by office.");

    let (_, stderr, success) = run_askbase(&config_path, &["ask", "Do I need a permit?"]);
    assert!(!success, "ask over an unusable knowledge base should fail");
    assert!(
        stderr.contains("produced no chunks"),
        "Should report the empty chunk set, got: {}",
        stderr
    );
    assert!(
        !stderr.contains("ASKBASE_TEST_NO_SUCH_KEY"),
        "Startup should fail before the embedding provider is built, got: {}",
        stderr
    );
}

#[test]
fn test_search_without_api_key() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_askbase(&config_path, &["search", "study permit"]);
    assert!(!success, "search without an API key should fail");
    assert!(
        stderr.contains("environment variable not set"),
        "Should report the missing key, got: {}",
        stderr
    );
}

#[test]
fn test_help_lists_commands() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_askbase(&config_path, &["--help"]);
    assert!(success);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("ask"));
    assert!(stdout.contains("search"));
    assert!(stdout.contains("chunks"));
}
