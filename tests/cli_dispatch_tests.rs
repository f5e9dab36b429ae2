use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_bearhunt"));
    command
        .env_remove("BEARHUNT_CATALOG")
        .env_remove("BEARHUNT_CONFIG");
    command
}

fn unique_temp_path(name: &str, extension: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("bearhunt-{name}-{stamp}.{extension}"))
}

const INVALID_CATALOG: &str = r#"heroes:
  - name: Broken
    effect_group: 1
    skills:
      - name: Slump
        effect: Attack Up
        values: [10, 8, 6, 4, 2]
"#;

#[test]
fn unknown_command_prints_usage() {
    let output = bin().arg("launch").output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: bearhunt"));
}

#[test]
fn heroes_command_emits_catalog_json() {
    let output = bin().arg("heroes").output().expect("heroes should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("heroes should emit json");
    assert_eq!(payload["heroes"].as_array().map(Vec::len), Some(12));
}

#[test]
fn calculate_command_reads_yaml_roster() {
    let path = unique_temp_path("roster", "yaml");
    fs::write(
        &path,
        "captains:\n  - hero: Jabel\n    skill: Hero's Domain\n    level: 5\njoiners:\n  - hero: Saul\n    level: 5\n",
    )
    .expect("fixture should be written");

    let output = bin()
        .args(["calculate", path.to_string_lossy().as_ref()])
        .output()
        .expect("calculate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("calculate should emit json");
    // 1.50 * 1.25
    assert_eq!(payload["rounded_percent"], 87.5);
    assert_eq!(payload["tier"], "good");

    let _ = fs::remove_file(path);
}

#[test]
fn calculate_command_renders_text_summary() {
    let path = unique_temp_path("roster-text", "json");
    fs::write(
        &path,
        r#"{"captains":[{"hero":"Amadeus","skill":"Unrighteous Strike","level":5}],"joiners":[{"hero":"Fahd","level":5},{"hero":"Saul","level":5},{"hero":"Gordon","level":5}]}"#,
    )
    .expect("fixture should be written");

    let output = bin()
        .args(["calculate", path.to_string_lossy().as_ref(), "--text"])
        .output()
        .expect("calculate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Rally Captain: Amadeus - Unrighteous Strike L5 (+40%)"));
    assert!(stdout.contains("Total Rally Size: 4 heroes"));
    assert!(stdout.contains("(Excellent!)"));

    let _ = fs::remove_file(path);
}

#[test]
fn calculate_command_returns_usage_without_path() {
    let output = bin().arg("calculate").output().expect("calculate should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: bearhunt calculate"));
}

#[test]
fn validate_command_passes_builtin_catalog() {
    let output = bin().arg("validate").output().expect("validate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("validation passed"));
}

#[test]
fn validate_command_returns_non_zero_on_invalid_catalog() {
    let path = unique_temp_path("invalid-catalog", "yaml");
    fs::write(&path, INVALID_CATALOG).expect("fixture should be written");

    let output = bin()
        .args(["validate", path.to_string_lossy().as_ref()])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed"));

    let _ = fs::remove_file(path);
}

#[test]
fn validate_command_lists_diagnostics_for_env_catalog() {
    let path = unique_temp_path("env-validate", "yaml");
    fs::write(&path, INVALID_CATALOG).expect("fixture should be written");

    let output = bin()
        .arg("validate")
        .env("BEARHUNT_CATALOG", &path)
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("level values decrease"));
    assert!(stderr.contains("validation failed: 1 issue(s)"));

    let _ = fs::remove_file(path);
}

#[test]
fn invalid_catalog_from_env_stops_commands() {
    let path = unique_temp_path("env-catalog", "yaml");
    fs::write(&path, INVALID_CATALOG).expect("fixture should be written");

    let output = bin()
        .arg("heroes")
        .env("BEARHUNT_CATALOG", &path)
        .output()
        .expect("heroes should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load hero catalog"));

    let _ = fs::remove_file(path);
}

#[test]
fn rally_command_runs_from_piped_input() {
    let mut child = bin()
        .arg("rally")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("rally should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"Chenko\nStand of Arms\n5\n1\nChenko\n5\n")
        .expect("input should be written");

    let output = child.wait_with_output().expect("rally should finish");
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total Rally Bonus: 50.0% (Good Setup)"));
    assert!(stdout.contains("Simple Addition"));
}
