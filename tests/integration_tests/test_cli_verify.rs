// integration tests for the verify command

use crate::common::*;

#[test]
fn test_verify_valid() {
    let dir = create_test_dir();
    write_config(
        dir.path(),
        r#"{
            profiles: [
                { id: "a", activation: { jdk: "[1.8,11)" } },
                { id: "b", activation: { condition: "${os.name} == 'Linux'" } },
            ],
        }"#,
    );

    let output = run_pactl(dir.path(), &["--no-json", "verify"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Profile set is valid"));

    let output = run_pactl(dir.path(), &["--json", "verify"]);
    assert_eq!(json_result(&output)["valid"], true);
}

#[test]
fn test_verify_invalid() {
    let dir = create_test_dir();
    write_config(
        dir.path(),
        r#"{
            profiles: [
                { id: "dup" },
                { id: "dup", activation: { condition: "(1" } },
            ],
        }"#,
    );

    let output = run_pactl(dir.path(), &["--json", "verify"]);
    assert_eq!(output.status.code(), Some(3));
    let error = json_error(&output);
    assert!(error["message"].as_str().unwrap().contains("2 error(s)"));
    let details = error["data"]["details"].as_array().unwrap();
    assert!(details[0].as_str().unwrap().contains("duplicate id 'dup'"));
    assert!(details[1].as_str().unwrap().contains("invalid condition"));

    let output = run_pactl(dir.path(), &["--no-json", "verify"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("  - profiles[1] ('dup'): duplicate id 'dup'"));
}

#[test]
fn test_verify_missing_file() {
    let dir = create_test_dir();
    let output = run_pactl(dir.path(), &["--no-json", "verify"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("config file not found"));
}
