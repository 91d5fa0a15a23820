// integration tests for the select command

use crate::common::*;

const PROFILES: &str = r#"{
    system_properties: { "java.version": "17.0.2" },
    profiles: [
        { id: "default", activation: { activeByDefault: true } },
        { id: "modern-jdk", activation: { jdk: "[11,)" }, properties: { modern: "yes" } },
        { id: "cascade", activation: { property: { name: "modern", value: "yes" } } },
        { id: "ci", activation: { property: { name: "env", value: "ci" } } },
        { id: "user", source: "settings", activation: { condition: "${java.version} != ''" } },
    ],
}"#;

fn active_ids(result: &serde_json::Value) -> Vec<String> {
    result["active"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_select_json() {
    let dir = create_test_dir();
    write_config(dir.path(), PROFILES);

    let output = run_pactl(dir.path(), &["--json", "select"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let result = json_result(&output);
    assert_eq!(active_ids(&result), vec!["modern-jdk", "cascade", "user"]);
    assert_eq!(result["active"][2]["source"], "settings");
    assert_eq!(result["problems"], serde_json::json!([]));
}

#[test]
fn test_select_with_user_property() {
    let dir = create_test_dir();
    write_config(dir.path(), PROFILES);

    let output = run_pactl(dir.path(), &["--json", "-D", "env=ci", "select"]);
    let result = json_result(&output);
    assert_eq!(active_ids(&result), vec!["modern-jdk", "cascade", "ci", "user"]);
}

#[test]
fn test_select_explicit_profiles() {
    let dir = create_test_dir();
    write_config(dir.path(), PROFILES);

    // without modern-jdk nothing in the project descriptor activates
    let output = run_pactl(dir.path(), &["--json", "select", "-P", "!modern-jdk"]);
    let result = json_result(&output);
    assert_eq!(active_ids(&result), vec!["default", "user"]);

    let output = run_pactl(dir.path(), &["--json", "select", "-P", "ci,-user"]);
    let result = json_result(&output);
    assert_eq!(active_ids(&result), vec!["modern-jdk", "cascade", "ci"]);
}

#[test]
fn test_select_text_output() {
    let dir = create_test_dir();
    write_config(dir.path(), PROFILES);

    let output = run_pactl(dir.path(), &["--no-json", "select"]);
    assert!(output.status.success());
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines, vec!["modern-jdk (pom)", "cascade (pom)", "user (settings)"]);
}

#[test]
fn test_select_reports_errors() {
    let dir = create_test_dir();
    write_config(
        dir.path(),
        r#"{ profiles: [ { id: "jdk8", activation: { jdk: "1.8" } } ] }"#,
    );

    let output = run_pactl(dir.path(), &["--json", "select"]);
    assert_eq!(output.status.code(), Some(4));
    let result = json_result(&output);
    assert_eq!(active_ids(&result), Vec::<String>::new());
    assert_eq!(result["problems"][0]["severity"], "error");
}

#[test]
fn test_select_warnings_do_not_fail() {
    let dir = create_test_dir();
    write_config(
        dir.path(),
        r#"{ profiles: [ { id: "bad", activation: { condition: "1 +" } } ] }"#,
    );

    let output = run_pactl(dir.path(), &["--no-json", "select"]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("warning: failed to evaluate condition"));
}

#[test]
fn test_select_missing_root_directory() {
    let dir = create_test_dir();
    write_config(
        dir.path(),
        r#"{ profiles: [ { id: "root", activation: { file: { exists: "${project.rootDirectory}/x" } } } ] }"#,
    );

    let output = run_pactl(dir.path(), &["--json", "select"]);
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(json_error(&output)["code"], -32005);
}

#[test]
fn test_select_missing_file_profile() {
    let dir = create_test_dir();
    write_config(
        dir.path(),
        r#"{
            root_directory: ".",
            profiles: [ { id: "fresh", activation: { file: { missing: "${project.rootDirectory}/someFile.txt" } } } ],
        }"#,
    );

    let output = run_pactl(dir.path(), &["--json", "select"]);
    assert_eq!(active_ids(&json_result(&output)), vec!["fresh"]);

    std::fs::write(dir.path().join("someFile.txt"), "").unwrap();
    let output = run_pactl(dir.path(), &["--json", "select"]);
    assert_eq!(active_ids(&json_result(&output)), Vec::<String>::new());
}

#[test]
fn test_select_invalid_config() {
    let dir = create_test_dir();
    write_config(dir.path(), "{ profiles: [ }");

    let output = run_pactl(dir.path(), &["--no-json", "select"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("failed to parse config file"));
}
