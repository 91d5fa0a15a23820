// integration tests for the eval command

use crate::common::*;
use std::fs;

#[test]
fn test_eval_arithmetic_json() {
    let dir = create_test_dir();
    let output = run_pactl(dir.path(), &["--json", "eval", "1 + 2 * 3"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let result = json_result(&output);
    assert_eq!(result["expression"], "1 + 2 * 3");
    assert_eq!(result["value"], serde_json::json!(7.0));
    assert_eq!(result["type"], "number");
    assert_eq!(result["active"], true);
}

#[test]
fn test_eval_text_output() {
    let dir = create_test_dir();

    let output = run_pactl(dir.path(), &["--no-json", "eval", "'a' + 1"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "a1");

    let output = run_pactl(dir.path(), &["--no-json", "eval", "length('hello') > 3"]);
    assert_eq!(stdout(&output).trim(), "true");
}

#[test]
fn test_eval_quiet_prints_nothing() {
    let dir = create_test_dir();
    let output = run_pactl(dir.path(), &["--quiet", "eval", "1"]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_eval_user_properties() {
    let dir = create_test_dir();

    let output = run_pactl(dir.path(), &["--no-json", "-D", "env=ci", "eval", "${env} == 'ci'"]);
    assert_eq!(stdout(&output).trim(), "true");

    let output = run_pactl(dir.path(), &["--no-json", "eval", "${env} == 'ci'"]);
    assert_eq!(stdout(&output).trim(), "false");
}

#[test]
fn test_eval_uses_config_properties() {
    let dir = create_test_dir();
    write_config(
        dir.path(),
        r#"{
            system_properties: { "java.version": "17.0.2" },
            user_properties: { env: "ci" },
        }"#,
    );

    let output = run_pactl(
        dir.path(),
        &["--no-json", "eval", "inrange(${java.version}, '[11,)') && ${env} == 'ci'"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "true");

    // -D dominates the file
    let output = run_pactl(dir.path(), &["--no-json", "-D", "env=local", "eval", "${env}"]);
    assert_eq!(stdout(&output).trim(), "local");
}

#[test]
fn test_eval_files_resolve_against_config_directory() {
    let dir = create_test_dir();
    write_config(dir.path(), "{}");
    fs::write(dir.path().join("marker"), "").unwrap();

    let output = run_pactl(
        dir.path(),
        &["--no-json", "eval", "exists('marker') && missing('${basedir}/nope')"],
    );
    assert_eq!(stdout(&output).trim(), "true");
}

#[test]
fn test_eval_error_exit_code() {
    let dir = create_test_dir();

    let output = run_pactl(dir.path(), &["--json", "eval", "5 / 0"]);
    assert_eq!(output.status.code(), Some(4));
    let error = json_error(&output);
    assert_eq!(error["code"], -32004);
    assert!(error["message"].as_str().unwrap().contains("division by zero"));

    let output = run_pactl(dir.path(), &["--no-json", "eval", "lenght('x')"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("did you mean 'length'"));
}

#[test]
fn test_eval_missing_root_directory() {
    let dir = create_test_dir();
    let output = run_pactl(
        dir.path(),
        &["--no-json", "eval", "exists('${project.rootDirectory}/pom.xml')"],
    );
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_eval_root_directory_from_config() {
    let dir = create_test_dir();
    write_config(dir.path(), r#"{ root_directory: "." }"#);

    let output = run_pactl(
        dir.path(),
        &["--no-json", "eval", "exists('${project.rootDirectory}/profiles.json5')"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "true");
}

#[test]
fn test_eval_explicit_missing_config() {
    let dir = create_test_dir();
    let output = run_pactl(dir.path(), &["--config", "nope.json5", "--no-json", "eval", "1"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("not found"));
}

#[test]
fn test_eval_config_from_env() {
    let dir = create_test_dir();
    let other = create_test_dir();
    let path = write_config(other.path(), r#"{ user_properties: { from: "env" } }"#);

    let output = run_pactl_with_env(
        dir.path(),
        &["--no-json", "eval", "${from}"],
        &[("PACTL_CONFIG", path.to_str().unwrap())],
    );
    assert_eq!(stdout(&output).trim(), "env");
}
