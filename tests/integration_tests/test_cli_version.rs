// integration tests for the version commands

use crate::common::*;

#[test]
fn test_version_flag() {
    let dir = create_test_dir();
    let output = run_pactl(dir.path(), &["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("pactl "));
}

#[test]
fn test_version_compare() {
    let dir = create_test_dir();

    let cases = [
        ("1.0", "1.0.0", "0"),
        ("1.0-alpha", "1.0", "-1"),
        ("1.10", "1.9", "1"),
        ("2.0-SNAPSHOT", "2.0-rc1", "1"),
    ];
    for (left, right, expected) in cases {
        let output = run_pactl(dir.path(), &["--no-json", "version-compare", left, right]);
        assert!(output.status.success(), "{} vs {}", left, right);
        assert_eq!(stdout(&output).trim(), expected, "{} vs {}", left, right);
    }

    let output = run_pactl(dir.path(), &["--json", "version-compare", "1", "2"]);
    let result = json_result(&output);
    assert_eq!(result["ordering"], -1);
    assert_eq!(result["left"], "1");
}

#[test]
fn test_version_in() {
    let dir = create_test_dir();

    let output = run_pactl(dir.path(), &["--no-json", "version-in", "1.5", "[1.0,2.0)"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "true");

    let output = run_pactl(dir.path(), &["--no-json", "version-in", "2.0", "[1.0,2.0)"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output).trim(), "false");

    let output = run_pactl(dir.path(), &["--json", "version-in", "1.8", "[1.8]"]);
    assert_eq!(json_result(&output)["contained"], true);
}

#[test]
fn test_version_invalid_arguments() {
    let dir = create_test_dir();

    let output = run_pactl(dir.path(), &["--no-json", "version-in", "1.5", "[1.0"]);
    assert_eq!(output.status.code(), Some(2));

    let output = run_pactl(dir.path(), &["--json", "version-compare", "", "1"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(json_error(&output)["code"], -32002);
}
