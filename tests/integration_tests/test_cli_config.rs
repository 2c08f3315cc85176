// integration tests for the config and check commands

use crate::common::*;
use std::fs;
use std::process::Command;

const RULES_CONFIG: &str = r#"{
    // JSON5: comments and trailing commas are allowed
    settings: { method: "default", threshold: 0.8 },
    rules: {
        refund: { op: "word/one", args: ["refund", "reimburse"] },
        adult: { op: "num/cmp/>=", args: [18] },
        typo: {
            op: "word/one",
            args: ["subscription"],
            options: { method: "levenshtein-window" },
        },
    },
}"#;

// ============================================================================
// config init / show / path
// ============================================================================

#[test]
fn test_config_init_writes_examples() {
    let dir = create_test_dir();
    let config_path = dir.path().join("nested").join("config.json");

    let output = run_ruleop(&["--no-json", "config", "init"], &config_path);
    assert!(output.status.success(), "{:?}", output);
    assert!(config_path.exists());

    let content = fs::read_to_string(&config_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert!(json["rules"]["adult"].is_object());
    assert_eq!(json["settings"]["threshold"], 0.8);
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), RULES_CONFIG);

    let output = run_ruleop(&["--no-json", "config", "init"], &config_path);
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(fs::read_to_string(&config_path).unwrap(), RULES_CONFIG);

    let output = run_ruleop(&["--no-json", "config", "init", "--force"], &config_path);
    assert!(output.status.success());
    assert_ne!(fs::read_to_string(&config_path).unwrap(), RULES_CONFIG);
}

#[test]
fn test_config_show_json_output() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), RULES_CONFIG);

    let (code, json) = run_json(&["config", "show"], &config_path);
    assert_eq!(code, 0);
    assert_eq!(json["result"]["settings"]["threshold"], 0.8);
    assert_eq!(json["result"]["rules"]["adult"]["op"], "num/cmp/>=");
}

#[test]
fn test_config_show_missing_file_shows_defaults() {
    let dir = create_test_dir();
    let (code, json) = run_json(&["config", "show"], &dir.path().join("absent.json"));

    assert_eq!(code, 0);
    assert_eq!(json["result"]["settings"]["method"], "default");
    assert_eq!(json["result"]["rules"], serde_json::json!({}));
}

#[test]
fn test_config_path_honours_flag_and_env() {
    let dir = create_test_dir();
    let config_path = dir.path().join("custom.json");

    let output = run_ruleop(&["--no-json", "config", "path"], &config_path);
    assert_eq!(stdout_of(&output).trim(), config_path.display().to_string());

    let env_path = dir.path().join("from-env.json");
    let output = Command::new(ruleop_binary_path())
        .args(["--no-json", "config", "path"])
        .env("RULEOP_CONFIG", &env_path)
        .output()
        .expect("Failed to run ruleop");
    assert_eq!(stdout_of(&output).trim(), env_path.display().to_string());
}

#[test]
fn test_config_malformed_file_is_config_error() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), "{ settings: ");

    let (code, json) = run_json(&["config", "show"], &config_path);
    assert_eq!(code, 5);
    assert_eq!(json["error"]["code"], -32005);
}

// ============================================================================
// config verify
// ============================================================================

#[test]
fn test_config_verify_valid() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), RULES_CONFIG);

    let output = run_ruleop(&["--no-json", "config", "verify"], &config_path);
    let stdout = stdout_of(&output);
    assert!(output.status.success(), "{}", stdout);
    assert!(stdout.contains("Configuration is valid"));
}

#[test]
fn test_config_verify_lists_problems() {
    let dir = create_test_dir();
    let config_path = write_config(
        dir.path(),
        r#"{
            settings: { method: "jaro" },
            rules: {
                broken: { op: "word/similar" },
                reversed: { op: "num/cmp/[a,b]", args: [9, 1] },
            },
        }"#,
    );

    let output = run_ruleop(&["--no-json", "config", "verify"], &config_path);
    assert_eq!(output.status.code(), Some(5));

    let stdout = stdout_of(&output);
    assert!(stdout.contains("3 error(s)"), "{}", stdout);
    assert!(stdout.contains("settings.method"));
    assert!(stdout.contains("rules.broken: unknown operator 'word/similar'"));
    assert!(stdout.contains("rules.reversed"));
}

#[test]
fn test_config_verify_rejects_strict_list() {
    let dir = create_test_dir();
    let config_path = write_config(
        dir.path(),
        r#"{ rules: { locale: { op: "has/one", args: ["en"], options: { strict: true, list: true } } } }"#,
    );

    let (code, json) = run_json(&["config", "verify"], &config_path);
    assert_eq!(code, 5);
    let errors = json["result"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().starts_with("rules.locale: invalid option 'strict'"));
}

#[test]
fn test_config_verify_json() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), r#"{ rules: { bad: { op: "has/some" } } }"#);

    let (code, json) = run_json(&["config", "verify"], &config_path);
    assert_eq!(code, 5);
    assert_eq!(json["result"]["valid"], false);
    assert_eq!(json["result"]["errors"].as_array().unwrap().len(), 1);
}

#[test]
fn test_config_verify_missing_file() {
    let dir = create_test_dir();
    let output = run_ruleop(&["--no-json", "config", "verify"], &dir.path().join("absent.json"));
    assert_eq!(output.status.code(), Some(5));
}

// ============================================================================
// config set
// ============================================================================

#[test]
fn test_config_set_threshold_and_method() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), RULES_CONFIG);

    let output = run_ruleop(
        &["--no-json", "config", "set", "settings.threshold", "0.6"],
        &config_path,
    );
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Set settings.threshold = 0.6"));

    run_ruleop(
        &["--no-json", "config", "set", "settings.method", "levenshtein"],
        &config_path,
    );

    let (_, json) = run_json(&["config", "show"], &config_path);
    assert_eq!(json["result"]["settings"]["threshold"], 0.6);
    assert_eq!(json["result"]["settings"]["method"], "levenshtein");
    // rules survive the rewrite
    assert_eq!(json["result"]["rules"]["refund"]["op"], "word/one");
}

#[test]
fn test_config_set_rejects_bad_input() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), RULES_CONFIG);

    let output = run_ruleop(&["--no-json", "config", "set", "settings.colour", "x"], &config_path);
    assert_eq!(output.status.code(), Some(4));

    let output = run_ruleop(
        &["--no-json", "config", "set", "settings.threshold", "7"],
        &config_path,
    );
    assert_eq!(output.status.code(), Some(4));
    assert_eq!(fs::read_to_string(&config_path).unwrap(), RULES_CONFIG);
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_named_rules() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), RULES_CONFIG);

    let (code, json) = run_json(&["check", "refund", "I need a refund now"], &config_path);
    assert_eq!(code, 0);
    assert_eq!(json["result"]["rule"], "refund");
    assert_eq!(json["result"]["detail"], "refund");

    assert_eq!(run_json(&["check", "adult", "21"], &config_path).0, 0);
    assert_eq!(run_json(&["check", "adult", "17"], &config_path).0, 2);
    assert_eq!(run_json(&["check", "adult", "-3"], &config_path).0, 2);
}

#[test]
fn test_check_rule_options_override_settings() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), RULES_CONFIG);

    let (code, json) = run_json(&["check", "typo", "cancel my subscripton"], &config_path);
    assert_eq!(code, 0, "{}", json);
    assert_eq!(json["result"]["method"], "levenshtein-window");
    assert_eq!(json["result"]["threshold"], 0.8);
}

#[test]
fn test_check_word_empty_rule_without_args() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), r#"{ rules: { blank: { op: "word/empty" } } }"#);

    assert_eq!(run_json(&["check", "blank", ""], &config_path).0, 0);
    assert_eq!(run_json(&["check", "blank", "text"], &config_path).0, 2);
}

#[test]
fn test_check_format_string() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), RULES_CONFIG);

    let output = run_ruleop(
        &["check", "refund", "reimburse me please", "--format", "{passed}:{detail}"],
        &config_path,
    );
    assert!(output.status.success());
    assert_eq!(stdout_of(&output).trim(), "true:reimburse");
}

#[test]
fn test_check_unknown_rule_suggests_names() {
    let dir = create_test_dir();
    let config_path = write_config(dir.path(), RULES_CONFIG);

    let (code, json) = run_json(&["check", "refunds", "x"], &config_path);
    assert_eq!(code, 5);
    assert_eq!(
        json["error"]["data"]["suggestions"],
        serde_json::json!(["adult", "refund", "typo"])
    );
}

#[test]
fn test_check_invalid_rule_is_reported() {
    let dir = create_test_dir();
    let config_path = write_config(
        dir.path(),
        r#"{ rules: { broken: { op: "word/similar", args: ["x"] } } }"#,
    );

    let (code, json) = run_json(&["check", "broken", "x"], &config_path);
    assert_eq!(code, 3);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("rule 'broken' is invalid"));
}
