// integration tests for the operator commands (word, num, time, has, bool, score, ops, methods)

use crate::common::*;

/// config path that does not exist, so every command runs on defaults
fn no_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    dir.path().join("absent.json")
}

// ============================================================================
// word
// ============================================================================

#[test]
fn test_word_one_passes_with_best_hit() {
    let dir = create_test_dir();
    let (code, json) = run_json(
        &["word", "one", "I want a refund", "-k", "refund", "-k", "cancel"],
        &no_config(&dir),
    );

    assert_eq!(code, 0, "{}", json);
    let result = &json["result"];
    assert_eq!(result["op"], "word/one");
    assert_eq!(result["passed"], true);
    assert_eq!(result["detail"], "refund");
    assert_eq!(result["scores"], serde_json::json!([0.0, 1.0]));
    assert_eq!(result["method"], "default");
}

#[test]
fn test_word_all_fails_with_exit_code_two() {
    let dir = create_test_dir();
    let (code, json) = run_json(
        &["word", "all", "refund please", "-k", "refund", "-k", "cancel"],
        &no_config(&dir),
    );

    assert_eq!(code, 2);
    assert_eq!(json["result"]["passed"], false);
    assert_eq!(json["result"]["detail"], "cancel");
}

#[test]
fn test_word_fuzzy_window_method() {
    let dir = create_test_dir();
    let (code, json) = run_json(
        &[
            "word",
            "word/one",
            "please cancel my subscripton",
            "-k",
            "subscription",
            "-m",
            "levenshtein-window",
            "-t",
            "0.8",
        ],
        &no_config(&dir),
    );

    assert_eq!(code, 0, "{}", json);
    let max = json["result"]["scores"][1].as_f64().unwrap();
    assert!(max > 0.8 && max < 1.0, "max score {}", max);
    assert_eq!(json["result"]["threshold"], 0.8);
}

#[test]
fn test_word_regex_method() {
    let dir = create_test_dir();
    let (code, _) = run_json(
        &["word", "all", "S...BnB", "-k", "S", "-k", "B", "-m", "reg"],
        &no_config(&dir),
    );
    assert_eq!(code, 0);

    let (code, json) = run_json(
        &["word", "one", "abc", "-k", "(open", "-m", "reg"],
        &no_config(&dir),
    );
    assert_eq!(code, 4);
    assert_eq!(json["error"]["code"], -32004);
}

#[test]
fn test_word_unknown_operator_suggests() {
    let dir = create_test_dir();
    let (code, json) = run_json(&["word", "inclde", "x", "-k", "y"], &no_config(&dir));

    assert_eq!(code, 3);
    assert_eq!(json["error"]["code"], -32003);
    assert_eq!(json["error"]["data"]["suggestions"][0], "word/include");
}

#[test]
fn test_word_set_is_unsupported() {
    let dir = create_test_dir();
    let (code, _) = run_json(&["word", "=", "x", "-k", "y"], &no_config(&dir));
    assert_eq!(code, 4);
}

#[test]
fn test_word_empty_and_any_without_keys() {
    let dir = create_test_dir();
    let config = no_config(&dir);

    assert_eq!(run_json(&["word", "empty", ""], &config).0, 0);
    assert_eq!(run_json(&["word", "empty", "text"], &config).0, 2);
    assert_eq!(run_json(&["word", "any", "hello"], &config).0, 0);
    assert_eq!(run_json(&["word", "any", " "], &config).0, 2);
}

#[test]
fn test_word_equality_ignores_whitespace() {
    let dir = create_test_dir();
    let (code, _) = run_json(
        &["word", "==", "hello world", "-k", "hello world"],
        &no_config(&dir),
    );
    assert_eq!(code, 0);
}

// ============================================================================
// num
// ============================================================================

#[test]
fn test_num_arithmetic_reports_value() {
    let dir = create_test_dir();
    let (code, json) = run_json(&["num", "+", "10", "1", "2.5"], &no_config(&dir));

    assert_eq!(code, 0);
    assert_eq!(json["result"]["op"], "num/cal/+");
    assert_eq!(json["result"]["value"], 13.5);
}

#[test]
fn test_num_max_text_output() {
    let dir = create_test_dir();
    let output = run_ruleop(&["--no-json", "num", "max", "1", "5", "3"], &no_config(&dir));

    assert!(output.status.success());
    assert_eq!(stdout_of(&output).trim(), "5");
}

#[test]
fn test_num_ranges() {
    let dir = create_test_dir();
    let config = no_config(&dir);

    assert_eq!(run_json(&["num", "[a,b]", "5", "3", "7"], &config).0, 0);
    assert_eq!(run_json(&["num", "[a,b)", "7", "3", "7"], &config).0, 2);
    assert_eq!(run_json(&["num", "num/cmp/(a,b]", "7", "3", "7"], &config).0, 0);
    assert_eq!(run_json(&["num", "<", "-5", "0"], &config).0, 0);
}

#[test]
fn test_num_errors_map_to_invalid_args() {
    let dir = create_test_dir();
    let config = no_config(&dir);

    // reversed bounds are rejected, never swapped
    let (code, json) = run_json(&["num", "[a,b]", "5", "7", "3"], &config);
    assert_eq!(code, 4);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("invalid range"));

    assert_eq!(run_json(&["num", "/", "1", "0"], &config).0, 4);
    assert_eq!(run_json(&["num", "[a,b]", "5", "3"], &config).0, 4);
    assert_eq!(run_json(&["num", ">", "five", "3"], &config).0, 4);
}

#[test]
fn test_num_classification() {
    let dir = create_test_dir();
    let config = no_config(&dir);

    assert_eq!(run_json(&["num", "isNan", "nan"], &config).0, 0);
    assert_eq!(run_json(&["num", "isinf", "-inf"], &config).0, 0);
    assert_eq!(run_json(&["num", "negInf", "inf"], &config).0, 2);
}

// ============================================================================
// time
// ============================================================================

#[test]
fn test_time_range() {
    let dir = create_test_dir();
    let config = no_config(&dir);

    let (code, json) = run_json(
        &[
            "time",
            "[a,b)",
            "2024-01-15T10:00:00Z",
            "2024-01-01T00:00:00Z",
            "2024-02-01T00:00:00Z",
        ],
        &config,
    );
    assert_eq!(code, 0);
    assert_eq!(json["result"]["op"], "time/[a,b)");

    let (code, _) = run_json(
        &["time", "[a,b)", "2024-02-01T00:00:00Z", "2024-01-01T00:00:00Z", "2024-02-01T00:00:00Z"],
        &config,
    );
    assert_eq!(code, 2);
}

#[test]
fn test_time_epoch_and_now() {
    let dir = create_test_dir();
    let config = no_config(&dir);

    assert_eq!(run_json(&["time", ">", "0", "now"], &config).0, 2);
    assert_eq!(run_json(&["time", "<=", "1000", "1970-01-01T00:00:01Z"], &config).0, 0);
    assert_eq!(run_json(&["time", "<", "tomorrow", "0"], &config).0, 4);
}

// ============================================================================
// has
// ============================================================================

#[test]
fn test_has_one_loose_and_strict() {
    let dir = create_test_dir();
    let config = no_config(&dir);

    let (code, json) = run_json(&["has", "one", "test", "-o", "testing", "-o", "demo"], &config);
    assert_eq!(code, 0);
    assert_eq!(json["result"]["detail"], "testing");

    let (code, _) = run_json(
        &["has", "one", "test", "-o", "testing", "-o", "demo", "--strict"],
        &config,
    );
    assert_eq!(code, 2);
}

#[test]
fn test_has_list_of_values() {
    let dir = create_test_dir();
    let config = no_config(&dir);

    let (code, _) = run_json(&["has", "all", "test", "demo", "-o", "test", "-o", "demo"], &config);
    assert_eq!(code, 0);

    let (code, json) = run_json(&["has", "all", "test", "other", "-o", "test", "-o", "demo"], &config);
    assert_eq!(code, 2);
    assert_eq!(json["result"]["detail"], "demo");
}

#[test]
fn test_has_none() {
    let dir = create_test_dir();
    let (code, json) = run_json(&["has", "none", "none", "-o", "test", "-o", "demo"], &no_config(&dir));
    assert_eq!(code, 0);
    assert_eq!(json["result"]["detail"], "");
}

// ============================================================================
// bool
// ============================================================================

#[test]
fn test_bool_operators() {
    let dir = create_test_dir();
    let config = no_config(&dir);

    assert_eq!(run_json(&["bool", "and", "true", "false", "true"], &config).0, 2);
    assert_eq!(run_json(&["bool", "or", "false", "yes"], &config).0, 0);
    assert_eq!(run_json(&["bool", "not", "false", "off"], &config).0, 0);
    assert_eq!(run_json(&["bool", "and"], &config).0, 0);
    assert_eq!(run_json(&["bool", "and", "maybe"], &config).0, 4);
    assert_eq!(run_json(&["bool", "xor", "true"], &config).0, 3);
}

// ============================================================================
// score, ops, methods
// ============================================================================

#[test]
fn test_score_levenshtein() {
    let dir = create_test_dir();
    let (code, json) = run_json(
        &["score", "kitten", "sitting", "-m", "levenshtein"],
        &no_config(&dir),
    );

    assert_eq!(code, 0);
    let score = json["result"]["score"].as_f64().unwrap();
    assert!((score - (1.0 - 3.0 / 7.0)).abs() < 1e-9, "score {}", score);
    assert_eq!(json["result"]["method"], "levenshtein");
}

#[test]
fn test_score_threshold_controls_exit_code() {
    let dir = create_test_dir();
    let (code, json) = run_json(
        &["score", "kitten", "sitting", "-m", "levenshtein", "-t", "0.9"],
        &no_config(&dir),
    );
    assert_eq!(code, 2);
    assert_eq!(json["result"]["passed"], false);
}

#[test]
fn test_score_rejects_malformed_pattern() {
    let dir = create_test_dir();
    let (code, json) = run_json(&["score", "abc", "(open", "-m", "reg"], &no_config(&dir));

    assert_eq!(code, 4);
    assert_eq!(json["error"]["code"], -32004);
}

#[test]
fn test_ops_lists_family() {
    let dir = create_test_dir();
    let (code, json) = run_json(&["ops", "--family", "has"], &no_config(&dir));

    assert_eq!(code, 0);
    assert_eq!(
        json["result"],
        serde_json::json!([{
            "family": "has",
            "operators": ["has/none", "has/any", "has/one", "has/all"]
        }])
    );
}

#[test]
fn test_ops_lists_every_family() {
    let dir = create_test_dir();
    let (_, json) = run_json(&["ops"], &no_config(&dir));

    let families = json["result"].as_array().unwrap();
    assert_eq!(families.len(), 5);
    let num = families.iter().find(|f| f["family"] == "num").unwrap();
    assert_eq!(num["operators"].as_array().unwrap().len(), 20);
}

#[test]
fn test_methods_lists_builtins() {
    let dir = create_test_dir();
    let (code, json) = run_json(&["methods"], &no_config(&dir));

    assert_eq!(code, 0);
    assert_eq!(
        json["result"]["methods"],
        serde_json::json!(["default", "levenshtein", "levenshtein-window", "reg"])
    );
}

#[test]
fn test_quiet_mode_prints_nothing() {
    let dir = create_test_dir();
    let output = run_ruleop(&["-q", "word", "one", "abc", "-k", "xyz"], &no_config(&dir));

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout_of(&output).is_empty());
}

#[test]
fn test_text_output_marks_outcome() {
    let dir = create_test_dir();
    let output = run_ruleop(
        &["--no-json", "word", "include", "testdemo", "-k", "demo"],
        &no_config(&dir),
    );

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("✓ word/include (demo)"), "{}", stdout);
}

#[test]
fn test_text_errors_go_to_stderr() {
    let dir = create_test_dir();
    let output = run_ruleop(&["--no-json", "has", "some", "x"], &no_config(&dir));

    assert_eq!(output.status.code(), Some(3));
    assert!(stdout_of(&output).is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown has operator 'some'"), "{}", stderr);
}
