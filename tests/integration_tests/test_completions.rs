// integration tests for shell completion generation

use crate::common::*;

#[test]
fn test_completions_bash() {
    let dir = create_test_dir();
    let output = run_ruleop(&["completions", "bash"], &dir.path().join("absent.json"));

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("ruleop"));
    assert!(stdout.contains("check"));
}

#[test]
fn test_completions_zsh_and_fish() {
    let dir = create_test_dir();
    for shell in ["zsh", "fish"] {
        let output = run_ruleop(&["completions", shell], &dir.path().join("absent.json"));
        assert!(output.status.success(), "{} completions failed", shell);
        assert!(!stdout_of(&output).is_empty());
    }
}

#[test]
fn test_completions_unknown_shell_rejected() {
    let dir = create_test_dir();
    let output = run_ruleop(&["completions", "cmd"], &dir.path().join("absent.json"));
    assert!(!output.status.success());
}
