//! exit codes for ruleop commands
//!
//! 0 = success (or the evaluated condition held), non-zero = failure.
//! specific codes let scripts tell a false condition apart from a bad rule

/// command completed successfully / condition passed
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// the condition was evaluated and did not hold
pub const EVALUATED_FALSE: i32 = 2;

/// operator string could not be decoded
pub const UNKNOWN_OPERATOR: i32 = 3;

/// invalid command-line arguments, rule arguments or input
pub const INVALID_ARGS: i32 = 4;

/// configuration file error
pub const CONFIG_ERROR: i32 = 5;

/// exit code for an evaluation outcome
pub fn for_outcome(passed: bool) -> i32 {
    if passed {
        SUCCESS
    } else {
        EVALUATED_FALSE
    }
}
