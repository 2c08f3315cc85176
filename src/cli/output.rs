//! output formatting for scriptable CLI output
//!
//! uses JSON-RPC 2.0 format for machine-readable output:
//! - success: {"jsonrpc": "2.0", "result": {...}, "id": null}
//! - error: {"jsonrpc": "2.0", "error": {"code": N, "message": "...", "data": {...}}, "id": null}
//!
//! also provides format string templating for scripting (`--format "{passed} {detail}"`)

use serde::Serialize;
use std::io::IsTerminal;

const JSONRPC_VERSION: &str = "2.0";

/// output mode determines how results are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// human-readable text output
    Text,
    /// machine-readable JSON-RPC 2.0 output
    Json,
    /// no output; the exit code carries the result
    Quiet,
    /// custom format string with {field} placeholders
    Format,
}

impl OutputMode {
    /// determine output mode from CLI flags and environment
    ///
    /// priority: quiet > format > json > no_json > auto-detect
    pub fn from_flags(json: bool, no_json: bool, quiet: bool, format: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        if format {
            return Self::Format;
        }
        if json {
            return Self::Json;
        }
        if no_json {
            return Self::Text;
        }
        // auto-detect: JSON when stdout is not a TTY (piped)
        if !std::io::stdout().is_terminal() {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }
}

/// JSON-RPC 2.0 success response
#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// null for CLI responses (no request id)
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

/// JSON-RPC 2.0 error response
#[derive(Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub error: RpcError,
    pub id: Option<String>,
}

#[derive(Serialize)]
pub struct RpcError {
    /// exit code offset by -32000 (application error range)
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

#[derive(Serialize)]
pub struct ErrorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self::with_suggestions(code, message, Vec::new())
    }

    pub fn with_suggestions(
        code: i32,
        message: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(code),
                message: message.into(),
                data: if suggestions.is_empty() {
                    None
                } else {
                    Some(ErrorData {
                        suggestions: Some(suggestions),
                    })
                },
            },
            id: None,
        }
    }
}

/// JSON-RPC reserves -32000 to -32099 for application errors
fn to_jsonrpc_code(exit_code: i32) -> i32 {
    -32000 - exit_code
}

// ============================================================================
// Result data structures
// ============================================================================

/// result of evaluating one operator or named rule
#[derive(Serialize)]
pub struct EvalData {
    /// canonical operator string
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    pub input: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

/// result of the score command
#[derive(Serialize)]
pub struct ScoreData {
    pub method: String,
    pub text: String,
    pub key: String,
    pub score: f64,
    pub threshold: f64,
    pub passed: bool,
}

/// operators of one family
#[derive(Serialize)]
pub struct FamilyData {
    pub family: String,
    pub operators: Vec<String>,
}

#[derive(Serialize)]
pub struct MethodsData {
    pub methods: Vec<String>,
}

// ============================================================================
// Output functions
// ============================================================================

/// format a string template with {field} placeholders
///
/// # example
/// ```ignore
/// let result = format_template("{passed} {detail}", &data);
/// assert_eq!(result, "true refund");
/// ```
pub fn format_template<T: Serialize>(template: &str, data: &T) -> String {
    let value = match serde_json::to_value(data) {
        Ok(v) => v,
        Err(_) => return template.to_string(),
    };

    let mut result = template.to_string();

    if let serde_json::Value::Object(map) = value {
        for (key, val) in map {
            let placeholder = format!("{{{}}}", key);
            let replacement = match val {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Array(arr) => arr
                    .iter()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
                serde_json::Value::Object(_) => val.to_string(),
            };
            result = result.replace(&placeholder, &replacement);
        }
    }

    result
}

/// print JSON-RPC success response to stdout
pub fn print_json<T: Serialize>(data: &T) {
    let response = JsonRpcResponse::new(data);
    if let Ok(json) = serde_json::to_string(&response) {
        println!("{}", json);
    }
}

/// print JSON-RPC error to stdout
pub fn print_json_error(code: i32, message: &str) {
    print_json_error_with_suggestions(code, message, Vec::new());
}

pub fn print_json_error_with_suggestions(code: i32, message: &str, suggestions: Vec<String>) {
    let error = JsonRpcError::with_suggestions(code, message, suggestions);
    if let Ok(json) = serde_json::to_string(&error) {
        println!("{}", json);
    }
}

/// render a score with two decimals, or "-" for the no-score sentinel
pub fn format_score(score: f64) -> String {
    if score < 0.0 {
        "-".to_string()
    } else {
        format!("{:.2}", score)
    }
}
