//! named rules: one operator bound to its arguments and options
//!
//! a rule is read from configuration as
//! `{ "op": "word/one", "args": ["refund"], "options": { "threshold": 0.8 } }`,
//! checked once when loaded (operator decoded, arguments converted, patterns
//! compiled) and then evaluated against string input as often as needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::op::{
    BoolOp, Family, HasOp, NumOp, NumOutcome, OpCodec, Operator, OperatorError, Options,
    ScorerRegistry, TimeOp, WordOp,
};

/// option key switching has rules to exact matching
pub const KEY_STRICT: &str = "strict";
/// option key making has rules split their input on commas
pub const KEY_LIST: &str = "list";

/// serialized form of a rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    /// canonical operator string
    pub op: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,

    #[serde(default, skip_serializing_if = "Options::is_empty")]
    pub options: Options,
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("invalid argument {index}: {reason}")]
    InvalidArgument { index: usize, reason: String },

    #[error("invalid input '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    #[error("invalid option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    #[error(transparent)]
    Operator(#[from] OperatorError),
}

/// outcome of evaluating a rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub passed: bool,

    /// computed value of arithmetic rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// the argument that decided the outcome, when there is one
    pub detail: String,

    /// [min, max] similarity of word rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<[f64; 2]>,
}

impl Verdict {
    fn flag(passed: bool) -> Self {
        Self {
            passed,
            value: None,
            detail: String::new(),
            scores: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Args {
    Bool(Vec<bool>),
    Num(Vec<f64>),
    Time(Vec<i64>),
    Text(Vec<String>),
}

/// a validated rule ready for evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    op: Operator,
    args: Args,
    options: Options,
}

impl Rule {
    /// decode and validate a serialized rule; `defaults` fill options the rule leaves unset
    pub fn from_def(def: &RuleDef, defaults: &Options) -> Result<Self, RuleError> {
        let op = Operator::parse(&def.op).ok_or_else(|| RuleError::UnknownOperator(def.op.clone()))?;
        Self::new(op, &def.args, def.options.merged_over(defaults))
    }

    /// bind an already decoded operator to raw arguments
    pub fn new(op: Operator, args: &[Value], options: Options) -> Result<Self, RuleError> {
        if op.is_unknown() {
            return Err(RuleError::UnknownOperator(op.encode()));
        }

        let args = match op {
            Operator::Bool(_) => Args::Bool(convert(args, as_bool)?),
            Operator::Num(_) => Args::Num(convert(args, as_f64)?),
            Operator::Time(_) => Args::Time(convert(args, as_millis)?),
            Operator::Has(_) => Args::Text(convert(args, as_text)?),
            Operator::Word(word) => Args::Text(word_keys(word, convert(args, as_text)?)),
        };
        let rule = Self { op, args, options };
        rule.check()?;
        Ok(rule)
    }

    pub fn operator(&self) -> Operator {
        self.op
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    // surface arity, range, division and pattern problems at load time
    // rather than on first evaluation
    fn check(&self) -> Result<(), RuleError> {
        match (&self.op, &self.args) {
            (Operator::Num(op), Args::Num(args)) => {
                op.accept(0.0, args)?;
            }
            (Operator::Time(op), Args::Time(args)) => {
                op.accept_millis(0, args)?;
            }
            (Operator::Word(op), Args::Text(keys)) => op.validate(keys, &self.options)?,
            (Operator::Has(_), _) if self.flag_option(KEY_LIST) && self.flag_option(KEY_STRICT) => {
                return Err(RuleError::InvalidOption {
                    key: KEY_STRICT.to_string(),
                    reason: format!("cannot be combined with '{}'", KEY_LIST),
                });
            }
            _ => {}
        }
        Ok(())
    }

    /// evaluate against the process-wide scorer registry
    pub fn evaluate(&self, input: &str) -> Result<Verdict, RuleError> {
        self.evaluate_with(ScorerRegistry::global(), input)
    }

    /// evaluate `input`, parsed according to the operator family
    pub fn evaluate_with(&self, registry: &ScorerRegistry, input: &str) -> Result<Verdict, RuleError> {
        match (&self.op, &self.args) {
            (Operator::Bool(op), Args::Bool(args)) => eval_bool(*op, input, args),
            (Operator::Num(op), Args::Num(args)) => {
                let src = parse_input(input, |s| as_f64(&Value::String(s.to_string())))?;
                Ok(match op.accept(src, args)? {
                    NumOutcome::Bool(passed) => Verdict::flag(passed),
                    NumOutcome::Value(value) => Verdict {
                        value: Some(value),
                        ..Verdict::flag(true)
                    },
                })
            }
            (Operator::Time(op), Args::Time(args)) => {
                let src = parse_input(input, parse_time)?;
                Ok(Verdict::flag(op.accept_millis(src, args)?))
            }
            (Operator::Has(op), Args::Text(opts)) => self.eval_has(*op, input, opts),
            (Operator::Word(op), Args::Text(keys)) => {
                let found = op.accept_with(registry, input, keys, &self.options)?;
                // all/none fail on their weakest key, everything else passes on its best
                let detail = match op {
                    WordOp::All | WordOp::None => found.least_hit(),
                    _ => found.best_hit(),
                };
                Ok(Verdict {
                    passed: found.passed,
                    value: None,
                    detail: detail.to_string(),
                    scores: found.is_scored().then_some(found.scores),
                })
            }
            _ => Err(OperatorError::unsupported(self.op).into()),
        }
    }

    fn eval_has(&self, op: HasOp, input: &str, opts: &[String]) -> Result<Verdict, RuleError> {
        let strict = self.flag_option(KEY_STRICT);
        let (passed, detail) = if self.flag_option(KEY_LIST) {
            let values: Vec<String> = split_list(input).map(str::to_string).collect();
            op.accept_arr(&values, opts)?
        } else if strict {
            op.accept_strict(input, opts)?
        } else {
            op.accept(input, opts)?
        };
        Ok(Verdict {
            detail,
            ..Verdict::flag(passed)
        })
    }

    fn flag_option(&self, key: &str) -> bool {
        self.options.get(key).map(truthy).unwrap_or(false)
    }
}

// empty and any only look at the text, but a keyword must exist for it to be scored
fn word_keys(op: WordOp, mut keys: Vec<String>) -> Vec<String> {
    if keys.is_empty() && matches!(op, WordOp::Empty | WordOp::Any) {
        keys.push(String::new());
    }
    keys
}

fn eval_bool(op: BoolOp, input: &str, args: &[bool]) -> Result<Verdict, RuleError> {
    let mut operands = Vec::new();
    for item in split_list(input) {
        operands.push(parse_input(item, |s| as_bool(&Value::String(s.to_string())))?);
    }
    operands.extend_from_slice(args);
    Ok(Verdict::flag(op.accept(&operands)?))
}

fn split_list(input: &str) -> impl Iterator<Item = &str> {
    input.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_input<T>(input: &str, parse: impl Fn(&str) -> Result<T, String>) -> Result<T, RuleError> {
    parse(input.trim()).map_err(|reason| RuleError::InvalidInput {
        input: input.to_string(),
        reason,
    })
}

fn convert<T>(args: &[Value], f: impl Fn(&Value) -> Result<T, String>) -> Result<Vec<T>, RuleError> {
    args.iter()
        .enumerate()
        .map(|(index, value)| f(value).map_err(|reason| RuleError::InvalidArgument { index, reason }))
        .collect()
}

// ============================================================================
// value conversions
// ============================================================================

fn as_f64(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{} is not a finite number", n)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "nan" => Ok(f64::NAN),
            "inf" | "+inf" | "infinity" => Ok(f64::INFINITY),
            "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
            other => other.parse().map_err(|_| format!("'{}' is not a number", s)),
        },
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(format!("expected a number, got {}", other)),
    }
}

fn as_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().map(|f| f != 0.0).unwrap_or(false)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(format!("'{}' is not a boolean", s)),
        },
        other => Err(format!("expected a boolean, got {}", other)),
    }
}

fn as_millis(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("{} is not an integer millisecond timestamp", n)),
        Value::String(s) => parse_time(s),
        other => Err(format!("expected a timestamp, got {}", other)),
    }
}

fn as_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected a string, got {}", other)),
    }
}

fn truthy(value: &Value) -> bool {
    as_bool(value).unwrap_or(false)
}

/// RFC 3339 timestamp, integer epoch milliseconds, or `now`
pub fn parse_time(text: &str) -> Result<i64, String> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("now") {
        return Ok(Utc::now().timestamp_millis());
    }
    if let Ok(millis) = text.parse::<i64>() {
        return Ok(millis);
    }
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| format!("'{}' is not an RFC 3339 timestamp or epoch millis: {}", text, e))
}

/// decode an operator of a known family from a symbol or canonical string
pub fn decode_in_family(family: Family, text: &str) -> Option<Operator> {
    let op = match family {
        Family::Bool => Operator::Bool(BoolOp::decode(text)),
        Family::Num => Operator::Num(NumOp::decode(text)),
        Family::Time => Operator::Time(TimeOp::decode(text)),
        Family::Has => Operator::Has(HasOp::decode(text)),
        Family::Word => Operator::Word(WordOp::decode(text)),
    };
    (!op.is_unknown()).then_some(op)
}
