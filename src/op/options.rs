//! typed view over the string-keyed options object passed to word operators
//!
//! only `threshold` and `method` are interpreted here; every other key is kept
//! so custom scorers can read their own settings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::score::ALGO_DEFAULT;

/// lower bound applied to every threshold
pub const MIN_THRESHOLD: f64 = 1e-6;
/// upper bound applied to every threshold
pub const MAX_THRESHOLD: f64 = 1.0;

pub const KEY_THRESHOLD: &str = "threshold";
pub const KEY_METHOD: &str = "method";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Map<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.set(KEY_THRESHOLD, Value::from(threshold));
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.set(KEY_METHOD, Value::String(method.into()));
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// read a key as a float; numeric strings and booleans are converted
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// read a key as a string; numbers and booleans are rendered
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// configured threshold clamped into `[1e-6, 1.0]`; missing reads as 0
    pub fn threshold(&self) -> f64 {
        clamp_threshold(self.get_f64(KEY_THRESHOLD).unwrap_or(0.0))
    }

    /// scorer name, `"default"` when unset or empty
    pub fn method(&self) -> String {
        match self.get_str(KEY_METHOD) {
            Some(m) if !m.is_empty() => m,
            _ => ALGO_DEFAULT.to_string(),
        }
    }

    /// layer `self` over `defaults`: keys set here win
    pub fn merged_over(&self, defaults: &Options) -> Options {
        let mut merged = defaults.0.clone();
        for (key, value) in &self.0 {
            merged.insert(key.clone(), value.clone());
        }
        Options(merged)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Options {
    fn from(map: Map<String, Value>) -> Self {
        Options(map)
    }
}

/// clamp into `[MIN_THRESHOLD, MAX_THRESHOLD]`; NaN becomes the minimum
pub fn clamp_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        return MIN_THRESHOLD;
    }
    threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD)
}
