use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::op::score::ALGO_DEFAULT;
use crate::op::Options;
use crate::rule::RuleDef;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    /// named rules, evaluated with `ruleop check <name> <input>`
    #[serde(default)]
    pub rules: BTreeMap<String, RuleDef>,
}

/// defaults applied to every rule that leaves the option unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

fn default_method() -> String {
    ALGO_DEFAULT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            method: default_method(),
            threshold: None,
        }
    }
}

impl Settings {
    /// settings as the options layer rules are merged over
    pub fn options(&self) -> Options {
        let mut options = Options::new().with_method(self.method.clone());
        if let Some(threshold) = self.threshold {
            options = options.with_threshold(threshold);
        }
        options
    }
}
