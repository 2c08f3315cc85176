mod schema;

pub use schema::{Config, Settings};

use anyhow::{anyhow, Context, Result};
use serde_json::json;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::op::{Options, ScorerRegistry};
use crate::rule::{Rule, RuleDef};

const CONFIG_ENV_VAR: &str = "RULEOP_CONFIG";

/// resolve the config file: explicit path, then `RULEOP_CONFIG`, then `~/.ruleop/config.json`
pub fn get_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return expand(&path.to_string_lossy());
    }

    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return expand(&path);
        }
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ruleop")
        .join("config.json")
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).to_string())
}

/// load the config at `path`; a missing file yields the defaults
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    parse(&content).with_context(|| format!("failed to parse config file: {}", path.display()))
}

pub fn load(explicit: Option<&Path>) -> Result<Config> {
    load_from(&get_config_path(explicit))
}

/// parse config text; JSON5 comments and trailing commas are accepted
pub fn parse(content: &str) -> Result<Config> {
    json5::from_str(content).map_err(|e| anyhow!("invalid config: {}", e))
}

pub fn save(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }

    let content = serde_json::to_string_pretty(config).context("failed to serialize config")?;

    fs::write(path, content)
        .with_context(|| format!("failed to write config file: {}", path.display()))?;

    Ok(())
}

/// build a named rule with the config's settings as option defaults
pub fn compile_rule(config: &Config, name: &str) -> Result<Rule> {
    let def = config.rules.get(name).ok_or_else(|| {
        let known: Vec<&str> = config.rules.keys().map(String::as_str).collect();
        if known.is_empty() {
            anyhow!("rule '{}' not found (no rules configured)", name)
        } else {
            anyhow!("rule '{}' not found; available: {}", name, known.join(", "))
        }
    })?;

    Rule::from_def(def, &config.settings.options())
        .with_context(|| format!("rule '{}' is invalid", name))
}

/// verify a config file and return a list of problems
pub fn verify(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config = parse(&content)?;
    Ok(verify_config(&config, ScorerRegistry::global()))
}

pub fn verify_config(config: &Config, registry: &ScorerRegistry) -> Vec<String> {
    let mut errors = Vec::new();

    if let Err(e) = validate_method(&config.settings.method, registry) {
        errors.push(format!("settings.method: {}", e));
    }
    if let Some(threshold) = config.settings.threshold {
        if let Err(e) = validate_threshold(threshold) {
            errors.push(format!("settings.threshold: {}", e));
        }
    }

    let defaults = config.settings.options();
    for (name, def) in &config.rules {
        let prefix = format!("rules.{}", name);

        if let Err(e) = Rule::from_def(def, &defaults) {
            errors.push(format!("{}: {}", prefix, e));
        }

        errors.extend(
            validate_rule_options(&def.options, registry)
                .into_iter()
                .map(|e| format!("{}.options.{}", prefix, e)),
        );
    }

    errors
}

fn validate_rule_options(options: &Options, registry: &ScorerRegistry) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(method) = options.get_str("method") {
        if let Err(e) = validate_method(&method, registry) {
            errors.push(format!("method: {}", e));
        }
    }
    if options.get("threshold").is_some() {
        match options.get_f64("threshold") {
            Some(threshold) => {
                if let Err(e) = validate_threshold(threshold) {
                    errors.push(format!("threshold: {}", e));
                }
            }
            None => errors.push("threshold: not a number".to_string()),
        }
    }

    errors
}

fn validate_method(method: &str, registry: &ScorerRegistry) -> Result<(), String> {
    if method.is_empty() || registry.contains(method) {
        return Ok(());
    }
    Err(format!(
        "unknown method '{}' (falls back to 'default'); available: {}",
        method,
        registry.names().join(", ")
    ))
}

fn validate_threshold(threshold: f64) -> Result<(), String> {
    if threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(format!("{} is outside (0, 1]", threshold))
    }
}

pub fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["settings", "method"] => {
            config.settings.method = value.trim().to_string();
        }
        ["settings", "threshold"] => {
            config.settings.threshold = match value.trim().to_lowercase().as_str() {
                "" | "none" | "unset" => None,
                other => {
                    let threshold: f64 = other
                        .parse()
                        .with_context(|| format!("invalid number: {}", value))?;
                    validate_threshold(threshold).map_err(|e| anyhow!("invalid threshold: {}", e))?;
                    Some(threshold)
                }
            };
        }
        _ => {
            return Err(anyhow!(
                "unknown config key: {}. Valid keys: settings.method, settings.threshold",
                key
            ));
        }
    }

    Ok(())
}

/// default config written by `ruleop config init`
pub fn default_with_examples() -> Config {
    let rule = |value: serde_json::Value| -> RuleDef {
        serde_json::from_value(value).unwrap_or_default()
    };

    let mut config = Config::default();
    config.settings.threshold = Some(0.8);
    config.rules.insert(
        "cancel-intent".to_string(),
        rule(json!({
            "op": "word/one",
            "args": ["cancel", "unsubscribe", "refund"],
            "options": { "method": "levenshtein-window" }
        })),
    );
    config.rules.insert(
        "no-profanity".to_string(),
        rule(json!({
            "op": "word/none",
            "args": ["(?i)darn", "(?i)heck"],
            "options": { "method": "reg", "threshold": 1.0 }
        })),
    );
    config.rules.insert(
        "adult".to_string(),
        rule(json!({ "op": "num/cmp/>=", "args": [18] })),
    );
    config.rules.insert(
        "business-hours".to_string(),
        rule(json!({
            "op": "time/[a,b)",
            "args": ["2024-01-01T09:00:00Z", "2024-01-01T17:00:00Z"]
        })),
    );
    config.rules.insert(
        "supported-locale".to_string(),
        rule(json!({
            "op": "has/one",
            "args": ["en", "de", "fr"],
            "options": { "strict": true }
        })),
    );
    config
}
