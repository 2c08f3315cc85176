use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde_json::Value;

use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::op::score::{clamp_score, compile_pattern, ALGO_REG};
use crate::op::{Family, OpCodec, Operator, Options, PreparedText, ScorerRegistry};
use crate::rule::{self, Rule, Verdict, KEY_STRICT};

use super::exit_codes;
use super::output::{
    self, format_score, EvalData, FamilyData, MethodsData, OutputMode, ScoreData,
};
use super::CliError;

#[derive(Parser)]
#[command(name = "ruleop")]
#[command(about = "Evaluate boolean, numeric, time, membership and fuzzy text conditions")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides RULEOP_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output; the exit code carries the result (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match text against keywords (empty, any, ==, !=, include, exclude, one, none, all)
    Word {
        /// Operator symbol or canonical form (e.g. "one" or "word/one")
        op: String,

        /// Text to evaluate
        text: String,

        /// Keyword to match against (repeatable)
        #[arg(short, long = "key", action = clap::ArgAction::Append)]
        keys: Vec<String>,

        /// Similarity method (default, reg, levenshtein, levenshtein-window)
        #[arg(short, long)]
        method: Option<String>,

        /// Minimum score a match must reach, clamped into [1e-6, 1]
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Compare or calculate numbers (==, <, [a,b], isNan, +, max, ...)
    Num {
        /// Operator symbol or canonical form (e.g. ">=" or "num/cmp/>=")
        op: String,

        /// Source value
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Operator arguments
        #[arg(allow_hyphen_values = true, num_args = 0..)]
        args: Vec<String>,
    },

    /// Compare timestamps (<, <=, >, >=, [a,b], [a,b), (a,b], (a,b))
    Time {
        /// Operator symbol or canonical form (e.g. "[a,b)" or "time/[a,b)")
        op: String,

        /// Source time: RFC 3339, epoch milliseconds or "now"
        value: String,

        /// Bounds: RFC 3339, epoch milliseconds or "now"
        #[arg(num_args = 1..)]
        args: Vec<String>,
    },

    /// Check set membership (none, any, one, all)
    Has {
        /// Operator symbol or canonical form (e.g. "one" or "has/one")
        op: String,

        /// Value(s) to look up; more than one checks the list as a whole
        #[arg(required = true)]
        values: Vec<String>,

        /// Option to match against (repeatable)
        #[arg(short, long = "option", action = clap::ArgAction::Append)]
        options: Vec<String>,

        /// Require exact equality instead of substring matching (single value only)
        #[arg(long)]
        strict: bool,
    },

    /// Combine booleans (and, or, not)
    Bool {
        /// Operator symbol or canonical form (e.g. "and" or "bool/and")
        op: String,

        /// Operands: true/false, yes/no, 1/0, on/off
        values: Vec<String>,
    },

    /// Score text against a single keyword with a similarity method
    Score {
        /// Text to score
        text: String,

        /// Keyword
        key: String,

        /// Similarity method (default, reg, levenshtein, levenshtein-window)
        #[arg(short, long)]
        method: Option<String>,

        /// Threshold used for window sizing and the pass flag
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// List operators by family
    Ops {
        /// Only list this family
        #[arg(long, value_enum)]
        family: Option<FamilyArg>,
    },

    /// List registered similarity methods
    Methods,

    /// Evaluate a named rule from the config file
    Check {
        /// Rule name
        rule: String,

        /// Input value
        #[arg(allow_hyphen_values = true)]
        input: String,

        /// Output format string with {field} placeholders (e.g. "{passed} {detail}")
        #[arg(long)]
        format: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Validate the configuration file
    Verify,
    /// Write a starter configuration with example rules
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (settings.method or settings.threshold)
        key: String,
        /// Value to set
        value: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FamilyArg {
    Bool,
    Num,
    Time,
    Has,
    Word,
}

impl From<FamilyArg> for Family {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Bool => Family::Bool,
            FamilyArg::Num => Family::Num,
            FamilyArg::Time => Family::Time,
            FamilyArg::Has => Family::Has,
            FamilyArg::Word => Family::Word,
        }
    }
}

pub fn execute(cli: Cli, output_mode: OutputMode) -> Result<i32> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Word {
            op,
            text,
            keys,
            method,
            threshold,
        } => {
            let config = load_config(config_path)?;
            let mut overrides = Options::new();
            if let Some(method) = method {
                overrides = overrides.with_method(method);
            }
            if let Some(threshold) = threshold {
                overrides = overrides.with_threshold(threshold);
            }
            let options = overrides.merged_over(&config.settings.options());

            let op = decode_op(Family::Word, &op)?;
            let args: Vec<Value> = keys.into_iter().map(Value::String).collect();
            let rule = Rule::new(op, &args, options)?;
            let verdict = rule.evaluate(&text)?;

            let data = eval_data(&rule, None, text, verdict);
            print_eval(output_mode, &data, None);
            Ok(exit_codes::for_outcome(data.passed))
        }

        Commands::Num { op, value, args } => {
            let op = decode_op(Family::Num, &op)?;
            evaluate_op(output_mode, op, &args, Options::new(), value)
        }

        Commands::Time { op, value, args } => {
            let op = decode_op(Family::Time, &op)?;
            evaluate_op(output_mode, op, &args, Options::new(), value)
        }

        Commands::Has {
            op,
            values,
            options,
            strict,
        } => {
            let operator = decode_op(Family::Has, &op)?;

            if let [value] = values.as_slice() {
                let mut rule_options = Options::new();
                if strict {
                    rule_options.set(KEY_STRICT, Value::Bool(true));
                }
                return evaluate_op(output_mode, operator, &options, rule_options, value.clone());
            }

            if strict {
                eprintln!("warning: --strict is ignored when checking a list of values");
            }
            let Operator::Has(has) = operator else {
                return Err(CliError::new(
                    exit_codes::UNKNOWN_OPERATOR,
                    format!("not a has operator: {}", op),
                )
                .into());
            };
            let (passed, detail) = has.accept_arr(&values, &options)?;
            let data = EvalData {
                op: has.encode(),
                rule: None,
                input: values.join(","),
                passed,
                value: None,
                detail,
                scores: None,
                method: None,
                threshold: None,
            };
            print_eval(output_mode, &data, None);
            Ok(exit_codes::for_outcome(passed))
        }

        Commands::Bool { op, values } => {
            let op = decode_op(Family::Bool, &op)?;
            evaluate_op(output_mode, op, &[], Options::new(), values.join(","))
        }

        Commands::Score {
            text,
            key,
            method,
            threshold,
        } => {
            let config = load_config(config_path)?;
            let mut options = config.settings.options();
            if let Some(method) = method {
                options = options.with_method(method);
            }
            if let Some(threshold) = threshold {
                options = options.with_threshold(threshold);
            }

            let method = options.method();
            if method == ALGO_REG {
                compile_pattern(&key)?;
            }
            let registry = ScorerRegistry::global();
            if !registry.contains(&method) {
                eprintln!("warning: unknown method '{}', using 'default'", method);
            }
            let scorer = registry.get(&method);
            let score = clamp_score(scorer(&PreparedText::new(&text), &key, &options));
            let threshold = options.threshold();

            let data = ScoreData {
                method,
                text,
                key,
                score,
                threshold,
                passed: score >= threshold,
            };
            match output_mode {
                OutputMode::Json => output::print_json(&data),
                OutputMode::Quiet => {}
                _ => println!("{}", format_score(data.score)),
            }
            Ok(exit_codes::for_outcome(data.passed))
        }

        Commands::Ops { family } => {
            let families: Vec<Family> = match family {
                Some(f) => vec![f.into()],
                None => Family::ALL.to_vec(),
            };
            let data: Vec<FamilyData> = families
                .into_iter()
                .map(|family| FamilyData {
                    family: family.to_string(),
                    operators: family.canonical_names(),
                })
                .collect();

            match output_mode {
                OutputMode::Json => output::print_json(&data),
                OutputMode::Quiet => {}
                _ => {
                    for entry in &data {
                        println!("{}:", entry.family);
                        for name in &entry.operators {
                            println!("  {}", name);
                        }
                    }
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Methods => {
            let data = MethodsData {
                methods: ScorerRegistry::global().names(),
            };
            match output_mode {
                OutputMode::Json => output::print_json(&data),
                OutputMode::Quiet => {}
                _ => {
                    for method in &data.methods {
                        println!("{}", method);
                    }
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Check {
            rule,
            input,
            format,
        } => {
            let config = load_config(config_path)?;
            if !config.rules.contains_key(&rule) {
                return Err(CliError::with_suggestions(
                    exit_codes::CONFIG_ERROR,
                    format!("rule '{}' not found", rule),
                    config.rules.keys().cloned().collect(),
                )
                .into());
            }

            let compiled = config::compile_rule(&config, &rule)?;
            let verdict = compiled.evaluate(&input)?;

            let data = eval_data(&compiled, Some(rule), input, verdict);
            let mode = if format.is_some() && !output_mode.is_quiet() {
                OutputMode::Format
            } else {
                output_mode
            };
            print_eval(mode, &data, format.as_deref());
            Ok(exit_codes::for_outcome(data.passed))
        }

        Commands::Config { command } => execute_config(command, config_path, output_mode),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ruleop", &mut std::io::stdout());
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn execute_config(
    command: ConfigCommands,
    config_path: Option<&Path>,
    output_mode: OutputMode,
) -> Result<i32> {
    let path = config::get_config_path(config_path);

    match command {
        ConfigCommands::Show => {
            let config = load_config(config_path)?;
            if output_mode.is_json() {
                output::print_json(&config);
            } else {
                let json =
                    serde_json::to_string_pretty(&config).context("failed to serialize config")?;
                println!("{}", json);
            }
            Ok(exit_codes::SUCCESS)
        }
        ConfigCommands::Path => {
            if output_mode.is_json() {
                output::print_json(&serde_json::json!({ "path": path }));
            } else {
                println!("{}", path.display());
            }
            Ok(exit_codes::SUCCESS)
        }
        ConfigCommands::Verify => {
            let errors = config::verify(&path)
                .map_err(|e| CliError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e)))?;

            if output_mode.is_json() {
                output::print_json(&serde_json::json!({
                    "path": path,
                    "valid": errors.is_empty(),
                    "errors": errors,
                }));
            } else if !output_mode.is_quiet() {
                if errors.is_empty() {
                    println!("✓ Configuration is valid: {}", path.display());
                } else {
                    println!(
                        "✗ Configuration has {} error(s): {}",
                        errors.len(),
                        path.display()
                    );
                    println!();
                    for error in &errors {
                        println!("  - {}", error);
                    }
                }
            }

            if errors.is_empty() {
                Ok(exit_codes::SUCCESS)
            } else {
                Ok(exit_codes::CONFIG_ERROR)
            }
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::new(
                    exit_codes::CONFIG_ERROR,
                    format!(
                        "config file already exists: {} (use --force to overwrite)",
                        path.display()
                    ),
                )
                .into());
            }
            config::save(&config::default_with_examples(), &path)?;
            if !output_mode.is_quiet() {
                println!("Wrote example configuration to {}", path.display());
            }
            Ok(exit_codes::SUCCESS)
        }
        ConfigCommands::Set { key, value } => {
            let mut config = load_config(config_path)?;
            config::set_value(&mut config, &key, &value)
                .map_err(|e| CliError::new(exit_codes::INVALID_ARGS, format!("{:#}", e)))?;
            config::save(&config, &path)?;
            if !output_mode.is_quiet() {
                println!("Set {} = {}", key, value);
            }
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    config::load(config_path)
        .map_err(|e| CliError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e)).into())
}

/// decode an operator of `family`, suggesting the closest names on failure
fn decode_op(family: Family, text: &str) -> Result<Operator> {
    rule::decode_in_family(family, text).ok_or_else(|| {
        CliError::with_suggestions(
            exit_codes::UNKNOWN_OPERATOR,
            format!("unknown {} operator '{}'", family, text),
            suggest(family, text),
        )
        .into()
    })
}

/// the three canonical names whose symbol is closest to `text`
fn suggest(family: Family, text: &str) -> Vec<String> {
    let family_prefix = format!("{}/", family);
    let needle = text.to_lowercase();
    let needle = needle.strip_prefix(&family_prefix).unwrap_or(&needle);

    let mut ranked: Vec<(usize, String)> = family
        .canonical_names()
        .into_iter()
        .map(|name| {
            let rest = name.strip_prefix(&family_prefix).unwrap_or(&name);
            let symbol = rest
                .strip_prefix("cmp/")
                .or_else(|| rest.strip_prefix("cal/"))
                .unwrap_or(rest);
            let distance = strsim::levenshtein(needle, &symbol.to_lowercase())
                .min(strsim::levenshtein(needle, &rest.to_lowercase()));
            (distance, name.clone())
        })
        .collect();
    ranked.sort_by_key(|(distance, _)| *distance);
    ranked.into_iter().take(3).map(|(_, name)| name).collect()
}

fn evaluate_op(
    output_mode: OutputMode,
    op: Operator,
    args: &[String],
    options: Options,
    input: String,
) -> Result<i32> {
    let args: Vec<Value> = args.iter().cloned().map(Value::String).collect();
    let rule = Rule::new(op, &args, options)?;
    let verdict = rule.evaluate(&input)?;

    let data = eval_data(&rule, None, input, verdict);
    print_eval(output_mode, &data, None);
    Ok(exit_codes::for_outcome(data.passed))
}

fn eval_data(rule: &Rule, name: Option<String>, input: String, verdict: Verdict) -> EvalData {
    let op = rule.operator();
    let (method, threshold) = match op {
        Operator::Word(_) => (
            Some(rule.options().method()),
            Some(rule.options().threshold()),
        ),
        _ => (None, None),
    };

    EvalData {
        op: op.encode(),
        rule: name,
        input,
        passed: verdict.passed,
        value: verdict.value,
        detail: verdict.detail,
        scores: verdict.scores,
        method,
        threshold,
    }
}

fn print_eval(output_mode: OutputMode, data: &EvalData, format: Option<&str>) {
    match output_mode {
        OutputMode::Json => output::print_json(data),
        OutputMode::Quiet => {}
        OutputMode::Format => {
            if let Some(template) = format {
                println!("{}", output::format_template(template, data));
            }
        }
        OutputMode::Text => {
            if let Some(value) = data.value {
                println!("{}", value);
                return;
            }
            let mark = if data.passed { "✓" } else { "✗" };
            let mut line = format!("{} {}", mark, data.op);
            if !data.detail.is_empty() {
                line.push_str(&format!(" ({})", data.detail));
            }
            if let Some([min, max]) = data.scores {
                line.push_str(&format!(
                    " scores {}..{}",
                    format_score(min),
                    format_score(max)
                ));
            }
            println!("{}", line);
        }
    }
}
