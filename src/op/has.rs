//! set membership operators over string values
//!
//! every accept method returns the pass flag plus a diagnostic hit: the option
//! (or value) that decided the outcome, or an empty string when none did.

use super::codec::OpCodec;
use super::error::OperatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HasOp {
    /// value matches none of the options
    None,
    /// value is present (non-empty)
    Any,
    /// value matches one of the options
    One,
    /// value matches every option
    All,
    Unknown,
}

const HAS_OPS: [HasOp; 4] = [HasOp::None, HasOp::Any, HasOp::One, HasOp::All];

impl OpCodec for HasOp {
    const FAMILY: &'static str = "has";
    const UNKNOWN: Self = HasOp::Unknown;

    fn all() -> &'static [Self] {
        &HAS_OPS
    }

    fn symbol(&self) -> &'static str {
        match self {
            HasOp::None => "none",
            HasOp::Any => "any",
            HasOp::One => "one",
            HasOp::All => "all",
            HasOp::Unknown => "",
        }
    }
}

impl std::fmt::Display for HasOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl HasOp {
    /// loose matching: `val` is looked up as a substring of the options,
    /// and for `All` every option must be a substring of `val`
    ///
    /// an empty `val` is absent and never found in an option
    pub fn accept(&self, val: &str, opts: &[String]) -> Result<(bool, String), OperatorError> {
        self.accept_by(val, opts, contains_probe, |val, opt| val.contains(opt))
    }

    /// strict matching: exact equality everywhere
    pub fn accept_strict(
        &self,
        val: &str,
        opts: &[String],
    ) -> Result<(bool, String), OperatorError> {
        self.accept_by(val, opts, |val, opt| val == opt, |val, opt| val == opt)
    }

    fn accept_by(
        &self,
        val: &str,
        opts: &[String],
        one: impl Fn(&str, &str) -> bool,
        all: impl Fn(&str, &str) -> bool,
    ) -> Result<(bool, String), OperatorError> {
        match self {
            HasOp::Any => Ok((!val.is_empty(), val.to_string())),
            HasOp::One | HasOp::None => {
                let hit = opts.iter().find(|opt| one(val, opt));
                let found = hit.is_some();
                let hit = hit.cloned().unwrap_or_default();
                Ok((found == (*self == HasOp::One), hit))
            }
            HasOp::All => {
                let mut last = String::new();
                for opt in opts {
                    if !all(val, opt) {
                        return Ok((false, opt.clone()));
                    }
                    last.clone_from(opt);
                }
                Ok((true, last))
            }
            HasOp::Unknown => Err(OperatorError::unsupported(self)),
        }
    }

    /// evaluate a list of probe values against a de-duplicated option set
    pub fn accept_arr(
        &self,
        values: &[String],
        opts: &[String],
    ) -> Result<(bool, String), OperatorError> {
        let opts = dedup(opts);

        match self {
            HasOp::Any => Ok((
                !values.is_empty(),
                values.first().cloned().unwrap_or_default(),
            )),
            HasOp::One | HasOp::None => {
                let hit = values
                    .iter()
                    .find_map(|val| opts.iter().find(|opt| contains_probe(val, opt)));
                let found = hit.is_some();
                let hit = hit.map(|opt| opt.to_string()).unwrap_or_default();
                Ok((found == (*self == HasOp::One), hit))
            }
            HasOp::All => {
                for opt in &opts {
                    if !values.iter().any(|val| val.contains(*opt)) {
                        return Ok((false, opt.to_string()));
                    }
                }
                Ok((true, String::new()))
            }
            HasOp::Unknown => Err(OperatorError::unsupported(self)),
        }
    }
}

fn contains_probe(val: &str, opt: &str) -> bool {
    !val.is_empty() && opt.contains(val)
}

fn dedup(opts: &[String]) -> Vec<&str> {
    let mut seen = Vec::with_capacity(opts.len());
    for opt in opts {
        if !seen.contains(&opt.as_str()) {
            seen.push(opt.as_str());
        }
    }
    seen
}
