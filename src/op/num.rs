//! numeric comparison and arithmetic operators

use std::fmt;

use super::codec::{decode_in, OpCodec};
use super::error::OperatorError;

/// equality tolerance: the smallest positive subnormal f64
pub const EPSILON: f64 = 4.94065645841247e-324;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumOp {
    /// ==
    Eq,
    /// !=
    Ne,
    /// <
    Lt,
    /// <=
    Le,
    /// >
    Gt,
    /// >=
    Ge,
    /// [a,b] both bounds included
    In,
    /// [a,b) left bound included
    InL,
    /// (a,b] right bound included
    InR,
    /// (a,b) no bound included
    InN,
    IsNan,
    IsInf,
    IsNegInf,
    /// = (assignment)
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Max,
    Min,
    Unknown,
}

const CMP_OPS: [NumOp; 13] = [
    NumOp::Eq,
    NumOp::Ne,
    NumOp::Lt,
    NumOp::In,
    NumOp::InL,
    NumOp::InR,
    NumOp::InN,
    NumOp::Le,
    NumOp::Gt,
    NumOp::Ge,
    NumOp::IsNan,
    NumOp::IsInf,
    NumOp::IsNegInf,
];

const CAL_OPS: [NumOp; 7] = [
    NumOp::Set,
    NumOp::Sub,
    NumOp::Add,
    NumOp::Div,
    NumOp::Mul,
    NumOp::Max,
    NumOp::Min,
];

const NUM_OPS: [NumOp; 20] = [
    NumOp::Eq,
    NumOp::Ne,
    NumOp::Lt,
    NumOp::In,
    NumOp::InL,
    NumOp::InR,
    NumOp::InN,
    NumOp::Le,
    NumOp::Gt,
    NumOp::Ge,
    NumOp::IsNan,
    NumOp::IsInf,
    NumOp::IsNegInf,
    NumOp::Set,
    NumOp::Sub,
    NumOp::Add,
    NumOp::Div,
    NumOp::Mul,
    NumOp::Max,
    NumOp::Min,
];

/// result of a numeric operator: comparisons yield a flag, arithmetic a value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumOutcome {
    Bool(bool),
    Value(f64),
}

impl NumOutcome {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NumOutcome::Bool(b) => Some(*b),
            NumOutcome::Value(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumOutcome::Value(v) => Some(*v),
            NumOutcome::Bool(_) => None,
        }
    }
}

impl OpCodec for NumOp {
    const FAMILY: &'static str = "num";
    const UNKNOWN: Self = NumOp::Unknown;

    fn all() -> &'static [Self] {
        &NUM_OPS
    }

    fn symbol(&self) -> &'static str {
        match self {
            NumOp::Eq => "==",
            NumOp::Ne => "!=",
            NumOp::Lt => "<",
            NumOp::Le => "<=",
            NumOp::Gt => ">",
            NumOp::Ge => ">=",
            NumOp::In => "[a,b]",
            NumOp::InL => "[a,b)",
            NumOp::InR => "(a,b]",
            NumOp::InN => "(a,b)",
            NumOp::IsNan => "isNan",
            NumOp::IsInf => "isInf",
            NumOp::IsNegInf => "negInf",
            NumOp::Set => "=",
            NumOp::Add => "+",
            NumOp::Sub => "-",
            NumOp::Mul => "*",
            NumOp::Div => "/",
            NumOp::Max => "max",
            NumOp::Min => "min",
            NumOp::Unknown => "",
        }
    }

    fn encode(&self) -> String {
        if self.is_unknown() {
            return String::new();
        }
        format!("{}/{}/{}", Self::FAMILY, self.kind(), self.symbol())
    }

    /// accepts "num/cmp/==", "cmp/==", "num/cal/+" or a bare symbol
    fn decode(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let full = if lowered.starts_with("num/") {
            lowered
        } else if lowered.starts_with("cmp/") || lowered.starts_with("cal/") {
            format!("num/{}", lowered)
        } else {
            return Self::from_symbol(text);
        };
        decode_in(&NUM_OPS, "", &full)
    }
}

impl fmt::Display for NumOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl NumOp {
    /// decode a comparison operator ("==" or "num/cmp/==")
    pub fn decode_cmp(text: &str) -> Self {
        decode_in(&CMP_OPS, "num/cmp/", text)
    }

    /// decode an arithmetic operator ("+" or "num/cal/+")
    pub fn decode_cal(text: &str) -> Self {
        decode_in(&CAL_OPS, "num/cal/", text)
    }

    /// look up a bare symbol across both kinds
    pub fn from_symbol(symbol: &str) -> Self {
        NUM_OPS
            .iter()
            .copied()
            .find(|op| op.symbol().eq_ignore_ascii_case(symbol))
            .unwrap_or(NumOp::Unknown)
    }

    /// sub-kind used in the canonical form: "cmp", "cal" or "unknown"
    pub fn kind(&self) -> &'static str {
        if self.is_cmp() {
            "cmp"
        } else if self.is_cal() {
            "cal"
        } else {
            "unknown"
        }
    }

    pub fn is_cmp(&self) -> bool {
        CMP_OPS.contains(self)
    }

    pub fn is_cal(&self) -> bool {
        CAL_OPS.contains(self)
    }

    /// apply the operator: comparisons return a flag, arithmetic the folded value
    pub fn accept(&self, src: f64, args: &[f64]) -> Result<NumOutcome, OperatorError> {
        if self.is_cal() {
            self.calculate(src, args).map(NumOutcome::Value)
        } else {
            self.compare(src, args).map(NumOutcome::Bool)
        }
    }

    /// evaluate a comparison variant
    pub fn compare(&self, src: f64, args: &[f64]) -> Result<bool, OperatorError> {
        match self {
            NumOp::IsNan => Ok(src.is_nan()),
            NumOp::IsInf => Ok(src.is_infinite()),
            NumOp::IsNegInf => Ok(src == f64::NEG_INFINITY),
            NumOp::Eq | NumOp::Ne | NumOp::Lt | NumOp::Le | NumOp::Gt | NumOp::Ge => {
                let other = *args
                    .first()
                    .ok_or_else(|| OperatorError::arity(self, 1, 0))?;
                Ok(self.compare_pair(src, other))
            }
            NumOp::In | NumOp::InL | NumOp::InR | NumOp::InN => {
                let (min, max) = match args {
                    [min, max] => (*min, *max),
                    _ => return Err(OperatorError::arity(self, 2, args.len())),
                };
                if min > max {
                    return Err(OperatorError::InvalidRange {
                        min: min.to_string(),
                        max: max.to_string(),
                    });
                }
                Ok(in_range(*self, src, min, max))
            }
            NumOp::Set
            | NumOp::Add
            | NumOp::Sub
            | NumOp::Mul
            | NumOp::Div
            | NumOp::Max
            | NumOp::Min
            | NumOp::Unknown => Err(OperatorError::unsupported(self)),
        }
    }

    fn compare_pair(&self, a: f64, b: f64) -> bool {
        match self {
            NumOp::Eq => approx_eq(a, b),
            NumOp::Ne => !approx_eq(a, b),
            NumOp::Lt => a < b,
            NumOp::Le => a <= b,
            NumOp::Gt => a > b,
            NumOp::Ge => a >= b,
            _ => false,
        }
    }

    /// fold `src` left-to-right over `args` with an arithmetic variant
    pub fn calculate(&self, src: f64, args: &[f64]) -> Result<f64, OperatorError> {
        if !self.is_cal() {
            return Err(OperatorError::unsupported(self));
        }

        let mut res = src;
        for (index, &arg) in args.iter().enumerate() {
            res = match self {
                NumOp::Set => arg,
                NumOp::Add => res + arg,
                NumOp::Sub => res - arg,
                NumOp::Mul => res * arg,
                NumOp::Div => {
                    if arg == 0.0 {
                        return Err(OperatorError::DivisionByZero { index });
                    }
                    res / arg
                }
                NumOp::Max => res.max(arg),
                NumOp::Min => res.min(arg),
                _ => return Err(OperatorError::unsupported(self)),
            };
        }
        Ok(res)
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= EPSILON
}

/// shared by the numeric and time range checks
pub(crate) fn in_range<T: PartialOrd>(op: impl Into<RangeKind>, src: T, min: T, max: T) -> bool {
    match op.into() {
        RangeKind::Closed => src >= min && src <= max,
        RangeKind::LeftClosed => src >= min && src < max,
        RangeKind::RightClosed => src > min && src <= max,
        RangeKind::Open => src > min && src < max,
    }
}

/// boundary inclusion of a range operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RangeKind {
    Closed,
    LeftClosed,
    RightClosed,
    Open,
}

impl From<NumOp> for RangeKind {
    fn from(op: NumOp) -> Self {
        match op {
            NumOp::InL => RangeKind::LeftClosed,
            NumOp::InR => RangeKind::RightClosed,
            NumOp::InN => RangeKind::Open,
            _ => RangeKind::Closed,
        }
    }
}
