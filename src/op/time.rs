//! time comparison operators
//!
//! values are compared as millisecond unix timestamps, so time zones only
//! matter for display, never for ordering.

use chrono::{DateTime, TimeZone};

use super::codec::OpCodec;
use super::error::OperatorError;
use super::num::{in_range, RangeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOp {
    /// earlier than
    Lt,
    /// not later than
    Le,
    /// later than
    Gt,
    /// not earlier than
    Ge,
    /// [a,b]
    In,
    /// [a,b)
    InL,
    /// (a,b]
    InR,
    /// (a,b)
    InN,
    Unknown,
}

const TIME_OPS: [TimeOp; 8] = [
    TimeOp::Lt,
    TimeOp::Le,
    TimeOp::Ge,
    TimeOp::Gt,
    TimeOp::In,
    TimeOp::InL,
    TimeOp::InR,
    TimeOp::InN,
];

impl OpCodec for TimeOp {
    const FAMILY: &'static str = "time";
    const UNKNOWN: Self = TimeOp::Unknown;

    fn all() -> &'static [Self] {
        &TIME_OPS
    }

    fn symbol(&self) -> &'static str {
        match self {
            TimeOp::Lt => "<",
            TimeOp::Le => "<=",
            TimeOp::Gt => ">",
            TimeOp::Ge => ">=",
            TimeOp::In => "[a,b]",
            TimeOp::InL => "[a,b)",
            TimeOp::InR => "(a,b]",
            TimeOp::InN => "(a,b)",
            TimeOp::Unknown => "",
        }
    }
}

impl std::fmt::Display for TimeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl From<TimeOp> for RangeKind {
    fn from(op: TimeOp) -> Self {
        match op {
            TimeOp::InL => RangeKind::LeftClosed,
            TimeOp::InR => RangeKind::RightClosed,
            TimeOp::InN => RangeKind::Open,
            _ => RangeKind::Closed,
        }
    }
}

impl TimeOp {
    /// compare `src` against one bound (`<`, `<=`, `>`, `>=`) or two bounds (ranges)
    pub fn accept<Tz: TimeZone>(
        &self,
        src: &DateTime<Tz>,
        args: &[DateTime<Tz>],
    ) -> Result<bool, OperatorError> {
        let millis: Vec<i64> = args.iter().map(DateTime::timestamp_millis).collect();
        self.accept_millis(src.timestamp_millis(), &millis)
    }

    /// same as [`TimeOp::accept`] over millisecond unix timestamps
    pub fn accept_millis(&self, src: i64, args: &[i64]) -> Result<bool, OperatorError> {
        match self {
            TimeOp::Lt | TimeOp::Le | TimeOp::Gt | TimeOp::Ge => {
                let other = *args
                    .first()
                    .ok_or_else(|| OperatorError::arity(self, 1, 0))?;
                Ok(match self {
                    TimeOp::Lt => src < other,
                    TimeOp::Le => src <= other,
                    TimeOp::Gt => src > other,
                    _ => src >= other,
                })
            }
            TimeOp::In | TimeOp::InL | TimeOp::InR | TimeOp::InN => {
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
            TimeOp::Unknown => Err(OperatorError::unsupported(self)),
        }
    }
}
