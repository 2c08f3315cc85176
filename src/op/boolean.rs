//! boolean combinators: and / or / not over values, thunks and fallible thunks

use super::codec::OpCodec;
use super::error::OperatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    /// every input is true (empty = true)
    And,
    /// at least one input is true (empty = false)
    Or,
    /// no input is true (empty = true)
    Not,
    Unknown,
}

const BOOL_OPS: [BoolOp; 3] = [BoolOp::And, BoolOp::Or, BoolOp::Not];

impl OpCodec for BoolOp {
    const FAMILY: &'static str = "bool";
    const UNKNOWN: Self = BoolOp::Unknown;

    fn all() -> &'static [Self] {
        &BOOL_OPS
    }

    fn symbol(&self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
            BoolOp::Not => "not",
            BoolOp::Unknown => "",
        }
    }
}

impl std::fmt::Display for BoolOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl BoolOp {
    /// combine plain boolean values
    pub fn accept(&self, hits: &[bool]) -> Result<bool, OperatorError> {
        self.accept_fn(hits.iter().map(|&hit| move || hit))
    }

    /// combine lazily evaluated conditions, stopping as soon as the outcome is known
    pub fn accept_fn<I, F>(&self, hits: I) -> Result<bool, OperatorError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> bool,
    {
        self.accept_fallible(hits.into_iter().map(|hit| move || Ok(hit())))
    }

    /// combine fallible conditions; the first error aborts the evaluation
    ///
    /// `Or` and `Not` stop at the first success, so errors from later
    /// conditions are never observed
    pub fn accept_fallible<I, F, E>(&self, hits: I) -> Result<bool, E>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Result<bool, E>,
        E: From<OperatorError>,
    {
        // short-circuit value: the input that decides the outcome, and the outcome it forces
        let (decisive, outcome) = match self {
            BoolOp::And => (false, false),
            BoolOp::Or => (true, true),
            BoolOp::Not => (true, false),
            BoolOp::Unknown => return Err(OperatorError::unsupported(self).into()),
        };

        for hit in hits {
            if hit()? == decisive {
                return Ok(outcome);
            }
        }
        Ok(!outcome)
    }
}
