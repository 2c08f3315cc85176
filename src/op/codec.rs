//! canonical string codec for operators
//!
//! every operator is persisted as `<family>/<symbol>` (numeric operators nest
//! a sub-kind: `num/cmp/==`, `num/cal/+`). decoding is case-insensitive and
//! never fails: unrecognized text maps to the family's `Unknown` sentinel.

use std::fmt;

use super::{BoolOp, HasOp, NumOp, TimeOp, WordOp};

/// shared codec behaviour of an operator family
pub trait OpCodec: Copy + PartialEq + fmt::Debug + Sized + 'static {
    /// family prefix, e.g. "word"
    const FAMILY: &'static str;

    /// sentinel for empty or unrecognized text
    const UNKNOWN: Self;

    /// every known variant in table order (excludes `UNKNOWN`)
    fn all() -> &'static [Self];

    /// short symbol, e.g. "<=" or "include"
    fn symbol(&self) -> &'static str;

    fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// canonical wire form; empty for `UNKNOWN`
    fn encode(&self) -> String {
        if self.is_unknown() {
            return String::new();
        }
        format!("{}/{}", Self::FAMILY, self.symbol())
    }

    /// parse either the short symbol ("one") or the canonical form ("word/one")
    fn decode(text: &str) -> Self {
        let prefix = format!("{}/", Self::FAMILY);
        decode_in(Self::all(), &prefix, text)
    }
}

/// linear scan of `table` for the entry whose canonical form equals `prefix + text`
pub(crate) fn decode_in<T: OpCodec>(table: &[T], prefix: &str, text: &str) -> T {
    let lowered = text.to_lowercase();
    let full = if lowered.starts_with(prefix) {
        lowered
    } else {
        format!("{}{}", prefix, lowered)
    };

    match table.iter().find(|op| op.encode().eq_ignore_ascii_case(&full)) {
        Some(op) => *op,
        None => {
            tracing::trace!(family = T::FAMILY, text, "unrecognized operator");
            T::UNKNOWN
        }
    }
}

/// operator family tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Bool,
    Num,
    Time,
    Has,
    Word,
}

impl Family {
    pub const ALL: [Family; 5] = [
        Family::Bool,
        Family::Num,
        Family::Time,
        Family::Has,
        Family::Word,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Bool => BoolOp::FAMILY,
            Family::Num => NumOp::FAMILY,
            Family::Time => TimeOp::FAMILY,
            Family::Has => HasOp::FAMILY,
            Family::Word => WordOp::FAMILY,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// canonical strings of every variant in this family
    pub fn canonical_names(&self) -> Vec<String> {
        fn names<T: OpCodec>() -> Vec<String> {
            T::all().iter().map(|op| op.encode()).collect()
        }

        match self {
            Family::Bool => names::<BoolOp>(),
            Family::Num => names::<NumOp>(),
            Family::Time => names::<TimeOp>(),
            Family::Has => names::<HasOp>(),
            Family::Word => names::<WordOp>(),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// an operator of any family, as read from a stored rule string
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operator {
    Bool(BoolOp),
    Num(NumOp),
    Time(TimeOp),
    Has(HasOp),
    Word(WordOp),
}

impl Operator {
    /// parse a canonical string such as "num/cmp/>=" or "word/one"
    ///
    /// returns `None` when the family or the variant is unknown
    pub fn parse(text: &str) -> Option<Self> {
        let (family, _) = text.split_once('/')?;
        let op = match Family::parse(family)? {
            Family::Bool => Operator::Bool(BoolOp::decode(text)),
            Family::Num => Operator::Num(NumOp::decode(text)),
            Family::Time => Operator::Time(TimeOp::decode(text)),
            Family::Has => Operator::Has(HasOp::decode(text)),
            Family::Word => Operator::Word(WordOp::decode(text)),
        };
        if op.is_unknown() {
            None
        } else {
            Some(op)
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Operator::Bool(_) => Family::Bool,
            Operator::Num(_) => Family::Num,
            Operator::Time(_) => Family::Time,
            Operator::Has(_) => Family::Has,
            Operator::Word(_) => Family::Word,
        }
    }

    pub fn is_unknown(&self) -> bool {
        match self {
            Operator::Bool(op) => op.is_unknown(),
            Operator::Num(op) => op.is_unknown(),
            Operator::Time(op) => op.is_unknown(),
            Operator::Has(op) => op.is_unknown(),
            Operator::Word(op) => op.is_unknown(),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Operator::Bool(op) => op.encode(),
            Operator::Num(op) => op.encode(),
            Operator::Time(op) => op.encode(),
            Operator::Has(op) => op.encode(),
            Operator::Word(op) => op.encode(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}
