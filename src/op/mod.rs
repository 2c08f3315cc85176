//! typed operators for evaluating declarative conditions
//!
//! five operator families, each with a canonical wire string and an `accept`
//! contract:
//! - bool: and, or, not over boolean operands
//! - num: comparisons (==, !=, <, <=, >, >=, ranges, nan/inf checks) and
//!   arithmetic (=, +, -, *, /, max, min)
//! - time: ordering and range checks over timestamps
//! - has: set membership over strings
//! - word: fuzzy text matching scored by a pluggable similarity scorer
//!
//! operators are plain `Copy` enums; the scorer registry is the only shared state.

mod boolean;
mod codec;
mod error;
mod has;
mod num;
mod options;
mod registry;
pub mod score;
mod time;
mod word;

pub use boolean::BoolOp;
pub use codec::{Family, OpCodec, Operator};
pub use error::OperatorError;
pub use has::HasOp;
pub use num::{NumOp, NumOutcome, EPSILON};
pub use options::{clamp_threshold, Options, MAX_THRESHOLD, MIN_THRESHOLD};
pub use registry::ScorerRegistry;
pub use score::{PreparedText, SimilarScorer, MAX_SCORE, MIN_SCORE};
pub use time::TimeOp;
pub use word::{WordMatch, WordOp, NO_SCORE};
