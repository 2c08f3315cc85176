//! text matching operators
//!
//! a word operator scores one source text against each keyword with the
//! scorer selected by `options.method`, keeps the lowest and highest score
//! (with the keywords that produced them) and compares them to
//! `options.threshold`.

use serde::Serialize;

use super::codec::OpCodec;
use super::error::OperatorError;
use super::options::Options;
use super::registry::ScorerRegistry;
use super::score::{
    clamp_score, compile_pattern, strip_whitespace, PreparedText, SimilarScorer, ALGO_REG, MAX_SCORE,
    MIN_SCORE,
};

/// score reported when no keyword was scored
pub const NO_SCORE: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordOp {
    /// assignment; carries no match semantics
    Set,
    /// text is empty
    Empty,
    /// text is not empty
    Any,
    /// text equals the keyword; whitespace is ignored on both sides
    Eq,
    /// text differs from the keyword; whitespace is ignored on both sides
    Ne,
    /// text contains the keyword
    Include,
    /// text does not contain the keyword
    Exclude,
    /// text matches at least one keyword
    One,
    /// text matches no keyword
    None,
    /// text matches every keyword
    All,
    Unknown,
}

const WORD_OPS: [WordOp; 10] = [
    WordOp::Set,
    WordOp::Empty,
    WordOp::Any,
    WordOp::Eq,
    WordOp::Ne,
    WordOp::Include,
    WordOp::Exclude,
    WordOp::One,
    WordOp::None,
    WordOp::All,
];

impl OpCodec for WordOp {
    const FAMILY: &'static str = "word";
    const UNKNOWN: Self = WordOp::Unknown;

    fn all() -> &'static [Self] {
        &WORD_OPS
    }

    fn symbol(&self) -> &'static str {
        match self {
            WordOp::Set => "=",
            WordOp::Empty => "empty",
            WordOp::Any => "any",
            WordOp::Eq => "==",
            WordOp::Ne => "!=",
            WordOp::Include => "include",
            WordOp::Exclude => "exclude",
            WordOp::One => "one",
            WordOp::None => "none",
            WordOp::All => "all",
            WordOp::Unknown => "",
        }
    }
}

impl std::fmt::Display for WordOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// outcome of a word operator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordMatch {
    pub passed: bool,
    /// [least matched keyword, best matched keyword]
    pub hits: [String; 2],
    /// [min score, max score]; both `NO_SCORE` when nothing was scored
    pub scores: [f64; 2],
}

impl WordMatch {
    pub fn least_hit(&self) -> &str {
        &self.hits[0]
    }

    pub fn best_hit(&self) -> &str {
        &self.hits[1]
    }

    pub fn min_score(&self) -> f64 {
        self.scores[0]
    }

    pub fn max_score(&self) -> f64 {
        self.scores[1]
    }

    /// false when the keyword list was empty; the scores are then sentinels, not zeros
    pub fn is_scored(&self) -> bool {
        self.scores[1] >= 0.0
    }
}

impl WordOp {
    /// evaluate against the process-wide scorer registry
    pub fn accept<S: AsRef<str>>(
        &self,
        src: &str,
        keys: &[S],
        options: &Options,
    ) -> Result<WordMatch, OperatorError> {
        self.accept_with(ScorerRegistry::global(), src, keys, options)
    }

    /// evaluate against an explicit scorer registry
    pub fn accept_with<S: AsRef<str>>(
        &self,
        registry: &ScorerRegistry,
        src: &str,
        keys: &[S],
        options: &Options,
    ) -> Result<WordMatch, OperatorError> {
        let max_args = self
            .max_args()
            .ok_or_else(|| OperatorError::unsupported(self))?;

        let method = options.method();
        let scorer = registry.get(&method);
        let threshold = options.threshold();
        let text = PreparedText::new(src);

        let mut min_score = NO_SCORE;
        let mut max_score = NO_SCORE;
        let mut least_hit = "";
        let mut best_hit = "";

        for key in keys.iter().take(max_args) {
            let key = key.as_ref();
            let score = self.score(&scorer, &text, key, options);
            if max_score < 0.0 || score > max_score {
                max_score = score;
                best_hit = key;
            }
            if min_score < 0.0 || score < min_score {
                min_score = score;
                least_hit = key;
            }
        }

        let passed = self.judge(min_score, max_score, threshold);
        tracing::debug!(
            op = %self,
            method = %method,
            threshold,
            min_score,
            max_score,
            passed,
            "word operator evaluated"
        );

        Ok(WordMatch {
            passed,
            hits: [least_hit.to_string(), best_hit.to_string()],
            scores: [min_score, max_score],
        })
    }

    /// check keywords ahead of evaluation: with the `reg` method every keyword
    /// must compile as a regular expression
    pub fn validate<S: AsRef<str>>(&self, keys: &[S], options: &Options) -> Result<(), OperatorError> {
        if self.max_args().is_none() {
            return Err(OperatorError::unsupported(self));
        }
        if options.method() == ALGO_REG && self.uses_scorer() {
            for key in keys {
                compile_pattern(key.as_ref())?;
            }
        }
        Ok(())
    }

    /// how many keywords are considered; `None` for variants without match semantics
    pub fn max_args(&self) -> Option<usize> {
        match self {
            WordOp::Empty | WordOp::Any => Some(1),
            WordOp::Eq | WordOp::Include | WordOp::Ne | WordOp::Exclude => Some(2),
            WordOp::All | WordOp::One | WordOp::None => Some(usize::MAX),
            WordOp::Set | WordOp::Unknown => None,
        }
    }

    /// negated variants score `1 - similarity`
    pub fn is_negative(&self) -> bool {
        self.symbol().starts_with("no")
    }

    fn uses_scorer(&self) -> bool {
        matches!(
            self,
            WordOp::Include | WordOp::Exclude | WordOp::One | WordOp::None | WordOp::All
        )
    }

    fn judge(&self, min_score: f64, max_score: f64, threshold: f64) -> bool {
        match self {
            // one hit is enough: the best score must clear the bar
            WordOp::Empty
            | WordOp::Any
            | WordOp::Ne
            | WordOp::Exclude
            | WordOp::Eq
            | WordOp::Include
            | WordOp::One => max_score >= threshold,
            // every keyword must clear the bar (for none the scores are inverted)
            WordOp::None | WordOp::All => min_score >= threshold,
            WordOp::Set | WordOp::Unknown => false,
        }
    }

    fn score(&self, scorer: &SimilarScorer, text: &PreparedText, key: &str, options: &Options) -> f64 {
        let flag = |hit: bool| if hit { MAX_SCORE } else { MIN_SCORE };
        let similarity = || clamp_score(scorer(text, key, options));

        match self {
            WordOp::Any => flag(!text.is_empty()),
            WordOp::Empty => flag(text.is_empty()),
            WordOp::Eq => flag(text.text() == strip_whitespace(key)),
            WordOp::Ne => flag(text.text() != strip_whitespace(key)),
            WordOp::Include | WordOp::One | WordOp::All => similarity(),
            WordOp::Exclude | WordOp::None => MAX_SCORE - similarity(),
            WordOp::Set | WordOp::Unknown => MIN_SCORE,
        }
    }
}
