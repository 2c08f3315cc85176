//! similarity scorers used by word operators
//!
//! a scorer compares a prepared source text with a single keyword and returns a
//! score in [0, 1]: 0 means unrelated, 1 means equivalent.
//!
//! built-in algorithms:
//! - `default`: 1 when the keyword occurs in the text
//! - `reg`: 1 when the keyword, compiled as a regex, matches the text
//! - `levenshtein`: normalized edit distance over the whole text
//! - `levenshtein-window`: best normalized edit distance over text windows

use std::sync::Arc;

use regex::Regex;
use strsim::levenshtein;

use super::error::OperatorError;
use super::options::Options;

pub const MAX_SCORE: f64 = 1.0;
pub const MIN_SCORE: f64 = 0.0;

pub const ALGO_DEFAULT: &str = "default";
pub const ALGO_REG: &str = "reg";
pub const ALGO_LEVENSHTEIN: &str = "levenshtein";
pub const ALGO_LEVENSHTEIN_WINDOW: &str = "levenshtein-window";

/// pluggable similarity function: (prepared text, keyword, options) -> score
pub type SimilarScorer = Arc<dyn Fn(&PreparedText, &str, &Options) -> f64 + Send + Sync>;

/// source text with whitespace removed, split into chars once per evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedText {
    text: String,
    runes: Vec<char>,
}

impl PreparedText {
    pub fn new(raw: &str) -> Self {
        let text = strip_whitespace(raw);
        let runes = text.chars().collect();
        Self { text, runes }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn runes(&self) -> &[char] {
        &self.runes
    }

    /// length in chars
    pub fn len(&self) -> usize {
        self.runes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runes.is_empty()
    }
}

/// remove every (unicode) whitespace character
pub fn strip_whitespace(s: &str) -> String {
    s.split_whitespace().collect()
}

/// whitespace-stripped text and its length in chars
pub fn trim_space_and_rune_count(s: &str) -> (String, usize) {
    let text = strip_whitespace(s);
    let len = text.chars().count();
    (text, len)
}

/// force a score into [0, 1]; NaN counts as no relation
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_SCORE;
    }
    score.clamp(MIN_SCORE, MAX_SCORE)
}

fn flag(hit: bool) -> f64 {
    if hit {
        MAX_SCORE
    } else {
        MIN_SCORE
    }
}

/// substring occurrence
pub fn score_by_count(text: &PreparedText, key: &str, _options: &Options) -> f64 {
    flag(text.text().contains(key))
}

/// regex match; a malformed pattern never matches
pub fn score_by_regex(text: &PreparedText, key: &str, _options: &Options) -> f64 {
    match compile_pattern(key) {
        Ok(pattern) => flag(pattern.is_match(text.text())),
        Err(e) => {
            tracing::warn!(error = %e, "scoring malformed pattern as no match");
            MIN_SCORE
        }
    }
}

pub fn compile_pattern(pattern: &str) -> Result<Regex, OperatorError> {
    Regex::new(pattern).map_err(|source| OperatorError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// `1 - distance / max(len(key), len(text))` over whitespace-stripped strings
pub fn levenshtein_score(text: &PreparedText, key: &str, _options: &Options) -> f64 {
    let (word, w_len) = trim_space_and_rune_count(key);
    if text.text() == word {
        return MAX_SCORE;
    }

    let dist = levenshtein(&word, text.text());
    let longest = w_len.max(text.len());
    clamp_score(1.0 - dist as f64 / longest as f64)
}

/// best [`levenshtein_score`]-style score over contiguous windows of the text
///
/// a short keyword against a long text is otherwise penalized for every char
/// of the text it does not cover; windows isolate the best local alignment.
/// the window sizes tried depend on the clamped `threshold` option.
pub fn levenshtein_window_score(text: &PreparedText, key: &str, options: &Options) -> f64 {
    let (word, w_len) = trim_space_and_rune_count(key);
    if text.text() == word {
        return MAX_SCORE;
    }

    window_sizes(text.len(), w_len, options.threshold())
        .into_iter()
        .map(|window| best_window_score(text.runes(), &word, w_len, window))
        .fold(MIN_SCORE, f64::max)
}

/// candidate window sizes: `w`, `ceil(w*ratio)`, `ceil(w/ratio)` and `t`,
/// dropping sizes outside `1..=t` and duplicates
pub fn window_sizes(t_len: usize, w_len: usize, ratio: f64) -> Vec<usize> {
    let min_window = (w_len as f64 * ratio).ceil() as usize;
    let max_window = (w_len as f64 / ratio).ceil() as usize;

    let mut sizes = Vec::with_capacity(4);
    for size in [w_len, min_window, max_window, t_len] {
        if (1..=t_len).contains(&size) && !sizes.contains(&size) {
            sizes.push(size);
        }
    }
    sizes
}

fn best_window_score(runes: &[char], word: &str, w_len: usize, window: usize) -> f64 {
    let denominator = w_len.max(window) as f64;
    let mut best = MIN_SCORE;

    for start in 0..=(runes.len() - window) {
        let candidate: String = runes[start..start + window].iter().collect();
        let dist = if candidate == word {
            0
        } else {
            levenshtein(word, &candidate)
        };
        best = best.max(1.0 - dist as f64 / denominator);
    }
    clamp_score(best)
}
