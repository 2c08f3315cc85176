//! name-keyed table of similarity scorers
//!
//! register custom scorers at startup, then evaluate. lookups clone the scorer
//! out under a read lock, so scoring itself never holds the lock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lazy_static::lazy_static;

use super::options::Options;
use super::score::{
    levenshtein_score, levenshtein_window_score, score_by_count, score_by_regex, PreparedText,
    SimilarScorer, ALGO_DEFAULT, ALGO_LEVENSHTEIN, ALGO_LEVENSHTEIN_WINDOW, ALGO_REG,
};

lazy_static! {
    static ref GLOBAL: ScorerRegistry = ScorerRegistry::new();
}

pub struct ScorerRegistry {
    scorers: RwLock<HashMap<String, SimilarScorer>>,
}

impl ScorerRegistry {
    /// registry seeded with the four built-in algorithms
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(ALGO_DEFAULT, score_by_count);
        registry.register(ALGO_REG, score_by_regex);
        registry.register(ALGO_LEVENSHTEIN, levenshtein_score);
        registry.register(ALGO_LEVENSHTEIN_WINDOW, levenshtein_window_score);
        registry
    }

    /// registry without any scorer; lookups fall back to the built-ins
    pub fn empty() -> Self {
        Self {
            scorers: RwLock::new(HashMap::new()),
        }
    }

    /// process-wide registry used by [`WordOp::accept`](super::WordOp::accept)
    pub fn global() -> &'static ScorerRegistry {
        &GLOBAL
    }

    /// add or replace a scorer, returning the one previously registered under `name`
    pub fn register<F>(&self, name: impl Into<String>, scorer: F) -> Option<SimilarScorer>
    where
        F: Fn(&PreparedText, &str, &Options) -> f64 + Send + Sync + 'static,
    {
        self.register_arc(name, Arc::new(scorer))
    }

    pub fn register_arc(&self, name: impl Into<String>, scorer: SimilarScorer) -> Option<SimilarScorer> {
        let name = name.into();
        tracing::debug!(method = %name, "registering similarity scorer");
        self.write().insert(name, scorer)
    }

    /// resolve a scorer by name
    ///
    /// unknown names resolve to `default`; `reg` always resolves to the regex
    /// scorer even when it was never registered
    pub fn get(&self, name: &str) -> SimilarScorer {
        if let Some(scorer) = self.read().get(name) {
            return Arc::clone(scorer);
        }
        if name == ALGO_REG {
            return Arc::new(score_by_regex);
        }
        if let Some(scorer) = self.read().get(ALGO_DEFAULT) {
            return Arc::clone(scorer);
        }
        Arc::new(score_by_count)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    // a panicking writer cannot leave a half-inserted entry behind, so poison is ignored
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, SimilarScorer>> {
        self.scorers.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, SimilarScorer>> {
        self.scorers.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ScorerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScorerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScorerRegistry")
            .field("scorers", &self.names())
            .finish()
    }
}
