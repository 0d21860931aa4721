use std::path::{Path, PathBuf};

use crate::data_dir::DataDir;

/// Glob patterns selecting corpus files when none are configured.
pub const DEFAULT_PATTERNS: &[&str] = &["*.txt"];

/// Minimum weighted-ratio score for a vocabulary term to join a query.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 82.0;

/// Maximum fuzzy expansions per query token.
pub const DEFAULT_FUZZY_LIMIT: usize = 3;

/// Scoring weight of a fuzzy expansion relative to an exact term.
pub const DEFAULT_FUZZY_WEIGHT: f64 = 0.8;

/// Where an [`IndexStore`](crate::store::IndexStore) reads documents from and
/// where it keeps its snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub corpus_dir: PathBuf,
    pub index_file: PathBuf,
    pub patterns: Vec<String>,
}

impl StoreConfig {
    pub fn new(
        corpus_dir: impl Into<PathBuf>,
        index_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            corpus_dir: corpus_dir.into(),
            index_file: index_file.into(),
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Build a config rooted in a resolved data directory.
    ///
    /// `corpus_dir` overrides the default `<data_dir>/data`.
    pub fn from_data_dir(data_dir: &DataDir, corpus_dir: Option<&Path>) -> Self {
        let corpus = corpus_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_dir.default_corpus_dir());
        Self::new(corpus, data_dir.index_file())
    }

    /// Replace the file patterns. An empty list keeps the defaults.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> =
            patterns.into_iter().map(Into::into).collect();
        if !patterns.is_empty() {
            self.patterns = patterns;
        }
        self
    }
}

/// Tuning for query expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub fuzzy_threshold: f64,
    pub fuzzy_limit: usize,
    pub fuzzy_weight: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            fuzzy_limit: DEFAULT_FUZZY_LIMIT,
            fuzzy_weight: DEFAULT_FUZZY_WEIGHT,
        }
    }
}
