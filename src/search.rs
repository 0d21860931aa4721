use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::{
    config::SearchConfig,
    fuzzy::{self, TermMatcher, WeightedRatio},
    index::Index,
    store::IndexStore,
    tokenizer::tokenize,
};

/// A ranked document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
}

/// One term of an expanded query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedTerm {
    pub term: String,
    /// Drawn from the vocabulary by similarity rather than typed verbatim.
    pub fuzzy: bool,
}

/// Ranks documents with tf-idf over the query terms and their fuzzy
/// expansions.
pub struct SearchEngine {
    config: SearchConfig,
    matcher: Option<Box<dyn TermMatcher>>,
}

impl SearchEngine {
    /// Engine with weighted-ratio fuzzy expansion.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_matcher(config, Box::new(WeightedRatio))
    }

    pub fn with_matcher(
        config: SearchConfig,
        matcher: Box<dyn TermMatcher>,
    ) -> Self {
        Self {
            config,
            matcher: Some(matcher),
        }
    }

    /// Drop fuzzy expansion; only exact query terms are scored.
    pub fn without_fuzzy(mut self) -> Self {
        self.matcher = None;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn is_fuzzy(&self) -> bool {
        self.matcher.is_some()
    }

    /// Load the store if needed, then rank its documents against `query`.
    pub fn search(
        &self,
        store: &mut IndexStore,
        query: &str,
        limit: usize,
    ) -> Vec<SearchHit> {
        store.load();
        self.rank(store.index(), query, limit)
    }

    /// Rank the documents of an in-memory index, best first.
    ///
    /// Equal scores are ordered by ascending document id. Returns nothing
    /// for a query without terms or an empty index.
    pub fn rank(&self, index: &Index, query: &str, limit: usize) -> Vec<SearchHit> {
        let tokens = tokenize(query);
        if tokens.is_empty() || index.docs.is_empty() {
            return Vec::new();
        }

        let expanded = self.expand_terms(&tokens, index);
        let doc_count = index.doc_count().max(1) as f64;
        let mut scores: HashMap<&str, f64> = HashMap::new();

        for ExpandedTerm { term, fuzzy } in &expanded {
            let Some(postings) = index.postings(term) else {
                continue;
            };

            let weight = if *fuzzy { self.config.fuzzy_weight } else { 1.0 };
            let df = postings.len() as f64;
            let idf = ((doc_count + 1.0) / (df + 1.0)).ln() + 1.0;

            for (doc_id, &tf) in postings {
                let length = index
                    .docs
                    .get(doc_id)
                    .map_or(1, |record| record.length.max(1));
                *scores.entry(doc_id.as_str()).or_insert(0.0) +=
                    weight * (f64::from(tf) / length as f64) * idf;
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .filter(|&(_, score)| score > 0.0)
            .map(|(doc_id, score)| SearchHit {
                doc_id: doc_id.to_string(),
                score,
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        hits.truncate(limit);

        tracing::debug!(
            query,
            terms = expanded.len(),
            hits = hits.len(),
            "search ranked"
        );
        hits
    }

    /// Each query token verbatim, followed by its closest vocabulary terms.
    ///
    /// The vocabulary term equal to the token itself still takes one of the
    /// `fuzzy_limit` slots but is not repeated as a fuzzy term. Duplicates
    /// are removed, keeping the first occurrence.
    pub fn expand_terms(
        &self,
        tokens: &[String],
        index: &Index,
    ) -> Vec<ExpandedTerm> {
        let mut expanded = Vec::new();
        let mut seen = HashSet::new();
        let mut push = |term: &str, fuzzy: bool| {
            let entry = ExpandedTerm {
                term: term.to_string(),
                fuzzy,
            };
            if seen.insert(entry.clone()) {
                expanded.push(entry);
            }
        };

        for token in tokens {
            push(token, false);

            let Some(matcher) = self.matcher.as_deref() else {
                continue;
            };
            let matches = fuzzy::extract(
                matcher,
                token,
                index.vocabulary(),
                self.config.fuzzy_threshold,
                self.config.fuzzy_limit,
            );
            for (term, _) in matches {
                if term != token.as_str() {
                    push(term, true);
                }
            }
        }

        expanded
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("config", &self.config)
            .field("fuzzy", &self.is_fuzzy())
            .finish()
    }
}

/// A hit resolved against the index for display.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayHit<'a> {
    pub rank: usize,
    pub doc_id: &'a str,
    pub path: &'a str,
    pub score: f64,
}

/// Attach ranks and source paths to hits.
pub fn resolve_hits<'a>(hits: &'a [SearchHit], index: &'a Index) -> Vec<DisplayHit<'a>> {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| DisplayHit {
            rank: i + 1,
            doc_id: &hit.doc_id,
            path: index
                .docs
                .get(&hit.doc_id)
                .map_or(hit.doc_id.as_str(), |r| r.path.as_str()),
            score: hit.score,
        })
        .collect()
}

/// Format results for human-readable terminal output.
pub fn format_human(hits: &[SearchHit], index: &Index) -> String {
    if hits.is_empty() {
        return "No matching documents.".to_string();
    }

    resolve_hits(hits, index)
        .iter()
        .map(|h| format!("{:>3}. {} | score={:.4}", h.rank, h.path, h.score))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format results as a JSON document.
pub fn format_json(
    hits: &[SearchHit],
    index: &Index,
    query: &str,
) -> serde_json::Result<String> {
    let results = resolve_hits(hits, index);
    serde_json::to_string(&serde_json::json!({
        "query": query,
        "result_count": results.len(),
        "results": results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::StoreConfig,
        index::DocumentRecord,
        tokenizer::term_frequencies,
    };

    fn index_of(docs: &[(&str, &str)]) -> Index {
        let mut index = Index::default();
        for (id, text) in docs {
            let record = DocumentRecord::new(
                format!("/corpus/{id}"),
                1.0,
                term_frequencies(tokenize(text)),
            );
            index.insert_document(id, record);
        }
        index
    }

    fn cat_dog_bird() -> Index {
        index_of(&[("a", "cat dog"), ("b", "dog bird")])
    }

    fn engine() -> SearchEngine {
        SearchEngine::new(SearchConfig::default())
    }

    fn ids(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.doc_id.as_str()).collect()
    }

    #[test]
    fn equal_scores_break_ties_by_id() {
        let hits = engine().rank(&cat_dog_bird(), "dog", 5);
        assert_eq!(ids(&hits), vec!["a", "b"]);
        assert_eq!(hits[0].score, hits[1].score);
    }

    #[test]
    fn exact_score_follows_tf_idf() {
        let hits = engine().rank(&cat_dog_bird(), "cat", 5);
        assert_eq!(ids(&hits), vec!["a"]);

        // N = 2, df = 1, tf = 1, length = 2
        let idf = (3.0_f64 / 2.0).ln() + 1.0;
        assert!((hits[0].score - 0.5 * idf).abs() < 1e-12);
    }

    #[test]
    fn typo_reaches_document_with_lower_score() {
        let index = cat_dog_bird();
        let exact = engine().rank(&index, "cat", 5);
        let typo = engine().rank(&index, "catt", 5);

        assert_eq!(ids(&typo), vec!["a"]);
        assert!(typo[0].score > 0.0);
        assert!(typo[0].score < exact[0].score);
        assert!((typo[0].score - 0.8 * exact[0].score).abs() < 1e-12);
    }

    #[test]
    fn without_fuzzy_only_matches_exact_terms() {
        let index = cat_dog_bird();
        let exact_only = engine().without_fuzzy();

        assert!(!exact_only.is_fuzzy());
        assert!(exact_only.rank(&index, "catt", 5).is_empty());
        assert_eq!(ids(&exact_only.rank(&index, "cat", 5)), vec!["a"]);
    }

    #[test]
    fn rarer_terms_rank_higher() {
        let index = index_of(&[
            ("a", "rust guide"),
            ("b", "rust book"),
            ("c", "python guide"),
            ("d", "rust compiler"),
        ]);
        let hits = engine().without_fuzzy().rank(&index, "rust python", 10);

        assert_eq!(hits[0].doc_id, "c");
        assert_eq!(hits.len(), 4);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn respects_limit() {
        let hits = engine().rank(&cat_dog_bird(), "dog", 1);
        assert_eq!(ids(&hits), vec!["a"]);
        assert!(engine().rank(&cat_dog_bird(), "dog", 0).is_empty());
    }

    #[test]
    fn empty_query_or_corpus_returns_nothing() {
        assert!(engine().rank(&cat_dog_bird(), "", 5).is_empty());
        assert!(engine().rank(&cat_dog_bird(), "?!.,", 5).is_empty());
        assert!(engine().rank(&Index::default(), "cat", 5).is_empty());
    }

    #[test]
    fn unknown_terms_contribute_nothing() {
        let hits = engine().rank(&cat_dog_bird(), "cat zebra", 5);
        let alone = engine().rank(&cat_dog_bird(), "cat", 5);
        assert_eq!(hits, alone);
    }

    #[test]
    fn repeated_query_terms_count_once() {
        let once = engine().rank(&cat_dog_bird(), "dog", 5);
        let twice = engine().rank(&cat_dog_bird(), "dog DOG dog", 5);
        assert_eq!(once, twice);
    }

    #[test]
    fn expansion_marks_fuzzy_terms() {
        let index = index_of(&[("a", "cat cats catty dog")]);
        let expanded =
            engine().expand_terms(&["cat".to_string()], &index);

        assert_eq!(expanded[0], ExpandedTerm {
            term: "cat".into(),
            fuzzy: false
        });
        // the self match uses one of the three slots
        let fuzzy: Vec<&str> = expanded
            .iter()
            .filter(|t| t.fuzzy)
            .map(|t| t.term.as_str())
            .collect();
        assert_eq!(fuzzy, vec!["catty", "cats"]);
    }

    #[test]
    fn custom_threshold_limits_expansion() {
        let index = cat_dog_bird();
        let strict = SearchEngine::new(SearchConfig {
            fuzzy_threshold: 99.0,
            ..SearchConfig::default()
        });
        assert!(strict.rank(&index, "catt", 5).is_empty());
    }

    #[test]
    fn search_loads_store_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let corpus = tmp.path().join("data");
        std::fs::create_dir_all(&corpus).unwrap();
        std::fs::write(corpus.join("a.txt"), "cat dog").unwrap();
        std::fs::write(corpus.join("b.txt"), "dog bird").unwrap();
        let config = StoreConfig::new(&corpus, tmp.path().join("index.json"));

        IndexStore::new(config.clone())
            .unwrap()
            .build_index(false)
            .unwrap();

        let mut fresh = IndexStore::new(config).unwrap();
        let hits = engine().search(&mut fresh, "dog", 5);
        assert!(fresh.is_loaded());
        assert_eq!(ids(&hits), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn formats_results() {
        let index = cat_dog_bird();
        let hits = engine().rank(&index, "dog", 5);

        let human = format_human(&hits, &index);
        assert!(human.contains("1. /corpus/a | score="));
        assert!(human.contains("2. /corpus/b"));
        assert_eq!(format_human(&[], &index), "No matching documents.");

        let json: serde_json::Value =
            serde_json::from_str(&format_json(&hits, &index, "dog").unwrap())
                .unwrap();
        assert_eq!(json["query"], "dog");
        assert_eq!(json["result_count"], 2);
        assert_eq!(json["results"][0]["doc_id"], "a");
        assert_eq!(json["results"][1]["rank"], 2);
    }
}
