use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Snapshot format version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

pub type Term = String;
pub type DocId = String;

/// Term → document → occurrence count.
pub type Postings = BTreeMap<DocId, u32>;
pub type InvertedIndex = BTreeMap<Term, Postings>;

/// Per-document record kept alongside the inverted index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub path: String,
    pub mtime: f64,
    /// Total term occurrences; always the sum of `tokens`.
    pub length: u64,
    /// Term frequencies of this document.
    pub tokens: BTreeMap<Term, u32>,
}

impl DocumentRecord {
    pub fn new(
        path: impl Into<String>,
        mtime: f64,
        tokens: BTreeMap<Term, u32>,
    ) -> Self {
        let length: u64 = tokens.values().map(|&c| u64::from(c)).sum();
        Self {
            path: path.into(),
            mtime,
            length,
            tokens,
        }
    }
}

/// The whole searchable state, persisted as one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub version: u32,
    /// Seconds since the Unix epoch of the last completed build.
    pub updated_at: Option<f64>,
    pub docs: BTreeMap<DocId, DocumentRecord>,
    pub inverted_index: InvertedIndex,
}

impl Default for Index {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            updated_at: None,
            docs: BTreeMap::new(),
            inverted_index: InvertedIndex::new(),
        }
    }
}

impl Index {
    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }

    pub fn vocab_size(&self) -> usize {
        self.inverted_index.len()
    }

    pub fn postings(&self, term: &str) -> Option<&Postings> {
        self.inverted_index.get(term)
    }

    /// Iterate the distinct indexed terms in order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.inverted_index.keys().map(String::as_str)
    }

    /// Store a document and merge its term counts into the postings.
    ///
    /// An existing record under the same id is removed first.
    pub fn insert_document(&mut self, doc_id: &str, record: DocumentRecord) {
        self.remove_document(doc_id);
        for (term, &count) in &record.tokens {
            self.inverted_index
                .entry(term.clone())
                .or_default()
                .insert(doc_id.to_string(), count);
        }
        self.docs.insert(doc_id.to_string(), record);
    }

    /// Remove a document and every posting that references it.
    ///
    /// Terms left without postings are dropped from the index. Returns the
    /// removed record, if there was one.
    pub fn remove_document(&mut self, doc_id: &str) -> Option<DocumentRecord> {
        let record = self.docs.remove(doc_id)?;
        for term in record.tokens.keys() {
            if let Some(postings) = self.inverted_index.get_mut(term) {
                postings.remove(doc_id);
                if postings.is_empty() {
                    self.inverted_index.remove(term);
                }
            }
        }
        Some(record)
    }

    /// Verify the structural invariants between `docs` and
    /// `inverted_index`, describing the first violation found.
    pub fn check_consistency(&self) -> Result<(), String> {
        for (doc_id, record) in &self.docs {
            let total: u64 = record.tokens.values().map(|&c| u64::from(c)).sum();
            if total != record.length {
                return Err(format!(
                    "document {doc_id}: length {} but term counts sum to {total}",
                    record.length
                ));
            }
            for (term, &count) in &record.tokens {
                match self.inverted_index.get(term).and_then(|p| p.get(doc_id))
                {
                    Some(&posted) if posted == count => {}
                    Some(&posted) => {
                        return Err(format!(
                            "term {term:?} in {doc_id}: posting {posted}, \
                             record {count}"
                        ));
                    }
                    None => {
                        return Err(format!(
                            "term {term:?} of {doc_id} missing from postings"
                        ));
                    }
                }
            }
        }

        for (term, postings) in &self.inverted_index {
            if postings.is_empty() {
                return Err(format!("term {term:?} has empty postings"));
            }
            for doc_id in postings.keys() {
                let known = self
                    .docs
                    .get(doc_id)
                    .is_some_and(|r| r.tokens.contains_key(term));
                if !known {
                    return Err(format!(
                        "term {term:?} posts unknown document {doc_id}"
                    ));
                }
            }
        }

        Ok(())
    }
}
