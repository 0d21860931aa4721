use std::{io::Write, path::Path, time::SystemTime};

use globset::GlobSet;
use serde::Serialize;

use crate::{
    config::StoreConfig,
    error::Result,
    incremental::diff_documents,
    index::{DocumentRecord, Index, SNAPSHOT_VERSION},
    tokenizer::{term_frequencies, tokenize},
    walker::{self, DiscoveredFile},
};

/// What [`IndexStore::load`] found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The store was already loaded; nothing was read.
    AlreadyLoaded,
    /// The snapshot was read and is consistent.
    Loaded,
    /// No snapshot exists yet; the store starts empty.
    Missing,
    /// A snapshot exists but could not be used; the store starts empty.
    Reset { reason: String },
}

/// Counters reported by [`IndexStore::build_index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub total_docs: usize,
    pub vocab_size: usize,
}

/// Owns the inverted index and keeps it in sync with the corpus directory.
///
/// The whole index lives in memory and is persisted as a single JSON
/// snapshot. A store expects to be the only writer of its snapshot.
#[derive(Debug)]
pub struct IndexStore {
    config: StoreConfig,
    matcher: GlobSet,
    index: Index,
    loaded: bool,
}

impl IndexStore {
    /// Create a store for the given configuration without touching disk.
    ///
    /// Fails only when a file pattern is not a valid glob.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let matcher = walker::build_matcher(&config.patterns)?;
        Ok(Self {
            config,
            matcher,
            index: Index::default(),
            loaded: false,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn document(&self, doc_id: &str) -> Option<&DocumentRecord> {
        self.index.docs.get(doc_id)
    }

    /// Load the persisted snapshot once.
    ///
    /// Any problem with the snapshot leaves an empty index in place; the
    /// returned status says which case applied.
    pub fn load(&mut self) -> LoadStatus {
        if self.loaded {
            return LoadStatus::AlreadyLoaded;
        }

        let (index, status) = read_snapshot(&self.config.index_file);
        if let LoadStatus::Reset { reason } = &status {
            tracing::warn!(
                path = %self.config.index_file.display(),
                %reason,
                "index snapshot unusable, starting from an empty index"
            );
        } else {
            tracing::debug!(
                path = %self.config.index_file.display(),
                docs = index.doc_count(),
                ?status,
                "index loaded"
            );
        }

        self.index = index;
        self.loaded = true;
        status
    }

    /// Atomically replace the snapshot with the in-memory index.
    ///
    /// The new snapshot is written to a temporary file next to the target
    /// and renamed over it, so a failed save leaves the previous one intact.
    pub fn save(&self) -> Result<()> {
        let path = &self.config.index_file;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let payload = serde_json::to_vec_pretty(&self.index)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&payload)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;

        tracing::debug!(path = %path.display(), bytes = payload.len(), "index saved");
        Ok(())
    }

    /// Bring the index up to date with the corpus directory and persist it.
    ///
    /// With `full_rebuild` every document is re-indexed from scratch;
    /// otherwise only new, modified and deleted files are processed.
    pub fn build_index(&mut self, full_rebuild: bool) -> Result<BuildStats> {
        self.load();
        if full_rebuild {
            self.index = Index::default();
        }

        let discovered =
            walker::discover_files(&self.config.corpus_dir, &self.matcher)?;
        let diff = diff_documents(&self.index.docs, &discovered);

        for doc_id in &diff.deleted_ids {
            self.index.remove_document(doc_id);
            tracing::debug!(doc = %doc_id, "removed");
        }
        for file in &diff.changed_files {
            self.index.remove_document(&file.id);
            self.index_file(file);
            tracing::debug!(doc = %file.id, "updated");
        }
        for file in &diff.new_files {
            self.index_file(file);
            tracing::debug!(doc = %file.id, "added");
        }

        self.index.updated_at = Some(now_secs());
        self.save()?;

        let stats = BuildStats {
            added: diff.new_files.len(),
            updated: diff.changed_files.len(),
            removed: diff.deleted_ids.len(),
            total_docs: self.index.doc_count(),
            vocab_size: self.index.vocab_size(),
        };
        tracing::info!(
            full_rebuild,
            added = stats.added,
            updated = stats.updated,
            removed = stats.removed,
            total_docs = stats.total_docs,
            vocab_size = stats.vocab_size,
            "index built"
        );
        Ok(stats)
    }

    fn index_file(&mut self, file: &DiscoveredFile) {
        let text = match walker::read_document(&file.absolute_path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    doc = %file.id,
                    error = %err,
                    "could not read document, indexing it as empty"
                );
                String::new()
            }
        };

        let record = DocumentRecord::new(
            file.absolute_path.to_string_lossy(),
            file.mtime,
            term_frequencies(tokenize(&text)),
        );
        self.index.insert_document(&file.id, record);
    }
}

fn read_snapshot(path: &Path) -> (Index, LoadStatus) {
    let reset = |reason: String| (Index::default(), LoadStatus::Reset { reason });

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return (Index::default(), LoadStatus::Missing);
        }
        Err(err) => return reset(format!("unreadable: {err}")),
    };

    let index: Index = match serde_json::from_slice(&bytes) {
        Ok(index) => index,
        Err(err) => return reset(format!("malformed: {err}")),
    };
    if index.version != SNAPSHOT_VERSION {
        return reset(format!("unsupported version {}", index.version));
    }
    if let Err(violation) = index.check_consistency() {
        return reset(format!("inconsistent: {violation}"));
    }

    (index, LoadStatus::Loaded)
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
