//! fuzzdoc - offline fuzzy full-text search over a directory of text files.
//!
//! fuzzdoc keeps an inverted index of a corpus directory in a single JSON
//! snapshot, updates it incrementally from file modification times, and
//! ranks documents with tf-idf over the query terms plus their closest
//! vocabulary matches.
//!
//! # Quick start
//!
//! ```no_run
//! use fuzzdoc::{DataDir, IndexStore, SearchConfig, SearchEngine, StoreConfig};
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let mut store =
//!     IndexStore::new(StoreConfig::from_data_dir(&data_dir, None)).unwrap();
//! let stats = store.build_index(false).unwrap();
//! println!("{} documents, {} terms", stats.total_docs, stats.vocab_size);
//!
//! let engine = SearchEngine::new(SearchConfig::default());
//! for hit in engine.search(&mut store, "rust programing", 5) {
//!     println!("{} (score: {:.4})", hit.doc_id, hit.score);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod data_dir;
pub mod error;
pub mod fuzzy;
pub mod incremental;
pub mod index;
pub mod search;
pub mod shell;
pub mod store;
pub mod tokenizer;
pub mod walker;

pub use config::{SearchConfig, StoreConfig};
pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use index::{DocumentRecord, Index};
pub use search::{SearchEngine, SearchHit};
pub use store::{BuildStats, IndexStore, LoadStatus};
pub use tokenizer::tokenize;
