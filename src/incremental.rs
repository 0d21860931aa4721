use std::collections::{BTreeMap, HashSet};

use crate::{
    index::{DocId, DocumentRecord},
    walker::DiscoveredFile,
};

/// Modification times closer than this are treated as unchanged.
pub const MTIME_EPSILON: f64 = 1e-6;

/// Result of comparing discovered files against the indexed documents.
#[derive(Debug, Default)]
pub struct DiffResult {
    /// Files that are new (not in the index).
    pub new_files: Vec<DiscoveredFile>,
    /// Files whose modification time differs from the indexed one.
    pub changed_files: Vec<DiscoveredFile>,
    /// Document ids that are indexed but no longer on disk, sorted.
    pub deleted_ids: Vec<DocId>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty()
            && self.changed_files.is_empty()
            && self.deleted_ids.is_empty()
    }
}

/// Compare discovered files against the stored document records.
///
/// `discovered` is expected in id order; new and changed files keep that
/// order.
pub fn diff_documents(
    known: &BTreeMap<DocId, DocumentRecord>,
    discovered: &[DiscoveredFile],
) -> DiffResult {
    let mut result = DiffResult::default();
    let mut seen = HashSet::with_capacity(discovered.len());

    for file in discovered {
        seen.insert(file.id.as_str());

        match known.get(&file.id) {
            None => result.new_files.push(file.clone()),
            Some(record) => {
                if (record.mtime - file.mtime).abs() >= MTIME_EPSILON {
                    result.changed_files.push(file.clone());
                }
            }
        }
    }

    result.deleted_ids = known
        .keys()
        .filter(|id| !seen.contains(id.as_str()))
        .cloned()
        .collect();

    result
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn make_file(name: &str, mtime: f64) -> DiscoveredFile {
        DiscoveredFile {
            id: name.to_string(),
            relative_path: PathBuf::from(name),
            absolute_path: PathBuf::from(format!("/abs/{name}")),
            mtime,
        }
    }

    fn known(entries: &[(&str, f64)]) -> BTreeMap<DocId, DocumentRecord> {
        entries
            .iter()
            .map(|&(id, mtime)| {
                (
                    id.to_string(),
                    DocumentRecord::new(
                        format!("/abs/{id}"),
                        mtime,
                        BTreeMap::new(),
                    ),
                )
            })
            .collect()
    }

    #[test]
    fn all_new_files() {
        let files = vec![make_file("a.txt", 100.0), make_file("b.txt", 200.0)];
        let diff = diff_documents(&BTreeMap::new(), &files);

        assert_eq!(diff.new_files.len(), 2);
        assert!(diff.changed_files.is_empty());
        assert!(diff.deleted_ids.is_empty());
    }

    #[test]
    fn unchanged_files() {
        let diff = diff_documents(
            &known(&[("a.txt", 100.5)]),
            &[make_file("a.txt", 100.5)],
        );
        assert!(diff.is_empty());
    }

    #[test]
    fn jitter_below_epsilon_is_ignored() {
        let diff = diff_documents(
            &known(&[("a.txt", 100.0)]),
            &[make_file("a.txt", 100.0 + MTIME_EPSILON / 10.0)],
        );
        assert!(diff.is_empty());
    }

    #[test]
    fn changed_file_detected() {
        let diff = diff_documents(
            &known(&[("a.txt", 100.0)]),
            &[make_file("a.txt", 100.25)],
        );
        assert!(diff.new_files.is_empty());
        assert_eq!(diff.changed_files.len(), 1);
        assert!(diff.deleted_ids.is_empty());
    }

    #[test]
    fn older_mtime_also_counts_as_change() {
        let diff = diff_documents(
            &known(&[("a.txt", 100.0)]),
            &[make_file("a.txt", 50.0)],
        );
        assert_eq!(diff.changed_files.len(), 1);
    }

    #[test]
    fn deleted_files_detected_in_order() {
        let diff = diff_documents(
            &known(&[("c.txt", 1.0), ("a.txt", 1.0), ("b.txt", 1.0)]),
            &[make_file("b.txt", 1.0)],
        );
        assert!(diff.new_files.is_empty());
        assert!(diff.changed_files.is_empty());
        assert_eq!(diff.deleted_ids, vec!["a.txt", "c.txt"]);
    }
}
