use std::{
    fs::ReadDir,
    path::{Component, Path, PathBuf},
    time::SystemTime,
};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::Result;

/// A discovered document file.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredFile {
    /// Stable document id: the relative path with `/` separators.
    pub id: String,
    /// Path relative to the corpus root directory.
    pub relative_path: PathBuf,
    /// Fully resolved absolute path.
    pub absolute_path: PathBuf,
    /// Last modification time as fractional seconds since the Unix epoch.
    pub mtime: f64,
}

/// Compile the configured file patterns into one matcher.
pub fn build_matcher<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern.as_ref())?);
    }
    Ok(builder.build()?)
}

/// Recursively walk the corpus root and discover matching document files.
///
/// The root is created when it does not exist yet. Hidden files and
/// directories (names starting with `.`) are skipped. Only problems with the
/// root itself are errors; an entry below it that cannot be read is logged
/// and skipped. Results are sorted by id and ids are unique.
pub fn discover_files(
    root: &Path,
    matcher: &GlobSet,
) -> Result<Vec<DiscoveredFile>> {
    if !root.exists() {
        tracing::info!(root = %root.display(), "creating corpus directory");
        std::fs::create_dir_all(root)?;
    }

    let canonical_root = root.canonicalize()?;
    let entries = std::fs::read_dir(&canonical_root)?;
    let mut results = Vec::new();
    walk_dir(&canonical_root, entries, matcher, &mut results);

    results.sort_by(|a, b| {
        a.id.cmp(&b.id)
            .then_with(|| a.relative_path.cmp(&b.relative_path))
    });
    results.dedup_by(|dup, kept| {
        let same = dup.id == kept.id;
        if same {
            tracing::warn!(
                id = %kept.id,
                kept = %kept.relative_path.display(),
                skipped = %dup.relative_path.display(),
                "file names map to the same document id, skipping duplicate"
            );
        }
        same
    });
    Ok(results)
}

fn walk_dir(
    root: &Path,
    entries: ReadDir,
    matcher: &GlobSet,
    results: &mut Vec<DiscoveredFile>,
) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping entry");
                continue;
            }
        };

        if file_type.is_dir() {
            match std::fs::read_dir(&path) {
                Ok(sub) => walk_dir(root, sub, matcher, results),
                Err(err) => tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "skipping unreadable directory"
                ),
            }
        } else if file_type.is_file() || file_type.is_symlink() {
            collect_file(root, &path, matcher, results);
        }
    }
}

/// Add `path` to `results` when it matches; failures are logged and skipped.
fn collect_file(
    root: &Path,
    path: &Path,
    matcher: &GlobSet,
    results: &mut Vec<DiscoveredFile>,
) {
    let relative_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    let id = document_id(&relative_path);
    if !matcher.is_match(&id) {
        return;
    }

    match resolve_file(path) {
        Ok(Some((absolute_path, mtime))) => results.push(DiscoveredFile {
            id,
            relative_path,
            absolute_path,
            mtime,
        }),
        // Directory links are not followed; this also rules out cycles.
        Ok(None) => {}
        Err(err) => tracing::warn!(
            path = %path.display(),
            error = %err,
            "skipping file that vanished or cannot be resolved"
        ),
    }
}

/// Canonical path and mtime of a regular file, following symlinks.
fn resolve_file(path: &Path) -> std::io::Result<Option<(PathBuf, f64)>> {
    let absolute_path = path.canonicalize()?;
    let metadata = std::fs::metadata(&absolute_path)?;
    if !metadata.is_file() {
        return Ok(None);
    }

    let mtime = metadata
        .modified()
        .unwrap_or(SystemTime::UNIX_EPOCH)
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    Ok(Some((absolute_path, mtime)))
}

/// Derive the document id from a path relative to the corpus root.
pub fn document_id(relative_path: &Path) -> String {
    relative_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Read a document as text, substituting invalid UTF-8 sequences.
pub fn read_document(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
