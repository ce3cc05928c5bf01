//! File discovery.
//!
//! Explicit paths are kept in the order given: files as-is, directories
//! expanded recursively by extension. Paths that do not exist are kept too,
//! so the loader reports them as unreadable. Without explicit paths the
//! configured source directories under the repository root are searched.

use glob::{glob, Pattern};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Expand `paths` (or `dirs` under `root` when `paths` is empty) into the
/// list of files to scan, without duplicates.
pub fn discover(
    root: &Path,
    paths: &[PathBuf],
    dirs: &[String],
    extensions: &[String],
) -> Vec<PathBuf> {
    let mut files = OrderedSet::default();
    if paths.is_empty() {
        for d in dirs {
            let dir = root.join(d);
            if !dir.is_dir() {
                tracing::debug!("source directory {} not found, skipping", dir.display());
                continue;
            }
            files.extend(expand_dir(&dir, extensions));
        }
    } else {
        for p in paths {
            if p.is_dir() {
                files.extend(expand_dir(p, extensions));
            } else {
                files.extend([p.clone()]);
            }
        }
    }
    tracing::debug!("discovered {} source files", files.items.len());
    files.items
}

/// Every file below `dir` with one of `extensions`, sorted.
pub fn expand_dir(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let base = Pattern::escape(&dir.to_string_lossy());
    let mut out: Vec<PathBuf> = Vec::new();
    for ext in extensions {
        let pattern = format!("{}/**/*.{}", base, ext.trim_start_matches('.'));
        let Ok(entries) = glob(&pattern) else {
            tracing::warn!("invalid discovery pattern {}", pattern);
            continue;
        };
        out.extend(entries.flatten().filter(|p| p.is_file()));
    }
    out.sort();
    out.dedup();
    out
}

/// Paths in first-seen order.
#[derive(Default)]
struct OrderedSet {
    items: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl OrderedSet {
    fn extend(&mut self, found: impl IntoIterator<Item = PathBuf>) {
        for f in found {
            if self.seen.insert(f.clone()) {
                self.items.push(f);
            }
        }
    }
}
