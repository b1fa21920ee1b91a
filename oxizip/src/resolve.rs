//! Expansion of user-supplied paths into archive entries.
//!
//! Files map to a single entry named after their last path component.
//! Directories are walked recursively; every regular file below them becomes
//! an entry whose name is the path relative to the directory, optionally
//! prefixed with the directory's own name. Directories themselves never
//! produce entries, so empty directories are not archived.

use log::warn;
use oxizip_core::path::standardize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A source file paired with the name it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedPath {
    /// Where the file lives on disk.
    pub source: PathBuf,
    /// Name inside the archive, `/`-separated. `None` if no name could be
    /// derived from the source path.
    pub entry_name: Option<String>,
}

impl ProcessedPath {
    /// Pair `source` with an entry name.
    pub fn new(source: impl Into<PathBuf>, entry_name: Option<String>) -> Self {
        Self {
            source: source.into(),
            entry_name,
        }
    }
}

/// Expand `paths` into archive entries.
///
/// With `include_root`, files found under a directory input are stored as
/// `<dirname>/<relative path>`; otherwise only the relative path is used.
/// Directory contents are visited in file name order. Unreadable
/// subdirectories are skipped with a warning.
pub fn resolve_paths<P: AsRef<Path>>(paths: &[P], include_root: bool) -> Vec<ProcessedPath> {
    let mut processed = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            expand_directory(path, include_root, &mut processed);
        } else {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            processed.push(ProcessedPath::new(path, name));
        }
    }

    processed
}

fn expand_directory(dir: &Path, include_root: bool, out: &mut Vec<ProcessedPath>) {
    let root_name = if include_root { root_name(dir) } else { None };

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable path under {}: {e}", dir.display());
                continue;
            }
        };

        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };
        let relative = join_components(relative);
        let name = match &root_name {
            Some(root) => format!("{root}/{relative}"),
            None => relative,
        };
        out.push(ProcessedPath::new(path, Some(name)));
    }
}

/// Name of a directory input, resolving `.` and `..` against the working
/// directory.
fn root_name(dir: &Path) -> Option<String> {
    let absolute = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
    standardize(&absolute)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

fn join_components(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
