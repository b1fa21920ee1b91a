//! Lexical path standardization and containment checks.
//!
//! Extraction writes every entry to `destination.join(name)`. A stored name
//! such as `../../etc/passwd` would escape the destination, so each output
//! path is standardized (`.` dropped, `..` folded into its parent) without
//! touching the filesystem and then required to stay under the standardized
//! destination. Nothing here performs I/O.

use std::path::{Component, Path, PathBuf};

/// Why an entry name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRejection {
    /// The stored name is empty.
    Empty,
    /// The standardized path is not inside the destination.
    OutsideDestination,
    /// The destination standardizes to an empty path or starts with `..`,
    /// so containment cannot be decided lexically.
    UnresolvedDestination,
}

/// Replace backslashes with forward slashes.
pub fn normalize_separators(name: &str) -> String {
    name.replace('\\', "/")
}

/// Check if a stored entry name denotes a directory.
pub fn is_directory_name(name: &str) -> bool {
    name.ends_with('/') || name.ends_with('\\')
}

/// Lexically standardize a path.
///
/// `.` components are removed and `..` removes the preceding normal
/// component. A `..` directly under the root is dropped (the root is its own
/// parent); a leading `..` on a relative path is kept since there is nothing
/// to fold it into.
pub fn standardize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    out.iter().map(|c| c.as_os_str()).collect()
}

fn climbs_out(path: &Path) -> bool {
    path.as_os_str().is_empty() || path.components().any(|c| c == Component::ParentDir)
}

/// Compute the output path for a stored entry name.
///
/// The name has its separators normalized, is joined to `destination`, and
/// the result is standardized. The path is only returned if it stays inside
/// the destination. Absolute stored names replace the destination when
/// joined and are therefore rejected unless they happen to point inside it.
///
/// `destination` should be absolute. A relative destination that
/// standardizes to nothing (`""`, `.`) or begins with `..` is rejected for
/// every name.
pub fn resolve_entry_path(destination: &Path, name: &str) -> Result<PathBuf, PathRejection> {
    if name.is_empty() {
        return Err(PathRejection::Empty);
    }

    let root = standardize(destination);
    if climbs_out(&root) {
        return Err(PathRejection::UnresolvedDestination);
    }

    let normalized = normalize_separators(name);
    let candidate = standardize(&destination.join(&normalized));

    if !climbs_out(&candidate) && candidate.starts_with(&root) {
        Ok(candidate)
    } else {
        Err(PathRejection::OutsideDestination)
    }
}
