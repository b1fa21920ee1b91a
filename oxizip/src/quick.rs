//! One-call helpers that work in the system temporary directory.

use crate::extract::Unzipper;
use crate::writer::Zipper;
use oxizip_core::error::{Result, ZipError};
use std::env;
use std::path::{Path, PathBuf};

/// Extract an archive into `<temp dir>/<archive name without extension>`.
///
/// Existing files are overwritten. Returns the directory extracted into.
pub fn quick_unzip_file(archive: impl AsRef<Path>) -> Result<PathBuf> {
    quick_unzip_with(archive.as_ref(), Unzipper::new())
}

/// Like [`quick_unzip_file`], reporting progress to `progress`.
pub fn quick_unzip_file_with_progress(
    archive: impl AsRef<Path>,
    progress: impl FnMut(f64),
) -> Result<PathBuf> {
    quick_unzip_with(archive.as_ref(), Unzipper::new().on_progress(progress))
}

fn quick_unzip_with(archive: &Path, mut unzipper: Unzipper<'_>) -> Result<PathBuf> {
    let stem = archive
        .file_stem()
        .ok_or_else(|| ZipError::file_not_found(archive))?;
    let destination = env::temp_dir().join(stem);
    unzipper.unzip_file(archive, &destination)?;
    Ok(destination)
}

/// Archive `paths` into `<temp dir>/<file_name>`, appending `.zip` unless
/// the name already ends with it.
///
/// Returns the path of the new archive.
pub fn quick_zip_files<P: AsRef<Path>>(paths: &[P], file_name: &str) -> Result<PathBuf> {
    quick_zip_with(paths, file_name, Zipper::new())
}

/// Like [`quick_zip_files`], reporting progress to `progress`.
pub fn quick_zip_files_with_progress<P: AsRef<Path>>(
    paths: &[P],
    file_name: &str,
    progress: impl FnMut(f64),
) -> Result<PathBuf> {
    quick_zip_with(paths, file_name, Zipper::new().on_progress(progress))
}

fn quick_zip_with<P: AsRef<Path>>(
    paths: &[P],
    file_name: &str,
    mut zipper: Zipper<'_>,
) -> Result<PathBuf> {
    let destination = env::temp_dir().join(archive_file_name(file_name));
    zipper.zip_files(paths, &destination)?;
    Ok(destination)
}

fn archive_file_name(file_name: &str) -> String {
    if file_name.ends_with(".zip") {
        file_name.to_string()
    } else {
        format!("{file_name}.zip")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_file_name() {
        assert_eq!(archive_file_name("archive"), "archive.zip");
        assert_eq!(archive_file_name("archive.zip"), "archive.zip");
        assert_eq!(archive_file_name("archive.cbz"), "archive.cbz.zip");
    }
}
