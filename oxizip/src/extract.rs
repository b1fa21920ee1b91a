//! Safe archive extraction.
//!
//! [`Unzipper`] walks the entries of an archive in stored order and writes
//! each one under the destination directory. Every output path is checked
//! against the destination before anything is written, so entries named
//! like `../../etc/passwd` abort the extraction instead of escaping it.
//!
//! Per entry:
//!
//! 1. Resolve the output path and reject it if it leaves the destination.
//! 2. Create the directory (or the file's parent directories).
//! 3. Skip existing files when overwriting is disabled.
//! 4. Stream the data through a 4 KiB buffer, then verify CRC and size.
//! 5. Restore Unix permissions and the modification time.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxizip::Unzipper;
//!
//! let mut unzipper = Unzipper::new()
//!     .overwrite(false)
//!     .on_file_extracted(|path| println!("extracted {}", path.display()));
//! unzipper.unzip_file("bb8.zip", "out")?;
//! # Ok::<(), oxizip::ZipError>(())
//! ```

use crate::codec::ZipArchiveReader;
use crate::names::NameSanitizer;
use filetime::FileTime;
use log::{debug, trace, warn};
use oxizip_core::error::{CodecError, Result, UnzipFailure, ZipError};
use oxizip_core::extension::ExtensionRegistry;
use oxizip_core::path::{PathRejection, resolve_entry_path, standardize};
use oxizip_core::progress::{ProgressFn, ProgressTracker};
use oxizip_core::traits::{ArchiveCursor, EntryStream};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Size of the buffer used to stream entry data to disk.
pub const UNZIP_CHUNK_SIZE: usize = 4096;

/// Callback invoked with the output path of each extracted entry.
pub type FileExtractedFn<'a> = Box<dyn FnMut(&Path) + 'a>;

/// Builder-style archive extractor.
pub struct Unzipper<'cb> {
    overwrite: bool,
    password: Option<String>,
    sanitize_names: bool,
    registry: &'cb ExtensionRegistry,
    progress: Option<ProgressFn<'cb>>,
    file_extracted: Option<FileExtractedFn<'cb>>,
}

impl Default for Unzipper<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'cb> Unzipper<'cb> {
    /// Create an extractor that overwrites existing files and checks
    /// extensions against the process-wide registry.
    ///
    /// Names are sanitized for Windows when running on Windows.
    pub fn new() -> Self {
        Self {
            overwrite: true,
            password: None,
            sanitize_names: cfg!(windows),
            registry: ExtensionRegistry::global(),
            progress: None,
            file_extracted: None,
        }
    }

    /// Whether existing files are replaced. Skipped files are not reported
    /// to the extraction callback.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Decrypt entries with `password`.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Replace characters Windows forbids in file names.
    pub fn sanitize_names(mut self, sanitize: bool) -> Self {
        self.sanitize_names = sanitize;
        self
    }

    /// Check archive extensions against `registry` instead of the
    /// process-wide one.
    pub fn extension_registry(mut self, registry: &'cb ExtensionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Receive progress updates in `0.0..=1.0`.
    pub fn on_progress(mut self, callback: impl FnMut(f64) + 'cb) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Receive the output path of every entry written.
    pub fn on_file_extracted(mut self, callback: impl FnMut(&Path) + 'cb) -> Self {
        self.file_extracted = Some(Box::new(callback));
        self
    }

    /// Extract the archive at `archive` into `destination`.
    ///
    /// Fails with [`ZipError::FileNotFound`] if the archive does not exist or
    /// its extension is not recognized.
    pub fn unzip_file(
        &mut self,
        archive: impl AsRef<Path>,
        destination: impl AsRef<Path>,
    ) -> Result<()> {
        let archive = archive.as_ref();
        let extension = archive
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if !self.registry.is_valid(extension) {
            return Err(ZipError::file_not_found(archive));
        }
        let total = match fs::metadata(archive) {
            Ok(metadata) => metadata.len(),
            Err(_) => return Err(ZipError::file_not_found(archive)),
        };

        debug!(
            "extracting {} ({total} bytes) into {}",
            archive.display(),
            destination.as_ref().display()
        );
        let mut cursor = ZipArchiveReader::open(archive)
            .map_err(|e| ZipError::unzip(UnzipFailure::OpenArchive(e)))?;
        self.extract(&mut cursor, destination.as_ref(), total)
    }

    /// Extract every entry of `cursor` into `destination`.
    ///
    /// `total` is the denominator for progress; the compressed size of each
    /// processed entry counts towards it.
    pub fn extract<C: ArchiveCursor + ?Sized>(
        &mut self,
        cursor: &mut C,
        destination: &Path,
        total: u64,
    ) -> Result<()> {
        let root = std::path::absolute(destination)
            .map_err(|e| ZipError::unzip(UnzipFailure::Destination(e)))?;
        let root = standardize(&root);
        let mut names = self.sanitize_names.then(NameSanitizer::new);
        let mut buffer = vec![0u8; UNZIP_CHUNK_SIZE];
        let mut progress = ProgressTracker::new(total, self.progress.as_deref_mut());

        cursor
            .go_to_first()
            .map_err(|e| ZipError::unzip(UnzipFailure::FirstEntry(e)))?;

        loop {
            let extracted = {
                let mut entry = cursor
                    .open_current(self.password.as_deref())
                    .map_err(|e| ZipError::unzip(UnzipFailure::OpenEntry(e)))?;
                progress.advance(entry.info().compressed_size);
                extract_entry(
                    entry.as_mut(),
                    &root,
                    self.overwrite,
                    names.as_mut(),
                    &mut buffer,
                )?
            };

            let more = cursor
                .go_to_next()
                .map_err(|e| ZipError::unzip(UnzipFailure::NextEntry(e)))?;

            progress.report();
            if let (Some(path), Some(callback)) = (&extracted, self.file_extracted.as_mut()) {
                callback(path.as_path());
            }

            if !more {
                break;
            }
        }

        progress.finish();
        Ok(())
    }
}

/// Write one entry. Returns the output path, or `None` if an existing file
/// was left in place.
fn extract_entry(
    entry: &mut dyn EntryStream,
    root: &Path,
    overwrite: bool,
    names: Option<&mut NameSanitizer>,
    buffer: &mut [u8],
) -> Result<Option<PathBuf>> {
    let info = entry.info().clone();
    let stored = info.name.as_str();
    if stored.is_empty() {
        return Err(ZipError::unzip(UnzipFailure::EmptyName));
    }
    let fail = |reason| ZipError::unzip_entry(stored, reason);

    let is_dir = info.is_dir();
    let name = match names {
        Some(names) => names.sanitize(stored),
        None => stored.to_string(),
    };
    let output = resolve_entry_path(root, &name).map_err(|rejection| match rejection {
        PathRejection::Empty => fail(UnzipFailure::EmptyName),
        PathRejection::OutsideDestination | PathRejection::UnresolvedDestination => {
            fail(UnzipFailure::PathTraversal)
        }
    })?;

    let directory = if is_dir {
        Some(output.as_path())
    } else {
        output.parent()
    };
    if let Some(directory) = directory {
        if let Err(e) = fs::create_dir_all(directory) {
            debug!("cannot create {}: {e}", directory.display());
        }
    }

    if !is_dir && !overwrite && output.exists() {
        trace!("keeping existing {}", output.display());
        if let Err(e) = entry.close() {
            debug!("closing skipped entry {stored}: {e}");
        }
        return Ok(None);
    }

    let written = if is_dir {
        0
    } else {
        write_output(entry, &output, buffer).map_err(fail)?
    };

    entry.close().map_err(|e| match e {
        CodecError::CrcMismatch => fail(UnzipFailure::CrcMismatch),
        other => fail(UnzipFailure::CloseEntry(other)),
    })?;

    if written != info.uncompressed_size {
        return Err(fail(UnzipFailure::SizeMismatch {
            declared: info.uncompressed_size,
            written,
        }));
    }

    if let Some(mode) = info.posix_permissions() {
        if let Err(e) = set_permissions(&output, mode) {
            warn!("cannot set mode {mode:o} on {}: {e}", output.display());
        }
    }

    if !is_dir {
        if let Some(time) = info.modified.to_system_time() {
            if let Err(e) = filetime::set_file_mtime(&output, FileTime::from_system_time(time)) {
                debug!("cannot set mtime on {}: {e}", output.display());
            }
        }
    }

    Ok(Some(output))
}

fn write_output(
    entry: &mut dyn EntryStream,
    output: &Path,
    buffer: &mut [u8],
) -> std::result::Result<u64, UnzipFailure> {
    let mut file = File::create(output).map_err(UnzipFailure::CreateOutput)?;
    let mut written = 0u64;
    loop {
        let n = entry.read_chunk(buffer).map_err(UnzipFailure::Read)?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n]).map_err(UnzipFailure::Write)?;
        written += n as u64;
    }
    file.flush().map_err(UnzipFailure::Write)?;
    Ok(written)
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_permissions(path: &Path, mode: u32) -> std::io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(mode & 0o200 == 0);
    fs::set_permissions(path, permissions)
}

/// Extract an archive with the default settings.
///
/// Extension checks use the process-wide registry.
pub fn unzip_file(
    archive: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    overwrite: bool,
    password: Option<&str>,
) -> Result<()> {
    let mut unzipper = Unzipper::new().overwrite(overwrite);
    if let Some(password) = password {
        unzipper = unzipper.password(password);
    }
    unzipper.unzip_file(archive, destination)
}
