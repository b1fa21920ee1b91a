//! Streaming archive creation.
//!
//! [`Zipper`] writes files from disk or in-memory buffers into a new archive.
//! Source files are streamed through a fixed 16 KiB buffer, so memory use
//! does not depend on file size.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxizip::{CompressionLevel, Zipper};
//!
//! let mut zipper = Zipper::new()
//!     .password("secret")
//!     .compression(CompressionLevel::Best)
//!     .on_progress(|p| println!("{:.0}%", p * 100.0));
//! zipper.zip_files(&["photos/"], "photos.zip")?;
//! # Ok::<(), oxizip::ZipError>(())
//! ```

use crate::codec::ZipArchiveWriter;
use crate::resolve::{ProcessedPath, resolve_paths};
use log::{debug, trace};
use oxizip_core::dostime::DosTimestamp;
use oxizip_core::entry::ArchiveFile;
use oxizip_core::error::{Result, ZipError, ZipFailure};
use oxizip_core::progress::{ProgressFn, ProgressTracker};
use oxizip_core::traits::{ArchiveSink, CompressionLevel, EntryOptions};
use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::Path;

/// Size of the buffer used to stream source data into the archive.
pub const ZIP_CHUNK_SIZE: usize = 16 * 1024;

/// Builder-style archive writer.
pub struct Zipper<'cb> {
    password: Option<String>,
    level: CompressionLevel,
    include_root: bool,
    progress: Option<ProgressFn<'cb>>,
}

impl Default for Zipper<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'cb> Zipper<'cb> {
    /// Create a writer with default compression, no password, and directory
    /// inputs stored under their own name.
    pub fn new() -> Self {
        Self {
            password: None,
            level: CompressionLevel::Default,
            include_root: true,
            progress: None,
        }
    }

    /// Encrypt every entry with `password`.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the compression level.
    pub fn compression(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Whether files under a directory input are prefixed with the
    /// directory's name.
    pub fn include_root_directory(mut self, include: bool) -> Self {
        self.include_root = include;
        self
    }

    /// Receive progress updates in `0.0..=1.0`.
    pub fn on_progress(mut self, callback: impl FnMut(f64) + 'cb) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Archive files and directories into a new archive at `destination`.
    ///
    /// Directory inputs are expanded recursively. An existing file at
    /// `destination` is replaced.
    pub fn zip_files<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        destination: impl AsRef<Path>,
    ) -> Result<()> {
        let destination = destination.as_ref();
        let processed = resolve_paths(paths, self.include_root);
        let sink = ZipArchiveWriter::create(destination)
            .map_err(|e| ZipError::zip_path(destination, ZipFailure::CreateArchive(e)))?;
        self.write_paths(&processed, sink)
    }

    /// Archive in-memory buffers into a new archive at `destination`.
    ///
    /// Empty buffers are skipped.
    pub fn zip_data(&mut self, files: &[ArchiveFile], destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        let sink = ZipArchiveWriter::create(destination)
            .map_err(|e| ZipError::zip_path(destination, ZipFailure::CreateArchive(e)))?;
        self.write_data(files, sink)
    }

    /// Write resolved paths into `sink` and close it.
    pub fn write_paths<S: ArchiveSink>(&mut self, paths: &[ProcessedPath], mut sink: S) -> Result<()> {
        let total = paths.iter().map(|p| source_size(&p.source)).sum();
        let mut buffer = allocate_buffer(ZIP_CHUNK_SIZE)?;
        let mut progress = ProgressTracker::new(total, self.progress.as_deref_mut());

        for path in paths {
            let source = path.source.as_path();
            if source.is_dir() {
                continue;
            }

            let mut input = File::open(source)
                .map_err(|e| ZipError::zip_path(source, ZipFailure::OpenSource(e)))?;
            let name = path
                .entry_name
                .as_deref()
                .ok_or_else(|| ZipError::zip_path(source, ZipFailure::NoEntryName))?;

            let metadata = input.metadata().ok();
            let size = metadata.as_ref().map_or(0, Metadata::len);
            let options = EntryOptions {
                modified: metadata
                    .as_ref()
                    .and_then(|m| m.modified().ok())
                    .map_or(DosTimestamp::ZERO, DosTimestamp::from_system_time),
                level: self.level,
                password: self.password.as_deref(),
                unix_mode: metadata.as_ref().and_then(unix_mode),
                size_hint: size,
            };

            debug!("adding {} as {name}", source.display());
            sink.open_new_entry(name, &options)
                .map_err(|e| ZipError::zip_path(source, ZipFailure::Codec(e)))?;
            copy_into(&mut input, &mut sink, &mut buffer)
                .map_err(|reason| ZipError::zip_path(source, reason))?;
            sink.close_current()
                .map_err(|e| ZipError::zip_path(source, ZipFailure::Codec(e)))?;

            progress.advance(size);
            progress.report_unless_complete();
        }

        sink.close_archive()
            .map_err(|e| ZipError::zip(ZipFailure::Codec(e)))?;
        progress.finish();
        Ok(())
    }

    /// Write in-memory files into `sink` and close it.
    pub fn write_data<S: ArchiveSink>(&mut self, files: &[ArchiveFile], mut sink: S) -> Result<()> {
        let total = files.iter().map(|f| f.len() as u64).sum();
        let mut buffer = allocate_buffer(ZIP_CHUNK_SIZE)?;
        let mut progress = ProgressTracker::new(total, self.progress.as_deref_mut());

        for file in files {
            if file.is_empty() {
                trace!("skipping empty buffer {}", file.name);
                continue;
            }
            if file.name.is_empty() {
                return Err(ZipError::zip(ZipFailure::NoEntryName));
            }

            let options = EntryOptions {
                modified: file.dos_time(),
                level: self.level,
                password: self.password.as_deref(),
                unix_mode: None,
                size_hint: file.len() as u64,
            };

            debug!("adding {} bytes as {}", file.len(), file.name);
            let codec_error = |e| ZipError::zip_path(&file.name, ZipFailure::Codec(e));
            sink.open_new_entry(&file.name, &options).map_err(codec_error)?;
            copy_into(&mut file.data.as_slice(), &mut sink, &mut buffer)
                .map_err(|reason| ZipError::zip_path(&file.name, reason))?;
            sink.close_current().map_err(codec_error)?;

            progress.advance(file.len() as u64);
            progress.report_unless_complete();
        }

        sink.close_archive()
            .map_err(|e| ZipError::zip(ZipFailure::Codec(e)))?;
        progress.finish();
        Ok(())
    }
}

/// Stream `input` into the open entry of `sink`.
fn copy_into<R: Read, S: ArchiveSink>(
    input: &mut R,
    sink: &mut S,
    buffer: &mut [u8],
) -> std::result::Result<u64, ZipFailure> {
    let mut copied = 0u64;
    loop {
        let n = match input.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ZipFailure::ReadSource(e)),
        };
        sink.write_current(&buffer[..n]).map_err(ZipFailure::Codec)?;
        copied += n as u64;
    }
    Ok(copied)
}

fn allocate_buffer(size: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(size)
        .map_err(|_| ZipError::zip(ZipFailure::BufferAllocation { size }))?;
    buffer.resize(size, 0);
    Ok(buffer)
}

/// Size of a source file; unreadable sources count as empty.
fn source_size(path: &Path) -> u64 {
    fs::metadata(path).map_or(0, |m| if m.is_dir() { 0 } else { m.len() })
}

#[cfg(unix)]
fn unix_mode(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn unix_mode(_metadata: &Metadata) -> Option<u32> {
    None
}

/// Archive files and directories with the default settings.
pub fn zip_files<P: AsRef<Path>>(
    paths: &[P],
    destination: impl AsRef<Path>,
    password: Option<&str>,
    level: CompressionLevel,
) -> Result<()> {
    let mut zipper = Zipper::new().compression(level);
    if let Some(password) = password {
        zipper = zipper.password(password);
    }
    zipper.zip_files(paths, destination)
}

/// Archive in-memory buffers with the default settings.
pub fn zip_data(
    files: &[ArchiveFile],
    destination: impl AsRef<Path>,
    password: Option<&str>,
    level: CompressionLevel,
) -> Result<()> {
    let mut zipper = Zipper::new().compression(level);
    if let Some(password) = password {
        zipper = zipper.password(password);
    }
    zipper.zip_data(files, destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxizip_core::error::{CodecError, ErrorKind};
    use oxizip_core::traits::CodecResult;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Records entries instead of encoding them.
    #[derive(Default)]
    struct RecordingSink {
        entries: Vec<(String, DosTimestamp, Vec<u8>)>,
        writes: Vec<usize>,
        closed: bool,
    }

    impl ArchiveSink for &mut RecordingSink {
        fn open_new_entry(&mut self, name: &str, options: &EntryOptions<'_>) -> CodecResult<()> {
            self.entries
                .push((name.to_string(), options.modified, Vec::new()));
            Ok(())
        }

        fn write_current(&mut self, data: &[u8]) -> CodecResult<()> {
            self.writes.push(data.len());
            match self.entries.last_mut() {
                Some(entry) => {
                    entry.2.extend_from_slice(data);
                    Ok(())
                }
                None => Err(CodecError::invalid_archive("no open entry")),
            }
        }

        fn close_current(&mut self) -> CodecResult<()> {
            Ok(())
        }

        fn close_archive(self) -> CodecResult<()> {
            self.closed = true;
            Ok(())
        }
    }

    #[test]
    fn test_write_data_skips_empty_buffers() {
        let files = vec![
            ArchiveFile::new("a.txt", b"alpha".to_vec()),
            ArchiveFile::new("empty.txt", Vec::new()),
            ArchiveFile::new("b.txt", b"bravo".to_vec()),
        ];
        let mut sink = RecordingSink::default();
        Zipper::new().write_data(&files, &mut sink).expect("write");

        let names: Vec<_> = sink.entries.iter().map(|e| e.0.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert!(sink.entries.iter().all(|e| e.1.is_zero()));
        assert!(sink.closed);
    }

    #[test]
    fn test_large_source_is_chunked() {
        let data = vec![7u8; ZIP_CHUNK_SIZE * 2 + 10];
        let files = vec![ArchiveFile::new("big.bin", data.clone())];
        let mut sink = RecordingSink::default();
        Zipper::new().write_data(&files, &mut sink).expect("write");

        assert_eq!(sink.writes, vec![ZIP_CHUNK_SIZE, ZIP_CHUNK_SIZE, 10]);
        assert_eq!(sink.entries[0].2, data);
    }

    #[test]
    fn test_data_progress() {
        let seen = RefCell::new(Vec::new());
        let files = vec![
            ArchiveFile::new("a", vec![0u8; 30]),
            ArchiveFile::new("b", vec![0u8; 10]),
        ];
        let mut sink = RecordingSink::default();
        Zipper::new()
            .on_progress(|p| seen.borrow_mut().push(p))
            .write_data(&files, &mut sink)
            .expect("write");

        // The last file reaches 1.0 and is only reported once, on finish.
        assert_eq!(seen.into_inner(), vec![0.75, 1.0]);
    }

    #[test]
    fn test_unnamed_buffer_rejected() {
        let files = vec![ArchiveFile::new("", b"data".to_vec())];
        let mut sink = RecordingSink::default();
        let err = Zipper::new().write_data(&files, &mut sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ZipFail);
    }

    #[test]
    fn test_write_paths_records_mtime() {
        let tmp = TempDir::new().expect("tempdir");
        let file = tmp.path().join("note.txt");
        fs::write(&file, b"hello").expect("write");

        let mut sink = RecordingSink::default();
        let paths = resolve_paths(&[&file], true);
        Zipper::new().write_paths(&paths, &mut sink).expect("zip");

        assert_eq!(sink.entries.len(), 1);
        assert_eq!(sink.entries[0].0, "note.txt");
        assert!(!sink.entries[0].1.is_zero());
        assert_eq!(sink.entries[0].2, b"hello");
    }

    #[test]
    fn test_missing_source_fails() {
        let tmp = TempDir::new().expect("tempdir");
        let paths = resolve_paths(&[tmp.path().join("missing.txt")], true);
        let mut sink = RecordingSink::default();
        let err = Zipper::new().write_paths(&paths, &mut sink).unwrap_err();
        assert!(matches!(
            err,
            ZipError::ZipFail {
                reason: ZipFailure::OpenSource(_),
                ..
            }
        ));
        assert!(!sink.closed);
    }

    #[test]
    fn test_nameless_source_fails() {
        let tmp = TempDir::new().expect("tempdir");
        let file = tmp.path().join("x");
        fs::write(&file, b"x").expect("write");
        let paths = vec![ProcessedPath::new(&file, None)];
        let mut sink = RecordingSink::default();
        let err = Zipper::new().write_paths(&paths, &mut sink).unwrap_err();
        assert!(matches!(
            err,
            ZipError::ZipFail {
                reason: ZipFailure::NoEntryName,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_input_reports_completion() {
        let seen = RefCell::new(Vec::new());
        let mut sink = RecordingSink::default();
        Zipper::new()
            .on_progress(|p| seen.borrow_mut().push(p))
            .write_paths(&[], &mut sink)
            .expect("zip");
        assert_eq!(seen.into_inner(), vec![1.0]);
        assert!(sink.closed);
    }
}
