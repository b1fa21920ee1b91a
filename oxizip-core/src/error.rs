//! Error types for OxiZip operations.
//!
//! Every failure surfaced to a caller is one of three kinds, mirroring the
//! direction of the operation that failed:
//!
//! - [`ZipError::FileNotFound`]: the source archive is missing or carries an
//!   unrecognized extension.
//! - [`ZipError::UnzipFail`]: anything that goes wrong while reading,
//!   positioning, validating or streaming an archive entry.
//! - [`ZipError::ZipFail`]: anything that goes wrong while creating an archive.
//!
//! The `reason` carried by the last two variants is a typed enum so callers
//! can still tell a CRC mismatch from a path-traversal attempt.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error reported by an archive codec (the component doing the actual ZIP
/// binary I/O and compression).
#[derive(Debug, Error)]
pub enum CodecError {
    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive structure is invalid or unsupported.
    #[error("Invalid archive: {message}")]
    InvalidArchive {
        /// Description reported by the codec.
        message: String,
    },

    /// The entry is encrypted and no password was supplied.
    #[error("Password required")]
    PasswordRequired,

    /// The supplied password does not decrypt the entry.
    #[error("Invalid password")]
    InvalidPassword,

    /// The archive contains no entries to position on.
    #[error("End of entry list")]
    EndOfList,

    /// The decompressed data does not match the stored CRC-32.
    #[error("CRC mismatch")]
    CrcMismatch,
}

impl CodecError {
    /// Create an invalid archive error.
    pub fn invalid_archive(message: impl Into<String>) -> Self {
        Self::InvalidArchive {
            message: message.into(),
        }
    }
}

/// Why an extraction failed.
#[derive(Debug, Error)]
pub enum UnzipFailure {
    /// The archive could not be opened by the codec.
    #[error("cannot open archive: {0}")]
    OpenArchive(#[source] CodecError),

    /// The destination directory could not be made absolute.
    #[error("cannot resolve destination directory: {0}")]
    Destination(#[source] io::Error),

    /// The codec could not position on the first entry.
    #[error("cannot position on first entry: {0}")]
    FirstEntry(#[source] CodecError),

    /// The current entry could not be opened.
    #[error("cannot open entry: {0}")]
    OpenEntry(#[source] CodecError),

    /// The codec could not advance to the next entry.
    #[error("cannot advance to next entry: {0}")]
    NextEntry(#[source] CodecError),

    /// The entry has an empty stored name.
    #[error("entry name is empty")]
    EmptyName,

    /// The entry would be written outside the destination directory.
    #[error("entry escapes destination directory")]
    PathTraversal,

    /// Reading decompressed bytes failed.
    #[error("cannot read entry data: {0}")]
    Read(#[source] CodecError),

    /// The output file could not be created.
    #[error("cannot create output file: {0}")]
    CreateOutput(#[source] io::Error),

    /// A chunk could not be fully written to the output file.
    #[error("cannot write output file: {0}")]
    Write(#[source] io::Error),

    /// The codec reported a CRC mismatch when closing the entry.
    #[error("CRC mismatch")]
    CrcMismatch,

    /// Closing the entry failed for a reason other than CRC.
    #[error("cannot close entry: {0}")]
    CloseEntry(#[source] CodecError),

    /// The number of bytes written differs from the declared size.
    #[error("size mismatch: declared {declared} bytes, wrote {written}")]
    SizeMismatch {
        /// Uncompressed size declared by the entry metadata.
        declared: u64,
        /// Bytes actually written to disk.
        written: u64,
    },
}

/// Why an archive creation failed.
#[derive(Debug, Error)]
pub enum ZipFailure {
    /// The destination archive could not be created.
    #[error("cannot create archive: {0}")]
    CreateArchive(#[source] CodecError),

    /// A source file could not be opened for reading.
    #[error("cannot open source file: {0}")]
    OpenSource(#[source] io::Error),

    /// A source file could not be read.
    #[error("cannot read source file: {0}")]
    ReadSource(#[source] io::Error),

    /// No archive entry name could be derived for a source path.
    #[error("no entry name could be derived")]
    NoEntryName,

    /// The streaming buffer could not be allocated.
    #[error("cannot allocate {size} byte buffer")]
    BufferAllocation {
        /// Requested buffer size.
        size: usize,
    },

    /// The codec failed while writing.
    #[error("codec write failed: {0}")]
    Codec(#[source] CodecError),
}

/// The three error kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source archive is missing or has an unrecognized extension.
    FileNotFound,
    /// Extraction failed.
    UnzipFail,
    /// Archive creation failed.
    ZipFail,
}

impl ErrorKind {
    /// A short human readable description of the kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::FileNotFound => "File not found.",
            Self::UnzipFail => "Failed to unzip file.",
            Self::ZipFail => "Failed to zip file.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// The main error type for OxiZip operations.
#[derive(Debug, Error)]
pub enum ZipError {
    /// Source archive missing or not a recognized archive extension.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// The archive path that was requested.
        path: PathBuf,
    },

    /// Extraction failed.
    #[error("Failed to unzip file{}: {reason}", entry_suffix(.entry.as_deref()))]
    UnzipFail {
        /// Stored name of the entry being processed, if any.
        entry: Option<String>,
        /// What went wrong.
        #[source]
        reason: UnzipFailure,
    },

    /// Archive creation failed.
    #[error("Failed to zip file{}: {reason}", path_suffix(.path.as_deref()))]
    ZipFail {
        /// Source path being archived, if any.
        path: Option<PathBuf>,
        /// What went wrong.
        #[source]
        reason: ZipFailure,
    },
}

fn entry_suffix(entry: Option<&str>) -> String {
    entry.map(|e| format!(" ({e})")).unwrap_or_default()
}

fn path_suffix(path: Option<&Path>) -> String {
    path.map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

/// Result type alias for OxiZip operations.
pub type Result<T> = std::result::Result<T, ZipError>;

impl ZipError {
    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create an extraction error that is not tied to a specific entry.
    pub fn unzip(reason: UnzipFailure) -> Self {
        Self::UnzipFail {
            entry: None,
            reason,
        }
    }

    /// Create an extraction error for a named entry.
    pub fn unzip_entry(entry: impl Into<String>, reason: UnzipFailure) -> Self {
        Self::UnzipFail {
            entry: Some(entry.into()),
            reason,
        }
    }

    /// Create an archive creation error that is not tied to a source path.
    pub fn zip(reason: ZipFailure) -> Self {
        Self::ZipFail { path: None, reason }
    }

    /// Create an archive creation error for a source path.
    pub fn zip_path(path: impl Into<PathBuf>, reason: ZipFailure) -> Self {
        Self::ZipFail {
            path: Some(path.into()),
            reason,
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::UnzipFail { .. } => ErrorKind::UnzipFail,
            Self::ZipFail { .. } => ErrorKind::ZipFail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_descriptions() {
        assert_eq!(ErrorKind::FileNotFound.description(), "File not found.");
        assert_eq!(ErrorKind::UnzipFail.description(), "Failed to unzip file.");
        assert_eq!(ErrorKind::ZipFail.description(), "Failed to zip file.");
    }

    #[test]
    fn test_error_display() {
        let err = ZipError::file_not_found("/nowhere/bb9.zip");
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert!(err.to_string().contains("bb9.zip"));

        let err = ZipError::unzip_entry("../naughtyFile.txt", UnzipFailure::PathTraversal);
        assert_eq!(err.kind(), ErrorKind::UnzipFail);
        assert!(err.to_string().contains("naughtyFile.txt"));
        assert!(err.to_string().contains("escapes"));

        let err = ZipError::zip(ZipFailure::NoEntryName);
        assert_eq!(err.kind(), ErrorKind::ZipFail);
        assert_eq!(
            err.to_string(),
            "Failed to zip file: no entry name could be derived"
        );
    }

    #[test]
    fn test_size_mismatch_display() {
        let err = ZipError::unzip(UnzipFailure::SizeMismatch {
            declared: 10,
            written: 4,
        });
        assert!(err.to_string().contains("declared 10 bytes, wrote 4"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: CodecError = io_err.into();
        assert!(matches!(err, CodecError::Io(_)));
    }
}
