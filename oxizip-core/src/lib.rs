//! # OxiZip Core
//!
//! Core components for the OxiZip archive library.
//!
//! This crate provides the building blocks shared by the zip and unzip
//! engines:
//!
//! - [`error`]: The three-kind error taxonomy and codec errors
//! - [`entry`]: Entry metadata and in-memory archive files
//! - [`traits`]: The codec seam and compression levels
//! - [`dostime`]: MS-DOS date/time packing
//! - [`path`]: Lexical path standardization and containment
//! - [`extension`]: Recognized archive extensions
//! - [`progress`]: Progress accounting
//!
//! ## Architecture
//!
//! OxiZip is layered like its sibling OxiArc:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Convenience                                         │
//! │     quick zip/unzip into the temporary directory        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Engines                                             │
//! │     path resolver, streaming writer, safe extractor     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Model (this crate)                                  │
//! │     errors, codec traits, DOS time, path containment    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: Codec                                               │
//! │     ZIP binary format, DEFLATE, CRC-32, ZipCrypto       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxizip_core::dostime::DosTimestamp;
//! use oxizip_core::path::resolve_entry_path;
//! use std::path::Path;
//!
//! let ts = DosTimestamp::from_unix_utc(315_532_800);
//! assert_eq!(ts.raw(), 0x0021_0000);
//!
//! assert!(resolve_entry_path(Path::new("/tmp/out"), "../etc/passwd").is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod dostime;
pub mod entry;
pub mod error;
pub mod extension;
pub mod path;
pub mod progress;
pub mod traits;

// Re-exports for convenience
pub use dostime::{DosDateTime, DosTimestamp};
pub use entry::{ArchiveFile, EntryInfo};
pub use error::{CodecError, ErrorKind, Result, UnzipFailure, ZipError, ZipFailure};
pub use extension::{
    ExtensionRegistry, add_custom_file_extension, is_valid_file_extension,
    remove_custom_file_extension,
};
pub use path::{PathRejection, resolve_entry_path, standardize};
pub use progress::{ProgressFn, ProgressTracker};
pub use traits::{
    ArchiveCursor, ArchiveSink, CodecResult, CompressionLevel, EntryOptions, EntryStream,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::dostime::DosTimestamp;
    pub use crate::entry::{ArchiveFile, EntryInfo};
    pub use crate::error::{ErrorKind, Result, ZipError};
    pub use crate::traits::{ArchiveCursor, ArchiveSink, CompressionLevel, EntryStream};
}
