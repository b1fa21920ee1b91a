//! # OxiZip
//!
//! ZIP archive creation and extraction for OxiZip.
//!
//! This crate provides the engines on top of [`oxizip_core`]:
//!
//! - **Writer**: Archive files, directory trees and in-memory buffers
//! - **Extractor**: Unpack archives with path containment, CRC and size
//!   verification, permission and timestamp restoration
//! - **Resolver**: Expand directory inputs into entry names
//! - **Quick helpers**: Zip and unzip through the temporary directory
//!
//! Encryption uses traditional PKWARE (ZipCrypto) encryption; compression
//! is DEFLATE or stored.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxizip::{CompressionLevel, unzip_file, zip_files};
//!
//! zip_files(&["notes.txt", "photos/"], "backup.zip", Some("password"), CompressionLevel::Default)?;
//! unzip_file("backup.zip", "restored", true, Some("password"))?;
//! # Ok::<(), oxizip::ZipError>(())
//! ```
//!
//! ## Archive Extensions
//!
//! Only archives ending in `.zip` or `.cbz` are extracted unless further
//! extensions are registered with [`add_custom_file_extension`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod extract;
pub mod names;
pub mod quick;
pub mod resolve;
pub mod writer;

// Re-exports
pub use codec::{ZipArchiveReader, ZipArchiveWriter};
pub use extract::{FileExtractedFn, UNZIP_CHUNK_SIZE, Unzipper, unzip_file};
pub use names::NameSanitizer;
pub use oxizip_core::{
    ArchiveFile, CompressionLevel, DosTimestamp, EntryInfo, ErrorKind, ExtensionRegistry,
    Result, UnzipFailure, ZipError, ZipFailure, add_custom_file_extension,
    is_valid_file_extension, remove_custom_file_extension,
};
pub use quick::{
    quick_unzip_file, quick_unzip_file_with_progress, quick_zip_files,
    quick_zip_files_with_progress,
};
pub use resolve::{ProcessedPath, resolve_paths};
pub use writer::{ZIP_CHUNK_SIZE, Zipper, zip_data, zip_files};
