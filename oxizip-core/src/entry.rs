//! Archive entry metadata.
//!
//! [`EntryInfo`] is what a codec reports about the entry under its cursor;
//! [`ArchiveFile`] is an in-memory buffer a caller wants stored as an entry.

use crate::dostime::DosTimestamp;
use std::time::SystemTime;

/// Lowest permission set restored on extraction (owner read only).
pub const MIN_RESTORED_MODE: u32 = 0o400;

/// Highest permission set restored on extraction (full access).
pub const MAX_RESTORED_MODE: u32 = 0o777;

/// Metadata of the entry currently open in a codec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryInfo {
    /// Stored name, exactly as found in the archive.
    pub name: String,
    /// Compressed size in bytes.
    pub compressed_size: u64,
    /// Declared uncompressed size in bytes.
    pub uncompressed_size: u64,
    /// External file attributes (Unix mode in the high 16 bits).
    pub external_attributes: u32,
    /// Last modification time.
    pub modified: DosTimestamp,
}

impl EntryInfo {
    /// Create info for a named entry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder method to set both sizes.
    pub fn with_sizes(mut self, compressed: u64, uncompressed: u64) -> Self {
        self.compressed_size = compressed;
        self.uncompressed_size = uncompressed;
        self
    }

    /// Builder method to set external attributes.
    pub fn with_external_attributes(mut self, attributes: u32) -> Self {
        self.external_attributes = attributes;
        self
    }

    /// Builder method to set a Unix mode (stored in the high 16 bits).
    pub fn with_unix_mode(mut self, mode: u32) -> Self {
        self.external_attributes = mode << 16;
        self
    }

    /// Builder method to set the modification time.
    pub fn with_modified(mut self, modified: DosTimestamp) -> Self {
        self.modified = modified;
        self
    }

    /// Whether the stored name marks a directory.
    pub fn is_dir(&self) -> bool {
        crate::path::is_directory_name(&self.name)
    }

    /// POSIX permission bits worth restoring.
    ///
    /// Returns `None` when the entry has no external attributes or the
    /// decoded mode lies outside `0o400..=0o777`.
    pub fn posix_permissions(&self) -> Option<u32> {
        if self.external_attributes == 0 {
            return None;
        }
        let mode = (self.external_attributes >> 16) & 0o777;
        (MIN_RESTORED_MODE..=MAX_RESTORED_MODE)
            .contains(&mode)
            .then_some(mode)
    }
}

/// In-memory data that will be archived as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    /// Entry name inside the archive (forward-slash separated).
    pub name: String,
    /// File contents.
    pub data: Vec<u8>,
    /// Modification time to store; the zero DOS time is used when absent.
    pub modified: Option<SystemTime>,
}

impl ArchiveFile {
    /// Create a new in-memory file.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            modified: None,
        }
    }

    /// Builder method to set the modification time.
    pub fn with_modified(mut self, time: SystemTime) -> Self {
        self.modified = Some(time);
        self
    }

    /// Size of the contents in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the contents are empty. Empty files are not archived.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// DOS timestamp for the entry header.
    pub fn dos_time(&self) -> DosTimestamp {
        self.modified
            .map(DosTimestamp::from_system_time)
            .unwrap_or(DosTimestamp::ZERO)
    }
}
