//! Codec seam traits and write-side options.
//!
//! The engines never touch the ZIP binary format directly. They drive a
//! codec through the narrow, cursor-shaped interface defined here:
//!
//! - [`ArchiveCursor`]: single-cursor reader over the entries of an archive.
//! - [`EntryStream`]: the decompressed contents of the entry under the cursor.
//! - [`ArchiveSink`]: writer that accepts one entry at a time.
//!
//! Only one entry is ever open at a time, which is why extraction and
//! creation are strictly sequential.

use crate::dostime::DosTimestamp;
use crate::entry::EntryInfo;
use crate::error::CodecError;

/// Result type for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Compression level requested for a write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Store entries without compression.
    None,
    /// Fastest DEFLATE setting.
    BestSpeed,
    /// The codec's default DEFLATE setting.
    #[default]
    Default,
    /// Smallest output, slowest.
    Best,
}

impl CompressionLevel {
    /// Numeric level in zlib convention (`-1` selects the codec default).
    pub fn codec_level(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::BestSpeed => 1,
            Self::Default => -1,
            Self::Best => 9,
        }
    }

    /// Check if entries are stored uncompressed.
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Get the level name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BestSpeed => "best-speed",
            Self::Default => "default",
            Self::Best => "best",
        }
    }
}

impl std::fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-entry header options handed to an [`ArchiveSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryOptions<'a> {
    /// Modification time for the local and central headers.
    pub modified: DosTimestamp,
    /// Compression level.
    pub level: CompressionLevel,
    /// Password for traditional PKWARE encryption.
    pub password: Option<&'a str>,
    /// Unix permission bits to record, if known.
    pub unix_mode: Option<u32>,
    /// Expected uncompressed size, used to decide on ZIP64 headers.
    pub size_hint: u64,
}

/// A single-cursor reader over the entries of an archive.
pub trait ArchiveCursor {
    /// Position on the first entry.
    ///
    /// Fails with [`CodecError::EndOfList`] on an empty archive.
    fn go_to_first(&mut self) -> CodecResult<()>;

    /// Advance to the next entry. Returns `false` at the end of the list.
    fn go_to_next(&mut self) -> CodecResult<bool>;

    /// Open the entry under the cursor for reading.
    ///
    /// The password is ignored for entries that are not encrypted.
    fn open_current(&mut self, password: Option<&str>) -> CodecResult<Box<dyn EntryStream + '_>>;
}

/// Decompressed contents of the entry under an [`ArchiveCursor`].
///
/// Dropping the stream releases it; [`EntryStream::close`] additionally
/// reports integrity failures.
pub trait EntryStream {
    /// Metadata of this entry.
    fn info(&self) -> &EntryInfo;

    /// Read up to `buf.len()` decompressed bytes. `Ok(0)` means end of data.
    fn read_chunk(&mut self, buf: &mut [u8]) -> CodecResult<usize>;

    /// Close the entry, reporting [`CodecError::CrcMismatch`] if the data
    /// read did not match the stored checksum.
    fn close(&mut self) -> CodecResult<()>;
}

/// A writer that builds an archive one entry at a time.
pub trait ArchiveSink {
    /// Start a new entry; any entry still open is closed first.
    fn open_new_entry(&mut self, name: &str, options: &EntryOptions<'_>) -> CodecResult<()>;

    /// Append bytes to the current entry.
    fn write_current(&mut self, data: &[u8]) -> CodecResult<()>;

    /// Finish the current entry.
    ///
    /// A codec may defer finalizing the entry until the next
    /// [`open_new_entry`](Self::open_new_entry) or
    /// [`close_archive`](Self::close_archive). Errors finishing this entry
    /// then surface from that call.
    fn close_current(&mut self) -> CodecResult<()>;

    /// Write the central directory and release the archive.
    fn close_archive(self) -> CodecResult<()>
    where
        Self: Sized;
}
