//! Codec adapter over the `zip` crate.
//!
//! [`ZipArchiveReader`] and [`ZipArchiveWriter`] expose the `zip` crate
//! through the cursor-shaped [`ArchiveCursor`] / [`ArchiveSink`] seam so the
//! engines never depend on its API directly.

use oxizip_core::dostime::DosTimestamp;
use oxizip_core::entry::EntryInfo;
use oxizip_core::error::CodecError;
use oxizip_core::traits::{ArchiveCursor, ArchiveSink, CodecResult, EntryOptions, EntryStream};
use std::fs::File;
use log::debug;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use zip::read::ZipFile;
use zip::result::ZipError as ZipCrateError;
use zip::unstable::write::FileOptionsExt;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

fn map_zip_error(err: ZipCrateError) -> CodecError {
    match err {
        ZipCrateError::Io(e) => CodecError::Io(e),
        ZipCrateError::InvalidPassword => CodecError::InvalidPassword,
        ZipCrateError::UnsupportedArchive(detail) if detail == ZipCrateError::PASSWORD_REQUIRED => {
            CodecError::PasswordRequired
        }
        other => CodecError::invalid_archive(other.to_string()),
    }
}

/// The `zip` crate reports checksum failures as an `InvalidData` read error
/// once the entry is exhausted.
fn is_checksum_error(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::InvalidData && err.to_string().contains("checksum")
}

const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const CENTRAL_HEADER_PREFIX: usize = 42;

// Hosts whose external attributes carry a POSIX mode in the high 16 bits.
const HOST_UNIX: u8 = 3;
const HOST_OSX: u8 = 19;

/// Read the raw external attributes of the central directory record at
/// `offset`.
///
/// The `zip` crate only exposes a Unix mode, which it synthesizes from the
/// DOS attributes for archives made elsewhere. Attributes from hosts that do
/// not store a POSIX mode keep only their low 16 bits.
fn read_external_attributes<R: Read + Seek>(reader: &mut R, offset: u64) -> io::Result<u32> {
    let mut header = [0u8; CENTRAL_HEADER_PREFIX];
    reader.seek(SeekFrom::Start(offset))?;
    reader.read_exact(&mut header)?;

    let signature = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    if signature != CENTRAL_HEADER_SIGNATURE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid central directory signature",
        ));
    }

    let host = header[5];
    let attributes = u32::from_le_bytes([header[38], header[39], header[40], header[41]]);
    Ok(match host {
        HOST_UNIX | HOST_OSX => attributes,
        _ => attributes & 0xFFFF,
    })
}

fn entry_info<R: Read>(file: &ZipFile<'_, R>, external_attributes: u32) -> EntryInfo {
    let modified = file
        .last_modified()
        .map(|dt| DosTimestamp::from_parts(dt.datepart(), dt.timepart()))
        .unwrap_or(DosTimestamp::ZERO);

    EntryInfo {
        name: file.name().to_string(),
        compressed_size: file.compressed_size(),
        uncompressed_size: file.size(),
        external_attributes,
        modified,
    }
}

/// Reads entries of an existing archive one at a time.
///
/// A second handle on the same archive, when present, is used to read the
/// raw external attributes of each entry. Without it entries report no
/// attributes and no permissions are restored.
pub struct ZipArchiveReader<R: Read + Seek = BufReader<File>> {
    archive: ZipArchive<R>,
    central: Option<R>,
    index: usize,
}

impl ZipArchiveReader {
    /// Open an archive on disk.
    pub fn open(path: &Path) -> CodecResult<Self> {
        let file = File::open(path)?;
        let central = File::open(path)?;
        Self::with_central_reader(BufReader::new(file), BufReader::new(central))
    }
}

impl<R: Read + Seek> ZipArchiveReader<R> {
    /// Read the central directory from `reader`.
    pub fn new(reader: R) -> CodecResult<Self> {
        let archive = ZipArchive::new(reader).map_err(map_zip_error)?;
        Ok(Self {
            archive,
            central: None,
            index: 0,
        })
    }

    /// Read the central directory from `reader`, taking external attributes
    /// from `central`, a second reader over the same bytes.
    pub fn with_central_reader(reader: R, central: R) -> CodecResult<Self> {
        let mut this = Self::new(reader)?;
        this.central = Some(central);
        Ok(this)
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Check if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }
}

impl<R: Read + Seek> ArchiveCursor for ZipArchiveReader<R> {
    fn go_to_first(&mut self) -> CodecResult<()> {
        if self.archive.is_empty() {
            return Err(CodecError::EndOfList);
        }
        self.index = 0;
        Ok(())
    }

    fn go_to_next(&mut self) -> CodecResult<bool> {
        if self.index + 1 < self.archive.len() {
            self.index += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn open_current(&mut self, password: Option<&str>) -> CodecResult<Box<dyn EntryStream + '_>> {
        let file = match password {
            Some(password) => self.archive.by_index_decrypt(self.index, password.as_bytes()),
            None => self.archive.by_index(self.index),
        }
        .map_err(map_zip_error)?;

        let offset = file.central_header_start();
        let external_attributes = match self.central.as_mut() {
            Some(central) => read_external_attributes(central, offset).unwrap_or_else(|e| {
                debug!("cannot read attributes of {}: {e}", file.name());
                0
            }),
            None => 0,
        };
        let info = entry_info(&file, external_attributes);
        Ok(Box::new(ZipEntryStream {
            file,
            info,
            crc_failed: false,
        }))
    }
}

struct ZipEntryStream<'a, R: Read> {
    file: ZipFile<'a, R>,
    info: EntryInfo,
    crc_failed: bool,
}

impl<R: Read> EntryStream for ZipEntryStream<'_, R> {
    fn info(&self) -> &EntryInfo {
        &self.info
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> CodecResult<usize> {
        loop {
            match self.file.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_checksum_error(&e) => {
                    self.crc_failed = true;
                    return Ok(0);
                }
                Err(e) => return Err(CodecError::Io(e)),
            }
        }
    }

    fn close(&mut self) -> CodecResult<()> {
        if self.crc_failed {
            Err(CodecError::CrcMismatch)
        } else {
            Ok(())
        }
    }
}

/// Builds a new archive one entry at a time.
pub struct ZipArchiveWriter<W: Write + Seek = BufWriter<File>> {
    writer: ZipWriter<W>,
}

impl ZipArchiveWriter {
    /// Create (or truncate) an archive on disk.
    pub fn create(path: &Path) -> CodecResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Seek> ZipArchiveWriter<W> {
    /// Write a new archive into `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            writer: ZipWriter::new(inner),
        }
    }
}

fn zip_datetime(ts: DosTimestamp) -> DateTime {
    let dt = ts.to_datetime();
    DateTime::from_date_and_time(dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second)
        .unwrap_or_default()
}

fn file_options(options: &EntryOptions<'_>) -> SimpleFileOptions {
    let method = if options.level.is_stored() {
        CompressionMethod::Stored
    } else {
        CompressionMethod::Deflated
    };
    // Negative levels select the codec default.
    let level = match options.level.codec_level() {
        level if level > 0 => Some(i64::from(level)),
        _ => None,
    };

    let mut file_options = SimpleFileOptions::default()
        .compression_method(method)
        .compression_level(level)
        .last_modified_time(zip_datetime(options.modified))
        .large_file(options.size_hint >= u64::from(u32::MAX));

    if let Some(mode) = options.unix_mode {
        file_options = file_options.unix_permissions(mode);
    }
    if let Some(password) = options.password {
        file_options = file_options.with_deprecated_encryption(password.as_bytes());
    }
    file_options
}

impl<W: Write + Seek> ArchiveSink for ZipArchiveWriter<W> {
    fn open_new_entry(&mut self, name: &str, options: &EntryOptions<'_>) -> CodecResult<()> {
        self.writer
            .start_file(name, file_options(options))
            .map_err(map_zip_error)
    }

    fn write_current(&mut self, data: &[u8]) -> CodecResult<()> {
        self.writer.write_all(data)?;
        Ok(())
    }

    /// The `zip` crate finalizes an entry when the next one starts or the
    /// archive is finished, so errors writing this entry's trailer surface
    /// from the following `open_new_entry` or from `close_archive`.
    fn close_current(&mut self) -> CodecResult<()> {
        Ok(())
    }

    fn close_archive(self) -> CodecResult<()> {
        let mut inner = self.writer.finish().map_err(map_zip_error)?;
        inner.flush()?;
        Ok(())
    }
}
