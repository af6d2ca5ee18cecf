//! RDAR archive reader.
//!
//! Parsing happens once at open; after that every operation is a read-only
//! lookup over the shared backing buffer, so an [`Archive`] can be shared
//! across extraction workers without locking.

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use nightwave_common::BinaryReader;
use rustc_hash::FxHashMap;

use crate::decompress;
use crate::{ArchiveHeader, CompressionKind, Error, FileRecord, IndexEntry, Result};

/// Sanity cap on a single entry's declared uncompressed size (1 GiB).
///
/// A hostile index can declare arbitrary sizes; reads refuse anything
/// above this cap before allocating.
pub const MAX_UNCOMPRESSED_SIZE: u64 = 1 << 30;

/// Backing buffer of an opened archive.
enum Backing {
    /// Memory-mapped file contents.
    Mapped(Mmap),
    /// Owned in-memory buffer.
    Owned(Vec<u8>),
}

impl Backing {
    #[inline]
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Mapped(mmap) => mmap,
            Self::Owned(vec) => vec,
        }
    }
}

/// An opened RDAR archive.
///
/// Owns the raw archive bytes and the parsed index; immutable once built.
/// Downstream consumers borrow payload slices during processing and own
/// only their final output buffers.
pub struct Archive {
    /// Raw archive bytes.
    backing: Backing,
    /// Archive file name, for reporting.
    name: String,
    /// Index entries in table declaration order.
    entries: Vec<IndexEntry>,
    /// Content id to entry table position.
    by_id: FxHashMap<u64, usize>,
}

impl Archive {
    /// Open an archive by path, memory-mapping its contents.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let (entries, by_id) = Self::parse_index(&mmap)?;

        Ok(Self {
            backing: Backing::Mapped(mmap),
            name,
            entries,
            by_id,
        })
    }

    /// Parse an archive from an owned in-memory buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let (entries, by_id) = Self::parse_index(&data)?;

        Ok(Self {
            backing: Backing::Owned(data),
            name: "<memory>".to_string(),
            entries,
            by_id,
        })
    }

    /// Get the archive name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of index entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Index entries in table declaration order.
    #[inline]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Look up an entry by content id.
    #[inline]
    pub fn get(&self, id: u64) -> Option<IndexEntry> {
        self.by_id.get(&id).map(|&pos| self.entries[pos])
    }

    /// Read an entry's contents, decompressing as needed.
    ///
    /// The output length always equals the entry's declared uncompressed
    /// size; any discrepancy fails [`Error::DecompressionMismatch`].
    pub fn read(&self, entry: &IndexEntry) -> Result<Vec<u8>> {
        if u64::from(entry.uncompressed_size) > MAX_UNCOMPRESSED_SIZE {
            return Err(Error::SizeLimitExceeded {
                size: u64::from(entry.uncompressed_size),
                limit: MAX_UNCOMPRESSED_SIZE,
            });
        }

        let expected = entry.uncompressed_size as usize;
        if expected == 0 {
            return Ok(Vec::new());
        }

        let start = entry.offset as usize;
        let end = start + entry.compressed_size as usize;
        let stored = self.backing.bytes().get(start..end).ok_or_else(|| {
            Error::CorruptIndex(format!("entry {:#018x} range outside the archive", entry.id))
        })?;

        match entry.compression {
            CompressionKind::None => {
                if stored.len() != expected {
                    return Err(Error::DecompressionMismatch {
                        expected,
                        actual: stored.len(),
                    });
                }
                Ok(stored.to_vec())
            }
            CompressionKind::Lz4 => decompress::decompress_lz4(stored, expected),
            CompressionKind::Kraken => {
                Err(Error::UnsupportedCompression(CompressionKind::Kraken as u8))
            }
        }
    }

    /// Read an entry's contents by content id.
    pub fn read_id(&self, id: u64) -> Result<Vec<u8>> {
        let entry = self.get(id).ok_or(Error::EntryNotFound(id))?;
        self.read(&entry)
    }

    /// Parse and validate the header and index table.
    fn parse_index(data: &[u8]) -> Result<(Vec<IndexEntry>, FxHashMap<u64, usize>)> {
        let mut reader = BinaryReader::new(data);

        let magic = reader.read_bytes(4)?;
        if magic != ArchiveHeader::MAGIC {
            let mut actual = [0u8; 4];
            actual.copy_from_slice(magic);
            return Err(Error::UnsupportedFormat { actual });
        }

        let header: ArchiveHeader = reader.read_struct()?;

        let version = header.version;
        if version != ArchiveHeader::SUPPORTED_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        // A declared size that disagrees with the buffer means the archive
        // was truncated or padded; nothing downstream can be trusted.
        let file_size = header.file_size;
        if file_size != data.len() as u64 {
            return Err(Error::CorruptIndex(format!(
                "declared file size {} disagrees with buffer of {} bytes",
                file_size,
                data.len()
            )));
        }

        let index_position = header.index_position;
        let index_size = u64::from(header.index_size);
        let index_end = index_position.checked_add(index_size);
        if index_position < ArchiveHeader::SIZE as u64
            || index_end.map_or(true, |end| end > data.len() as u64)
        {
            return Err(Error::CorruptIndex("index block outside the archive".into()));
        }

        reader.seek(index_position as usize)?;
        let entry_count = reader.read_u32()? as usize;
        let table_crc = reader.read_u32()?;

        if index_size < 8 {
            return Err(Error::CorruptIndex("index block too small".into()));
        }
        let stored = reader.read_bytes(index_size as usize - 8)?;

        // The record table may itself be stored as an XLZ4 buffer; the
        // checksum always covers the raw records.
        let table_size = entry_count * FileRecord::SIZE;
        let table: Cow<'_, [u8]> = if stored.starts_with(&decompress::XLZ4_MAGIC) {
            Cow::Owned(decompress::decompress_lz4(stored, table_size)?)
        } else if stored.len() == table_size {
            Cow::Borrowed(stored)
        } else {
            return Err(Error::CorruptIndex(
                "index size disagrees with entry count".into(),
            ));
        };

        let actual_crc = crc32c::crc32c(&table);
        if actual_crc != table_crc {
            return Err(Error::CorruptIndex(format!(
                "index table checksum mismatch: expected {table_crc:#010x}, got {actual_crc:#010x}"
            )));
        }

        let mut entries = Vec::with_capacity(entry_count);
        let mut by_id =
            FxHashMap::with_capacity_and_hasher(entry_count, Default::default());

        let mut table_reader = BinaryReader::new(&table);
        for _ in 0..entry_count {
            let record: FileRecord = table_reader.read_struct()?;

            let id = record.id;
            let offset = record.offset;
            let compressed_size = record.compressed_size;
            let uncompressed_size = record.uncompressed_size;
            let compression = CompressionKind::try_from(record.compression)
                .map_err(Error::UnsupportedCompression)?;

            let end = offset
                .checked_add(u64::from(compressed_size))
                .ok_or_else(|| {
                    Error::CorruptIndex(format!("entry {id:#018x} range overflows"))
                })?;
            if offset < ArchiveHeader::SIZE as u64 || end > index_position {
                return Err(Error::CorruptIndex(format!(
                    "entry {id:#018x} range outside the payload region"
                )));
            }

            // Duplicate ids mean a misparsed table, not a shadowed entry.
            if by_id.insert(id, entries.len()).is_some() {
                return Err(Error::CorruptIndex(format!("duplicate content id {id:#018x}")));
            }

            entries.push(IndexEntry {
                id,
                offset,
                compressed_size,
                uncompressed_size,
                compression,
            });
        }

        Ok((entries, by_id))
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .finish()
    }
}
