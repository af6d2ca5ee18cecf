//! Archive header and index table structures.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Archive file header (without the 4-byte magic).
///
/// The magic bytes (`RDAR`) are read separately before this struct.
/// All fields are little-endian.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct ArchiveHeader {
    /// Container format version.
    pub version: u32,
    /// Absolute byte offset of the index block.
    pub index_position: u64,
    /// Size of the index block in bytes.
    pub index_size: u32,
    /// Absolute byte offset of the debug block (unused here).
    pub debug_position: u64,
    /// Size of the debug block in bytes (unused here).
    pub debug_size: u32,
    /// Declared total archive size in bytes.
    pub file_size: u64,
}

impl ArchiveHeader {
    /// Archive magic bytes.
    pub const MAGIC: [u8; 4] = *b"RDAR";

    /// Total header size including the magic.
    pub const SIZE: usize = 4 + std::mem::size_of::<Self>();

    /// The only container version this reader supports.
    pub const SUPPORTED_VERSION: u32 = 12;
}

/// A raw index record as stored on disk (32 bytes).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct FileRecord {
    /// Content identifier (FNV-1a 64 of the resource path).
    pub id: u64,
    /// Absolute byte offset of the payload buffer.
    pub offset: u64,
    /// Stored (possibly compressed) size in bytes.
    pub compressed_size: u32,
    /// Size after decompression in bytes.
    pub uncompressed_size: u32,
    /// Compression kind tag.
    pub compression: u8,
    /// Reserved, zero in all observed archives.
    pub reserved: [u8; 7],
}

impl FileRecord {
    /// Size of one record in the index table.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// Compression kind of a stored payload buffer.
///
/// The set of kinds is fixed by the container format; dispatch is an
/// explicit match, never dynamic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompressionKind {
    /// Stored verbatim.
    None = 0,
    /// LZ4 block data behind an `XLZ4` preamble.
    Lz4 = 1,
    /// Oodle Kraken. Recognized but not decodable without the
    /// proprietary runtime.
    Kraken = 2,
}

impl TryFrom<u8> for CompressionKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Lz4),
            2 => Ok(Self::Kraken),
            other => Err(other),
        }
    }
}

/// A resolved index entry.
///
/// This contains metadata about one stored resource, not the resource
/// bytes themselves. Use [`Archive::read`](crate::Archive::read) to get
/// the decompressed contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Content identifier (FNV-1a 64 of the resource path).
    pub id: u64,
    /// Absolute byte offset of the payload buffer.
    pub offset: u64,
    /// Stored (possibly compressed) size in bytes.
    pub compressed_size: u32,
    /// Size after decompression in bytes.
    pub uncompressed_size: u32,
    /// Compression kind of the stored buffer.
    pub compression: CompressionKind,
}
