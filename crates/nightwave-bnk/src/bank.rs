//! Soundbank chunk walking and media index parsing.

use nightwave_common::BinaryReader;

use crate::{Error, Result};

/// Chunk tags recognized by the demuxer.
mod tags {
    /// Bank header: version and bank id.
    pub const BKHD: &[u8; 4] = b"BKHD";
    /// Media index: 12-byte records addressing into DATA.
    pub const DIDX: &[u8; 4] = b"DIDX";
    /// Concatenated embedded stream bytes.
    pub const DATA: &[u8; 4] = b"DATA";
}

/// Size of one DIDX media index record.
const DIDX_RECORD_SIZE: usize = 12;

/// One embedded stream within a bank's DATA chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankEntry {
    /// Stream identifier, unique within the bank.
    pub id: u32,
    /// Byte offset relative to the DATA chunk payload.
    pub offset: u32,
    /// Stream length in bytes.
    pub length: u32,
}

/// A parsed soundbank, borrowing the decompressed block it came from.
///
/// Entries are kept in DIDX declaration order, which matches the on-disk
/// order of the stream bytes, so repeated demuxes of the same block
/// enumerate identically.
#[derive(Debug)]
pub struct SoundBank<'a> {
    version: u32,
    bank_id: u32,
    entries: Vec<BankEntry>,
    data: &'a [u8],
}

impl<'a> SoundBank<'a> {
    /// Check if a blob starts with a bank header chunk.
    #[inline]
    pub fn is_soundbank(data: &[u8]) -> bool {
        data.len() >= 8 && &data[..4] == tags::BKHD
    }

    /// Demux a decompressed block as a soundbank.
    ///
    /// Fails [`Error::NotASoundBank`] when the blob does not lead with a
    /// `BKHD` chunk, so callers can probe arbitrary resources and skip
    /// the non-audio ones. Unknown chunk tags are skipped using their
    /// declared length; a length that overruns the blob fails
    /// [`Error::CorruptBank`].
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if !Self::is_soundbank(data) {
            return Err(Error::NotASoundBank);
        }

        let mut reader = BinaryReader::new(data);
        let mut header: Option<(u32, u32)> = None;
        let mut entries: Option<Vec<BankEntry>> = None;
        let mut bank_data: Option<&'a [u8]> = None;

        while !reader.is_empty() {
            if reader.remaining() < 8 {
                return Err(Error::CorruptBank(format!(
                    "{} trailing bytes where a chunk header was expected",
                    reader.remaining()
                )));
            }

            let tag_bytes = reader.read_bytes(4)?;
            let tag = [tag_bytes[0], tag_bytes[1], tag_bytes[2], tag_bytes[3]];
            let length = reader.read_u32()? as usize;
            if length > reader.remaining() {
                return Err(Error::CorruptBank(format!(
                    "chunk {} declares {} bytes but only {} remain",
                    String::from_utf8_lossy(&tag),
                    length,
                    reader.remaining()
                )));
            }
            let payload = reader.read_bytes(length)?;

            match &tag {
                tags::BKHD => {
                    if header.is_some() {
                        return Err(Error::CorruptBank("duplicate BKHD chunk".into()));
                    }
                    let mut bkhd = BinaryReader::new(payload);
                    let version = bkhd.read_u32()?;
                    let bank_id = bkhd.read_u32()?;
                    // The remainder of BKHD (language id, padding) is
                    // irrelevant to demuxing.
                    header = Some((version, bank_id));
                }
                tags::DIDX => {
                    if entries.is_some() {
                        return Err(Error::CorruptBank("duplicate DIDX chunk".into()));
                    }
                    if length % DIDX_RECORD_SIZE != 0 {
                        return Err(Error::CorruptBank(format!(
                            "DIDX length {length} is not a whole number of records"
                        )));
                    }
                    let mut didx = BinaryReader::new(payload);
                    let mut parsed = Vec::with_capacity(length / DIDX_RECORD_SIZE);
                    for _ in 0..length / DIDX_RECORD_SIZE {
                        parsed.push(BankEntry {
                            id: didx.read_u32()?,
                            offset: didx.read_u32()?,
                            length: didx.read_u32()?,
                        });
                    }
                    entries = Some(parsed);
                }
                tags::DATA => {
                    if bank_data.is_some() {
                        return Err(Error::CorruptBank("duplicate DATA chunk".into()));
                    }
                    bank_data = Some(payload);
                }
                _ => {} // Unknown chunk, skipped by declared length.
            }
        }

        let (version, bank_id) = header.ok_or(Error::NotASoundBank)?;
        let entries = entries.unwrap_or_default();
        let data = bank_data.unwrap_or(&[]);

        if !entries.is_empty() && data.is_empty() {
            return Err(Error::CorruptBank(
                "media index present but no DATA chunk".into(),
            ));
        }
        for entry in &entries {
            let end = u64::from(entry.offset) + u64::from(entry.length);
            if end > data.len() as u64 {
                return Err(Error::CorruptBank(format!(
                    "stream {} range {}..{} outside DATA chunk of {} bytes",
                    entry.id,
                    entry.offset,
                    end,
                    data.len()
                )));
            }
        }

        Ok(Self {
            version,
            bank_id,
            entries,
            data,
        })
    }

    /// Bank format version from the BKHD chunk.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Bank identifier from the BKHD chunk.
    #[inline]
    pub fn bank_id(&self) -> u32 {
        self.bank_id
    }

    /// Embedded streams in media index declaration order.
    #[inline]
    pub fn entries(&self) -> &[BankEntry] {
        &self.entries
    }

    /// Find an embedded stream by id.
    pub fn find(&self, id: u32) -> Option<&BankEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Borrow an embedded stream's bytes.
    ///
    /// Ranges were validated against the DATA chunk at parse time.
    #[inline]
    pub fn entry_bytes(&self, entry: &BankEntry) -> &'a [u8] {
        &self.data[entry.offset as usize..(entry.offset + entry.length) as usize]
    }
}
