//! Extraction orchestration.
//!
//! A session owns one immutably-opened archive. Every operation is
//! read-only over the archive buffer and produces freshly owned output,
//! so batch extraction parallelizes without locks: each worker owns its
//! own decompressed block for the duration of one entry.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nightwave_archive::{Archive, IndexEntry};
use nightwave_bnk::SoundBank;
use nightwave_wem::{self as wem, Codec, WemStream};

use crate::{ExtractError, Result};

/// How stream payloads are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Verbatim stream bytes, bit-exact.
    #[default]
    PassThrough,
    /// Decode to interleaved PCM in a WAV container.
    Pcm,
}

/// Cooperative cancellation flag for batch extraction.
///
/// Checked between entries, never mid-decode; cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One extractable stream discovered by probing the index.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AudioEntryInfo {
    /// Content id of the archive entry holding the stream.
    pub content_id: u64,
    /// Stream id within the bank; `None` for standalone streams.
    pub wem_id: Option<u32>,
    /// Stream codec.
    pub codec: Codec,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Stream length in bytes.
    pub length: u32,
}

/// An extracted stream plus its source addressing and playback metadata.
#[derive(Debug, Clone)]
pub struct ExtractedAudio {
    /// Content id of the archive entry the stream came from.
    pub content_id: u64,
    /// Stream id within the bank; `None` for standalone streams.
    pub wem_id: Option<u32>,
    /// Codec of the payload.
    pub codec: Codec,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Stream bytes, owned by the caller from here on.
    pub payload: Vec<u8>,
}

/// Per-item result of a batch extraction.
#[derive(Debug)]
pub struct ItemOutcome {
    /// Content id of the item.
    pub content_id: u64,
    /// Stream id within the bank, when known.
    pub wem_id: Option<u32>,
    /// The extracted stream or the typed failure for this item alone.
    pub result: Result<ExtractedAudio>,
}

/// An extraction session over one opened archive.
pub struct ExtractionSession {
    archive: Archive,
    raw_dump: bool,
}

impl ExtractionSession {
    /// Open an archive by path and parse its index.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Archive::open(path)?))
    }

    /// Start a session over an in-memory archive buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(Self::new(Archive::from_bytes(data)?))
    }

    /// Start a session over an already-opened archive.
    pub fn new(archive: Archive) -> Self {
        Self {
            archive,
            raw_dump: false,
        }
    }

    /// Allow pass-through extraction of streams with unrecognized codecs.
    pub fn with_raw_dump(mut self, raw_dump: bool) -> Self {
        self.raw_dump = raw_dump;
        self
    }

    /// The underlying archive.
    #[inline]
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Probe every index entry and enumerate extractable streams.
    ///
    /// Entries that fail to decompress, are not banks or standalone
    /// streams, or embed unparseable stream bytes are silently classified
    /// as skipped; probing never fails the session. Output order follows
    /// the index table, then bank declaration order.
    pub fn list_audio_entries(&self) -> Vec<AudioEntryInfo> {
        let mut out = Vec::new();

        for entry in self.archive.entries() {
            let Ok(block) = self.archive.read(entry) else {
                continue;
            };

            if let Ok(bank) = SoundBank::parse(&block) {
                for be in bank.entries() {
                    if let Ok(stream) = WemStream::parse(bank.entry_bytes(be)) {
                        out.push(AudioEntryInfo {
                            content_id: entry.id,
                            wem_id: Some(be.id),
                            codec: stream.codec(),
                            sample_rate: stream.sample_rate(),
                            channels: stream.channels(),
                            length: be.length,
                        });
                    }
                }
            } else if let Ok(stream) = WemStream::parse(&block) {
                out.push(AudioEntryInfo {
                    content_id: entry.id,
                    wem_id: None,
                    codec: stream.codec(),
                    sample_rate: stream.sample_rate(),
                    channels: stream.channels(),
                    length: block.len() as u32,
                });
            }
        }

        out
    }

    /// Extract one stream.
    ///
    /// With a `wem_id`, the entry is demuxed as a bank and the stream
    /// looked up in its media index. Without one, standalone streams
    /// extract directly and single-stream banks resolve to their only
    /// stream; multi-stream banks fail [`ExtractError::SubStreamRequired`].
    pub fn extract(
        &self,
        id: u64,
        wem_id: Option<u32>,
        mode: ExtractMode,
    ) -> Result<ExtractedAudio> {
        let entry = self
            .archive
            .get(id)
            .ok_or(nightwave_archive::Error::EntryNotFound(id))?;
        let block = self.archive.read(&entry)?;

        match wem_id {
            Some(sub) => {
                let bank = SoundBank::parse(&block)?;
                let be = bank
                    .find(sub)
                    .ok_or(ExtractError::SubStreamNotFound { id, sub })?;
                self.extract_stream(id, Some(sub), bank.entry_bytes(be), mode)
            }
            None => {
                if SoundBank::is_soundbank(&block) {
                    let bank = SoundBank::parse(&block)?;
                    match bank.entries() {
                        [only] => {
                            self.extract_stream(id, Some(only.id), bank.entry_bytes(only), mode)
                        }
                        entries => Err(ExtractError::SubStreamRequired {
                            id,
                            count: entries.len(),
                        }),
                    }
                } else {
                    self.extract_stream(id, None, &block, mode)
                }
            }
        }
    }

    /// Extract every audio-bearing entry in the archive.
    ///
    /// Entries are independent, so with the `parallel` feature they are
    /// processed on a worker pool; outcome order follows the index table
    /// either way. A failure on one item never aborts the batch. The
    /// token is checked between entries: entries not yet started when
    /// cancellation lands are reported as [`ExtractError::Cancelled`],
    /// and completed results are retained.
    pub fn extract_all(&self, mode: ExtractMode, cancel: &CancelToken) -> Vec<ItemOutcome> {
        let process = |entry: &IndexEntry| -> Vec<ItemOutcome> {
            if cancel.is_cancelled() {
                return vec![ItemOutcome {
                    content_id: entry.id,
                    wem_id: None,
                    result: Err(ExtractError::Cancelled),
                }];
            }
            self.process_entry(entry, mode)
        };

        #[cfg(feature = "parallel")]
        let nested: Vec<Vec<ItemOutcome>> = {
            use rayon::prelude::*;
            self.archive.entries().par_iter().map(process).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let nested: Vec<Vec<ItemOutcome>> =
            self.archive.entries().iter().map(process).collect();

        nested.into_iter().flatten().collect()
    }

    /// Process one index entry into zero or more outcomes.
    ///
    /// Kraken-compressed entries cannot be probed for audio and are
    /// skipped, like non-audio resources. Every other failure is
    /// recorded against the item.
    fn process_entry(&self, entry: &IndexEntry, mode: ExtractMode) -> Vec<ItemOutcome> {
        let block = match self.archive.read(entry) {
            Ok(block) => block,
            Err(nightwave_archive::Error::UnsupportedCompression(_)) => return Vec::new(),
            Err(e) => {
                return vec![ItemOutcome {
                    content_id: entry.id,
                    wem_id: None,
                    result: Err(e.into()),
                }];
            }
        };

        if SoundBank::is_soundbank(&block) {
            match SoundBank::parse(&block) {
                Ok(bank) => bank
                    .entries()
                    .iter()
                    .map(|be| ItemOutcome {
                        content_id: entry.id,
                        wem_id: Some(be.id),
                        result: self.extract_stream(
                            entry.id,
                            Some(be.id),
                            bank.entry_bytes(be),
                            mode,
                        ),
                    })
                    .collect(),
                Err(e) => vec![ItemOutcome {
                    content_id: entry.id,
                    wem_id: None,
                    result: Err(e.into()),
                }],
            }
        } else if WemStream::is_riff(&block) {
            vec![ItemOutcome {
                content_id: entry.id,
                wem_id: None,
                result: self.extract_stream(entry.id, None, &block, mode),
            }]
        } else {
            Vec::new() // Not an audio resource.
        }
    }

    fn extract_stream(
        &self,
        content_id: u64,
        wem_id: Option<u32>,
        bytes: &[u8],
        mode: ExtractMode,
    ) -> Result<ExtractedAudio> {
        let audio = match mode {
            ExtractMode::PassThrough => wem::pass_through(bytes, self.raw_dump)?,
            ExtractMode::Pcm => wem::decode(bytes)?,
        };

        Ok(ExtractedAudio {
            content_id,
            wem_id,
            codec: audio.codec,
            sample_rate: audio.sample_rate,
            channels: audio.channels,
            payload: audio.payload,
        })
    }
}

impl std::fmt::Debug for ExtractionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionSession")
            .field("archive", &self.archive)
            .field("raw_dump", &self.raw_dump)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightwave_archive::{ArchiveHeader, CompressionKind};

    /// A raw archive entry: stored bytes plus declared metadata.
    struct RawEntry {
        id: u64,
        stored: Vec<u8>,
        uncompressed_size: u32,
        kind: u8,
    }

    impl RawEntry {
        fn stored(id: u64, data: &[u8]) -> Self {
            Self {
                id,
                stored: data.to_vec(),
                uncompressed_size: data.len() as u32,
                kind: CompressionKind::None as u8,
            }
        }
    }

    /// Assemble a well-formed archive from raw entries.
    fn build_archive(entries: &[RawEntry]) -> Vec<u8> {
        let mut out = vec![0u8; ArchiveHeader::SIZE];
        let mut records = Vec::new();

        for entry in entries {
            records.push((entry.id, out.len() as u64, entry.stored.len() as u32));
            out.extend_from_slice(&entry.stored);
        }

        let index_position = out.len() as u64;
        let mut table = Vec::new();
        for (entry, &(id, offset, zsize)) in entries.iter().zip(&records) {
            table.extend_from_slice(&id.to_le_bytes());
            table.extend_from_slice(&offset.to_le_bytes());
            table.extend_from_slice(&zsize.to_le_bytes());
            table.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
            table.push(entry.kind);
            table.extend_from_slice(&[0u8; 7]);
        }

        out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        out.extend_from_slice(&crc32c::crc32c(&table).to_le_bytes());
        out.extend_from_slice(&table);

        out[0..4].copy_from_slice(&ArchiveHeader::MAGIC);
        out[4..8].copy_from_slice(&ArchiveHeader::SUPPORTED_VERSION.to_le_bytes());
        out[8..16].copy_from_slice(&index_position.to_le_bytes());
        out[16..20].copy_from_slice(&((8 + table.len()) as u32).to_le_bytes());
        let file_size = out.len() as u64;
        out[32..40].copy_from_slice(&file_size.to_le_bytes());
        out
    }

    /// Build a minimal WEM with the given format tag and payload.
    fn build_wem(format_tag: u16, channels: u16, sample_rate: u32, data: &[u8]) -> Vec<u8> {
        let mut fmt = Vec::new();
        fmt.extend_from_slice(&format_tag.to_le_bytes());
        fmt.extend_from_slice(&channels.to_le_bytes());
        fmt.extend_from_slice(&sample_rate.to_le_bytes());
        fmt.extend_from_slice(&0u32.to_le_bytes());
        fmt.extend_from_slice(&2u16.to_le_bytes());
        fmt.extend_from_slice(&16u16.to_le_bytes());

        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&((4 + 8 + fmt.len() + 8 + data.len()) as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&(fmt.len() as u32).to_le_bytes());
        out.extend_from_slice(&fmt);
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    /// Build a bank embedding the given WEM blobs.
    fn build_bank(streams: &[(u32, &[u8])]) -> Vec<u8> {
        let mut bkhd = Vec::new();
        bkhd.extend_from_slice(&134u32.to_le_bytes());
        bkhd.extend_from_slice(&0x2077u32.to_le_bytes());
        bkhd.extend_from_slice(&[0u8; 8]);

        let mut didx = Vec::new();
        let mut data = Vec::new();
        for (id, bytes) in streams {
            didx.extend_from_slice(&id.to_le_bytes());
            didx.extend_from_slice(&(data.len() as u32).to_le_bytes());
            didx.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            data.extend_from_slice(bytes);
        }

        let mut out = Vec::new();
        for (tag, payload) in [
            (b"BKHD", &bkhd[..]),
            (b"DIDX", &didx[..]),
            (b"DATA", &data[..]),
        ] {
            out.extend_from_slice(tag);
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(payload);
        }
        out
    }

    const BANK_ID: u64 = 0x1000;
    const WEM_A: u32 = 101;
    const WEM_B: u32 = 202;

    /// The reference fixture: one bank with two streams, two non-audio
    /// entries.
    fn scenario_archive() -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let wem_a = build_wem(0xFFFF, 2, 44100, b"vorbis packet bytes");
        let wem_b = build_wem(0x0001, 1, 48000, &[0x10u8; 64]);
        let bank = build_bank(&[(WEM_A, &wem_a), (WEM_B, &wem_b)]);

        let archive = build_archive(&[
            RawEntry::stored(BANK_ID, &bank),
            RawEntry::stored(0x2000, b"CR2W not audio at all"),
            RawEntry::stored(0x3000, &[0xEE; 40]),
        ]);

        (archive, wem_a, wem_b)
    }

    #[test]
    fn test_list_finds_exactly_the_bank_streams() {
        let (archive, _, _) = scenario_archive();
        let session = ExtractionSession::from_bytes(archive).unwrap();

        let listing = session.list_audio_entries();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].content_id, BANK_ID);
        assert_eq!(listing[0].wem_id, Some(WEM_A));
        assert_eq!(listing[0].codec, Codec::Vorbis);
        assert_eq!(listing[1].wem_id, Some(WEM_B));
        assert_eq!(listing[1].codec, Codec::Pcm);

        // Deterministic across repeated probes.
        assert_eq!(session.list_audio_entries(), listing);
    }

    #[test]
    fn test_extract_pass_through_is_bit_exact() {
        let (archive, wem_a, _) = scenario_archive();
        let session = ExtractionSession::from_bytes(archive).unwrap();

        let audio = session
            .extract(BANK_ID, Some(WEM_A), ExtractMode::PassThrough)
            .unwrap();
        assert_eq!(audio.payload, wem_a);
        assert_eq!(audio.codec, Codec::Vorbis);
        assert_eq!(audio.wem_id, Some(WEM_A));
    }

    #[test]
    fn test_extract_decode_mode() {
        let (archive, _, _) = scenario_archive();
        let session = ExtractionSession::from_bytes(archive).unwrap();

        let audio = session
            .extract(BANK_ID, Some(WEM_B), ExtractMode::Pcm)
            .unwrap();
        assert_eq!(audio.codec, Codec::Pcm);

        let parsed = WemStream::parse(&audio.payload).unwrap();
        assert_eq!(parsed.sample_rate(), 48000);
        assert_eq!(parsed.data(), &[0x10u8; 64]);
    }

    #[test]
    fn test_extract_addressing_errors() {
        let (archive, _, _) = scenario_archive();
        let session = ExtractionSession::from_bytes(archive).unwrap();

        assert!(matches!(
            session.extract(0x9999, None, ExtractMode::PassThrough),
            Err(ExtractError::Archive(
                nightwave_archive::Error::EntryNotFound(0x9999)
            ))
        ));
        assert!(matches!(
            session.extract(BANK_ID, Some(555), ExtractMode::PassThrough),
            Err(ExtractError::SubStreamNotFound { id: BANK_ID, sub: 555 })
        ));
        assert!(matches!(
            session.extract(BANK_ID, None, ExtractMode::PassThrough),
            Err(ExtractError::SubStreamRequired { id: BANK_ID, count: 2 })
        ));
    }

    #[test]
    fn test_single_stream_bank_without_sub_id() {
        let wem = build_wem(0x0001, 1, 44100, &[0u8; 8]);
        let bank = build_bank(&[(77, &wem)]);
        let archive = build_archive(&[RawEntry::stored(1, &bank)]);
        let session = ExtractionSession::from_bytes(archive).unwrap();

        let audio = session.extract(1, None, ExtractMode::PassThrough).unwrap();
        assert_eq!(audio.wem_id, Some(77));
        assert_eq!(audio.payload, wem);
    }

    #[test]
    fn test_standalone_stream_entry() {
        let wem = build_wem(0xFFFF, 2, 44100, b"standalone music stream");
        let archive = build_archive(&[RawEntry::stored(42, &wem)]);
        let session = ExtractionSession::from_bytes(archive).unwrap();

        let listing = session.list_audio_entries();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].wem_id, None);

        let audio = session.extract(42, None, ExtractMode::PassThrough).unwrap();
        assert_eq!(audio.payload, wem);
    }

    #[test]
    fn test_batch_partial_failure_isolation() {
        let wem = build_wem(0x0001, 1, 44100, &[0u8; 16]);
        let bank = build_bank(&[(5, &wem)]);

        // A corrupt LZ4 entry among valid ones: the XLZ4 preamble is
        // present but the block data is garbage.
        let mut corrupt = Vec::new();
        corrupt.extend_from_slice(b"XLZ4");
        corrupt.extend_from_slice(&64u32.to_le_bytes());
        corrupt.extend_from_slice(&[0xAB; 10]);

        let archive = build_archive(&[
            RawEntry::stored(1, &bank),
            RawEntry {
                id: 2,
                stored: corrupt,
                uncompressed_size: 64,
                kind: CompressionKind::Lz4 as u8,
            },
            RawEntry::stored(3, &wem),
        ]);
        let session = ExtractionSession::from_bytes(archive).unwrap();

        let outcomes = session.extract_all(ExtractMode::PassThrough, &CancelToken::new());
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(ExtractError::Archive(_))
        ));
        assert_eq!(outcomes[1].content_id, 2);
        assert!(outcomes[2].result.is_ok());
    }

    #[test]
    fn test_batch_skips_non_audio_and_kraken() {
        let wem = build_wem(0x0001, 1, 44100, &[0u8; 16]);
        let archive = build_archive(&[
            RawEntry::stored(1, b"plain resource bytes, not audio"),
            RawEntry {
                id: 2,
                stored: vec![0u8; 24],
                uncompressed_size: 24,
                kind: CompressionKind::Kraken as u8,
            },
            RawEntry::stored(3, &wem),
        ]);
        let session = ExtractionSession::from_bytes(archive).unwrap();

        let outcomes = session.extract_all(ExtractMode::PassThrough, &CancelToken::new());
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].content_id, 3);
    }

    #[test]
    fn test_cancellation_reports_unstarted_entries() {
        let (archive, _, _) = scenario_archive();
        let session = ExtractionSession::from_bytes(archive).unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();

        let outcomes = session.extract_all(ExtractMode::PassThrough, &cancel);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o.result, Err(ExtractError::Cancelled))));
    }

    #[test]
    fn test_raw_dump_fallback() {
        let wem = build_wem(0x7777, 1, 22050, b"mystery codec payload");
        let archive = build_archive(&[RawEntry::stored(9, &wem)]);

        let strict = ExtractionSession::from_bytes(archive.clone()).unwrap();
        let outcomes = strict.extract_all(ExtractMode::PassThrough, &CancelToken::new());
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            outcomes[0].result,
            Err(ExtractError::Stream(
                nightwave_wem::Error::UnsupportedCodec(0x7777)
            ))
        ));

        let lenient = ExtractionSession::from_bytes(archive)
            .unwrap()
            .with_raw_dump(true);
        let audio = lenient.extract(9, None, ExtractMode::PassThrough).unwrap();
        assert_eq!(audio.payload, wem);
    }
}
