//! RIFF/WEM stream parsing and codec classification.

use std::fmt;

use nightwave_common::BinaryReader;

use crate::{Error, Result};

/// Codec of an audio stream, derived from the WAVE format tag.
///
/// The set of codecs Wwise emits is fixed; dispatch is an explicit match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Codec {
    /// Plain PCM samples.
    Pcm,
    /// IMA ADPCM blocks (standard or Wwise-tagged).
    ImaAdpcm,
    /// Wwise Vorbis (proprietary packet framing).
    Vorbis,
    /// Wwise Opus (proprietary packet framing).
    Opus,
    /// Unrecognized format tag.
    Unknown(u16),
}

impl Codec {
    /// Classify a WAVE format tag.
    pub fn from_tag(tag: u16) -> Self {
        match tag {
            0x0001 | 0xFFFE => Self::Pcm,
            0x0002 | 0x0069 => Self::ImaAdpcm,
            0xFFFF => Self::Vorbis,
            0x3040 | 0x3041 => Self::Opus,
            other => Self::Unknown(other),
        }
    }

    /// Whether this crate can transcode the codec to PCM.
    pub fn is_decodable(&self) -> bool {
        matches!(self, Self::Pcm | Self::ImaAdpcm)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pcm => write!(f, "pcm"),
            Self::ImaAdpcm => write!(f, "ima-adpcm"),
            Self::Vorbis => write!(f, "vorbis"),
            Self::Opus => write!(f, "opus"),
            Self::Unknown(tag) => write!(f, "unknown({tag:#06x})"),
        }
    }
}

/// A parsed WEM stream, borrowing the bytes it came from.
#[derive(Debug)]
pub struct WemStream<'a> {
    codec: Codec,
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
    data: &'a [u8],
    raw: &'a [u8],
}

impl<'a> WemStream<'a> {
    /// Check if a blob starts with a RIFF/WAVE header.
    #[inline]
    pub fn is_riff(data: &[u8]) -> bool {
        data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WAVE"
    }

    /// Parse a WEM stream.
    ///
    /// Requires `fmt ` and `data` chunks; Wwise metadata chunks
    /// (`akd `, `cue `, `LIST`, ...) are skipped by declared length.
    /// Odd-length chunks are padded to a word boundary per RIFF rules.
    pub fn parse(raw: &'a [u8]) -> Result<Self> {
        if !Self::is_riff(raw) {
            return Err(Error::NotAudioStream("missing RIFF/WAVE header"));
        }

        let mut reader = BinaryReader::new_at(raw, 12);
        let mut format: Option<(u16, u16, u32, u16, u16)> = None;
        let mut data: Option<&'a [u8]> = None;

        while reader.remaining() >= 8 {
            let tag_bytes = reader.read_bytes(4)?;
            let tag = [tag_bytes[0], tag_bytes[1], tag_bytes[2], tag_bytes[3]];
            let length = reader.read_u32()? as usize;
            if length > reader.remaining() {
                return Err(Error::NotAudioStream("chunk overruns the stream"));
            }
            let payload = reader.read_bytes(length)?;

            match &tag {
                b"fmt " => {
                    if length < 16 {
                        return Err(Error::NotAudioStream("fmt chunk too short"));
                    }
                    let mut fmt_reader = BinaryReader::new(payload);
                    let format_tag = fmt_reader.read_u16()?;
                    let channels = fmt_reader.read_u16()?;
                    let sample_rate = fmt_reader.read_u32()?;
                    let _avg_byte_rate = fmt_reader.read_u32()?;
                    let block_align = fmt_reader.read_u16()?;
                    let bits_per_sample = fmt_reader.read_u16()?;
                    // cbSize and codec-specific extra bytes are not
                    // needed for classification.
                    format = Some((format_tag, channels, sample_rate, block_align, bits_per_sample));
                }
                b"data" => {
                    data = Some(payload);
                }
                _ => {} // Wwise metadata, skipped.
            }

            // RIFF chunks are word-aligned.
            if length % 2 == 1 && reader.remaining() > 0 {
                reader.advance(1);
            }
        }

        let (format_tag, channels, sample_rate, block_align, bits_per_sample) =
            format.ok_or(Error::NotAudioStream("missing fmt chunk"))?;
        let data = data.ok_or(Error::NotAudioStream("missing data chunk"))?;

        Ok(Self {
            codec: Codec::from_tag(format_tag),
            format_tag,
            channels,
            sample_rate,
            block_align,
            bits_per_sample,
            data,
            raw,
        })
    }

    /// The stream's codec.
    #[inline]
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// The raw WAVE format tag.
    #[inline]
    pub fn format_tag(&self) -> u16 {
        self.format_tag
    }

    /// Channel count.
    #[inline]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Codec block alignment in bytes.
    #[inline]
    pub fn block_align(&self) -> u16 {
        self.block_align
    }

    /// Bits per sample (codec-specific meaning for compressed streams).
    #[inline]
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// The `data` chunk payload.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The entire stream as parsed.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.raw
    }
}
