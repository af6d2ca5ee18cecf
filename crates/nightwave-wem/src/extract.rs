//! Stream extraction modes.

use crate::{adpcm, wav, Codec, Error, Result, WemStream};

/// An extracted audio stream with its playback metadata.
///
/// The payload is either the verbatim stream bytes (pass-through) or a
/// WAV-wrapped PCM rendition (decode); both outlive the buffers they
/// were extracted from.
#[derive(Debug, Clone)]
pub struct AudioStream {
    /// Codec of the payload.
    pub codec: Codec,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Stream bytes, ready to hand to a file writer.
    pub payload: Vec<u8>,
}

/// Extract a stream verbatim.
///
/// No bit loss: the payload is byte-identical to the input. Streams with
/// an unrecognized codec tag fail [`Error::UnsupportedCodec`] unless the
/// caller requested the raw-dump fallback.
pub fn pass_through(bytes: &[u8], raw_dump: bool) -> Result<AudioStream> {
    let stream = WemStream::parse(bytes)?;

    if let Codec::Unknown(tag) = stream.codec() {
        if !raw_dump {
            return Err(Error::UnsupportedCodec(tag));
        }
    }

    Ok(AudioStream {
        codec: stream.codec(),
        sample_rate: stream.sample_rate(),
        channels: stream.channels(),
        payload: bytes.to_vec(),
    })
}

/// Decode a stream to interleaved PCM in a canonical WAV container.
///
/// PCM streams are re-wrapped; IMA ADPCM streams are decoded block by
/// block. Wwise Vorbis/Opus payloads use proprietary packet framing and
/// cannot be transcoded here; they fail [`Error::UnsupportedCodec`] and
/// remain extractable via [`pass_through`].
pub fn decode(bytes: &[u8]) -> Result<AudioStream> {
    let stream = WemStream::parse(bytes)?;

    let payload = match stream.codec() {
        Codec::Pcm => {
            let bits = stream.bits_per_sample();
            if !matches!(bits, 8 | 16 | 24 | 32) {
                return Err(Error::Decode(format!("invalid bits per sample: {bits}")));
            }
            wav::write_wav(stream.sample_rate(), stream.channels(), bits, stream.data())
        }
        Codec::ImaAdpcm => {
            let samples = adpcm::decode(stream.data(), stream.channels(), stream.block_align())?;
            wav::write_wav_pcm16(stream.sample_rate(), stream.channels(), &samples)
        }
        Codec::Vorbis | Codec::Opus => {
            return Err(Error::UnsupportedCodec(stream.format_tag()));
        }
        Codec::Unknown(tag) => {
            return Err(Error::UnsupportedCodec(tag));
        }
    };

    Ok(AudioStream {
        codec: Codec::Pcm,
        sample_rate: stream.sample_rate(),
        channels: stream.channels(),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::test_support::build_wem;

    #[test]
    fn test_pass_through_is_bit_exact() {
        let wem = build_wem(0xFFFF, 2, 44100, 0, 0, b"opaque vorbis packets");

        let extracted = pass_through(&wem, false).unwrap();
        assert_eq!(extracted.payload, wem);
        assert_eq!(extracted.codec, Codec::Vorbis);
        assert_eq!(extracted.sample_rate, 44100);
        assert_eq!(extracted.channels, 2);
    }

    #[test]
    fn test_unknown_codec_needs_raw_dump() {
        let wem = build_wem(0x7777, 1, 22050, 0, 0, b"mystery bytes");

        assert!(matches!(
            pass_through(&wem, false),
            Err(Error::UnsupportedCodec(0x7777))
        ));

        let dumped = pass_through(&wem, true).unwrap();
        assert_eq!(dumped.codec, Codec::Unknown(0x7777));
        assert_eq!(dumped.payload, wem);
    }

    #[test]
    fn test_decode_pcm_rewraps() {
        let pcm: Vec<u8> = (0..32).collect();
        let wem = build_wem(0x0001, 1, 32000, 2, 16, &pcm);

        let decoded = decode(&wem).unwrap();
        assert_eq!(decoded.codec, Codec::Pcm);

        let parsed = WemStream::parse(&decoded.payload).unwrap();
        assert_eq!(parsed.data(), &pcm[..]);
        assert_eq!(parsed.sample_rate(), 32000);
    }

    #[test]
    fn test_decode_adpcm() {
        // One mono block: silent preamble plus one zero nibble group.
        let block = [0u8; 8];
        let wem = build_wem(0x0069, 1, 24000, 8, 4, &block);

        let decoded = decode(&wem).unwrap();
        let parsed = WemStream::parse(&decoded.payload).unwrap();
        assert_eq!(parsed.codec(), Codec::Pcm);
        // 1 preamble sample + 8 nibbles, 16-bit each.
        assert_eq!(parsed.data().len(), 9 * 2);
        assert!(parsed.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_vorbis_unsupported() {
        let wem = build_wem(0xFFFF, 2, 44100, 0, 0, b"packets");

        assert!(matches!(decode(&wem), Err(Error::UnsupportedCodec(0xFFFF))));
    }

    #[test]
    fn test_decode_corrupt_adpcm_fails() {
        // Step index out of range in the preamble.
        let block = [0, 0, 120, 0, 0, 0, 0, 0];
        let wem = build_wem(0x0069, 1, 24000, 8, 4, &block);

        assert!(matches!(decode(&wem), Err(Error::Decode(_))));
    }
}
