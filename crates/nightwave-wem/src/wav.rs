//! Canonical WAV container synthesis for decoded PCM.

use byteorder::{LittleEndian, WriteBytesExt};

/// Wrap raw PCM bytes in a canonical WAV container.
pub fn write_wav(sample_rate: u32, channels: u16, bits_per_sample: u16, pcm: &[u8]) -> Vec<u8> {
    let byte_rate = sample_rate * u32::from(channels) * u32::from(bits_per_sample) / 8;
    let block_align = channels * bits_per_sample / 8;
    let data_len = pcm.len() as u32;
    let file_len = 36 + data_len;

    let mut wav = Vec::with_capacity(file_len as usize + 8);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.write_u32::<LittleEndian>(file_len).unwrap();
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.write_u32::<LittleEndian>(16).unwrap();
    wav.write_u16::<LittleEndian>(1).unwrap(); // PCM format
    wav.write_u16::<LittleEndian>(channels).unwrap();
    wav.write_u32::<LittleEndian>(sample_rate).unwrap();
    wav.write_u32::<LittleEndian>(byte_rate).unwrap();
    wav.write_u16::<LittleEndian>(block_align).unwrap();
    wav.write_u16::<LittleEndian>(bits_per_sample).unwrap();

    // data chunk
    wav.extend_from_slice(b"data");
    wav.write_u32::<LittleEndian>(data_len).unwrap();
    wav.extend_from_slice(pcm);

    wav
}

/// Wrap interleaved 16-bit samples in a canonical WAV container.
pub fn write_wav_pcm16(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        pcm.extend_from_slice(&sample.to_le_bytes());
    }
    write_wav(sample_rate, channels, 16, &pcm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Codec, WemStream};

    #[test]
    fn test_header_layout() {
        let wav = write_wav(44100, 2, 16, &[0u8; 8]);

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(wav.len(), 44 + 8);
    }

    #[test]
    fn test_roundtrips_through_parser() {
        let samples: Vec<i16> = (0..16).map(|i| i * 100).collect();
        let wav = write_wav_pcm16(48000, 2, &samples);

        let stream = WemStream::parse(&wav).unwrap();
        assert_eq!(stream.codec(), Codec::Pcm);
        assert_eq!(stream.sample_rate(), 48000);
        assert_eq!(stream.channels(), 2);
        assert_eq!(stream.bits_per_sample(), 16);
        assert_eq!(stream.data().len(), 32);
    }
}
