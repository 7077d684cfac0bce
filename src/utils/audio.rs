use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::utils::{AppError, Result};

/// PCM parameters extracted from a Gemini audio mime type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavOptions {
    pub num_channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl Default for WavOptions {
    fn default() -> Self {
        // Gemini TTS emits mono 16-bit PCM at 24kHz unless the mime type says otherwise
        Self {
            num_channels: 1,
            sample_rate: 24000,
            bits_per_sample: 16,
        }
    }
}

/// Parse a mime type like `audio/L16;rate=24000` into WAV conversion options
pub fn parse_mime_type(mime_type: &str) -> WavOptions {
    let mut options = WavOptions::default();

    let mut parts = mime_type.split(';').map(str::trim);
    if let Some(file_type) = parts.next() {
        if let Some(format) = file_type.split('/').nth(1) {
            if let Some(bits) = format.strip_prefix('L') {
                if let Ok(bits) = bits.parse() {
                    options.bits_per_sample = bits;
                }
            }
        }
    }

    for param in parts {
        if let Some((key, value)) = param.split_once('=') {
            if key.trim() == "rate" {
                if let Ok(rate) = value.trim().parse() {
                    options.sample_rate = rate;
                }
            }
        }
    }

    options
}

/// Build a 44-byte RIFF/WAVE header for raw PCM data
pub fn create_wav_header(data_length: u32, options: WavOptions) -> [u8; 44] {
    let WavOptions {
        num_channels,
        sample_rate,
        bits_per_sample,
    } = options;
    let byte_rate = sample_rate * u32::from(num_channels) * u32::from(bits_per_sample) / 8;
    let block_align = num_channels * bits_per_sample / 8;

    let mut header = [0u8; 44];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&(36 + data_length).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    header[22..24].copy_from_slice(&num_channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bits_per_sample.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_length.to_le_bytes());
    header
}

/// Wrap base64-encoded raw PCM in a WAV container
pub fn convert_to_wav(raw_base64: &str, mime_type: &str) -> Result<Vec<u8>> {
    let options = parse_mime_type(mime_type);
    let data = decode_base64_audio(raw_base64)?;
    let header = create_wav_header(data.len() as u32, options);

    let mut wav = Vec::with_capacity(44 + data.len());
    wav.extend_from_slice(&header);
    wav.extend_from_slice(&data);
    Ok(wav)
}

/// Decode base64 audio payloads from clients or providers
pub fn decode_base64_audio(data: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(data)
        .map_err(|e| AppError::BadRequest(format!("Invalid base64 audio data: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mime_type_l16_with_rate() {
        let options = parse_mime_type("audio/L16;rate=24000");
        assert_eq!(options.bits_per_sample, 16);
        assert_eq!(options.sample_rate, 24000);
        assert_eq!(options.num_channels, 1);
    }

    #[test]
    fn test_parse_mime_type_l24_overrides_bits() {
        let options = parse_mime_type("audio/L24;rate=48000");
        assert_eq!(options.bits_per_sample, 24);
        assert_eq!(options.sample_rate, 48000);
    }

    #[test]
    fn test_parse_mime_type_defaults() {
        let options = parse_mime_type("audio/pcm");
        assert_eq!(options, WavOptions::default());
    }

    #[test]
    fn test_wav_header_layout() {
        let header = create_wav_header(1000, WavOptions::default());
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[36..40], b"data");
        assert_eq!(u32::from_le_bytes(header[4..8].try_into().unwrap()), 1036);
        assert_eq!(u32::from_le_bytes(header[40..44].try_into().unwrap()), 1000);
        // byte rate = 24000 * 1 * 16 / 8
        assert_eq!(u32::from_le_bytes(header[28..32].try_into().unwrap()), 48000);
    }

    #[test]
    fn test_convert_to_wav_prepends_header() {
        let raw = BASE64.encode([0u8, 1, 2, 3]);
        let wav = convert_to_wav(&raw, "audio/L16;rate=24000").expect("conversion failed");
        assert_eq!(wav.len(), 48);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[44..], &[0, 1, 2, 3]);
    }

    #[test]
    fn test_decode_base64_audio_rejects_garbage() {
        assert!(decode_base64_audio("not-base64!!!").is_err());
    }
}
