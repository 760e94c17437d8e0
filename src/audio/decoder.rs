//! Decoding of synthesized speech payloads
//!
//! The speech service returns base64 encoded raw PCM: signed 16-bit little
//! endian samples, 24kHz, mono. Samples are normalized to f32 in [-1, 1].

use super::error::DecodeError;
use base64::Engine;

/// Sample rate of the speech service output
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Channel count of the speech service output
pub const SPEECH_CHANNELS: u16 = 1;

/// Planar, ready-to-play audio
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl DecodedBuffer {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(sample_rate, vec![samples])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Average all channels into one
    pub fn to_mono(&self) -> Vec<f32> {
        match self.channels.len() {
            0 => Vec::new(),
            1 => self.channels[0].clone(),
            n => (0..self.frames())
                .map(|i| self.channels.iter().map(|c| c[i]).sum::<f32>() / n as f32)
                .collect(),
        }
    }
}

/// Decode a standard base64 payload into raw bytes
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
    if bytes.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    Ok(bytes)
}

/// Convert interleaved 16-bit little endian PCM into a planar buffer
pub fn decode_pcm16(
    bytes: &[u8],
    sample_rate: u32,
    channel_count: u16,
) -> Result<DecodedBuffer, DecodeError> {
    if channel_count == 0 {
        return Err(DecodeError::NoChannels);
    }
    if bytes.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::TruncatedSample(bytes.len()));
    }

    let channel_count = channel_count as usize;
    let total_samples = bytes.len() / 2;
    let frames = total_samples / channel_count;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];

    for (i, pair) in bytes
        .chunks_exact(2)
        .take(frames * channel_count)
        .enumerate()
    {
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        channels[i % channel_count].push(sample as f32 / 32768.0);
    }

    Ok(DecodedBuffer::new(sample_rate, channels))
}

/// Decode a speech service payload at its fixed 24kHz mono format
pub fn decode_speech(payload: &str) -> Result<DecodedBuffer, DecodeError> {
    let bytes = decode_base64(payload)?;
    decode_pcm16(&bytes, SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(samples: &[i16]) -> String {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_decode_speech_normalizes_samples() {
        let buffer = decode_speech(&encode(&[0, i16::MIN, i16::MAX, 16384])).unwrap();
        assert_eq!(buffer.sample_rate(), SPEECH_SAMPLE_RATE);
        assert_eq!(buffer.channel_count(), 1);
        assert_eq!(buffer.frames(), 4);

        let samples = buffer.channel(0).unwrap();
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[1], -1.0);
        assert!(samples[2] < 1.0 && samples[2] > 0.999);
        assert_eq!(samples[3], 0.5);
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert!(matches!(decode_speech(""), Err(DecodeError::EmptyPayload)));
        assert!(matches!(decode_speech("  \n"), Err(DecodeError::EmptyPayload)));
    }

    #[test]
    fn test_invalid_payloads_are_rejected() {
        assert!(matches!(
            decode_speech("not base64!!"),
            Err(DecodeError::Base64(_))
        ));
        // "AAA=" decodes to two bytes, "AA==" to one
        assert!(matches!(
            decode_speech("AA=="),
            Err(DecodeError::TruncatedSample(1))
        ));
        assert!(matches!(
            decode_pcm16(&[0, 0], 24_000, 0),
            Err(DecodeError::NoChannels)
        ));
    }

    #[test]
    fn test_stereo_is_split_and_partial_frames_dropped() {
        let bytes: Vec<u8> = [100i16, -100, 200, -200, 300]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let buffer = decode_pcm16(&bytes, 48_000, 2).unwrap();
        assert_eq!(buffer.frames(), 2);
        assert_eq!(buffer.channel(0).unwrap().len(), 2);
        assert_eq!(buffer.channel(1).unwrap().len(), 2);
        assert!(buffer.to_mono().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_duration() {
        let buffer = DecodedBuffer::from_mono(vec![0.0; 12_000], SPEECH_SAMPLE_RATE);
        assert_eq!(buffer.duration_seconds(), 0.5);
    }
}
