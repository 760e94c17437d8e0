//! In-memory WAV clips of recorded narration
//!
//! A finished recording is kept as a single WAV encoded blob (32-bit float,
//! mono) and decoded again when it is played back.

use super::decoder::DecodedBuffer;
use super::error::AudioError;
use chrono::{DateTime, Utc};
use hound::{WavSpec, WavWriter};
use std::io::Cursor;
use std::sync::Arc;

/// A finalized, playable recording
#[derive(Debug, Clone)]
pub struct RecordedClip {
    name: String,
    recorded_at: DateTime<Utc>,
    wav: Arc<[u8]>,
    duration_seconds: f64,
}

impl RecordedClip {
    /// Encode captured mono samples into a WAV clip
    pub fn encode(samples: &[f32], sample_rate: u32) -> Result<Self, AudioError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)
                .map_err(|e| AudioError::Clip(format!("Failed to create WAV writer: {}", e)))?;
            for &sample in samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| AudioError::Clip(format!("Failed to write sample: {}", e)))?;
            }
            writer
                .finalize()
                .map_err(|e| AudioError::Clip(format!("Failed to finalize WAV data: {}", e)))?;
        }

        let recorded_at = Utc::now();
        Ok(Self {
            name: generate_name(&recorded_at),
            recorded_at,
            wav: cursor.into_inner().into(),
            duration_seconds: duration_seconds(samples.len(), sample_rate),
        })
    }

    /// Decode the clip back into samples
    pub fn decode(&self) -> Result<DecodedBuffer, AudioError> {
        let reader = hound::WavReader::new(Cursor::new(&self.wav[..]))
            .map_err(|e| AudioError::Clip(format!("Failed to open WAV data: {}", e)))?;

        let spec = reader.spec();
        let channel_count = spec.channels.max(1) as usize;

        let samples: Result<Vec<f32>, _> = match spec.sample_format {
            hound::SampleFormat::Float => reader.into_samples::<f32>().collect(),
            hound::SampleFormat::Int => {
                let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_value))
                    .collect()
            }
        };
        let samples = samples.map_err(|e| AudioError::Clip(format!("Failed to read samples: {}", e)))?;

        let mut channels = vec![Vec::with_capacity(samples.len() / channel_count); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Ok(DecodedBuffer::new(spec.sample_rate, channels))
    }

    /// File-like name identifying the clip
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Encoded WAV bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.wav
    }
}

fn generate_name(recorded_at: &DateTime<Utc>) -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "recording_{}_{}.wav",
        recorded_at.format("%Y%m%d_%H%M%S"),
        &uuid[..8]
    )
}

/// Get duration of samples in seconds
pub fn duration_seconds(sample_count: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    sample_count as f64 / sample_rate as f64
}
