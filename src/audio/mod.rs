//! Narration audio pipeline
//!
//! This module provides:
//! - Decoding of synthesized speech (base64 PCM, 24kHz mono)
//! - Microphone recording into in-memory WAV clips via PipeWire and hound
//! - A playback controller that keeps exactly one narration source

mod capture;
mod decoder;
mod error;
#[cfg(test)]
pub(crate) mod fakes;
mod playback;
mod recorder;

pub use capture::{
    CaptureSession, CaptureState, Microphone, PipeWireMicrophone, VoiceCaptureController,
};
pub use decoder::{decode_speech, DecodedBuffer};
pub use error::{AudioError, CaptureError, DecodeError};
pub use playback::{
    ActivePlayback, AudioOutput, AudioSource, PipeWireOutput, PlaybackController, PlaybackState,
};
pub use recorder::RecordedClip;
