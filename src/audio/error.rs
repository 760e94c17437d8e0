//! Error types for the audio pipeline

use thiserror::Error;

/// Failure to turn a speech payload into samples
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("audio payload is empty")]
    EmptyPayload,

    #[error("audio payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("PCM data has an odd length of {0} bytes")]
    TruncatedSample(usize),

    #[error("channel count must be at least 1")]
    NoChannels,
}

/// Failure while loading or playing audio
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("recorded clip is unreadable: {0}")]
    Clip(String),

    #[error("audio output unavailable: {0}")]
    Output(String),
}

/// Failure to open or keep a microphone session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("audio capture unsupported: {0}")]
    Unsupported(String),

    #[error("capture device error: {0}")]
    Device(String),
}

impl CaptureError {
    /// Sentence shown under the record button
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureError::PermissionDenied(_) => {
                "Microphone access denied. Please allow microphone access in your system settings."
            }
            CaptureError::Unsupported(_) => "Audio recording is not supported on this system.",
            CaptureError::Device(_) => "The microphone stopped working. Please try recording again.",
        }
    }

    /// Classify a PipeWire stream error string
    pub(crate) fn from_stream_error(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("permission") || lower.contains("denied") || lower.contains("eacces") {
            CaptureError::PermissionDenied(message.to_string())
        } else {
            CaptureError::Device(message.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_errors_are_classified() {
        assert!(matches!(
            CaptureError::from_stream_error("Permission denied by portal"),
            CaptureError::PermissionDenied(_)
        ));
        assert!(matches!(
            CaptureError::from_stream_error("node removed"),
            CaptureError::Device(_)
        ));
    }
}
