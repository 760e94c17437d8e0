//! Story content and speech services
//!
//! The app talks to its generators through three small traits so the screen
//! models can be driven by stubs in tests. [`GeminiClient`] implements all of
//! them against the Gemini REST API.

pub mod gemini;

use crate::models::{Story, StoryIdea, StoryRequest};
use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiClient, GeminiConfig};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Malformed(String),

    #[error("generated story is empty")]
    EmptyStory,

    #[error("audio data not found in response")]
    EmptyAudio,

    #[error("request interrupted: {0}")]
    Interrupted(String),
}

/// Generator of story ideas for the home screen
#[async_trait]
pub trait IdeaService: Send + Sync {
    async fn generate_ideas(&self) -> Result<Vec<StoryIdea>, ServiceError>;
}

/// Generator of complete stories
#[async_trait]
pub trait StoryService: Send + Sync {
    /// Write the story behind a browsed idea
    async fn story_from_idea(&self, title: &str, premise: &str) -> Result<Story, ServiceError>;

    /// Write a story from the custom story form
    async fn custom_story(&self, request: &StoryRequest) -> Result<Story, ServiceError>;
}

/// Text to speech
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Returns base64 encoded 24kHz mono PCM
    async fn synthesize(&self, text: &str, voice: &str) -> Result<String, ServiceError>;
}

/// Result of a request whose task never finished
pub fn or_interrupted<T>(result: Option<Result<T, ServiceError>>) -> Result<T, ServiceError> {
    result.unwrap_or_else(|| {
        Err(ServiceError::Interrupted(
            "request task did not finish".to_string(),
        ))
    })
}

#[cfg(test)]
pub(crate) mod stubs {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Returns queued responses in order
    pub struct StubIdeas {
        responses: Mutex<VecDeque<Result<Vec<StoryIdea>, ServiceError>>>,
    }

    impl StubIdeas {
        pub fn new(responses: Vec<Result<Vec<StoryIdea>, ServiceError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl IdeaService for StubIdeas {
        async fn generate_ideas(&self) -> Result<Vec<StoryIdea>, ServiceError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::Malformed("no more responses".into())))
        }
    }

    /// Always answers with the same story, or always fails
    pub struct StubStories {
        pub story: Option<Story>,
        pub requests: Mutex<Vec<StoryRequest>>,
    }

    impl StubStories {
        pub fn returning(story: Story) -> Self {
            Self {
                story: Some(story),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                story: None,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StoryService for StubStories {
        async fn story_from_idea(&self, title: &str, _premise: &str) -> Result<Story, ServiceError> {
            match &self.story {
                Some(story) => Ok(Story::new(title, story.text.clone())),
                None => Err(ServiceError::EmptyStory),
            }
        }

        async fn custom_story(&self, request: &StoryRequest) -> Result<Story, ServiceError> {
            self.requests.lock().unwrap().push(request.clone());
            self.story.clone().ok_or(ServiceError::EmptyStory)
        }
    }

    /// Returns a fixed payload for every voice
    pub struct StubSpeech {
        pub payload: String,
    }

    #[async_trait]
    impl SpeechService for StubSpeech {
        async fn synthesize(&self, _text: &str, _voice: &str) -> Result<String, ServiceError> {
            Ok(self.payload.clone())
        }
    }
}
