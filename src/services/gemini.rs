//! Gemini REST client
//!
//! All generators go through `POST /v1beta/models/{model}:generateContent`.
//! Ideas use a JSON response schema, stories plain text, and speech the
//! audio response modality with a prebuilt voice.

use super::{IdeaService, ServiceError, SpeechService, StoryService};
use crate::models::{Story, StoryIdea, StoryRequest};
use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_IDEA_COUNT: usize = 18;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub speech_model: String,
    /// How many ideas to ask for per fetch
    pub idea_count: usize,
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            idea_count: DEFAULT_IDEA_COUNT,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_speech_model(mut self, model: impl Into<String>) -> Self {
        self.speech_model = model.into();
        self
    }

    pub fn with_idea_count(mut self, count: usize) -> Self {
        self.idea_count = count.max(1);
        self
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate(
        &self,
        model: &str,
        body: serde_json::Value,
    ) -> Result<GenerateContentResponse, ServiceError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ServiceError::MissingApiKey)?;

        debug!("generateContent request to {}", model);
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} answered HTTP {}", model, status);
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn generate_text(&self, prompt: String) -> Result<String, ServiceError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        let response = self.generate(&self.config.text_model, body).await?;
        Ok(response.text().unwrap_or_default())
    }
}

#[async_trait]
impl IdeaService for GeminiClient {
    async fn generate_ideas(&self) -> Result<Vec<StoryIdea>, ServiceError> {
        let body = ideas_request(self.config.idea_count);
        let response = self.generate(&self.config.text_model, body).await?;
        let text = response
            .text()
            .ok_or_else(|| ServiceError::Malformed("response has no text".to_string()))?;
        parse_ideas(&text)
    }
}

#[async_trait]
impl StoryService for GeminiClient {
    async fn story_from_idea(&self, title: &str, premise: &str) -> Result<Story, ServiceError> {
        let text = self.generate_text(story_from_idea_prompt(title, premise)).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::EmptyStory);
        }
        Ok(Story::new(title, text))
    }

    async fn custom_story(&self, request: &StoryRequest) -> Result<Story, ServiceError> {
        let text = self.generate_text(custom_story_prompt(request)).await?;
        parse_custom_story(&text)
    }
}

#[async_trait]
impl SpeechService for GeminiClient {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<String, ServiceError> {
        let response = self
            .generate(&self.config.speech_model, speech_request(text, voice))
            .await?;
        response
            .inline_data()
            .filter(|data| !data.is_empty())
            .map(str::to_string)
            .ok_or(ServiceError::EmptyAudio)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    data: String,
}

impl GenerateContentResponse {
    fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Text parts of the first candidate joined together
    fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// Base64 payload of the first part, when it carries inline data
    fn inline_data(&self) -> Option<&str> {
        self.parts()
            .first()
            .and_then(|p| p.inline_data.as_ref())
            .map(|d| d.data.as_str())
    }
}

#[derive(Deserialize)]
struct IdeaList {
    ideas: Vec<StoryIdea>,
}

fn parse_ideas(text: &str) -> Result<Vec<StoryIdea>, ServiceError> {
    let list: IdeaList = serde_json::from_str(text)
        .map_err(|e| ServiceError::Malformed(format!("idea list is not valid JSON: {}", e)))?;
    Ok(list.ideas)
}

/// First line is the title, the rest is the story
fn parse_custom_story(text: &str) -> Result<Story, ServiceError> {
    let mut lines = text.splitn(2, '\n');
    let title = lines.next().unwrap_or_default().trim();
    let body = lines.next().unwrap_or_default().trim();

    if title.is_empty() || body.is_empty() {
        return Err(ServiceError::Malformed(
            "generated story is not in the expected format".to_string(),
        ));
    }
    Ok(Story::new(title, body))
}

fn ideas_request(count: usize) -> serde_json::Value {
    let prompt = format!(
        "Generate a list of {} unique, magical, and soothing bedtime story ideas for children aged 3-7.\n\
         For each idea, provide a creative title and a short, one-sentence premise.",
        count
    );

    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "ideas": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "title": {
                                    "type": "STRING",
                                    "description": "The creative title of the story."
                                },
                                "premise": {
                                    "type": "STRING",
                                    "description": "A short, one-sentence premise for the story."
                                }
                            },
                            "required": ["title", "premise"]
                        }
                    }
                },
                "required": ["ideas"]
            }
        }
    })
}

const STORY_RULES: &str = "The story should be around 200-300 words, have a clear beginning, middle, and a happy, calming end.\n\
    It must be age-appropriate for a young child (3-7 years old).\n\
    Do not use any complex words or scary themes.";

fn story_from_idea_prompt(title: &str, premise: &str) -> String {
    format!(
        "Based on the title \"{}\" and the premise \"{}\", write a complete, magical, and soothing bedtime story.\n\
         {}\n\
         The response must be only the story text itself.",
        title, premise, STORY_RULES
    )
}

fn custom_story_prompt(request: &StoryRequest) -> String {
    format!(
        "Create a short, magical, and soothing bedtime story for a child named {}.\n\
         The main character should be a {}.\n\
         The story should be about {}.\n\
         {}\n\
         The response must start with a title on the very first line, followed by the story content. For example:\n\
         The Magical Adventure of Leo the Lion\n\n\
         Once upon a time...",
        request.child_name, request.character, request.theme, STORY_RULES
    )
}

fn speech_request(text: &str, voice: &str) -> serde_json::Value {
    json!({
        "contents": [{
            "parts": [{ "text": format!("Read this story in a gentle, calming voice: {}", text) }]
        }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice }
                }
            }
        }
    })
}
