use serde::{Deserialize, Serialize};

/// A finished story ready to be read or narrated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub text: String,
}

impl Story {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }

    /// Story shown when a custom story could not be written
    pub fn placeholder() -> Self {
        Self::new(
            "A Little Hiccup",
            "Oh dear, it seems our storybook is a little stuck. The story couldn't be created right now. Let's try again in a moment!",
        )
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A title and one-sentence premise used to seed a full story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryIdea {
    pub title: String,
    pub premise: String,
}

impl StoryIdea {
    pub fn new(title: impl Into<String>, premise: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            premise: premise.into(),
        }
    }
}

/// Ingredients of a custom story, already checked for emptiness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest {
    pub child_name: String,
    pub character: String,
    pub theme: String,
}

/// A narrator voice offered in the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceOption {
    /// Name shown on the voice button
    pub name: &'static str,
    /// Prebuilt voice identifier understood by the speech service
    pub value: &'static str,
}

pub const VOICE_OPTIONS: &[VoiceOption] = &[
    VoiceOption {
        name: "Sleepy Owl",
        value: "Kore",
    },
    VoiceOption {
        name: "Cheerful Pixie",
        value: "Puck",
    },
    VoiceOption {
        name: "Wise Wizard",
        value: "Charon",
    },
    VoiceOption {
        name: "Brave Knight",
        value: "Fenrir",
    },
    VoiceOption {
        name: "Starlight Fairy",
        value: "Zephyr",
    },
    VoiceOption {
        name: "Soft Cloud",
        value: "Achernar",
    },
];

/// Look up a catalog voice by its service identifier
pub fn voice_by_value(value: &str) -> Option<&'static VoiceOption> {
    VOICE_OPTIONS.iter().find(|v| v.value == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_catalog_values_are_unique() {
        for (i, voice) in VOICE_OPTIONS.iter().enumerate() {
            assert!(VOICE_OPTIONS[i + 1..].iter().all(|v| v.value != voice.value));
        }
        assert_eq!(voice_by_value("Puck").map(|v| v.name), Some("Cheerful Pixie"));
        assert!(voice_by_value("Nobody").is_none());
    }

    #[test]
    fn test_placeholder_story_is_readable() {
        let story = Story::placeholder();
        assert_eq!(story.title, "A Little Hiccup");
        assert!(story.word_count() > 10);
    }
}
