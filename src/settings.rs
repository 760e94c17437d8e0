//! Runtime settings
//!
//! Resolved once at startup from the command line and environment. Nothing is
//! persisted.

use crate::cli::Args;
use crate::services::GeminiConfig;
use log::{info, warn};

/// Secondary variable checked when `GEMINI_API_KEY` is not set
const FALLBACK_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Clone)]
pub struct Settings {
    pub gemini: GeminiConfig,
}

impl Settings {
    pub fn from_args(args: &Args) -> Self {
        let api_key = resolve_api_key(
            args.api_key.clone(),
            std::env::var(FALLBACK_KEY_VAR).ok(),
        );

        match &api_key {
            Some(_) => info!("Using Gemini at {}", args.base_url),
            None => warn!(
                "No API key found; set GEMINI_API_KEY or pass --api-key. Story requests will fail."
            ),
        }

        let gemini = GeminiConfig::new(api_key)
            .with_base_url(args.base_url.clone())
            .with_text_model(args.text_model.clone())
            .with_speech_model(args.speech_model.clone())
            .with_idea_count(usize::from(args.idea_count));

        Self { gemini }
    }
}

/// First non-blank key wins
fn resolve_api_key(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    [primary, fallback]
        .into_iter()
        .flatten()
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_api_key_resolution() {
        assert_eq!(
            resolve_api_key(Some("a".into()), Some("b".into())).as_deref(),
            Some("a")
        );
        assert_eq!(
            resolve_api_key(Some("  ".into()), Some(" b ".into())).as_deref(),
            Some("b")
        );
        assert_eq!(resolve_api_key(None, None), None);
    }

    #[test]
    fn test_settings_from_args() {
        let args = Args::parse_from([
            "storynest",
            "--api-key",
            "secret",
            "--base-url",
            "http://localhost:9000",
            "--idea-count",
            "4",
        ]);
        let settings = Settings::from_args(&args);
        assert_eq!(settings.gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.gemini.base_url, "http://localhost:9000");
        assert_eq!(settings.gemini.idea_count, 4);
    }
}
