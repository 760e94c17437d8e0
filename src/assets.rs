//! Embedded icons
//!
//! SVGs under `assets/icons` are compiled into the binary and served to gpui.

use gpui::AssetSource;
use rust_embed::RustEmbed;
use std::borrow::Cow;

#[derive(RustEmbed)]
#[folder = "assets"]
#[include = "icons/*.svg"]
pub struct Assets;

impl AssetSource for Assets {
    fn load(&self, path: &str) -> anyhow::Result<Option<Cow<'static, [u8]>>> {
        if path.is_empty() {
            return Ok(None);
        }
        Ok(Self::get(path).map(|f| f.data))
    }

    fn list(&self, path: &str) -> anyhow::Result<Vec<gpui::SharedString>> {
        Ok(Self::iter()
            .filter(|p| p.starts_with(path))
            .map(|p| p.into())
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Play,
    Pause,
    Record,
    Stop,
    ChevronLeft,
    MagicWand,
    BookOpen,
    Microphone,
    Speaker,
    Refresh,
    Plus,
}

impl Icon {
    pub const ALL: [Icon; 11] = [
        Icon::Play,
        Icon::Pause,
        Icon::Record,
        Icon::Stop,
        Icon::ChevronLeft,
        Icon::MagicWand,
        Icon::BookOpen,
        Icon::Microphone,
        Icon::Speaker,
        Icon::Refresh,
        Icon::Plus,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Icon::Play => "icons/play.svg",
            Icon::Pause => "icons/pause.svg",
            Icon::Record => "icons/record.svg",
            Icon::Stop => "icons/stop.svg",
            Icon::ChevronLeft => "icons/chevron-left.svg",
            Icon::MagicWand => "icons/magic-wand.svg",
            Icon::BookOpen => "icons/book-open.svg",
            Icon::Microphone => "icons/microphone.svg",
            Icon::Speaker => "icons/speaker.svg",
            Icon::Refresh => "icons/refresh.svg",
            Icon::Plus => "icons/plus.svg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_icon_is_embedded() {
        for icon in Icon::ALL {
            let data = Assets.load(icon.path()).unwrap();
            assert!(data.is_some_and(|d| !d.is_empty()), "{:?} missing", icon);
        }
    }

    #[test]
    fn test_list_and_empty_path() {
        assert!(Assets.load("").unwrap().is_none());
        assert_eq!(Assets.list("icons/").unwrap().len(), Icon::ALL.len());
    }
}
