//! Screen state machine
//!
//! ```text
//! Home --start_creating--> Creating --story_created--> Playing
//! Home --select_idea--> Loading --finish_loading(Ok)--> Playing
//!                       Loading --finish_loading(Err)--> Home
//! Creating/Playing --back--> Home
//! ```

use super::request::RequestTag;
use crate::models::{Story, StoryIdea};
use crate::services::ServiceError;
use log::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Creating,
    /// A story is being written for `idea`
    Loading { idea: StoryIdea, tag: RequestTag },
    Playing(Story),
}

impl View {
    fn name(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Creating => "Creating",
            View::Loading { .. } => "Loading",
            View::Playing(_) => "Playing",
        }
    }
}

#[derive(Debug, Default)]
pub struct Navigator {
    view: View,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// The story of the player screen
    pub fn story(&self) -> Option<&Story> {
        match &self.view {
            View::Playing(story) => Some(story),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.view, View::Loading { .. })
    }

    pub fn start_creating(&mut self) -> bool {
        if self.view != View::Home {
            return self.ignore("start_creating");
        }
        self.go(View::Creating)
    }

    pub fn story_created(&mut self, story: Story) -> bool {
        if self.view != View::Creating {
            return self.ignore("story_created");
        }
        self.go(View::Playing(story))
    }

    /// Start loading the story of `idea`; the caller runs the request
    pub fn select_idea(&mut self, idea: StoryIdea) -> Option<RequestTag> {
        if self.view != View::Home {
            self.ignore("select_idea");
            return None;
        }
        let tag = RequestTag::new();
        info!("Writing story for idea \"{}\"", idea.title);
        self.go(View::Loading { idea, tag });
        Some(tag)
    }

    pub fn finish_loading(&mut self, tag: RequestTag, result: Result<Story, ServiceError>) -> bool {
        match &self.view {
            View::Loading { tag: current, .. } if *current == tag => {}
            _ => {
                debug!("Dropping stale story {}", tag);
                return false;
            }
        }

        match result {
            Ok(story) => self.go(View::Playing(story)),
            Err(e) => {
                warn!("Error generating story from idea: {}", e);
                self.go(View::Home)
            }
        }
    }

    pub fn back(&mut self) -> bool {
        match self.view {
            View::Creating | View::Playing(_) => self.go(View::Home),
            _ => self.ignore("back"),
        }
    }

    fn go(&mut self, view: View) -> bool {
        debug!("View {} -> {}", self.view.name(), view.name());
        self.view = view;
        true
    }

    fn ignore(&self, transition: &str) -> bool {
        debug!("Ignoring {} in {}", transition, self.view.name());
        false
    }
}
