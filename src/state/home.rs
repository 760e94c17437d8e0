//! Idea board of the home screen

use super::request::{RequestTag, RequestTracker};
use crate::models::StoryIdea;
use crate::services::{IdeaService, ServiceError};
use log::{debug, warn};

pub const IDEAS_ERROR: &str = "The story fairies are sleeping! Couldn't fetch new ideas.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdeaFetch {
    /// Replace the whole list
    Refresh,
    /// Append to the end of the list
    LoadMore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum BoardStatus {
    #[default]
    Idle,
    Fetching(IdeaFetch),
}

#[derive(Debug, Default)]
pub struct IdeaBoard {
    ideas: Vec<StoryIdea>,
    status: BoardStatus,
    requests: RequestTracker,
    error: Option<&'static str>,
}

impl IdeaBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ideas(&self) -> &[StoryIdea] {
        &self.ideas
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn is_refreshing(&self) -> bool {
        self.status == BoardStatus::Fetching(IdeaFetch::Refresh)
    }

    pub fn is_appending(&self) -> bool {
        self.status == BoardStatus::Fetching(IdeaFetch::LoadMore)
    }

    pub fn is_busy(&self) -> bool {
        self.status != BoardStatus::Idle
    }

    /// Start a fetch. Returns `None` while another fetch is running.
    pub fn begin(&mut self, kind: IdeaFetch) -> Option<RequestTag> {
        if self.is_busy() {
            debug!("Ignoring {:?}, ideas are already being fetched", kind);
            return None;
        }

        if kind == IdeaFetch::Refresh {
            self.ideas.clear();
        }
        self.error = None;
        self.status = BoardStatus::Fetching(kind);
        Some(self.requests.issue())
    }

    /// Apply a fetch result. Returns false when the tag is stale.
    pub fn finish(
        &mut self,
        tag: RequestTag,
        result: Result<Vec<StoryIdea>, ServiceError>,
    ) -> bool {
        if !self.requests.complete(tag) {
            debug!("Dropping stale idea response {}", tag);
            return false;
        }

        let BoardStatus::Fetching(kind) = std::mem::take(&mut self.status) else {
            return false;
        };

        match result {
            Ok(ideas) => {
                debug!("Received {} ideas ({:?})", ideas.len(), kind);
                match kind {
                    IdeaFetch::Refresh => self.ideas = ideas,
                    IdeaFetch::LoadMore => self.ideas.extend(ideas),
                }
            }
            Err(e) => {
                warn!("Failed to fetch story ideas: {}", e);
                self.error = Some(IDEAS_ERROR);
            }
        }
        true
    }

    /// Abandon the running fetch, e.g. when leaving the home screen
    pub fn cancel(&mut self) {
        self.requests.cancel();
        self.status = BoardStatus::Idle;
    }

    /// Run one fetch to completion against `service`
    pub async fn fetch(&mut self, service: &dyn IdeaService, kind: IdeaFetch) -> bool {
        let Some(tag) = self.begin(kind) else {
            return false;
        };
        let result = service.generate_ideas().await;
        self.finish(tag, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::stubs::StubIdeas;

    fn ideas(titles: &[&str]) -> Vec<StoryIdea> {
        titles
            .iter()
            .map(|t| StoryIdea::new(*t, format!("{} premise", t)))
            .collect()
    }

    #[tokio::test]
    async fn test_refresh_replaces_and_load_more_appends() {
        let service = StubIdeas::new(vec![
            Ok(ideas(&["Moon", "Owl"])),
            Ok(ideas(&["Cloud"])),
            Ok(ideas(&["Star"])),
        ]);
        let mut board = IdeaBoard::new();

        assert!(board.fetch(&service, IdeaFetch::Refresh).await);
        assert!(board.fetch(&service, IdeaFetch::LoadMore).await);
        let titles: Vec<&str> = board.ideas().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Moon", "Owl", "Cloud"]);

        assert!(board.fetch(&service, IdeaFetch::Refresh).await);
        assert_eq!(board.ideas(), ideas(&["Star"]).as_slice());
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_list_empty() {
        let service = StubIdeas::new(vec![
            Ok(ideas(&["Moon", "Owl"])),
            Err(ServiceError::Malformed("boom".into())),
        ]);
        let mut board = IdeaBoard::new();
        board.fetch(&service, IdeaFetch::Refresh).await;

        board.fetch(&service, IdeaFetch::Refresh).await;
        assert!(board.ideas().is_empty());
        assert_eq!(board.error(), Some(IDEAS_ERROR));
        assert!(!board.is_busy());
    }

    #[tokio::test]
    async fn test_failed_load_more_keeps_list() {
        let service = StubIdeas::new(vec![
            Ok(ideas(&["Moon"])),
            Err(ServiceError::EmptyStory),
            Ok(ideas(&["Owl"])),
        ]);
        let mut board = IdeaBoard::new();
        board.fetch(&service, IdeaFetch::Refresh).await;
        board.fetch(&service, IdeaFetch::LoadMore).await;
        assert_eq!(board.ideas().len(), 1);
        assert_eq!(board.error(), Some(IDEAS_ERROR));

        // The next fetch clears the message
        board.fetch(&service, IdeaFetch::LoadMore).await;
        assert_eq!(board.ideas().len(), 2);
        assert!(board.error().is_none());
    }

    #[test]
    fn test_only_one_fetch_at_a_time() {
        let mut board = IdeaBoard::new();
        let tag = board.begin(IdeaFetch::Refresh).unwrap();
        assert!(board.is_refreshing());
        assert!(board.begin(IdeaFetch::LoadMore).is_none());

        assert!(board.finish(tag, Ok(ideas(&["Moon"]))));
        assert!(!board.is_busy());
        assert!(board.begin(IdeaFetch::LoadMore).is_some());
        assert!(board.is_appending());
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut board = IdeaBoard::new();
        let old = board.begin(IdeaFetch::Refresh).unwrap();
        board.cancel();
        let new = board.begin(IdeaFetch::Refresh).unwrap();

        assert!(!board.finish(old, Ok(ideas(&["Old"]))));
        assert!(board.is_refreshing());
        assert!(board.finish(new, Ok(ideas(&["New"]))));
        assert_eq!(board.ideas()[0].title, "New");
    }
}
