//! Custom story form

use super::request::{RequestTag, RequestTracker};
use crate::models::{Story, StoryRequest};
use crate::services::{ServiceError, StoryService};
use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all the magic ingredients!")]
    MissingIngredients,
}

/// A validated request on its way to the story service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub tag: RequestTag,
    pub request: StoryRequest,
}

#[derive(Debug, Default)]
pub struct StoryForm {
    child_name: String,
    character: String,
    theme: String,
    requests: RequestTracker,
    error: Option<ValidationError>,
}

impl StoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_child_name(&mut self, value: impl Into<String>) {
        self.child_name = value.into();
    }

    pub fn set_character(&mut self, value: impl Into<String>) {
        self.character = value.into();
    }

    pub fn set_theme(&mut self, value: impl Into<String>) {
        self.theme = value.into();
    }

    pub fn error(&self) -> Option<ValidationError> {
        self.error
    }

    pub fn is_submitting(&self) -> bool {
        self.requests.in_flight()
    }

    /// Validate the fields and produce a request for the story service
    pub fn begin_submit(&mut self) -> Result<Option<Submission>, ValidationError> {
        if self.is_submitting() {
            return Ok(None);
        }

        let child_name = self.child_name.trim();
        let character = self.character.trim();
        let theme = self.theme.trim();
        if child_name.is_empty() || character.is_empty() || theme.is_empty() {
            self.error = Some(ValidationError::MissingIngredients);
            return Err(ValidationError::MissingIngredients);
        }

        let request = StoryRequest {
            child_name: child_name.to_string(),
            character: character.to_string(),
            theme: theme.to_string(),
        };
        self.error = None;
        let tag = self.requests.issue();
        debug!("Submitting custom story request {}", tag);
        Ok(Some(Submission { tag, request }))
    }

    /// Turn the service answer into the story to play
    ///
    /// A failed request still yields a story, the placeholder. `None` means
    /// the tag is stale.
    pub fn finish_submit(
        &mut self,
        tag: RequestTag,
        result: Result<Story, ServiceError>,
    ) -> Option<Story> {
        if !self.requests.complete(tag) {
            debug!("Dropping stale story response {}", tag);
            return None;
        }

        Some(result.unwrap_or_else(|e| {
            warn!("Error generating custom story: {}", e);
            Story::placeholder()
        }))
    }

    pub fn cancel(&mut self) {
        self.requests.cancel();
    }

    /// Validate, call the service and return the story
    pub async fn submit(
        &mut self,
        service: &dyn StoryService,
    ) -> Result<Option<Story>, ValidationError> {
        let Some(submission) = self.begin_submit()? else {
            return Ok(None);
        };
        let result = service.custom_story(&submission.request).await;
        Ok(self.finish_submit(submission.tag, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::stubs::StubStories;

    fn filled_form() -> StoryForm {
        let mut form = StoryForm::new();
        form.set_child_name("  Lily ");
        form.set_character("a brave firefly");
        form.set_theme("finding a hidden treasure");
        form
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let mut form = filled_form();
        form.set_theme("   ");

        assert_eq!(
            form.begin_submit(),
            Err(ValidationError::MissingIngredients)
        );
        assert_eq!(
            form.error().map(|e| e.to_string()).as_deref(),
            Some("Please fill in all the magic ingredients!")
        );
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_validation_happens_before_the_request() {
        let service = StubStories::returning(Story::new("T", "text"));
        let mut form = StoryForm::new();
        form.set_child_name("Lily");

        assert!(form.submit(&service).await.is_err());
        assert!(service.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_sends_trimmed_request() {
        let service = StubStories::returning(Story::new("Lily and the Lantern Bug", "Once..."));
        let mut form = filled_form();

        let story = form.submit(&service).await.unwrap().unwrap();
        assert_eq!(story.title, "Lily and the Lantern Bug");

        let requests = service.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].child_name, "Lily");
        assert!(form.error().is_none());
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_service_failure_yields_placeholder() {
        let service = StubStories::failing();
        let mut form = filled_form();

        let story = form.submit(&service).await.unwrap().unwrap();
        assert_eq!(story, Story::placeholder());
        assert_eq!(story.title, "A Little Hiccup");
    }

    #[test]
    fn test_one_submission_at_a_time() {
        let mut form = filled_form();
        let first = form.begin_submit().unwrap().unwrap();
        assert_eq!(form.begin_submit(), Ok(None));

        form.cancel();
        assert!(form.finish_submit(first.tag, Ok(Story::new("T", "x"))).is_none());
    }
}
