//! Tags for in-flight service requests
//!
//! Every request carries a [`RequestTag`]. A response is applied only while its
//! tag is still the current one, so a slow older response can never overwrite
//! the result of a newer request.

use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTag(Uuid);

impl RequestTag {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestTag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

/// Remembers the one request whose response is still wanted
#[derive(Debug, Default)]
pub struct RequestTracker {
    current: Option<RequestTag>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding any previous one
    pub fn issue(&mut self) -> RequestTag {
        let tag = RequestTag::new();
        self.current = Some(tag);
        tag
    }

    pub fn is_current(&self, tag: RequestTag) -> bool {
        self.current == Some(tag)
    }

    /// Accept a response. Returns false for stale tags.
    pub fn complete(&mut self, tag: RequestTag) -> bool {
        if self.is_current(tag) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Forget the current request so its response is dropped
    pub fn cancel(&mut self) {
        self.current = None;
    }

    pub fn in_flight(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_request_supersedes_older() {
        let mut tracker = RequestTracker::new();
        let first = tracker.issue();
        let second = tracker.issue();

        assert!(!tracker.complete(first));
        assert!(tracker.in_flight());
        assert!(tracker.complete(second));
        assert!(!tracker.in_flight());
        assert!(!tracker.complete(second), "a tag completes only once");
    }

    #[test]
    fn test_cancel_drops_response() {
        let mut tracker = RequestTracker::new();
        let tag = tracker.issue();
        tracker.cancel();
        assert!(!tracker.complete(tag));
    }

    #[test]
    fn test_tags_are_unique() {
        assert_ne!(RequestTag::new(), RequestTag::new());
        assert_eq!(RequestTag::new().to_string().len(), 8);
    }
}
