//! Screen models
//!
//! Plain state machines behind the gpui views. They own no UI handles and can
//! be driven directly from tests.

pub mod creator;
pub mod home;
pub mod narration;
pub mod navigator;
pub mod player;
pub mod request;

pub use creator::{StoryForm, Submission, ValidationError};
pub use home::{IdeaBoard, IdeaFetch};
pub use narration::NarrationPanel;
pub use navigator::{Navigator, View};
pub use player::{SpeechTicket, StoryPlayer};
pub use request::{RequestTag, RequestTracker};
