//! The story player screen
//!
//! [`StoryPlayer`] ties the playback and capture controllers to one story.
//! Synthesized narration is requested through a [`SpeechTicket`]; the answer
//! is applied with [`StoryPlayer::finish_speech`] only while its tag is still
//! current. Recorded clips arrive on the capture completion channel and are
//! picked up by [`StoryPlayer::refresh`].

use super::narration::NarrationPanel;
use super::request::{RequestTag, RequestTracker};
use crate::audio::{
    decode_speech, AudioOutput, CaptureState, Microphone, PlaybackController, PlaybackState,
    RecordedClip, VoiceCaptureController,
};
use crate::models::Story;
use crate::services::{ServiceError, SpeechService};
use log::{debug, error, info};
use std::sync::mpsc::{self, Receiver};

pub const SPEECH_ERROR: &str =
    "Could not generate audio. Please try another voice or try again later.";
pub const PLAYBACK_ERROR: &str = "The narration could not be played. Please try again.";

/// Everything needed to run one speech request off the UI thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechTicket {
    pub tag: RequestTag,
    pub text: String,
    pub voice: &'static str,
}

pub struct StoryPlayer {
    story: Story,
    playback: PlaybackController,
    capture: VoiceCaptureController,
    completed: Receiver<RecordedClip>,
    panel: NarrationPanel,
    speech: RequestTracker,
    selected_voice: Option<&'static str>,
    error: Option<&'static str>,
}

impl StoryPlayer {
    pub fn new(story: Story, output: Box<dyn AudioOutput>, microphone: Box<dyn Microphone>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            story,
            playback: PlaybackController::new(output),
            capture: VoiceCaptureController::new(microphone, tx),
            completed: rx,
            panel: NarrationPanel::Closed,
            speech: RequestTracker::new(),
            selected_voice: None,
            error: None,
        }
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn panel(&self) -> NarrationPanel {
        self.panel
    }

    pub fn selected_voice(&self) -> Option<&'static str> {
        self.selected_voice
    }

    pub fn is_generating(&self) -> bool {
        self.speech.in_flight()
    }

    /// Speech or playback problem shown above the controls
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn has_audio(&self) -> bool {
        self.playback.has_source()
    }

    pub fn progress(&self) -> f32 {
        self.playback.progress()
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    pub fn is_recording(&self) -> bool {
        self.capture.is_recording()
    }

    pub fn recording_level(&self) -> f32 {
        self.capture.level()
    }

    pub fn recording_seconds(&self) -> f64 {
        self.capture.elapsed_seconds()
    }

    pub fn capture_error(&self) -> Option<&'static str> {
        self.capture.error().map(|e| e.user_message())
    }

    pub fn toggle_synthesized_panel(&mut self) {
        self.panel.toggle_synthesized();
        self.discard_hidden_recording();
    }

    pub fn toggle_recorded_panel(&mut self) {
        self.panel.toggle_recorded();
        self.discard_hidden_recording();
    }

    /// A recording only lives while its panel is shown. Hiding the panel
    /// discards the take and frees the microphone.
    fn discard_hidden_recording(&mut self) {
        if self.panel != NarrationPanel::RecordedVoice && self.capture.is_recording() {
            info!("Recorder closed mid-take, discarding it");
            self.capture.release();
        }
    }

    /// Drop the current narration and request speech in `voice`
    pub fn select_voice(&mut self, voice: &'static str) -> SpeechTicket {
        self.playback.clear();
        self.error = None;
        self.selected_voice = Some(voice);

        let tag = self.speech.issue();
        debug!("Requesting speech {} with voice {}", tag, voice);
        SpeechTicket {
            tag,
            text: self.story.text.clone(),
            voice,
        }
    }

    /// Apply a speech answer. Returns false when the tag is stale.
    pub fn finish_speech(&mut self, tag: RequestTag, result: Result<String, ServiceError>) -> bool {
        if !self.speech.complete(tag) {
            debug!("Dropping stale speech response {}", tag);
            return false;
        }

        let decoded = result.map_err(|e| e.to_string()).and_then(|payload| {
            decode_speech(&payload).map_err(|e| e.to_string())
        });

        match decoded {
            Ok(buffer) => {
                info!("Narration ready ({:.1}s)", buffer.duration_seconds());
                self.playback.load_synthesized(buffer);
            }
            Err(e) => {
                error!("Error generating speech: {}", e);
                self.error = Some(SPEECH_ERROR);
            }
        }
        true
    }

    /// Request, wait for and load speech in one go
    pub async fn narrate(&mut self, service: &dyn SpeechService, voice: &'static str) -> bool {
        let ticket = self.select_voice(voice);
        let result = service.synthesize(&ticket.text, ticket.voice).await;
        self.finish_speech(ticket.tag, result)
    }

    /// Does nothing while recording so the speakers stay out of the take
    pub fn toggle_playback(&mut self) -> PlaybackState {
        if self.capture.is_recording() {
            debug!("Ignoring playback toggle while recording");
            return self.playback.state();
        }
        match self.playback.toggle() {
            Ok(state) => {
                self.error = None;
                state
            }
            Err(e) => {
                error!("Error starting narration: {}", e);
                self.error = Some(PLAYBACK_ERROR);
                PlaybackState::Idle
            }
        }
    }

    pub fn start_recording(&mut self) {
        // The speakers must not end up in the recording
        self.playback.stop();
        let _ = self.capture.start_recording();
    }

    pub fn stop_recording(&mut self) {
        if self.capture.stop_recording().is_ok() {
            self.collect_recordings();
        }
    }

    /// Pick up everything that changed outside of user actions
    pub fn refresh(&mut self) {
        self.playback.refresh();
        self.capture.poll();
        self.collect_recordings();
    }

    /// Stop playback and release the microphone
    pub fn teardown(&mut self) {
        self.speech.cancel();
        self.playback.stop();
        self.capture.release();
    }

    fn collect_recordings(&mut self) {
        while let Ok(clip) = self.completed.try_recv() {
            info!(
                "Narrating with {} recorded at {}",
                clip.name(),
                clip.recorded_at().format("%H:%M:%S")
            );
            self.error = None;
            self.selected_voice = None;
            self.speech.cancel();
            self.playback.load_recorded(clip);
            self.panel.close();
        }
    }
}

impl Drop for StoryPlayer {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fakes::{FakeMicrophone, FakeOutput};
    use crate::audio::{AudioSource, CaptureError};
    use crate::services::stubs::StubSpeech;
    use base64::Engine;

    fn player(output: &FakeOutput, mic: &FakeMicrophone) -> StoryPlayer {
        StoryPlayer::new(
            Story::new("The Sleepy Owl", "Once upon a time an owl could not sleep."),
            Box::new(output.clone()),
            Box::new(mic.clone()),
        )
    }

    fn speech_payload(samples: usize) -> String {
        let pcm: Vec<u8> = (0..samples as i16).flat_map(|s| s.to_le_bytes()).collect();
        base64::engine::general_purpose::STANDARD.encode(pcm)
    }

    #[tokio::test]
    async fn test_empty_payload_reports_speech_error() {
        let output = FakeOutput::new();
        let mic = FakeMicrophone::new(Vec::new(), 16_000);
        let mut player = player(&output, &mic);
        let service = StubSpeech {
            payload: String::new(),
        };

        assert!(player.narrate(&service, "Kore").await);
        assert_eq!(player.error(), Some(SPEECH_ERROR));
        assert!(!player.has_audio());

        assert_eq!(player.toggle_playback(), PlaybackState::Idle);
        assert_eq!(output.started(), 0);
    }

    #[tokio::test]
    async fn test_narration_loads_without_autoplay() {
        let output = FakeOutput::new();
        let mic = FakeMicrophone::new(Vec::new(), 16_000);
        let mut player = player(&output, &mic);
        let service = StubSpeech {
            payload: speech_payload(480),
        };

        player.toggle_synthesized_panel();
        assert!(player.narrate(&service, "Puck").await);
        assert!(player.error().is_none());
        assert_eq!(player.selected_voice(), Some("Puck"));
        assert_eq!(player.playback_state(), PlaybackState::Idle);

        assert_eq!(player.toggle_playback(), PlaybackState::Playing);
        assert_eq!(output.last_sample_rate(), Some(24_000));
    }

    #[test]
    fn test_stale_speech_is_ignored() {
        let output = FakeOutput::new();
        let mic = FakeMicrophone::new(Vec::new(), 16_000);
        let mut player = player(&output, &mic);

        let slow = player.select_voice("Kore");
        let fast = player.select_voice("Charon");
        assert!(player.finish_speech(fast.tag, Ok(speech_payload(10))));
        assert!(!player.finish_speech(slow.tag, Ok(String::new())));

        assert!(player.error().is_none());
        assert!(player.has_audio());
        assert_eq!(player.selected_voice(), Some("Charon"));
    }

    #[test]
    fn test_new_voice_clears_previous_audio() {
        let output = FakeOutput::new();
        let mic = FakeMicrophone::new(Vec::new(), 16_000);
        let mut player = player(&output, &mic);

        let ticket = player.select_voice("Kore");
        player.finish_speech(ticket.tag, Ok(speech_payload(10)));
        player.toggle_playback();

        let ticket = player.select_voice("Fenrir");
        assert_eq!(output.active(), 0);
        assert!(!player.has_audio());
        assert!(player.is_generating());

        player.finish_speech(ticket.tag, Err(ServiceError::EmptyAudio));
        assert_eq!(player.error(), Some(SPEECH_ERROR));
        assert!(!player.has_audio());
        assert!(!player.is_generating());
    }

    #[test]
    fn test_recording_replaces_narration_and_closes_panel() {
        let output = FakeOutput::new();
        let mic = FakeMicrophone::new(vec![0.2; 1600], 16_000);
        let mut player = player(&output, &mic);

        let ticket = player.select_voice("Kore");
        player.finish_speech(ticket.tag, Ok(speech_payload(10)));
        player.toggle_playback();

        player.toggle_recorded_panel();
        player.start_recording();
        assert_eq!(output.active(), 0, "playback stops while recording");
        assert!(player.is_recording());

        player.stop_recording();
        assert_eq!(mic.active(), 0);
        assert_eq!(player.panel(), NarrationPanel::Closed);
        assert!(player.selected_voice().is_none());
        assert!(matches!(
            player.playback.source(),
            AudioSource::Recorded(_)
        ));

        assert_eq!(player.toggle_playback(), PlaybackState::Playing);
        assert_eq!(output.last_sample_rate(), Some(16_000));
    }

    #[test]
    fn test_closing_recorder_panel_releases_microphone() {
        let output = FakeOutput::new();
        let mic = FakeMicrophone::new(vec![0.2; 1600], 16_000);
        let mut player = player(&output, &mic);

        player.toggle_recorded_panel();
        player.start_recording();
        assert_eq!(mic.active(), 1);

        player.toggle_synthesized_panel();
        assert_eq!(mic.active(), 0);
        assert!(!player.is_recording());
        assert_eq!(player.panel(), NarrationPanel::SynthesizedVoice);

        // The discarded take never reaches playback
        player.refresh();
        assert!(!player.has_audio());

        player.toggle_synthesized_panel();
        player.toggle_recorded_panel();
        player.start_recording();
        player.toggle_recorded_panel();
        assert_eq!(mic.active(), 0);
        assert_eq!(player.panel(), NarrationPanel::Closed);
    }

    #[test]
    fn test_playback_stays_off_while_recording() {
        let output = FakeOutput::new();
        let mic = FakeMicrophone::new(vec![0.2; 1600], 16_000);
        let mut player = player(&output, &mic);

        let ticket = player.select_voice("Kore");
        player.finish_speech(ticket.tag, Ok(speech_payload(10)));
        player.toggle_recorded_panel();
        player.start_recording();

        assert_eq!(player.toggle_playback(), PlaybackState::Idle);
        assert_eq!(output.started(), 0);
        assert!(player.is_recording());
    }

    #[test]
    fn test_microphone_denied_is_shown() {
        let output = FakeOutput::new();
        let mic = FakeMicrophone::new(Vec::new(), 16_000);
        mic.fail_next_open(CaptureError::PermissionDenied("no".into()));
        let mut player = player(&output, &mic);

        player.toggle_recorded_panel();
        player.start_recording();
        assert_eq!(player.capture_state(), CaptureState::Error);
        assert!(player
            .capture_error()
            .is_some_and(|m| m.starts_with("Microphone access denied")));
        assert_eq!(player.panel(), NarrationPanel::RecordedVoice);
    }

    #[test]
    fn test_refresh_notices_end_and_device_loss() {
        let output = FakeOutput::new();
        let mic = FakeMicrophone::new(vec![0.0; 16], 16_000);
        let mut player = player(&output, &mic);

        let ticket = player.select_voice("Kore");
        player.finish_speech(ticket.tag, Ok(speech_payload(10)));
        player.toggle_playback();
        output.finish_current();
        player.refresh();
        assert_eq!(player.playback_state(), PlaybackState::Idle);
        assert_eq!(output.active(), 0);

        player.start_recording();
        mic.break_current(CaptureError::Device("unplugged".into()));
        player.refresh();
        assert_eq!(player.capture_state(), CaptureState::Error);
        assert_eq!(mic.active(), 0);
    }

    #[test]
    fn test_drop_releases_everything() {
        let output = FakeOutput::new();
        let mic = FakeMicrophone::new(vec![0.0; 16], 16_000);
        let mut player = player(&output, &mic);

        let ticket = player.select_voice("Kore");
        player.finish_speech(ticket.tag, Ok(speech_payload(10)));
        player.toggle_playback();
        player.capture.start_recording().unwrap();
        assert_eq!(output.active(), 1);
        assert_eq!(mic.active(), 1);

        drop(player);
        assert_eq!(output.active(), 0);
        assert_eq!(mic.active(), 0);
    }
}
