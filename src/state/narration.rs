//! Which narration panel is open on the player screen

/// At most one panel is open at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NarrationPanel {
    #[default]
    Closed,
    SynthesizedVoice,
    RecordedVoice,
}

impl NarrationPanel {
    pub fn toggle_synthesized(&mut self) {
        self.toggle(NarrationPanel::SynthesizedVoice);
    }

    pub fn toggle_recorded(&mut self) {
        self.toggle(NarrationPanel::RecordedVoice);
    }

    pub fn close(&mut self) {
        *self = NarrationPanel::Closed;
    }

    fn toggle(&mut self, panel: NarrationPanel) {
        *self = if *self == panel {
            NarrationPanel::Closed
        } else {
            panel
        };
    }
}
