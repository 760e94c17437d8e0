//! In-memory audio backends for controller tests

use super::capture::{CaptureSession, Microphone};
use super::decoder::DecodedBuffer;
use super::error::{AudioError, CaptureError};
use super::playback::{ActivePlayback, AudioOutput};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

#[derive(Default)]
struct OutputLog {
    started: usize,
    stopped: usize,
    active: usize,
    max_active: usize,
    last_sample_rate: Option<u32>,
    current: Option<Rc<Cell<bool>>>,
    fail_next: bool,
}

/// Output that records stream starts and stops instead of making sound
#[derive(Clone, Default)]
pub struct FakeOutput {
    log: Rc<RefCell<OutputLog>>,
}

impl FakeOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> usize {
        self.log.borrow().started
    }

    pub fn stopped(&self) -> usize {
        self.log.borrow().stopped
    }

    pub fn active(&self) -> usize {
        self.log.borrow().active
    }

    pub fn max_active(&self) -> usize {
        self.log.borrow().max_active
    }

    pub fn last_sample_rate(&self) -> Option<u32> {
        self.log.borrow().last_sample_rate
    }

    /// Make the most recent stream run out of samples
    pub fn finish_current(&self) {
        if let Some(finished) = &self.log.borrow().current {
            finished.set(true);
        }
    }

    pub fn fail_next_start(&self) {
        self.log.borrow_mut().fail_next = true;
    }
}

impl AudioOutput for FakeOutput {
    fn start(&mut self, buffer: Arc<DecodedBuffer>) -> Result<Box<dyn ActivePlayback>, AudioError> {
        let mut log = self.log.borrow_mut();
        if log.fail_next {
            log.fail_next = false;
            return Err(AudioError::Output("no speakers".to_string()));
        }

        let finished = Rc::new(Cell::new(false));
        log.started += 1;
        log.active += 1;
        log.max_active = log.max_active.max(log.active);
        log.last_sample_rate = Some(buffer.sample_rate());
        log.current = Some(finished.clone());

        Ok(Box::new(FakeStream {
            log: self.log.clone(),
            finished,
            released: false,
        }))
    }
}

struct FakeStream {
    log: Rc<RefCell<OutputLog>>,
    finished: Rc<Cell<bool>>,
    released: bool,
}

impl ActivePlayback for FakeStream {
    fn is_finished(&self) -> bool {
        self.released || self.finished.get()
    }

    fn progress(&self) -> f32 {
        0.5
    }

    fn stop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut log = self.log.borrow_mut();
        log.stopped += 1;
        log.active -= 1;
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Default)]
struct MicrophoneLog {
    opened: usize,
    released: usize,
    next_error: Option<CaptureError>,
    current_failure: Option<Rc<RefCell<Option<CaptureError>>>>,
}

/// Microphone that "captures" a fixed set of samples
#[derive(Clone)]
pub struct FakeMicrophone {
    log: Rc<RefCell<MicrophoneLog>>,
    samples: Vec<f32>,
    sample_rate: u32,
}

impl FakeMicrophone {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            log: Rc::new(RefCell::new(MicrophoneLog::default())),
            samples,
            sample_rate,
        }
    }

    pub fn opened(&self) -> usize {
        self.log.borrow().opened
    }

    /// Sessions currently holding the device
    pub fn active(&self) -> usize {
        let log = self.log.borrow();
        log.opened - log.released
    }

    pub fn fail_next_open(&self, error: CaptureError) {
        self.log.borrow_mut().next_error = Some(error);
    }

    /// Make the open session report a device failure
    pub fn break_current(&self, error: CaptureError) {
        if let Some(failure) = &self.log.borrow().current_failure {
            *failure.borrow_mut() = Some(error);
        }
    }
}

impl Microphone for FakeMicrophone {
    fn open(&mut self) -> Result<Box<dyn CaptureSession>, CaptureError> {
        let mut log = self.log.borrow_mut();
        if let Some(error) = log.next_error.take() {
            return Err(error);
        }

        let failure = Rc::new(RefCell::new(None));
        log.opened += 1;
        log.current_failure = Some(failure.clone());

        Ok(Box::new(FakeSession {
            log: self.log.clone(),
            samples: self.samples.clone(),
            sample_rate: self.sample_rate,
            failure,
        }))
    }
}

struct FakeSession {
    log: Rc<RefCell<MicrophoneLog>>,
    samples: Vec<f32>,
    sample_rate: u32,
    failure: Rc<RefCell<Option<CaptureError>>>,
}

impl CaptureSession for FakeSession {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn level(&self) -> f32 {
        0.1
    }

    fn elapsed_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    fn failure(&self) -> Option<CaptureError> {
        self.failure.borrow().clone()
    }

    fn finish(mut self: Box<Self>) -> Vec<f32> {
        std::mem::take(&mut self.samples)
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.log.borrow_mut().released += 1;
    }
}
