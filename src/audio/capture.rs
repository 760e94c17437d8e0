//! Recording the reader's own voice
//!
//! [`VoiceCaptureController`] opens a microphone session, lets it collect
//! audio, and on stop turns the collected samples into one [`RecordedClip`]
//! that is sent to whoever listens on the completion channel. The session is
//! released on stop, on device failure, and when the controller is dropped.

use super::error::CaptureError;
use super::recorder::RecordedClip;
use log::{debug, error, info, warn};
use pipewire as pw;
use pw::spa;
use pw::spa::param::format::{MediaSubtype, MediaType};
use pw::spa::param::format_utils;
use pw::spa::pod::Pod;
use std::sync::mpsc::{self, Sender, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long PipeWire may take to open the capture stream
const STREAM_STARTUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Source of microphone sessions
pub trait Microphone {
    fn open(&mut self) -> Result<Box<dyn CaptureSession>, CaptureError>;
}

/// An open microphone collecting audio
///
/// Dropping a session must release the device.
pub trait CaptureSession {
    fn sample_rate(&self) -> u32;

    /// Smoothed RMS input level (0.0 - 1.0)
    fn level(&self) -> f32;

    fn elapsed_seconds(&self) -> f64;

    /// Set when the device failed after the session was opened
    fn failure(&self) -> Option<CaptureError>;

    /// Release the device and return everything captured
    fn finish(self: Box<Self>) -> Vec<f32>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Recording,
    Error,
}

enum Phase {
    Idle,
    Recording(Box<dyn CaptureSession>),
    Failed(CaptureError),
}

/// Owner of the microphone for one player screen
pub struct VoiceCaptureController {
    microphone: Box<dyn Microphone>,
    phase: Phase,
    completed: Sender<RecordedClip>,
}

impl VoiceCaptureController {
    /// `completed` receives one clip per successful recording
    pub fn new(microphone: Box<dyn Microphone>, completed: Sender<RecordedClip>) -> Self {
        Self {
            microphone,
            phase: Phase::Idle,
            completed,
        }
    }

    pub fn state(&self) -> CaptureState {
        match self.phase {
            Phase::Idle => CaptureState::Idle,
            Phase::Recording(_) => CaptureState::Recording,
            Phase::Failed(_) => CaptureState::Error,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.phase, Phase::Recording(_))
    }

    pub fn error(&self) -> Option<&CaptureError> {
        match &self.phase {
            Phase::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn level(&self) -> f32 {
        match &self.phase {
            Phase::Recording(session) => session.level(),
            _ => 0.0,
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        match &self.phase {
            Phase::Recording(session) => session.elapsed_seconds(),
            _ => 0.0,
        }
    }

    /// Open the microphone and start collecting audio
    ///
    /// Does nothing if a recording is already running. On failure the
    /// controller keeps no session and reports `Error` until the next attempt.
    pub fn start_recording(&mut self) -> Result<(), CaptureError> {
        if self.is_recording() {
            return Ok(());
        }

        match self.microphone.open() {
            Ok(session) => {
                info!("Recording started ({}Hz)", session.sample_rate());
                self.phase = Phase::Recording(session);
                Ok(())
            }
            Err(e) => {
                error!("Error accessing microphone: {}", e);
                self.phase = Phase::Failed(e.clone());
                Err(e)
            }
        }
    }

    /// Finish the recording, release the microphone and publish the clip
    ///
    /// Does nothing when no recording is running.
    pub fn stop_recording(&mut self) -> Result<(), CaptureError> {
        let Phase::Recording(session) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return Ok(());
        };

        let sample_rate = session.sample_rate();
        let samples = session.finish();
        debug!("Microphone released after {} samples", samples.len());

        let clip = RecordedClip::encode(&samples, sample_rate).map_err(|e| {
            let error = CaptureError::Device(e.to_string());
            self.phase = Phase::Failed(error.clone());
            error
        })?;

        info!(
            "Recording complete: {} ({:.1}s)",
            clip.name(),
            clip.duration_seconds()
        );
        if self.completed.send(clip).is_err() {
            warn!("Recording finished but nobody is listening for it");
        }
        Ok(())
    }

    /// Notice a device failure of the running session
    pub fn poll(&mut self) -> CaptureState {
        let failure = match &self.phase {
            Phase::Recording(session) => session.failure(),
            _ => None,
        };

        if let Some(error) = failure {
            error!("Recording aborted: {}", error);
            if let Phase::Recording(session) = std::mem::replace(&mut self.phase, Phase::Idle) {
                drop(session.finish());
            }
            self.phase = Phase::Failed(error);
        }

        self.state()
    }

    /// Release the microphone without producing a clip
    pub fn release(&mut self) {
        if let Phase::Recording(session) = std::mem::replace(&mut self.phase, Phase::Idle) {
            debug!("Discarding unfinished recording");
            drop(session.finish());
        }
    }
}

impl Drop for VoiceCaptureController {
    fn drop(&mut self) {
        self.release();
    }
}

/// Shared state between a capture thread and its session handle
#[derive(Clone)]
struct SharedCaptureState {
    inner: Arc<Mutex<CaptureStateInner>>,
}

struct CaptureStateInner {
    /// Smoothed RMS volume level (0.0 - 1.0)
    volume_level: f32,
    /// Captured audio samples (f32, mono)
    samples: Vec<f32>,
    sample_rate: u32,
    failure: Option<CaptureError>,
}

impl SharedCaptureState {
    fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CaptureStateInner {
                volume_level: 0.0,
                samples: Vec::new(),
                sample_rate: 48000,
                failure: None,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut CaptureStateInner) -> R) -> Option<R> {
        self.inner.lock().ok().map(|mut inner| f(&mut inner))
    }

    fn set_failure(&self, error: CaptureError) {
        self.with(|inner| inner.failure = Some(error));
    }

    /// Append one chunk of incoming mono audio
    fn process_samples(&self, samples: &[f32], sample_rate: u32) {
        self.with(|inner| {
            if sample_rate > 0 {
                inner.sample_rate = sample_rate;
            }
            if samples.is_empty() {
                return;
            }

            let rms = calculate_rms(samples);
            inner.volume_level = inner.volume_level * 0.7 + rms * 0.3;
            inner.samples.extend_from_slice(samples);
        });
    }
}

enum PipeWireCommand {
    Stop,
}

/// Default microphone through PipeWire
#[derive(Default)]
pub struct PipeWireMicrophone;

impl PipeWireMicrophone {
    pub fn new() -> Self {
        Self
    }
}

impl Microphone for PipeWireMicrophone {
    fn open(&mut self) -> Result<Box<dyn CaptureSession>, CaptureError> {
        let state = SharedCaptureState::new();
        let (sender, receiver) = pw::channel::channel::<PipeWireCommand>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), CaptureError>>(1);

        let thread_state = state.clone();
        let handle = thread::spawn(move || {
            if let Err(e) = run_capture_loop(thread_state.clone(), receiver, &ready_tx) {
                let _ = ready_tx.try_send(Err(e.clone()));
                thread_state.set_failure(e);
            }
        });

        match ready_rx.recv_timeout(STREAM_STARTUP_TIMEOUT) {
            Ok(Ok(())) => Ok(Box::new(PipeWireCapture {
                state,
                sender: Some(sender),
                thread_handle: Some(handle),
            })),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = sender.send(PipeWireCommand::Stop);
                let _ = handle.join();
                Err(CaptureError::Device(
                    "PipeWire did not open a capture stream".to_string(),
                ))
            }
        }
    }
}

/// A running PipeWire capture stream
struct PipeWireCapture {
    state: SharedCaptureState,
    sender: Option<pw::channel::Sender<PipeWireCommand>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl PipeWireCapture {
    fn shutdown(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(PipeWireCommand::Stop);
        }

        // Joining guarantees the stream is disconnected
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                warn!("Capture thread panicked");
            }
        }
    }
}

impl CaptureSession for PipeWireCapture {
    fn sample_rate(&self) -> u32 {
        self.state.with(|inner| inner.sample_rate).unwrap_or(48000)
    }

    fn level(&self) -> f32 {
        self.state.with(|inner| inner.volume_level).unwrap_or(0.0)
    }

    fn elapsed_seconds(&self) -> f64 {
        self.state
            .with(|inner| inner.samples.len() as f64 / inner.sample_rate.max(1) as f64)
            .unwrap_or(0.0)
    }

    fn failure(&self) -> Option<CaptureError> {
        self.state.with(|inner| inner.failure.clone()).flatten()
    }

    fn finish(mut self: Box<Self>) -> Vec<f32> {
        self.shutdown();
        self.state
            .with(|inner| std::mem::take(&mut inner.samples))
            .unwrap_or_default()
    }
}

impl Drop for PipeWireCapture {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run the PipeWire capture loop in a background thread
fn run_capture_loop(
    state: SharedCaptureState,
    receiver: pw::channel::Receiver<PipeWireCommand>,
    ready: &SyncSender<Result<(), CaptureError>>,
) -> Result<(), CaptureError> {
    pw::init();

    let mainloop = pw::main_loop::MainLoopRc::new(None).map_err(|e| {
        CaptureError::Unsupported(format!("Failed to create PipeWire main loop: {}", e))
    })?;

    let context = pw::context::ContextRc::new(&mainloop, None).map_err(|e| {
        CaptureError::Unsupported(format!("Failed to create PipeWire context: {}", e))
    })?;

    let core = context.connect_rc(None).map_err(|e| {
        CaptureError::Unsupported(format!("Failed to connect to PipeWire: {}", e))
    })?;

    let mainloop_weak = mainloop.downgrade();
    let _receiver = receiver.attach(mainloop.loop_(), move |cmd| match cmd {
        PipeWireCommand::Stop => {
            if let Some(mainloop) = mainloop_weak.upgrade() {
                mainloop.quit();
            }
        }
    });

    struct UserData {
        format: spa::param::audio::AudioInfoRaw,
        state: SharedCaptureState,
        mainloop_weak: pw::main_loop::MainLoopWeak,
    }

    let user_data = UserData {
        format: Default::default(),
        state: state.clone(),
        mainloop_weak: mainloop.downgrade(),
    };

    let props = pw::properties::properties! {
        *pw::keys::MEDIA_TYPE => "Audio",
        *pw::keys::MEDIA_CATEGORY => "Capture",
        *pw::keys::MEDIA_ROLE => "Communication",
        *pw::keys::APP_NAME => "StoryNest",
    };

    let stream = pw::stream::StreamBox::new(&core, "storynest-capture", props)
        .map_err(|e| CaptureError::Device(format!("Failed to create PipeWire stream: {}", e)))?;

    let _listener = stream
        .add_local_listener_with_user_data(user_data)
        .state_changed(|_, user_data, _old, new| {
            if let pw::stream::StreamState::Error(message) = new {
                user_data
                    .state
                    .set_failure(CaptureError::from_stream_error(&message));
                if let Some(mainloop) = user_data.mainloop_weak.upgrade() {
                    mainloop.quit();
                }
            }
        })
        .param_changed(|_, user_data, id, param| {
            let Some(param) = param else { return };
            if id != spa::param::ParamType::Format.as_raw() {
                return;
            }

            let (media_type, media_subtype) = match format_utils::parse_format(param) {
                Ok(v) => v,
                Err(_) => return,
            };

            if media_type != MediaType::Audio || media_subtype != MediaSubtype::Raw {
                return;
            }

            if let Err(e) = user_data.format.parse(param) {
                warn!("Failed to parse capture format: {:?}", e);
            }
        })
        .process(|stream, user_data| {
            let Some(mut buffer) = stream.dequeue_buffer() else {
                return;
            };

            let datas = buffer.datas_mut();
            if datas.is_empty() {
                return;
            }

            let data = &mut datas[0];
            let n_channels = user_data.format.channels().max(1);
            let sample_rate = user_data.format.rate();
            let n_samples = data.chunk().size() / (std::mem::size_of::<f32>() as u32);

            if let Some(raw_samples) = data.data() {
                // Keep the first channel only
                let mut mono_samples = Vec::with_capacity((n_samples / n_channels) as usize);

                for i in (0..n_samples).step_by(n_channels as usize) {
                    let start = i as usize * std::mem::size_of::<f32>();
                    let end = start + std::mem::size_of::<f32>();
                    if end <= raw_samples.len() {
                        let mut bytes = [0u8; 4];
                        bytes.copy_from_slice(&raw_samples[start..end]);
                        mono_samples.push(f32::from_le_bytes(bytes));
                    }
                }

                user_data.state.process_samples(&mono_samples, sample_rate);
            }
        })
        .register()
        .map_err(|e| CaptureError::Device(format!("Failed to register stream listener: {}", e)))?;

    // Request F32LE at the native rate
    let mut audio_info = spa::param::audio::AudioInfoRaw::new();
    audio_info.set_format(spa::param::audio::AudioFormat::F32LE);

    let obj = spa::pod::Object {
        type_: spa::utils::SpaTypes::ObjectParamFormat.as_raw(),
        id: spa::param::ParamType::EnumFormat.as_raw(),
        properties: audio_info.into(),
    };

    let values: Vec<u8> = spa::pod::serialize::PodSerializer::serialize(
        std::io::Cursor::new(Vec::new()),
        &spa::pod::Value::Object(obj),
    )
    .map_err(|e| CaptureError::Device(format!("Failed to serialize audio format: {:?}", e)))?
    .0
    .into_inner();

    let format_pod = Pod::from_bytes(&values)
        .ok_or_else(|| CaptureError::Device("Failed to build audio format pod".to_string()))?;
    let mut params = [format_pod];

    stream
        .connect(
            spa::utils::Direction::Input,
            None,
            pw::stream::StreamFlags::AUTOCONNECT
                | pw::stream::StreamFlags::MAP_BUFFERS
                | pw::stream::StreamFlags::RT_PROCESS,
            &mut params,
        )
        .map_err(|e| CaptureError::from_stream_error(&format!("Failed to connect stream: {}", e)))?;

    let _ = ready.try_send(Ok(()));

    // Run until stopped
    mainloop.run();

    Ok(())
}

/// Calculate RMS volume from samples
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
