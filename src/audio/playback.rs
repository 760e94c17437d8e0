//! Story narration playback
//!
//! [`PlaybackController`] owns the one playable source of the player screen
//! and the stream currently playing it. Streams come from an [`AudioOutput`];
//! the desktop build uses [`PipeWireOutput`].

use super::decoder::DecodedBuffer;
use super::error::AudioError;
use super::recorder::RecordedClip;
use log::{debug, error, warn};
use pipewire as pw;
use pw::spa;
use pw::spa::param::format::{MediaSubtype, MediaType};
use pw::spa::param::format_utils;
use pw::spa::pod::Pod;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long a new stream may take to connect before we give up on it
const STREAM_STARTUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Something that can start playing a decoded buffer
pub trait AudioOutput {
    fn start(&mut self, buffer: Arc<DecodedBuffer>) -> Result<Box<dyn ActivePlayback>, AudioError>;
}

/// A stream that is playing, or has finished playing, one buffer
pub trait ActivePlayback {
    /// True once every sample was played or the stream died
    fn is_finished(&self) -> bool;

    /// Fraction of the buffer already played (0.0 - 1.0)
    fn progress(&self) -> f32 {
        0.0
    }

    /// Halt output and release the stream. Must be idempotent.
    fn stop(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
}

/// The narration currently loaded into the player
#[derive(Debug, Clone, Default)]
pub enum AudioSource {
    #[default]
    None,
    Synthesized(Arc<DecodedBuffer>),
    Recorded(RecordedClip),
}

impl AudioSource {
    pub fn is_none(&self) -> bool {
        matches!(self, AudioSource::None)
    }
}

/// Single owner of narration output
pub struct PlaybackController {
    output: Box<dyn AudioOutput>,
    source: AudioSource,
    active: Option<Box<dyn ActivePlayback>>,
}

impl PlaybackController {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            output,
            source: AudioSource::None,
            active: None,
        }
    }

    /// Replace the source with synthesized speech. Does not start playing.
    pub fn load_synthesized(&mut self, buffer: DecodedBuffer) {
        self.stop();
        debug!(
            "Loaded synthesized narration ({:.1}s)",
            buffer.duration_seconds()
        );
        self.source = AudioSource::Synthesized(Arc::new(buffer));
    }

    /// Replace the source with a recorded clip. Does not start playing.
    pub fn load_recorded(&mut self, clip: RecordedClip) {
        self.stop();
        debug!(
            "Loaded recorded narration {} ({:.1}s)",
            clip.name(),
            clip.duration_seconds()
        );
        self.source = AudioSource::Recorded(clip);
    }

    /// Stop playback and forget the source
    pub fn clear(&mut self) {
        self.stop();
        self.source = AudioSource::None;
    }

    pub fn source(&self) -> &AudioSource {
        &self.source
    }

    pub fn has_source(&self) -> bool {
        !self.source.is_none()
    }

    pub fn state(&self) -> PlaybackState {
        match &self.active {
            Some(active) if !active.is_finished() => PlaybackState::Playing,
            _ => PlaybackState::Idle,
        }
    }

    /// Release a stream that ended on its own and report the current state
    pub fn refresh(&mut self) -> PlaybackState {
        if self.active.as_ref().is_some_and(|a| a.is_finished()) {
            debug!("Narration finished");
            self.stop();
        }
        self.state()
    }

    /// Progress of the playing stream, 0.0 when idle
    pub fn progress(&self) -> f32 {
        match &self.active {
            Some(active) if !active.is_finished() => active.progress(),
            _ => 0.0,
        }
    }

    /// Play the loaded source from the start, or stop it if it is playing
    ///
    /// Without a source this does nothing and reports `Idle`.
    pub fn toggle(&mut self) -> Result<PlaybackState, AudioError> {
        if self.refresh() == PlaybackState::Playing {
            self.stop();
            return Ok(PlaybackState::Idle);
        }

        let buffer = match &self.source {
            AudioSource::None => return Ok(PlaybackState::Idle),
            AudioSource::Synthesized(buffer) => buffer.clone(),
            AudioSource::Recorded(clip) => Arc::new(clip.decode()?),
        };

        let stream = self.output.start(buffer)?;
        self.active = Some(stream);
        Ok(self.state())
    }

    /// Stop whatever is playing. Safe to call at any time.
    pub fn stop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.stop();
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Shared read position of one PipeWire stream
#[derive(Clone)]
struct PlaybackCursor {
    inner: Arc<Mutex<CursorInner>>,
    finished: Arc<AtomicBool>,
}

struct CursorInner {
    samples: Vec<f32>,
    position: usize,
}

impl PlaybackCursor {
    fn new(samples: Vec<f32>) -> Self {
        let finished = samples.is_empty();
        Self {
            inner: Arc::new(Mutex::new(CursorInner {
                samples,
                position: 0,
            })),
            finished: Arc::new(AtomicBool::new(finished)),
        }
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    fn mark_finished(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    fn progress(&self) -> f32 {
        let Ok(inner) = self.inner.lock() else {
            return 0.0;
        };
        if inner.samples.is_empty() {
            0.0
        } else {
            inner.position as f32 / inner.samples.len() as f32
        }
    }

    /// Get the next samples (advances position), `None` once exhausted
    fn next_samples(&self, count: usize) -> Option<Vec<f32>> {
        let mut inner = self.inner.lock().ok()?;
        if inner.position >= inner.samples.len() {
            return None;
        }

        let end = (inner.position + count).min(inner.samples.len());
        let samples = inner.samples[inner.position..end].to_vec();
        inner.position = end;
        Some(samples)
    }
}

enum PlaybackCommand {
    Stop,
}

/// Speaker output through PipeWire, one stream thread per playback
#[derive(Default)]
pub struct PipeWireOutput;

impl PipeWireOutput {
    pub fn new() -> Self {
        Self
    }
}

impl AudioOutput for PipeWireOutput {
    fn start(&mut self, buffer: Arc<DecodedBuffer>) -> Result<Box<dyn ActivePlayback>, AudioError> {
        let sample_rate = buffer.sample_rate();
        let cursor = PlaybackCursor::new(buffer.to_mono());

        let (sender, receiver) = pw::channel::channel::<PlaybackCommand>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);

        let thread_cursor = cursor.clone();
        let handle = thread::spawn(move || {
            if let Err(e) = run_playback_loop(thread_cursor.clone(), sample_rate, receiver, &ready_tx)
            {
                error!("Playback error: {}", e);
                let _ = ready_tx.try_send(Err(e));
            }
            thread_cursor.mark_finished();
        });

        match ready_rx.recv_timeout(STREAM_STARTUP_TIMEOUT) {
            Ok(Ok(())) => Ok(Box::new(PipeWireStream {
                cursor,
                sender: Some(sender),
                thread_handle: Some(handle),
            })),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(AudioError::Output(e))
            }
            Err(_) => {
                let _ = sender.send(PlaybackCommand::Stop);
                let _ = handle.join();
                Err(AudioError::Output(
                    "PipeWire did not open a playback stream".to_string(),
                ))
            }
        }
    }
}

struct PipeWireStream {
    cursor: PlaybackCursor,
    sender: Option<pw::channel::Sender<PlaybackCommand>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ActivePlayback for PipeWireStream {
    fn is_finished(&self) -> bool {
        self.cursor.is_finished()
    }

    fn progress(&self) -> f32 {
        self.cursor.progress()
    }

    fn stop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(PlaybackCommand::Stop);
        }

        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                warn!("Playback thread panicked");
            }
        }

        self.cursor.mark_finished();
    }
}

impl Drop for PipeWireStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run the PipeWire playback loop in a background thread
fn run_playback_loop(
    cursor: PlaybackCursor,
    sample_rate: u32,
    receiver: pw::channel::Receiver<PlaybackCommand>,
    ready: &SyncSender<Result<(), String>>,
) -> Result<(), String> {
    pw::init();

    let mainloop = pw::main_loop::MainLoopRc::new(None)
        .map_err(|e| format!("Failed to create PipeWire main loop: {}", e))?;

    let context = pw::context::ContextRc::new(&mainloop, None)
        .map_err(|e| format!("Failed to create PipeWire context: {}", e))?;

    let core = context
        .connect_rc(None)
        .map_err(|e| format!("Failed to connect to PipeWire: {}", e))?;

    let mainloop_weak = mainloop.downgrade();
    let _receiver = receiver.attach(mainloop.loop_(), move |cmd| match cmd {
        PlaybackCommand::Stop => {
            if let Some(mainloop) = mainloop_weak.upgrade() {
                mainloop.quit();
            }
        }
    });

    struct UserData {
        format: spa::param::audio::AudioInfoRaw,
        cursor: PlaybackCursor,
        mainloop_weak: pw::main_loop::MainLoopWeak,
    }

    let user_data = UserData {
        format: Default::default(),
        cursor,
        mainloop_weak: mainloop.downgrade(),
    };

    let props = pw::properties::properties! {
        *pw::keys::MEDIA_TYPE => "Audio",
        *pw::keys::MEDIA_CATEGORY => "Playback",
        *pw::keys::MEDIA_ROLE => "Music",
        *pw::keys::APP_NAME => "StoryNest",
    };

    let stream = pw::stream::StreamBox::new(&core, "storynest-narration", props)
        .map_err(|e| format!("Failed to create PipeWire stream: {}", e))?;

    let _listener = stream
        .add_local_listener_with_user_data(user_data)
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
                warn!("Failed to parse playback format: {:?}", e);
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
            let n_channels = user_data.format.channels().max(1) as usize;
            let stride = std::mem::size_of::<f32>() * n_channels;

            let Some(slice) = data.data() else {
                return;
            };

            let n_frames = slice.len() / stride;

            match user_data.cursor.next_samples(n_frames) {
                Some(samples) => {
                    for (i, &sample) in samples.iter().enumerate() {
                        let bytes = sample.to_le_bytes();
                        for channel in 0..n_channels {
                            let offset = i * stride + channel * 4;
                            if offset + 4 <= slice.len() {
                                slice[offset..offset + 4].copy_from_slice(&bytes);
                            }
                        }
                    }
                    let written = samples.len() * stride;
                    if written < slice.len() {
                        slice[written..].fill(0);
                    }

                    let chunk = data.chunk_mut();
                    *chunk.offset_mut() = 0;
                    *chunk.stride_mut() = stride as i32;
                    *chunk.size_mut() = written as u32;
                }
                None => {
                    user_data.cursor.mark_finished();
                    if let Some(mainloop) = user_data.mainloop_weak.upgrade() {
                        mainloop.quit();
                    }
                }
            }
        })
        .register()
        .map_err(|e| format!("Failed to register stream listener: {}", e))?;

    // Mono F32LE at the buffer's own rate, PipeWire resamples as needed
    let mut audio_info = spa::param::audio::AudioInfoRaw::new();
    audio_info.set_format(spa::param::audio::AudioFormat::F32LE);
    audio_info.set_rate(sample_rate);
    audio_info.set_channels(1);

    let obj = spa::pod::Object {
        type_: spa::utils::SpaTypes::ObjectParamFormat.as_raw(),
        id: spa::param::ParamType::EnumFormat.as_raw(),
        properties: audio_info.into(),
    };

    let values: Vec<u8> = spa::pod::serialize::PodSerializer::serialize(
        std::io::Cursor::new(Vec::new()),
        &spa::pod::Value::Object(obj),
    )
    .map_err(|e| format!("Failed to serialize audio format: {:?}", e))?
    .0
    .into_inner();

    let format_pod =
        Pod::from_bytes(&values).ok_or_else(|| "Failed to build audio format pod".to_string())?;
    let mut params = [format_pod];

    stream
        .connect(
            spa::utils::Direction::Output,
            None,
            pw::stream::StreamFlags::AUTOCONNECT
                | pw::stream::StreamFlags::MAP_BUFFERS
                | pw::stream::StreamFlags::RT_PROCESS,
            &mut params,
        )
        .map_err(|e| format!("Failed to connect stream: {}", e))?;

    let _ = ready.try_send(Ok(()));

    // Run until stopped or the buffer is exhausted
    mainloop.run();

    Ok(())
}
