//! Scripted collaborators shared by the integration tests
#![allow(dead_code)]

use canopy_voice::codec::{
    AmpCapabilities, AudioFormat, AudioOutput, CodecInfo, Decibels, OutputChannel, OutputMask, OutputTarget,
    ToneSpec,
};
use canopy_voice::engine::{AudioEngine, AudioProtocol, Cue, PlaybackReport, RequestId};
use canopy_voice::picker::{
    BootEntry, CursorOffset, DisplayControl, InputEvent, PickerView, ScreenMode, SessionContext, ViewKind,
};
use canopy_voice::provider::{AudioAssetProvider, AudioBuffer};
use canopy_voice::{AudioFileId, CodecError, LanguageCode, ManualClock, ProviderError, ViewError};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

pub const AMP: AmpCapabilities = AmpCapabilities {
    offset: 0x57,
    num_steps: 0x7F,
    step_size: 2,
    mute_capable: true,
};

pub fn all_outputs() -> OutputTarget {
    OutputTarget {
        outputs: OutputMask::ALL,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Provider

#[derive(Debug, Default)]
pub struct ProviderLog {
    pub acquired: Vec<AudioFileId>,
    pub released: Vec<AudioFileId>,
    pub failed: Vec<AudioFileId>,
}

/// Provider that synthesizes an 8-byte buffer for every id except the failing ones
pub struct RecordingProvider {
    pub log: Arc<Mutex<ProviderLog>>,
    failing: HashSet<AudioFileId>,
    formats: HashMap<AudioFileId, AudioFormat>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        RecordingProvider {
            log: Arc::new(Mutex::new(ProviderLog::default())),
            failing: HashSet::new(),
            formats: HashMap::new(),
        }
    }

    pub fn failing(mut self, file: AudioFileId) -> Self {
        self.failing.insert(file);
        self
    }

    /// Lend `file` tagged with `format` instead of the signal format
    pub fn with_format(mut self, file: AudioFileId, format: AudioFormat) -> Self {
        self.formats.insert(file, format);
        self
    }
}

impl AudioAssetProvider for RecordingProvider {
    fn acquire(&mut self, file: AudioFileId, language: LanguageCode) -> Result<AudioBuffer, ProviderError> {
        let mut log = self.log.lock();
        if self.failing.contains(&file) {
            log.failed.push(file);
            return Err(ProviderError::NotFound { file, language });
        }
        log.acquired.push(file);
        let format = self.formats.get(&file).copied().unwrap_or_else(AudioFormat::signal);
        Ok(AudioBuffer::new(file, language, vec![file.raw() as u8; 8], format))
    }

    fn release(&mut self, buffer: AudioBuffer) -> Result<(), ProviderError> {
        self.log.lock().released.push(buffer.file());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output

#[derive(Debug, Default)]
pub struct OutputLog {
    pub connects: usize,
    pub started: Vec<Vec<u8>>,
    pub gains: Vec<Decibels>,
    pub halts: usize,
}

/// Output whose tracks stay audible for a fixed number of `is_active` polls
pub struct ScriptedOutput {
    pub log: Arc<Mutex<OutputLog>>,
    polls_per_track: usize,
    remaining: usize,
    fail_connect: bool,
    ignore_halt: bool,
    outputs: Vec<OutputChannel>,
}

impl ScriptedOutput {
    pub fn new(polls_per_track: usize) -> Self {
        ScriptedOutput {
            log: Arc::new(Mutex::new(OutputLog::default())),
            polls_per_track,
            remaining: 0,
            fail_connect: false,
            ignore_halt: false,
            outputs: vec![OutputChannel { index: 0, amp: AMP }],
        }
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Halting is acknowledged but the track keeps playing out
    pub fn ignoring_halt(mut self) -> Self {
        self.ignore_halt = true;
        self
    }

    pub fn without_amplifier(mut self) -> Self {
        self.outputs = vec![OutputChannel {
            index: 0,
            amp: AmpCapabilities::default(),
        }];
        self
    }
}

impl AudioOutput for ScriptedOutput {
    fn connect(&mut self, _target: &OutputTarget) -> Result<CodecInfo, CodecError> {
        if self.fail_connect {
            return Err(CodecError::NotFound("controller 0".into()));
        }
        self.log.lock().connects += 1;
        Ok(CodecInfo {
            name: "scripted".into(),
            outputs: self.outputs.clone(),
        })
    }

    fn configure(&mut self, _format: &AudioFormat, gain: Decibels) -> Result<(), CodecError> {
        self.log.lock().gains.push(gain);
        Ok(())
    }

    fn start(&mut self, samples: &[u8]) -> Result<(), CodecError> {
        self.log.lock().started.push(samples.to_vec());
        self.remaining = self.polls_per_track;
        Ok(())
    }

    fn is_active(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    fn halt(&mut self) -> Result<(), CodecError> {
        self.log.lock().halts += 1;
        if !self.ignore_halt {
            self.remaining = 0;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Engine with an enqueue log

/// Engine wrapper recording every cue handed to it
pub struct RecordingAudio {
    pub engine: AudioEngine,
    pub enqueued: Vec<Cue>,
    pub stops: Vec<bool>,
}

impl AudioProtocol for RecordingAudio {
    fn connect(&mut self, target: OutputTarget) -> Result<(), CodecError> {
        self.engine.connect(target)
    }

    fn set_provider(&mut self, provider: Box<dyn AudioAssetProvider>) {
        self.engine.set_provider(provider)
    }

    fn amplifier(&self) -> Result<AmpCapabilities, CodecError> {
        self.engine.amplifier()
    }

    fn set_default_gain(&mut self, gain: Decibels) {
        self.engine.set_default_gain(gain)
    }

    fn default_gain(&self) -> Decibels {
        self.engine.default_gain()
    }

    fn set_language(&mut self, language: LanguageCode) {
        self.engine.set_language(language)
    }

    fn language(&self) -> LanguageCode {
        self.engine.language()
    }

    fn play_file(&mut self, file: AudioFileId, gain: Option<Decibels>, wait: bool) -> canopy_voice::Result<RequestId> {
        self.enqueued.push(Cue::File(file));
        self.engine.play_file(file, gain, wait)
    }

    fn play_tone(&mut self, tone: ToneSpec, wait: bool) -> canopy_voice::Result<RequestId> {
        self.enqueued.push(Cue::Tone(tone));
        self.engine.play_tone(tone, wait)
    }

    fn stop_playback(&mut self, wait: bool) -> Result<(), CodecError> {
        self.stops.push(wait);
        self.engine.stop_playback(wait)
    }

    fn set_delay(&mut self, delay: Duration) -> Duration {
        self.engine.set_delay(delay)
    }

    fn pump(&mut self) {
        self.engine.pump()
    }

    fn is_idle(&self) -> bool {
        self.engine.is_idle()
    }

    fn take_reports(&mut self) -> Vec<PlaybackReport> {
        self.engine.take_reports()
    }
}

/// Engine, logs and clock wired together
pub struct Harness {
    pub audio: RecordingAudio,
    pub provider: Arc<Mutex<ProviderLog>>,
    pub output: Arc<Mutex<OutputLog>>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(output: ScriptedOutput, provider: RecordingProvider) -> Self {
        Harness::with_engine(output, provider, |engine| engine)
    }

    /// Like [`Harness::new`], with a hook to tune the engine before use
    pub fn with_engine(
        output: ScriptedOutput,
        provider: RecordingProvider,
        tune: impl FnOnce(AudioEngine) -> AudioEngine,
    ) -> Self {
        let clock = Arc::new(ManualClock::new());
        let output_log = Arc::clone(&output.log);
        let provider_log = Arc::clone(&provider.log);

        let mut engine = tune(AudioEngine::new(Box::new(output), clock.clone()).unwrap());
        engine.set_provider(Box::new(provider));

        Harness {
            audio: RecordingAudio {
                engine,
                enqueued: Vec::new(),
                stops: Vec::new(),
            },
            provider: provider_log,
            output: output_log,
            clock,
        }
    }

    pub fn with_polls(polls_per_track: usize) -> Self {
        Harness::new(ScriptedOutput::new(polls_per_track), RecordingProvider::new())
    }
}

// ---------------------------------------------------------------------------
// View and display

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    Construct(CursorOffset),
    Initialize(ViewKind),
    Register(usize),
    LateInitialize(usize),
    Redraw,
    Clear,
    Deinitialize,
    Destruct,
}

/// View replaying one scripted poll result per frame
#[derive(Default)]
pub struct ScriptedView {
    pub calls: Vec<ViewCall>,
    pub frames: usize,
    script: VecDeque<Option<InputEvent>>,
    fail_construct: bool,
    fail_initialize: bool,
    fail_register: Option<usize>,
    final_cursor: Option<CursorOffset>,
}

impl ScriptedView {
    pub fn new(script: impl IntoIterator<Item = Option<InputEvent>>) -> Self {
        ScriptedView {
            script: script.into_iter().collect(),
            ..Default::default()
        }
    }

    /// View that never reports input
    pub fn idle() -> Self {
        ScriptedView::default()
    }

    pub fn failing_construct(mut self) -> Self {
        self.fail_construct = true;
        self
    }

    pub fn failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    pub fn failing_register(mut self, index: usize) -> Self {
        self.fail_register = Some(index);
        self
    }

    pub fn leaving_cursor_at(mut self, cursor: CursorOffset) -> Self {
        self.final_cursor = Some(cursor);
        self
    }

    pub fn called(&self, call: &ViewCall) -> bool {
        self.calls.contains(call)
    }
}

impl PickerView for ScriptedView {
    fn construct(&mut self, session: &SessionContext) -> Result<(), ViewError> {
        if self.fail_construct {
            return Err(ViewError::new("out of memory"));
        }
        self.calls.push(ViewCall::Construct(session.cursor));
        Ok(())
    }

    fn initialize_view(&mut self, kind: ViewKind, _session: &SessionContext) -> Result<(), ViewError> {
        if self.fail_initialize {
            return Err(ViewError::new("theme missing"));
        }
        self.calls.push(ViewCall::Initialize(kind));
        Ok(())
    }

    fn register_entry(&mut self, index: usize, _entry: &BootEntry) -> Result<(), ViewError> {
        if self.fail_register == Some(index) {
            return Err(ViewError::new("label image missing"));
        }
        self.calls.push(ViewCall::Register(index));
        Ok(())
    }

    fn late_initialize(&mut self, default_index: usize) {
        self.calls.push(ViewCall::LateInitialize(default_index));
    }

    fn redraw_and_flush(&mut self) {
        self.calls.push(ViewCall::Redraw);
    }

    fn draw_frame(&mut self, _session: &SessionContext) {
        self.frames += 1;
    }

    fn poll_input(&mut self) -> Option<InputEvent> {
        self.script.pop_front().flatten()
    }

    fn clear_screen(&mut self) {
        self.calls.push(ViewCall::Clear);
    }

    fn deinitialize_view(&mut self) {
        self.calls.push(ViewCall::Deinitialize);
    }

    fn destruct(&mut self) {
        self.calls.push(ViewCall::Destruct);
    }

    fn cursor_position(&self) -> Option<CursorOffset> {
        self.final_cursor
    }
}

/// Console tracking every mode switch
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub mode: ScreenMode,
    pub history: Vec<ScreenMode>,
}

impl DisplayControl for RecordingDisplay {
    fn set_mode(&mut self, mode: ScreenMode) -> ScreenMode {
        self.history.push(mode);
        std::mem::replace(&mut self.mode, mode)
    }
}
