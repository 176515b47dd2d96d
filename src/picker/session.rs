//! Per-session context and the shared draw loop
//!
//! [`GuiState`] is the only state that survives between sessions. A
//! [`SessionContext`] is built when a session enters and dropped before the
//! orchestrator returns.

use super::password::PrivilegeLevel;
use super::view::{InputEvent, PickerView};
use super::PickerContext;
use crate::clock::Clock;
use crate::engine::AudioProtocol;
use crate::error::Result;
use crate::voiceover::AudioFileId;
use std::ops::ControlFlow;
use std::time::Duration;

/// Pointer position in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CursorOffset {
    /// Horizontal offset
    pub x: u32,
    /// Vertical offset
    pub y: u32,
}

impl CursorOffset {
    /// Multiply both axes by the UI scale
    pub fn scaled(self, scale: u8) -> Self {
        CursorOffset {
            x: self.x * u32::from(scale),
            y: self.y * u32::from(scale),
        }
    }
}

/// Unscaled pointer position of the very first session
pub const DEFAULT_CURSOR_OFFSET: CursorOffset = CursorOffset { x: 4, y: 112 };

/// Limit for draining audio before teardown
pub(crate) const DRAIN_LIMIT: Duration = Duration::from_secs(10);

/// State carried from one picker session to the next
#[derive(Debug, Clone, Default)]
pub struct GuiState {
    cursor: Option<CursorOffset>,
    sessions: u32,
}

impl GuiState {
    /// State before any session ran
    pub fn new() -> Self {
        GuiState::default()
    }

    /// Cursor position the next session starts at, if one was ever set
    pub fn cursor(&self) -> Option<CursorOffset> {
        self.cursor
    }

    /// Number of sessions that entered successfully
    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    /// Cursor for a new session; the scaled default is used only the first time
    fn initial_cursor(&mut self, scale: u8) -> CursorOffset {
        *self
            .cursor
            .get_or_insert_with(|| DEFAULT_CURSOR_OFFSET.scaled(scale))
    }

    pub(crate) fn entered(&mut self) {
        self.sessions += 1;
    }

    pub(crate) fn end_session(&mut self, cursor: Option<CursorOffset>) {
        if let Some(cursor) = cursor {
            self.cursor = Some(cursor);
        }
    }
}

/// Everything one picker or password session needs while it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Pointer position
    pub cursor: CursorOffset,
    /// UI scale
    pub scale: u8,
    /// Play the intro animation
    pub use_ease_in: bool,
    /// Speak prompts in this session
    pub audio_assist: bool,
    /// Remaining countdown; cleared by user activity
    pub timeout: Option<Duration>,
    /// Auxiliary entries hidden
    pub hide_auxiliary: bool,
    /// Entry chosen by the user or the timeout
    pub chosen: Option<usize>,
    /// Caller must rebuild the menu
    pub refresh: bool,
    /// Level being requested (password sessions)
    pub privilege: Option<PrivilegeLevel>,
}

impl SessionContext {
    /// Context for a boot picker session
    pub(crate) fn menu(gui: &mut GuiState, picker: &PickerContext) -> Self {
        SessionContext {
            cursor: gui.initial_cursor(picker.scale),
            scale: picker.scale,
            use_ease_in: picker.use_ease_in(),
            audio_assist: picker.assist_active(),
            timeout: picker.timeout(),
            hide_auxiliary: picker.hide_auxiliary,
            chosen: None,
            refresh: false,
            privilege: None,
        }
    }

    /// Context for a password prompt
    pub(crate) fn password(gui: &mut GuiState, picker: &PickerContext, level: PrivilegeLevel) -> Self {
        SessionContext {
            cursor: gui.initial_cursor(picker.scale),
            scale: picker.scale,
            use_ease_in: picker.use_ease_in(),
            audio_assist: picker.assist_active(),
            timeout: None,
            hide_auxiliary: true,
            chosen: None,
            refresh: false,
            privilege: Some(level),
        }
    }
}

/// Why the draw loop stopped
pub(crate) enum LoopExit<T> {
    /// The input handler finished the loop
    Handled(T),
    /// The countdown ran out without user activity
    TimedOut,
}

/// Connect and configure audio for a session that speaks
///
/// Connection failures abort the session; gain problems only degrade volume.
pub(crate) fn prepare_audio(audio: &mut dyn AudioProtocol, picker: &PickerContext) -> Result<()> {
    audio.set_delay(picker.setup_delay);
    if let Some(target) = picker.output.clone() {
        audio.connect(target)?;
    }
    audio.set_language(picker.language);

    match audio.amplifier() {
        Ok(amp) => {
            let gain = audio.set_default_gain_from_raw(picker.volume.raw_gain(amp.num_steps));
            tracing::debug!(level = picker.volume.level(), %gain, "voice-over gain configured");
        }
        Err(err) => {
            tracing::warn!(error = %err, gain = %audio.default_gain(), "cannot derive gain from volume, keeping previous gain");
        }
    }
    Ok(())
}

/// Queue a cue without waiting; failures are logged and dropped
pub(crate) fn announce(audio: &mut dyn AudioProtocol, file: AudioFileId) {
    if let Err(err) = audio.play_file(file, None, false) {
        tracing::warn!(%file, error = %err, "failed to queue voice-over cue");
    }
}

/// Pump audio until everything queued has played or `limit` passes
pub(crate) fn drain_audio(audio: &mut dyn AudioProtocol, clock: &dyn Clock, poll: Duration, limit: Duration) {
    let deadline = clock.now() + limit;
    loop {
        audio.pump();
        if audio.is_idle() {
            return;
        }
        if clock.now() >= deadline {
            tracing::warn!("voice-over still playing after drain limit");
            return;
        }
        clock.stall(poll);
    }
}

/// Run frames until the handler breaks or the countdown expires
///
/// Each iteration pumps audio, draws one frame and handles at most one input
/// event. The first event of any kind cancels the countdown. Returns how the
/// loop ended together with the time spent in it.
pub(crate) fn run_draw_loop<T>(
    audio: &mut dyn AudioProtocol,
    view: &mut dyn PickerView,
    clock: &dyn Clock,
    frame_interval: Duration,
    session: &mut SessionContext,
    mut handle: impl FnMut(InputEvent, &mut SessionContext, &mut dyn AudioProtocol) -> ControlFlow<T>,
) -> (LoopExit<T>, Duration) {
    let started = clock.now();

    loop {
        audio.pump();
        view.draw_frame(session);

        if let Some(event) = view.poll_input() {
            if session.timeout.take().is_some() {
                tracing::debug!(?event, "countdown aborted by user activity");
                if session.audio_assist {
                    announce(audio, AudioFileId::ABORT_TIMEOUT);
                }
            }
            if let ControlFlow::Break(value) = handle(event, &mut *session, &mut *audio) {
                return (LoopExit::Handled(value), clock.now() - started);
            }
        }

        let elapsed = clock.now() - started;
        if session.timeout.is_some_and(|timeout| elapsed >= timeout) {
            return (LoopExit::TimedOut, elapsed);
        }

        clock.stall(frame_interval);
    }
}
