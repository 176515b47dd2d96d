//! Boot picker session

use super::entry::BootEntry;
use super::session::{self, GuiState, LoopExit, SessionContext};
use super::view::{DisplayControl, InputEvent, PickerView, ScreenMode, ViewKind};
use super::PickerContext;
use crate::clock::Clock;
use crate::codec::ToneSpec;
use crate::engine::AudioProtocol;
use crate::error::{Result, VoiceOverError};
use crate::voiceover::AudioFileId;
use std::ops::ControlFlow;
use std::time::Duration;

/// Stages of a menu session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuPhase {
    /// No session running
    Idle,
    /// Building the session context and switching to graphics
    Entering,
    /// Registering boot entries with the view
    PopulatingEntries,
    /// Queueing the spoken menu
    AudioAnnouncing,
    /// Draw loop running
    Interactive,
    /// Tearing down
    Exiting,
    /// Finished
    Done,
}

/// How an entry got chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionReason {
    /// User picked it
    User,
    /// Countdown expired on the default entry
    Timeout,
}

/// Result of a completed menu session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSelection {
    /// Chosen entry index
    pub index: usize,
    /// Why it was chosen
    pub reason: SelectionReason,
    /// Time spent in the draw loop
    pub elapsed: Duration,
}

enum MenuExit {
    Chosen(usize),
    Refresh,
}

/// Drives one boot picker session at a time
///
/// ```text
/// Idle -> Entering -> PopulatingEntries -> [AudioAnnouncing] -> Interactive -> Exiting -> Done
/// ```
pub struct MenuOrchestrator<'a> {
    audio: &'a mut dyn AudioProtocol,
    view: &'a mut dyn PickerView,
    display: &'a mut dyn DisplayControl,
    clock: &'a dyn Clock,
    phases: Vec<MenuPhase>,
}

impl<'a> MenuOrchestrator<'a> {
    /// Orchestrator over the given collaborators
    pub fn new(
        audio: &'a mut dyn AudioProtocol,
        view: &'a mut dyn PickerView,
        display: &'a mut dyn DisplayControl,
        clock: &'a dyn Clock,
    ) -> Self {
        MenuOrchestrator {
            audio,
            view,
            display,
            clock,
            phases: vec![MenuPhase::Idle],
        }
    }

    /// Current phase
    pub fn phase(&self) -> MenuPhase {
        self.phases.last().copied().unwrap_or(MenuPhase::Idle)
    }

    /// Phases of the current or most recent session, oldest first
    pub fn phases(&self) -> &[MenuPhase] {
        &self.phases
    }

    fn transition(&mut self, phase: MenuPhase) {
        tracing::debug!(from = ?self.phase(), to = ?phase, "menu phase");
        self.phases.push(phase);
    }

    /// Show the boot picker and wait for a choice
    ///
    /// Returns [`VoiceOverError::Aborted`] when the caller must rebuild and
    /// show the menu again. `picker.hide_auxiliary` is updated on every exit
    /// that reached the draw loop.
    pub fn show_menu(
        &mut self,
        picker: &mut PickerContext,
        gui: &mut GuiState,
        entries: &[BootEntry],
        default_index: usize,
    ) -> Result<MenuSelection> {
        self.phases.truncate(1);
        if default_index >= entries.len() {
            self.transition(MenuPhase::Done);
            return Err(VoiceOverError::SessionInit(format!(
                "default entry {default_index} out of range for {} entries",
                entries.len()
            )));
        }

        let mut session = SessionContext::menu(gui, picker);

        self.transition(MenuPhase::Entering);
        let previous_mode = match self.enter(picker, gui, &session, entries.len()) {
            Ok(mode) => mode,
            Err(err) => {
                tracing::warn!(error = %err, "boot picker failed to start");
                self.transition(MenuPhase::Done);
                return Err(err);
            }
        };

        self.transition(MenuPhase::PopulatingEntries);
        for (index, entry) in entries.iter().enumerate() {
            if let Err(source) = self.view.register_entry(index, entry) {
                tracing::warn!(index, entry = %entry.name, error = %source, "boot entry registration failed");
                self.transition(MenuPhase::Exiting);
                self.view.deinitialize_view();
                self.leave(gui, previous_mode);
                self.transition(MenuPhase::Done);
                return Err(VoiceOverError::EntryRegistration { index, source });
            }
        }
        self.view.late_initialize(default_index);
        self.view.redraw_and_flush();

        if session.audio_assist {
            self.transition(MenuPhase::AudioAnnouncing);
            self.announce_menu(&session, entries, default_index);
        }

        self.transition(MenuPhase::Interactive);
        let clock = self.clock;
        let (exit, elapsed) = session::run_draw_loop(
            &mut *self.audio,
            &mut *self.view,
            clock,
            picker.frame_interval,
            &mut session,
            |event, session, audio| handle_input(event, session, audio, clock, entries),
        );

        let selection = match exit {
            LoopExit::Handled(MenuExit::Chosen(index)) => Some(MenuSelection {
                index,
                reason: SelectionReason::User,
                elapsed,
            }),
            LoopExit::Handled(MenuExit::Refresh) => None,
            LoopExit::TimedOut => {
                session.chosen = Some(default_index);
                Some(MenuSelection {
                    index: default_index,
                    reason: SelectionReason::Timeout,
                    elapsed,
                })
            }
        };

        self.transition(MenuPhase::Exiting);
        if let Err(err) = self.audio.stop_playback(true) {
            tracing::warn!(error = %err, "failed to silence voice-over on exit");
        }
        if !session.refresh {
            self.view.clear_screen();
        }
        self.view.deinitialize_view();
        self.leave(gui, previous_mode);
        picker.hide_auxiliary = session.hide_auxiliary;
        self.transition(MenuPhase::Done);

        match selection {
            Some(selection) if !session.refresh => {
                tracing::info!(index = selection.index, reason = ?selection.reason, "boot entry chosen");
                Ok(selection)
            }
            _ => {
                tracing::info!("boot picker refresh requested");
                Err(VoiceOverError::Aborted)
            }
        }
    }

    /// Audio setup, graphics mode and view creation; unwinds on failure
    fn enter(
        &mut self,
        picker: &PickerContext,
        gui: &mut GuiState,
        session: &SessionContext,
        entry_count: usize,
    ) -> Result<ScreenMode> {
        if session.audio_assist {
            session::prepare_audio(&mut *self.audio, picker)?;
        }

        self.view
            .construct(session)
            .map_err(|err| VoiceOverError::SessionInit(err.to_string()))?;
        let previous_mode = self.display.set_mode(ScreenMode::Graphics);

        if let Err(err) = self.view.initialize_view(ViewKind::BootPicker { entry_count }, session) {
            self.leave(gui, previous_mode);
            return Err(VoiceOverError::SessionInit(err.to_string()));
        }

        gui.entered();
        Ok(previous_mode)
    }

    /// Release the drawing context and restore the console mode
    fn leave(&mut self, gui: &mut GuiState, previous_mode: ScreenMode) {
        gui.end_session(self.view.cursor_position());
        self.view.destruct();
        self.display.set_mode(previous_mode);
    }

    /// Queue "choose OS", every entry, the default marker and the closing beep
    fn announce_menu(&mut self, session: &SessionContext, entries: &[BootEntry], default_index: usize) {
        session::announce(&mut *self.audio, AudioFileId::CHOOSE_OS);
        for (index, entry) in entries.iter().enumerate() {
            session::announce(&mut *self.audio, entry.voice_cue());
            if session.timeout.is_some() && index == default_index {
                session::announce(&mut *self.audio, AudioFileId::DEFAULT);
            }
        }
        if let Err(err) = self.audio.play_tone(ToneSpec::NORMAL, false) {
            tracing::warn!(error = %err, "failed to queue menu signal");
        }
    }
}

fn handle_input(
    event: InputEvent,
    session: &mut SessionContext,
    audio: &mut dyn AudioProtocol,
    clock: &dyn Clock,
    entries: &[BootEntry],
) -> ControlFlow<MenuExit> {
    match event {
        InputEvent::Select(index) if index < entries.len() => {
            session.chosen = Some(index);
            ControlFlow::Break(MenuExit::Chosen(index))
        }
        InputEvent::Focus(index) => {
            if let (true, Some(entry)) = (session.audio_assist, entries.get(index)) {
                if let Err(err) = audio.stop_playback(false) {
                    tracing::warn!(error = %err, "failed to interrupt voice-over");
                }
                session::announce(audio, entry.voice_cue());
            }
            ControlFlow::Continue(())
        }
        InputEvent::Refresh => {
            session.refresh = true;
            ControlFlow::Break(MenuExit::Refresh)
        }
        InputEvent::ToggleAuxiliary => {
            session.hide_auxiliary = !session.hide_auxiliary;
            session.refresh = true;
            if session.audio_assist && !session.hide_auxiliary {
                session::announce(audio, AudioFileId::SHOW_AUXILIARY);
                session::drain_audio(audio, clock, Duration::from_millis(1), session::DRAIN_LIMIT);
            }
            ControlFlow::Break(MenuExit::Refresh)
        }
        _ => ControlFlow::Continue(()),
    }
}
