//! Password prompt session

use super::session::{self, GuiState, LoopExit, SessionContext};
use super::view::{DisplayControl, InputEvent, PickerView, ScreenMode, ViewKind};
use super::{PickerCommand, PickerContext};
use crate::clock::Clock;
use crate::engine::AudioProtocol;
use crate::error::{Result, VoiceOverError};
use crate::voiceover::AudioFileId;
use std::ops::ControlFlow;

/// Longest password accepted from the keyboard, in bytes
pub const MAX_PASSWORD_LENGTH: usize = 32;

/// Access tier requested through the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrivilegeLevel {
    /// No privilege
    #[default]
    Unauthorized,
    /// Allowed to boot and change picker state
    Authorized,
}

/// Verdict of the external password check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verification {
    /// Password correct
    Accepted,
    /// Password wrong, more attempts allowed
    Incorrect,
    /// Password wrong, no attempts left
    RetryLimitReached,
}

/// Result of a password session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivilegeOutcome {
    /// The requested level was granted
    Granted,
    /// Attempts exhausted
    Denied,
}

/// Checks submitted passwords
pub trait PasswordVerifier {
    /// Verify `password` for `level`
    fn verify(&mut self, password: &[u8], level: PrivilegeLevel) -> Verification;
}

/// Stages of a password session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasswordPhase {
    /// No session running
    Idle,
    /// Building the session context and switching to graphics
    Entering,
    /// Reading and verifying passwords
    Interactive,
    /// Tearing down
    Exiting,
    /// Finished
    Done,
}

/// Drives privilege prompts
pub struct PasswordOrchestrator<'a> {
    audio: &'a mut dyn AudioProtocol,
    view: &'a mut dyn PickerView,
    display: &'a mut dyn DisplayControl,
    clock: &'a dyn Clock,
    verifier: &'a mut dyn PasswordVerifier,
    phases: Vec<PasswordPhase>,
}

impl<'a> PasswordOrchestrator<'a> {
    /// Orchestrator over the given collaborators
    pub fn new(
        audio: &'a mut dyn AudioProtocol,
        view: &'a mut dyn PickerView,
        display: &'a mut dyn DisplayControl,
        clock: &'a dyn Clock,
        verifier: &'a mut dyn PasswordVerifier,
    ) -> Self {
        PasswordOrchestrator {
            audio,
            view,
            display,
            clock,
            verifier,
            phases: vec![PasswordPhase::Idle],
        }
    }

    /// Current phase
    pub fn phase(&self) -> PasswordPhase {
        self.phases.last().copied().unwrap_or(PasswordPhase::Idle)
    }

    /// Phases of the current or most recent session, oldest first
    pub fn phases(&self) -> &[PasswordPhase] {
        &self.phases
    }

    fn transition(&mut self, phase: PasswordPhase) {
        tracing::debug!(from = ?self.phase(), to = ?phase, "password phase");
        self.phases.push(phase);
    }

    /// Prompt until the verifier accepts a password or the retry limit is hit
    pub fn request_privilege(
        &mut self,
        picker: &PickerContext,
        gui: &mut GuiState,
        level: PrivilegeLevel,
    ) -> Result<PrivilegeOutcome> {
        self.phases.truncate(1);
        let mut session = SessionContext::password(gui, picker, level);

        self.transition(PasswordPhase::Entering);
        let previous_mode = match self.enter(picker, gui, &session) {
            Ok(mode) => mode,
            Err(err) => {
                tracing::warn!(error = %err, "password prompt failed to start");
                self.transition(PasswordPhase::Done);
                return Err(err);
            }
        };
        self.view.redraw_and_flush();
        if session.audio_assist {
            session::announce(&mut *self.audio, AudioFileId::ENTER_PASSWORD);
        }

        self.transition(PasswordPhase::Interactive);
        let mut password = Vec::with_capacity(MAX_PASSWORD_LENGTH);
        let verifier = &mut *self.verifier;
        let (exit, _) = session::run_draw_loop(
            &mut *self.audio,
            &mut *self.view,
            self.clock,
            picker.frame_interval,
            &mut session,
            |event, session, audio| handle_input(event, session, audio, &mut *verifier, &mut password, level),
        );
        password.fill(0);

        let outcome = match exit {
            LoopExit::Handled(outcome) => outcome,
            LoopExit::TimedOut => PrivilegeOutcome::Denied,
        };
        if session.audio_assist {
            session::drain_audio(&mut *self.audio, self.clock, picker.frame_interval, session::DRAIN_LIMIT);
        }

        self.transition(PasswordPhase::Exiting);
        // Whatever outlived the drain is cut here so no buffer stays lent.
        if let Err(err) = self.audio.stop_playback(true) {
            tracing::warn!(error = %err, "failed to silence voice-over on exit");
        }
        if picker.command != PickerCommand::ShowPicker {
            self.view.clear_screen();
        }
        self.view.deinitialize_view();
        gui.end_session(self.view.cursor_position());
        self.view.destruct();
        self.display.set_mode(previous_mode);
        self.transition(PasswordPhase::Done);

        tracing::info!(?level, ?outcome, "privilege request finished");
        Ok(outcome)
    }

    fn enter(&mut self, picker: &PickerContext, gui: &mut GuiState, session: &SessionContext) -> Result<ScreenMode> {
        if session.audio_assist {
            session::prepare_audio(&mut *self.audio, picker)?;
        }

        self.view
            .construct(session)
            .map_err(|err| VoiceOverError::SessionInit(err.to_string()))?;
        let previous_mode = self.display.set_mode(ScreenMode::Graphics);

        if let Err(err) = self.view.initialize_view(ViewKind::Password, session) {
            gui.end_session(self.view.cursor_position());
            self.view.destruct();
            self.display.set_mode(previous_mode);
            return Err(VoiceOverError::SessionInit(err.to_string()));
        }

        gui.entered();
        Ok(previous_mode)
    }
}

fn handle_input(
    event: InputEvent,
    session: &mut SessionContext,
    audio: &mut dyn AudioProtocol,
    verifier: &mut dyn PasswordVerifier,
    password: &mut Vec<u8>,
    level: PrivilegeLevel,
) -> ControlFlow<PrivilegeOutcome> {
    match event {
        InputEvent::Char(ch) if ch.is_ascii() && !ch.is_ascii_control() => {
            if password.len() < MAX_PASSWORD_LENGTH {
                password.push(ch as u8);
            }
            ControlFlow::Continue(())
        }
        InputEvent::Backspace => {
            if let Some(last) = password.last_mut() {
                *last = 0;
                password.pop();
            }
            ControlFlow::Continue(())
        }
        InputEvent::Submit => {
            let verdict = verifier.verify(password, level);
            password.fill(0);
            password.clear();
            tracing::debug!(?verdict, "password verified");

            let (cue, flow) = match verdict {
                Verification::Accepted => (
                    AudioFileId::PASSWORD_ACCEPTED,
                    ControlFlow::Break(PrivilegeOutcome::Granted),
                ),
                Verification::Incorrect => (AudioFileId::PASSWORD_INCORRECT, ControlFlow::Continue(())),
                Verification::RetryLimitReached => (
                    AudioFileId::PASSWORD_RETRY_LIMIT,
                    ControlFlow::Break(PrivilegeOutcome::Denied),
                ),
            };
            if session.audio_assist {
                session::announce(audio, cue);
            }
            flow
        }
        _ => ControlFlow::Continue(()),
    }
}
