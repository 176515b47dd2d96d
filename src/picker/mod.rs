//! Boot picker and password sessions with audio assist
//!
//! The orchestrators sequence an external renderer, a display-mode switch and
//! an [`AudioProtocol`](crate::engine::AudioProtocol) engine through one
//! session each. All of them run on the caller's thread.

mod config;
mod entry;
mod menu;
mod password;
mod session;
mod view;

pub use config::{OutputConfig, PickerAttributes, PickerConfig};
pub use entry::{BootEntry, EntryKind};
pub use menu::{MenuOrchestrator, MenuPhase, MenuSelection, SelectionReason};
pub use password::{
    PasswordOrchestrator, PasswordPhase, PasswordVerifier, PrivilegeLevel, PrivilegeOutcome,
    Verification, MAX_PASSWORD_LENGTH,
};
pub use session::{CursorOffset, GuiState, SessionContext, DEFAULT_CURSOR_OFFSET};
pub use view::{DisplayControl, InputEvent, PickerView, ScreenMode, ViewKind};

use crate::codec::OutputTarget;
use crate::error::Result;
use crate::voiceover::{LanguageCode, VolumeLevel};
use std::time::Duration;

/// What the boot manager does after the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PickerCommand {
    /// Boot the default entry unless interrupted
    #[default]
    Default,
    /// Show the boot picker
    ShowPicker,
    /// Reset NVRAM
    ResetNvram,
    /// Boot macOS directly
    BootApple,
    /// Boot macOS recovery directly
    BootAppleRecovery,
}

/// Runtime settings shared by picker sessions
///
/// `hide_auxiliary` is written back when a menu session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerContext {
    /// Audio assist setting
    pub audio_assist: bool,
    /// Picker attributes
    pub attributes: PickerAttributes,
    /// Countdown to the default entry, 0 disables it
    pub timeout_seconds: u32,
    /// Auxiliary entries hidden
    pub hide_auxiliary: bool,
    /// Follow-up command
    pub command: PickerCommand,
    /// Voice-over language
    pub language: LanguageCode,
    /// UI scale
    pub scale: u8,
    /// Delay between draw loop frames
    pub frame_interval: Duration,
    /// System volume
    pub volume: VolumeLevel,
    /// Level below which assist stays silent
    pub minimum_volume: u8,
    /// Settle delay after codec setup
    pub setup_delay: Duration,
    /// Output to connect on session entry, `None` if already connected
    pub output: Option<OutputTarget>,
}

impl Default for PickerContext {
    fn default() -> Self {
        PickerContext {
            audio_assist: false,
            attributes: PickerAttributes::empty(),
            timeout_seconds: 0,
            hide_auxiliary: true,
            command: PickerCommand::ShowPicker,
            language: LanguageCode::English,
            scale: 1,
            frame_interval: Duration::from_millis(16),
            volume: VolumeLevel::default(),
            minimum_volume: 0,
            setup_delay: Duration::ZERO,
            output: None,
        }
    }
}

impl PickerContext {
    /// Build from validated configuration
    pub fn from_config(config: &PickerConfig) -> Result<Self> {
        config.validate()?;

        Ok(PickerContext {
            audio_assist: config.audio_assist,
            attributes: config.attributes(),
            timeout_seconds: config.timeout_seconds,
            hide_auxiliary: config.hide_auxiliary,
            command: PickerCommand::ShowPicker,
            language: LanguageCode::from_locale(config.language.as_deref()),
            scale: config.scale,
            frame_interval: Duration::from_millis(config.frame_interval_ms),
            volume: VolumeLevel::from_system(config.system_volume, config.volume_amplifier),
            minimum_volume: config.minimum_volume,
            setup_delay: Duration::from_micros(config.setup_delay_us),
            output: config.output.as_ref().map(OutputConfig::target),
        })
    }

    /// Whether prompts are spoken: assist is on and the system is audible
    pub fn assist_active(&self) -> bool {
        self.audio_assist && self.volume.is_audible(self.minimum_volume)
    }

    /// Intro animation is skipped for assist users and with reduced motion
    pub fn use_ease_in(&self) -> bool {
        !self.audio_assist && !self.attributes.contains(PickerAttributes::REDUCE_MOTION)
    }

    /// Countdown, if enabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(u64::from(self.timeout_seconds)))
    }
}
