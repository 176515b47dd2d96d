//! Voice-over for firmware boot pickers
//!
//! Turns a visual boot menu into a sequence of spoken prompts and signal tones,
//! and drives the interactive session that lets a user choose a boot entry or
//! enter a password without seeing the screen.
//!
//! # Features
//! - Queued, gain-controlled playback of provider-supplied voice assets
//! - Scope-bound provider buffers: every acquire is released exactly once
//! - Boot picker and password sessions with audio assist, timeout and refresh
//! - Volume level to codec gain conversion with graceful degradation
//! - Deterministic timing through an injectable clock
//!
//! # Crate feature flags
//! - `export-wav` (default): Dump provider assets as WAV files (`export`)
//! - `streaming` (opt-in): Play through the host sound device (enables optional `rodio` dep)
//!
//! # Quick start
//! ## Speak one phrase
//! ```no_run
//! # #[cfg(feature = "streaming")]
//! # {
//! use canopy_voice::{AssetTable, AudioEngine, AudioProtocol, SystemClock};
//! use canopy_voice::codec::{AudioFormat, OutputMask, OutputTarget};
//! use canopy_voice::streaming::RodioOutput;
//! use canopy_voice::voiceover::{AudioFileId, LanguageCode};
//!
//! let pcm = std::fs::read("welcome.raw").unwrap();
//! let table = AssetTable::new().with_asset(AudioFileId::WELCOME, LanguageCode::English, pcm, AudioFormat::signal());
//!
//! let mut engine = AudioEngine::new(Box::new(RodioOutput::new()), SystemClock::shared()).unwrap();
//! engine.connect(OutputTarget { outputs: OutputMask::ALL, ..Default::default() }).unwrap();
//! engine.set_provider(Box::new(table));
//! engine.play_file(AudioFileId::WELCOME, None, false).unwrap();
//! engine.wait_until_idle().unwrap();
//! # }
//! ```
//!
//! ## Run the boot picker
//! ```ignore
//! use canopy_voice::picker::{GuiState, MenuOrchestrator, PickerConfig, PickerContext};
//!
//! let config = PickerConfig::from_json(&std::fs::read_to_string("picker.json")?)?;
//! let mut picker = PickerContext::from_config(&config)?;
//! let mut gui = GuiState::new();
//!
//! let mut menu = MenuOrchestrator::new(&mut engine, &mut view, &mut console, &clock);
//! match menu.show_menu(&mut picker, &mut gui, &entries, default_index) {
//!     Ok(selection) => boot(selection.index),
//!     Err(err) if err.is_aborted() => rebuild_entries(),
//!     Err(err) => return Err(err),
//! }
//! ```

#![warn(missing_docs)]

// Domain modules
pub mod clock; // Time Source & Stalls
pub mod codec; // Hardware Output Contract
pub mod engine; // Playback Queue
mod error;
#[cfg(feature = "export-wav")]
pub mod export; // WAV Asset Dump
pub mod picker; // Menu & Password Sessions
pub mod provider; // Asset Providers
#[cfg(feature = "streaming")]
pub mod streaming; // Host Audio Output
pub mod voiceover; // File Ids, Languages, Volume

pub use error::{CodecError, LayoutError, ProviderError, Result, ViewError, VoiceOverError};

// Public API exports
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use engine::{AudioEngine, AudioProtocol, Cue, PlaybackReport, RequestId, RequestOutcome, PROTOCOL_REVISION};
#[cfg(feature = "export-wav")]
pub use export::{dump_assets, DumpSummary};
pub use picker::{
    GuiState, MenuOrchestrator, MenuSelection, PasswordOrchestrator, PickerConfig, PickerContext,
};
pub use provider::{AssetTable, AudioAssetProvider, AudioBuffer, CallbackProvider, LentBuffer};
#[cfg(feature = "streaming")]
pub use streaming::RodioOutput;
pub use voiceover::{AudioFileId, LanguageCode, VolumeLevel};
