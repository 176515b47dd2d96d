//! Audio protocol: queued, gain-controlled playback of voice-over cues
//!
//! Callers hold a `dyn AudioProtocol` rather than a concrete engine. The
//! engine and the picker's draw loop share one thread: nothing plays "in the
//! background" unless somebody calls [`AudioProtocol::pump`]. The draw loop
//! does this once per frame, and waiting operations pump while they spin.

mod player;

pub use player::{AudioEngine, DEFAULT_POLL_INTERVAL};

use crate::codec::{AmpCapabilities, Decibels, OutputTarget, ToneSpec};
use crate::error::{CodecError, ProviderError, Result};
use crate::provider::AudioAssetProvider;
use crate::voiceover::{AudioFileId, LanguageCode};
use std::fmt;
use std::time::Duration;

/// Revision reported by [`AudioProtocol::revision`]
pub const PROTOCOL_REVISION: u32 = 0x050000;

/// Something the engine can play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Provider asset
    File(AudioFileId),
    /// Synthesized beeps, never routed through the provider
    Tone(ToneSpec),
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cue::File(file) => write!(f, "{file}"),
            Cue::Tone(tone) => write!(f, "tone x{}", tone.count),
        }
    }
}

/// Handle identifying one enqueued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// A queued playback request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackRequest {
    /// Request handle
    pub id: RequestId,
    /// What to play
    pub cue: Cue,
    /// Explicit gain; `None` plays at the engine's default gain
    pub gain: Option<Decibels>,
    /// Whether the caller waited for earlier work before enqueueing
    pub wait: bool,
}

/// How a request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Played until the hardware went silent
    Played,
    /// The provider could not supply the asset; nothing was played
    ProviderFailed(ProviderError),
    /// The output refused the track
    CodecFailed(CodecError),
    /// Discarded or halted by `stop_playback`
    Cancelled,
}

impl RequestOutcome {
    /// Whether the request played to completion
    pub fn is_played(&self) -> bool {
        matches!(self, RequestOutcome::Played)
    }
}

/// Result record for one finished request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Request handle
    pub id: RequestId,
    /// What was requested
    pub cue: Cue,
    /// How it ended
    pub outcome: RequestOutcome,
}

/// Operation set of an audio engine
///
/// Failures of individual queued requests never surface from `play_file`;
/// they are collected as [`PlaybackReport`]s and drained with
/// [`AudioProtocol::take_reports`].
pub trait AudioProtocol {
    /// Protocol revision
    fn revision(&self) -> u32 {
        PROTOCOL_REVISION
    }

    /// Establish the output path; rejected with [`CodecError::Busy`] while a track plays
    fn connect(&mut self, target: OutputTarget) -> std::result::Result<(), CodecError>;

    /// Install the asset provider used by requests enqueued from now on
    fn set_provider(&mut self, provider: Box<dyn AudioAssetProvider>);

    /// Amplifier of the first selected output that has one
    fn amplifier(&self) -> std::result::Result<AmpCapabilities, CodecError>;

    /// Convert a raw codec gain parameter to decibels
    fn raw_gain_to_decibels(&self, raw: u8) -> std::result::Result<Decibels, CodecError> {
        Ok(self.amplifier()?.decibels(raw))
    }

    /// Gain used by requests without an explicit one
    fn set_default_gain(&mut self, gain: Decibels);

    /// Current default gain
    fn default_gain(&self) -> Decibels;

    /// Convert and install a raw default gain
    ///
    /// A failed conversion keeps the previous default, which is returned.
    fn set_default_gain_from_raw(&mut self, raw: u8) -> Decibels {
        match self.raw_gain_to_decibels(raw) {
            Ok(gain) => {
                self.set_default_gain(gain);
                gain
            }
            Err(err) => {
                let previous = self.default_gain();
                tracing::warn!(raw, error = %err, %previous, "gain conversion failed, keeping previous gain");
                previous
            }
        }
    }

    /// Language passed to the provider
    fn set_language(&mut self, language: LanguageCode);

    /// Current language
    fn language(&self) -> LanguageCode;

    /// Enqueue a provider asset
    ///
    /// With `wait`, earlier requests are played out first. The call does not
    /// wait for the new request itself.
    fn play_file(&mut self, file: AudioFileId, gain: Option<Decibels>, wait: bool) -> Result<RequestId>;

    /// Enqueue synthesized beeps
    fn play_tone(&mut self, tone: ToneSpec, wait: bool) -> Result<RequestId>;

    /// Cancel the active track and discard the queue
    ///
    /// With `wait`, returns only after the hardware is silent; the engine is
    /// idle afterwards. If the output is still active when the wait limit
    /// passes, the halted track keeps its buffer until a later [`pump`]
    /// sees the output go quiet, and [`CodecError::Device`] is returned.
    ///
    /// [`pump`]: AudioProtocol::pump
    fn stop_playback(&mut self, wait: bool) -> std::result::Result<(), CodecError>;

    /// Settle delay applied after each hardware reconfiguration; returns the old value
    fn set_delay(&mut self, delay: Duration) -> Duration;

    /// Advance playback: retire a finished track and start the next request
    fn pump(&mut self);

    /// No active track and nothing queued
    fn is_idle(&self) -> bool;

    /// Drain per-request results collected so far
    fn take_reports(&mut self) -> Vec<PlaybackReport>;
}
