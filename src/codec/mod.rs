//! Hardware-facing output contract
//!
//! The codec driver is reached only through [`AudioOutput`]. Everything the
//! engine needs to know about the hardware comes back from `connect` as a
//! [`CodecInfo`]: which outputs exist and what amplifier each one has.

mod format;

pub use format::{decode_pcm, AudioFormat, BitDepth, SampleFrequency, ToneSpec};

use crate::error::CodecError;
use std::fmt;

/// Signed gain in dB relative to the codec's 0 dB reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Decibels(pub i8);

impl Decibels {
    /// 0 dB
    pub const ZERO: Decibels = Decibels(0);

    /// Clamp a wider value into the `i8` range
    pub fn saturating(value: i32) -> Self {
        Decibels(value.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8)
    }

    /// Linear amplitude factor for software volume control
    pub fn to_linear(self) -> f32 {
        10f32.powf(f32::from(self.0) / 20.0)
    }
}

impl fmt::Display for Decibels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dB", self.0)
    }
}

/// Amplifier capabilities of one codec output
///
/// Gain follows the HDA convention: each step is `(step_size + 1) * 0.25` dB
/// and `offset` is the step that corresponds to 0 dB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AmpCapabilities {
    /// Step representing 0 dB
    pub offset: u8,
    /// Highest valid step
    pub num_steps: u8,
    /// Step size in quarter-dB units, minus one
    pub step_size: u8,
    /// Whether the amplifier can mute
    pub mute_capable: bool,
}

impl AmpCapabilities {
    /// An output without amplifier reports zero steps
    pub fn is_present(&self) -> bool {
        self.num_steps != 0
    }

    /// Convert a raw gain parameter to decibels
    ///
    /// Parameters above `num_steps` are clamped, which keeps the mapping
    /// monotonic over the whole `u8` range.
    pub fn decibels(&self, raw: u8) -> Decibels {
        let raw = raw.min(self.num_steps);
        let quarter_db = (i32::from(raw) - i32::from(self.offset)) * (i32::from(self.step_size) + 1);
        Decibels::saturating(quarter_db.div_euclid(4))
    }
}

/// One output (pin widget) of the connected codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputChannel {
    /// Output index as used by [`OutputMask`]
    pub index: u8,
    /// Amplifier capabilities
    pub amp: AmpCapabilities,
}

/// What the driver reports about the codec after `connect`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodecInfo {
    /// Human-readable codec name
    pub name: String,
    /// Outputs in codec order
    pub outputs: Vec<OutputChannel>,
}

/// Bit mask selecting codec outputs by index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OutputMask(pub u64);

impl OutputMask {
    /// Every output
    pub const ALL: OutputMask = OutputMask(u64::MAX);

    /// Whether the output with this index is selected
    pub fn contains(self, index: u8) -> bool {
        index < 64 && self.0 & (1u64 << index) != 0
    }
}

/// Where audio should go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputTarget {
    /// Controller device path, first controller when absent
    pub device_path: Option<String>,
    /// Codec address on the controller, first codec when absent
    pub codec_address: Option<u8>,
    /// Outputs to drive
    pub outputs: OutputMask,
}

impl OutputTarget {
    /// First amplifier-capable output selected by this target
    pub fn first_amplifier(&self, codec: &CodecInfo) -> Option<AmpCapabilities> {
        codec
            .outputs
            .iter()
            .find(|output| self.outputs.contains(output.index) && output.amp.is_present())
            .map(|output| output.amp)
    }
}

/// Driver contract for the physical audio path
///
/// Playback is asynchronous: `start` returns as soon as the hardware is
/// running and `is_active` reports when it has gone silent. The buffer passed
/// to `start` stays alive until `is_active` returns false or `halt` completes.
pub trait AudioOutput {
    /// Open the controller/codec and select outputs
    fn connect(&mut self, target: &OutputTarget) -> Result<CodecInfo, CodecError>;

    /// Program stream format and gain for the next track
    fn configure(&mut self, format: &AudioFormat, gain: Decibels) -> Result<(), CodecError>;

    /// Begin playing raw PCM in the configured format
    fn start(&mut self, samples: &[u8]) -> Result<(), CodecError>;

    /// Whether the hardware is still producing sound
    fn is_active(&mut self) -> bool;

    /// Stop the current stream; silence may follow with a delay
    fn halt(&mut self) -> Result<(), CodecError>;
}
