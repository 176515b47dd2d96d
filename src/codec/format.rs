//! PCM formats understood by the output path
//!
//! Formats are described by sample frequency, bit depth and channel count. Raw
//! buffers stay opaque bytes until an output needs floating point samples.

use crate::error::CodecError;
use std::time::Duration;

/// Sample frequencies a codec stream can be programmed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFrequency {
    /// 8 kHz
    Hz8000,
    /// 11.025 kHz
    Hz11025,
    /// 16 kHz
    Hz16000,
    /// 22.05 kHz
    Hz22050,
    /// 32 kHz
    Hz32000,
    /// 44.1 kHz
    Hz44100,
    /// 48 kHz
    Hz48000,
    /// 88.2 kHz
    Hz88200,
    /// 96 kHz
    Hz96000,
    /// 192 kHz
    Hz192000,
}

impl SampleFrequency {
    const TABLE: [(SampleFrequency, u32); 10] = [
        (SampleFrequency::Hz8000, 8_000),
        (SampleFrequency::Hz11025, 11_025),
        (SampleFrequency::Hz16000, 16_000),
        (SampleFrequency::Hz22050, 22_050),
        (SampleFrequency::Hz32000, 32_000),
        (SampleFrequency::Hz44100, 44_100),
        (SampleFrequency::Hz48000, 48_000),
        (SampleFrequency::Hz88200, 88_200),
        (SampleFrequency::Hz96000, 96_000),
        (SampleFrequency::Hz192000, 192_000),
    ];

    /// Frequency in Hz
    pub fn hz(self) -> u32 {
        Self::TABLE
            .iter()
            .find(|(freq, _)| *freq == self)
            .map_or(0, |(_, hz)| *hz)
    }

    /// Look up an exact frequency
    pub fn from_hz(hz: u32) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, value)| *value == hz)
            .map(|(freq, _)| *freq)
    }
}

/// Sample bit depths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    /// Unsigned 8-bit
    Bits8,
    /// Signed 16-bit
    Bits16,
    /// Signed 20-bit in a 32-bit container
    Bits20,
    /// Signed 24-bit in a 32-bit container
    Bits24,
    /// Signed 32-bit
    Bits32,
}

impl BitDepth {
    /// Significant bits per sample
    pub fn bits(self) -> u32 {
        match self {
            BitDepth::Bits8 => 8,
            BitDepth::Bits16 => 16,
            BitDepth::Bits20 => 20,
            BitDepth::Bits24 => 24,
            BitDepth::Bits32 => 32,
        }
    }

    /// Bytes each sample occupies in a buffer
    pub fn container_bytes(self) -> usize {
        match self {
            BitDepth::Bits8 => 1,
            BitDepth::Bits16 => 2,
            BitDepth::Bits20 | BitDepth::Bits24 | BitDepth::Bits32 => 4,
        }
    }
}

/// Format metadata attached to every audio buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioFormat {
    /// Sample frequency
    pub frequency: SampleFrequency,
    /// Sample bit depth
    pub bits: BitDepth,
    /// Interleaved channel count
    pub channels: u8,
}

impl AudioFormat {
    /// Maximum interleaved channels a stream may carry
    pub const MAX_CHANNELS: u8 = 8;

    /// Create a format, rejecting channel counts the output path cannot carry
    pub fn new(frequency: SampleFrequency, bits: BitDepth, channels: u8) -> Result<Self, CodecError> {
        let format = AudioFormat {
            frequency,
            bits,
            channels,
        };
        format.validate()?;
        Ok(format)
    }

    /// Check a format that may have been built without [`AudioFormat::new`]
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.channels == 0 || self.channels > Self::MAX_CHANNELS {
            return Err(CodecError::Unsupported(format!(
                "{} channels (expected 1..={})",
                self.channels,
                Self::MAX_CHANNELS
            )));
        }
        Ok(())
    }

    /// 16-bit mono at 44.1 kHz, used for synthesized signals
    pub fn signal() -> Self {
        AudioFormat {
            frequency: SampleFrequency::Hz44100,
            bits: BitDepth::Bits16,
            channels: 1,
        }
    }

    /// Bytes per interleaved frame
    pub fn frame_bytes(&self) -> usize {
        self.bits.container_bytes() * usize::from(self.channels)
    }

    /// Playback time of `len` bytes in this format
    ///
    /// A format without channels has no frames and plays for zero time.
    pub fn duration_of(&self, len: usize) -> Duration {
        let frames = len.checked_div(self.frame_bytes()).unwrap_or(0) as u64;
        Duration::from_micros(frames * 1_000_000 / u64::from(self.frequency.hz()))
    }
}

/// Decode raw PCM bytes into normalized `f32` samples in [-1.0, 1.0]
///
/// Trailing bytes that do not form a whole sample are ignored.
pub fn decode_pcm(data: &[u8], bits: BitDepth) -> Vec<f32> {
    match bits {
        BitDepth::Bits8 => data
            .iter()
            .map(|&byte| (f32::from(byte) - 128.0) / 128.0)
            .collect(),
        BitDepth::Bits16 => data
            .chunks_exact(2)
            .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32_768.0)
            .collect(),
        BitDepth::Bits20 | BitDepth::Bits24 | BitDepth::Bits32 => {
            let scale = (1u64 << (bits.bits() - 1)) as f32;
            data.chunks_exact(4)
                .map(|quad| {
                    let value = i32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]);
                    (value as f32 / scale).clamp(-1.0, 1.0)
                })
                .collect()
        }
    }
}

/// Beep sequence synthesized by the engine instead of loaded from a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneSpec {
    /// Number of beeps
    pub count: u8,
    /// Length of each beep
    pub tone: Duration,
    /// Silence after each beep
    pub silence: Duration,
    /// Beep pitch in Hz
    pub frequency_hz: u32,
}

impl ToneSpec {
    /// Single short beep marking the end of an announcement
    pub const NORMAL: ToneSpec = ToneSpec {
        count: 1,
        tone: Duration::from_millis(200),
        silence: Duration::from_millis(150),
        frequency_hz: 800,
    };

    /// Render the beeps as 16-bit mono PCM in [`AudioFormat::signal`]
    pub fn render(&self) -> Vec<u8> {
        let rate = u64::from(SampleFrequency::Hz44100.hz());
        let tone_samples = (self.tone.as_micros() as u64 * rate / 1_000_000) as usize;
        let silence_samples = (self.silence.as_micros() as u64 * rate / 1_000_000) as usize;
        let half_period = (rate / u64::from(self.frequency_hz.max(1)) / 2).max(1) as usize;
        let amplitude = i16::MAX / 2;

        let mut pcm = Vec::with_capacity(usize::from(self.count) * (tone_samples + silence_samples) * 2);
        for _ in 0..self.count {
            for i in 0..tone_samples {
                let sample = if (i / half_period) % 2 == 0 { amplitude } else { -amplitude };
                pcm.extend_from_slice(&sample.to_le_bytes());
            }
            pcm.resize(pcm.len() + silence_samples * 2, 0);
        }
        pcm
    }
}
