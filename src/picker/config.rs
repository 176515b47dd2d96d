//! Picker configuration as stored by the host
//!
//! Values arrive as JSON and are validated before a [`super::PickerContext`]
//! is built from them.

use crate::codec::{OutputMask, OutputTarget};
use crate::error::{Result, VoiceOverError};
use crate::voiceover::MAX_AMPLIFIER;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Picker attribute bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PickerAttributes: u32 {
        /// Use volume icons from the boot volume
        const USE_VOLUME_ICON = 0x0001;
        /// Use prerendered disk labels
        const USE_DISK_LABEL_FILE = 0x0002;
        /// Use generic label images
        const USE_GENERIC_LABEL_IMAGE = 0x0004;
        /// Hide icons provided by the theme
        const HIDE_THEMED_ICONS = 0x0008;
        /// Enable pointer control
        const USE_POINTER_CONTROL = 0x0010;
        /// Show debug information
        const SHOW_DEBUG_DISPLAY = 0x0020;
        /// Minimal UI without extra controls
        const USE_MINIMAL_UI = 0x0040;
        /// Use flavour icons
        const USE_FLAVOUR_ICON = 0x0080;
        /// Reverse entry order
        const USE_REVERSED_UI = 0x0100;
        /// Suppress intro animations
        const REDUCE_MOTION = 0x0200;
    }
}

/// Output path selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Controller device path, first controller when absent
    pub device_path: Option<String>,
    /// Codec address, first codec when absent
    pub codec_address: Option<u8>,
    /// Output bit mask
    pub output_mask: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            device_path: None,
            codec_address: None,
            output_mask: u64::MAX,
        }
    }
}

impl OutputConfig {
    /// Output target for `connect`
    pub fn target(&self) -> OutputTarget {
        OutputTarget {
            device_path: self.device_path.clone(),
            codec_address: self.codec_address,
            outputs: OutputMask(self.output_mask),
        }
    }
}

/// Picker and voice-over settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Speak the menu
    pub audio_assist: bool,
    /// Raw [`PickerAttributes`] bits; unknown bits are ignored
    pub picker_attributes: u32,
    /// Seconds before the default entry is chosen, 0 disables the timeout
    pub timeout_seconds: u32,
    /// Hide auxiliary entries initially
    pub hide_auxiliary: bool,
    /// Voice-over language, e.g. `"en"` or `"pt-BR"`
    pub language: Option<String>,
    /// Stored system volume byte (bit 7 = muted)
    pub system_volume: Option<u8>,
    /// Volume amplifier in percent
    pub volume_amplifier: u32,
    /// Volume level below which assist stays silent
    pub minimum_volume: u8,
    /// Settle delay after codec setup, microseconds
    pub setup_delay_us: u64,
    /// UI scale
    pub scale: u8,
    /// Draw loop frame interval, milliseconds
    pub frame_interval_ms: u64,
    /// Audio output
    pub output: Option<OutputConfig>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        PickerConfig {
            audio_assist: false,
            picker_attributes: 0,
            timeout_seconds: 5,
            hide_auxiliary: true,
            language: None,
            system_volume: None,
            volume_amplifier: 100,
            minimum_volume: 20,
            setup_delay_us: 0,
            scale: 1,
            frame_interval_ms: 16,
            output: None,
        }
    }
}

impl PickerConfig {
    /// Parse and validate JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PickerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the picker cannot honour
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_AMPLIFIER).contains(&self.volume_amplifier) {
            return Err(VoiceOverError::Config(format!(
                "volume_amplifier {} outside 1..={MAX_AMPLIFIER}",
                self.volume_amplifier
            )));
        }
        if self.minimum_volume > 100 {
            return Err(VoiceOverError::Config(format!(
                "minimum_volume {} above 100",
                self.minimum_volume
            )));
        }
        if !matches!(self.scale, 1 | 2) {
            return Err(VoiceOverError::Config(format!("scale {} must be 1 or 2", self.scale)));
        }
        if self.frame_interval_ms == 0 {
            return Err(VoiceOverError::Config("frame_interval_ms must be non-zero".into()));
        }
        if self.output.as_ref().is_some_and(|output| output.output_mask == 0) {
            return Err(VoiceOverError::Config("output_mask selects no outputs".into()));
        }
        Ok(())
    }

    /// Typed attribute flags
    pub fn attributes(&self) -> PickerAttributes {
        PickerAttributes::from_bits_truncate(self.picker_attributes)
    }
}
