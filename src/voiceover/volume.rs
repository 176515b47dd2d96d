//! System volume level handling
//!
//! The firmware stores the user's volume as one byte: bit 7 is the mute flag,
//! bits 0-6 the level. An amplifier coefficient (percent) scales the level
//! before it is mapped onto the codec's raw gain steps.

/// Level used when no system volume has been stored
pub const DEFAULT_VOLUME_LEVEL: u8 = 70;

/// Mute bit of the stored system volume byte
pub const SYSTEM_VOLUME_MUTED: u8 = 0x80;

/// Level bits of the stored system volume byte
pub const SYSTEM_VOLUME_MASK: u8 = 0x7F;

/// Largest accepted amplifier coefficient
pub const MAX_AMPLIFIER: u32 = 999;

/// Volume level in the 0..=100 range plus mute state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeLevel {
    level: u8,
    muted: bool,
}

impl VolumeLevel {
    /// Build from an explicit level, clamped to 100
    pub fn new(level: u8, muted: bool) -> Self {
        VolumeLevel {
            level: level.min(100),
            muted,
        }
    }

    /// Decode the stored system volume byte
    ///
    /// `amplifier` is a percentage in `1..=999`; values outside are clamped.
    pub fn from_system(raw: Option<u8>, amplifier: u32) -> Self {
        let Some(raw) = raw else {
            return VolumeLevel::new(DEFAULT_VOLUME_LEVEL, false);
        };

        let amplifier = amplifier.clamp(1, MAX_AMPLIFIER);
        let scaled = u32::from(raw & SYSTEM_VOLUME_MASK) * amplifier / 100;
        VolumeLevel {
            level: scaled.min(100) as u8,
            muted: raw & SYSTEM_VOLUME_MUTED != 0,
        }
    }

    /// Level in percent
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Whether the mute bit is set
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Whether voice-over should be audible at all
    pub fn is_audible(&self, minimum: u8) -> bool {
        !self.muted && self.level >= minimum
    }

    /// Map the level onto a codec gain parameter with `steps` steps
    pub fn raw_gain(&self, steps: u8) -> u8 {
        let raw = (u32::from(self.level) * u32::from(steps) + 50) / 100;
        raw.min(u32::from(steps)) as u8
    }
}

impl Default for VolumeLevel {
    fn default() -> Self {
        VolumeLevel::new(DEFAULT_VOLUME_LEVEL, false)
    }
}
