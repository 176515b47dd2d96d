//! Playback through the host's sound device
//!
//! [`RodioOutput`] implements [`AudioOutput`](crate::codec::AudioOutput) on top
//! of `rodio`, so the engine can speak on a desktop machine the same way it
//! drives a firmware codec.

mod audio_device;

pub use audio_device::{RodioOutput, SOFTWARE_AMPLIFIER};
