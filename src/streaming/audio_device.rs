//! Audio device integration using rodio

use crate::codec::{
    decode_pcm, AmpCapabilities, AudioFormat, AudioOutput, CodecInfo, Decibels, OutputChannel, OutputTarget,
};
use crate::error::CodecError;
use rodio::buffer::SamplesBuffer;
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::{OutputStream, OutputStreamHandle, Sink};

/// Volume range exposed for the software sink: 101 steps of 1 dB, step 100 is 0 dB
pub const SOFTWARE_AMPLIFIER: AmpCapabilities = AmpCapabilities {
    offset: 100,
    num_steps: 100,
    step_size: 3,
    mute_capable: true,
};

struct Stream {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

/// Output that plays tracks on a system audio device
///
/// `connect` opens the device named by the target's device path, or the
/// default device when none is given. Each track gets a fresh sink so a halted
/// track never blocks the next one.
pub struct RodioOutput {
    stream: Option<Stream>,
    sink: Option<Sink>,
    format: AudioFormat,
    gain: Decibels,
}

impl Default for RodioOutput {
    fn default() -> Self {
        RodioOutput::new()
    }
}

impl RodioOutput {
    /// Unconnected output
    pub fn new() -> Self {
        RodioOutput {
            stream: None,
            sink: None,
            format: AudioFormat::signal(),
            gain: Decibels::ZERO,
        }
    }

    fn open(target: &OutputTarget) -> Result<(OutputStream, OutputStreamHandle, String), CodecError> {
        let Some(path) = target.device_path.as_deref() else {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| CodecError::Device(format!("Failed to create audio stream: {e}")))?;
            return Ok((stream, handle, "default".into()));
        };

        let host = rodio::cpal::default_host();
        let device = host
            .output_devices()
            .map_err(|e| CodecError::Device(format!("Failed to list audio devices: {e}")))?
            .find(|device| device.name().is_ok_and(|name| name == path))
            .ok_or_else(|| CodecError::NotFound(path.to_string()))?;
        let (stream, handle) = OutputStream::try_from_device(&device)
            .map_err(|e| CodecError::Device(format!("Failed to open {path}: {e}")))?;
        Ok((stream, handle, path.to_string()))
    }
}

impl AudioOutput for RodioOutput {
    fn connect(&mut self, target: &OutputTarget) -> Result<CodecInfo, CodecError> {
        if target.codec_address.is_some_and(|address| address != 0) {
            return Err(CodecError::NotFound(format!(
                "codec {:?} on a software device",
                target.codec_address
            )));
        }

        self.halt()?;
        let (stream, handle, name) = Self::open(target)?;
        self.stream = Some(Stream {
            _stream: stream,
            handle,
        });

        Ok(CodecInfo {
            name,
            outputs: vec![OutputChannel {
                index: 0,
                amp: SOFTWARE_AMPLIFIER,
            }],
        })
    }

    fn configure(&mut self, format: &AudioFormat, gain: Decibels) -> Result<(), CodecError> {
        if self.stream.is_none() {
            return Err(CodecError::NotConnected);
        }
        self.format = *format;
        self.gain = gain;
        Ok(())
    }

    fn start(&mut self, samples: &[u8]) -> Result<(), CodecError> {
        let stream = self.stream.as_ref().ok_or(CodecError::NotConnected)?;
        let sink = Sink::try_new(&stream.handle)
            .map_err(|e| CodecError::Device(format!("Failed to create audio sink: {e}")))?;

        let data = decode_pcm(samples, self.format.bits);
        sink.set_volume(self.gain.to_linear());
        sink.append(SamplesBuffer::new(
            u16::from(self.format.channels),
            self.format.frequency.hz(),
            data,
        ));
        self.sink = Some(sink);
        Ok(())
    }

    fn is_active(&mut self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }

    fn halt(&mut self) -> Result<(), CodecError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        Ok(())
    }
}
