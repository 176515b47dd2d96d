//! FIFO playback engine on top of an [`AudioOutput`] and an asset provider

use super::{AudioProtocol, Cue, PlaybackReport, PlaybackRequest, RequestId, RequestOutcome};
use crate::clock::SharedClock;
use crate::codec::{AmpCapabilities, AudioFormat, AudioOutput, CodecInfo, Decibels, OutputTarget, ToneSpec};
use crate::error::{CodecError, ProviderError, Result, VoiceOverError};
use crate::provider::{self, AudioAssetProvider, LentBuffer, SharedProvider};
use crate::voiceover::{AudioFileId, FileIdLayout, LanguageCode};
use std::collections::VecDeque;
use std::time::Duration;

/// Interval between hardware polls while busy-waiting
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Upper bound on any single busy-wait for silence
const DEFAULT_WAIT_LIMIT: Duration = Duration::from_secs(30);

struct Connection {
    target: OutputTarget,
    codec: CodecInfo,
}

/// A request plus the provider and language it was enqueued under
struct Queued {
    request: PlaybackRequest,
    provider: Option<SharedProvider>,
    language: LanguageCode,
}

enum TrackBuffer {
    Lent(LentBuffer),
    Synth(Vec<u8>),
}

impl TrackBuffer {
    fn samples(&self) -> &[u8] {
        match self {
            TrackBuffer::Lent(lent) => lent.buffer().map_or(&[][..], |buffer| buffer.data()),
            TrackBuffer::Synth(pcm) => pcm,
        }
    }
}

struct ActiveTrack {
    request: PlaybackRequest,
    buffer: TrackBuffer,
    halted: bool,
}

/// Audio engine servicing playback requests strictly in enqueue order
///
/// At most one buffer is in flight. Provider buffers are held in a
/// [`LentBuffer`] for exactly as long as the hardware plays them.
pub struct AudioEngine {
    output: Box<dyn AudioOutput>,
    clock: SharedClock,
    connection: Option<Connection>,
    provider: Option<SharedProvider>,
    language: LanguageCode,
    default_gain: Decibels,
    delay: Duration,
    queue: VecDeque<Queued>,
    active: Option<ActiveTrack>,
    next_id: u64,
    reports: Vec<PlaybackReport>,
    poll_interval: Duration,
    wait_limit: Duration,
}

impl AudioEngine {
    /// Create an engine driving `output`
    ///
    /// Fails if the audio file id layout is inconsistent.
    pub fn new(output: Box<dyn AudioOutput>, clock: SharedClock) -> Result<Self> {
        FileIdLayout::CANONICAL.validate()?;

        Ok(AudioEngine {
            output,
            clock,
            connection: None,
            provider: None,
            language: LanguageCode::default(),
            default_gain: Decibels::ZERO,
            delay: Duration::ZERO,
            queue: VecDeque::new(),
            active: None,
            next_id: 0,
            reports: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_limit: DEFAULT_WAIT_LIMIT,
        })
    }

    /// Change the busy-wait poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Change how long a busy-wait may spin before giving up
    pub fn with_wait_limit(mut self, limit: Duration) -> Self {
        self.wait_limit = limit;
        self
    }

    /// Whether `connect` has succeeded
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Codec reported by the last successful `connect`
    pub fn codec(&self) -> Option<&CodecInfo> {
        self.connection.as_ref().map(|connection| &connection.codec)
    }

    /// Current settle delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Request currently playing
    pub fn active_request(&self) -> Option<&PlaybackRequest> {
        self.active.as_ref().map(|track| &track.request)
    }

    /// Requests waiting behind the active one
    pub fn queued(&self) -> impl Iterator<Item = &PlaybackRequest> {
        self.queue.iter().map(|queued| &queued.request)
    }

    /// Play out everything queued, pumping while waiting
    pub fn wait_until_idle(&mut self) -> std::result::Result<(), CodecError> {
        let deadline = self.clock.now() + self.wait_limit;
        loop {
            self.pump();
            if self.active.is_none() && self.queue.is_empty() {
                return Ok(());
            }
            if self.clock.now() >= deadline {
                tracing::warn!(limit = ?self.wait_limit, "playback did not finish in time");
                return Err(CodecError::Device("timed out waiting for playback".into()));
            }
            self.clock.stall(self.poll_interval);
        }
    }

    fn enqueue(&mut self, cue: Cue, gain: Option<Decibels>, wait: bool) -> Result<RequestId> {
        if self.connection.is_none() {
            return Err(CodecError::NotConnected.into());
        }
        if matches!(cue, Cue::File(_)) && self.provider.is_none() {
            return Err(ProviderError::Missing.into());
        }
        if wait {
            self.wait_until_idle()?;
        }

        self.next_id += 1;
        let request = PlaybackRequest {
            id: RequestId(self.next_id),
            cue,
            gain,
            wait,
        };
        tracing::debug!(id = request.id.0, %cue, queued = self.queue.len(), "enqueued playback request");
        self.queue.push_back(Queued {
            request,
            provider: self.provider.clone(),
            language: self.language,
        });

        self.pump();
        Ok(request.id)
    }

    fn report(&mut self, request: PlaybackRequest, outcome: RequestOutcome) {
        match &outcome {
            RequestOutcome::ProviderFailed(err) => {
                tracing::warn!(id = request.id.0, cue = %request.cue, error = %err, "skipping cue, asset unavailable");
            }
            RequestOutcome::CodecFailed(err) => {
                tracing::warn!(id = request.id.0, cue = %request.cue, error = %err, "output rejected cue");
            }
            RequestOutcome::Played | RequestOutcome::Cancelled => {
                tracing::debug!(id = request.id.0, cue = %request.cue, ?outcome, "request finished");
            }
        }
        self.reports.push(PlaybackReport {
            id: request.id,
            cue: request.cue,
            outcome,
        });
    }

    fn service(&mut self, queued: Queued) -> std::result::Result<ActiveTrack, (PlaybackRequest, RequestOutcome)> {
        let request = queued.request;
        let (buffer, format) = match request.cue {
            Cue::File(file) => {
                let provider = queued
                    .provider
                    .ok_or((request, RequestOutcome::ProviderFailed(ProviderError::Missing)))?;
                let lent = LentBuffer::acquire(&provider, file, queued.language)
                    .map_err(|err| (request, RequestOutcome::ProviderFailed(err)))?;
                let format = lent
                    .buffer()
                    .map(|buffer| buffer.format())
                    .unwrap_or_else(AudioFormat::signal);
                (TrackBuffer::Lent(lent), format)
            }
            Cue::Tone(tone) => (TrackBuffer::Synth(tone.render()), AudioFormat::signal()),
        };
        format
            .validate()
            .map_err(|err| (request, RequestOutcome::CodecFailed(err)))?;

        let gain = request.gain.unwrap_or(self.default_gain);
        self.output
            .configure(&format, gain)
            .map_err(|err| (request, RequestOutcome::CodecFailed(err)))?;
        self.clock.stall(self.delay);
        self.output
            .start(buffer.samples())
            .map_err(|err| (request, RequestOutcome::CodecFailed(err)))?;

        tracing::debug!(id = request.id.0, cue = %request.cue, %gain, "started playback");
        Ok(ActiveTrack {
            request,
            buffer,
            halted: false,
        })
    }

    fn retire_active(&mut self) {
        let Some(track) = self.active.take() else {
            return;
        };
        if let TrackBuffer::Lent(lent) = track.buffer {
            if let Err(err) = lent.release() {
                tracing::warn!(id = track.request.id.0, error = %err, "provider rejected buffer release");
            }
        }
        let outcome = if track.halted {
            RequestOutcome::Cancelled
        } else {
            RequestOutcome::Played
        };
        self.report(track.request, outcome);
    }
}

impl AudioProtocol for AudioEngine {
    fn connect(&mut self, target: OutputTarget) -> std::result::Result<(), CodecError> {
        self.pump();
        if self.active.is_some() {
            tracing::warn!("connect rejected while a track is playing");
            return Err(CodecError::Busy);
        }

        let codec = self.output.connect(&target)?;
        self.clock.stall(self.delay);
        tracing::info!(codec = %codec.name, outputs = codec.outputs.len(), mask = target.outputs.0, "audio output connected");
        self.connection = Some(Connection { target, codec });
        Ok(())
    }

    fn set_provider(&mut self, provider: Box<dyn AudioAssetProvider>) {
        tracing::info!(ownership = ?provider.ownership(), "installed audio asset provider");
        self.provider = Some(provider::share(provider));
    }

    fn amplifier(&self) -> std::result::Result<AmpCapabilities, CodecError> {
        let connection = self.connection.as_ref().ok_or(CodecError::NotConnected)?;
        connection
            .target
            .first_amplifier(&connection.codec)
            .ok_or(CodecError::NoAmplifier)
    }

    fn set_default_gain(&mut self, gain: Decibels) {
        tracing::debug!(%gain, "default gain set");
        self.default_gain = gain;
    }

    fn default_gain(&self) -> Decibels {
        self.default_gain
    }

    fn set_language(&mut self, language: LanguageCode) {
        self.language = language;
    }

    fn language(&self) -> LanguageCode {
        self.language
    }

    fn play_file(&mut self, file: AudioFileId, gain: Option<Decibels>, wait: bool) -> Result<RequestId> {
        self.enqueue(Cue::File(file), gain, wait)
    }

    fn play_tone(&mut self, tone: ToneSpec, wait: bool) -> Result<RequestId> {
        if tone.count == 0 {
            return Err(VoiceOverError::Codec(CodecError::Unsupported("tone without beeps".into())));
        }
        self.enqueue(Cue::Tone(tone), None, wait)
    }

    fn stop_playback(&mut self, wait: bool) -> std::result::Result<(), CodecError> {
        let discarded = std::mem::take(&mut self.queue);
        for queued in discarded {
            self.report(queued.request, RequestOutcome::Cancelled);
        }

        let Some(track) = self.active.as_mut() else {
            return Ok(());
        };
        track.halted = true;
        let halted = self.output.halt();

        if wait {
            let deadline = self.clock.now() + self.wait_limit;
            while self.output.is_active() && self.clock.now() < deadline {
                self.clock.stall(self.poll_interval);
            }
            if self.output.is_active() {
                // The buffer may still be read by the device; pump retires it once silent.
                tracing::warn!(limit = ?self.wait_limit, "output still active after stop");
                halted?;
                return Err(CodecError::Device("output did not go silent".into()));
            }
            self.retire_active();
            halted?;
        } else {
            halted?;
        }
        Ok(())
    }

    fn set_delay(&mut self, delay: Duration) -> Duration {
        std::mem::replace(&mut self.delay, delay)
    }

    fn pump(&mut self) {
        if self.active.is_some() {
            if self.output.is_active() {
                return;
            }
            self.retire_active();
        }

        while let Some(queued) = self.queue.pop_front() {
            match self.service(queued) {
                Ok(track) => {
                    self.active = Some(track);
                    return;
                }
                Err((request, outcome)) => self.report(request, outcome),
            }
        }
    }

    fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    fn take_reports(&mut self) -> Vec<PlaybackReport> {
        std::mem::take(&mut self.reports)
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        if self.active.is_some() {
            if let Err(err) = self.output.halt() {
                tracing::warn!(error = %err, "failed to halt output on drop");
            }
        }
    }
}
