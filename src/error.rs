//! Error types for voice-over playback and picker sessions
//!
//! Each concern gets its own enum so callers can tell a missing asset apart from
//! a codec that refused to connect. [`VoiceOverError`] wraps all of them for the
//! session-level API.

use crate::voiceover::{AudioFileId, LanguageCode};
use thiserror::Error;

/// Failures reported by (or about) the audio asset provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No provider has been installed on the engine
    #[error("no audio asset provider installed")]
    Missing,

    /// The provider has no asset for this file and language
    #[error("audio file {file} not available for language '{language}'")]
    NotFound {
        /// Requested file
        file: AudioFileId,
        /// Requested language
        language: LanguageCode,
    },

    /// The provider returned data that cannot be played
    #[error("invalid audio data for {file}: {reason}")]
    InvalidData {
        /// Requested file
        file: AudioFileId,
        /// What was wrong with it
        reason: String,
    },

    /// A buffer was handed back that the provider never lent
    #[error("release of unknown buffer for {file}")]
    UnknownBuffer {
        /// File the buffer claimed to hold
        file: AudioFileId,
    },

    /// Provider-specific failure
    #[error("{0}")]
    Other(String),
}

/// Failures of the hardware output path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Playback or gain conversion attempted before `connect`
    #[error("audio output is not connected")]
    NotConnected,

    /// Reconnect attempted while a track is still playing
    #[error("audio output is busy playing a track")]
    Busy,

    /// Requested controller or codec does not exist
    #[error("audio device not found: {0}")]
    NotFound(String),

    /// None of the selected outputs has amplifier capabilities
    #[error("no selected output exposes amplifier capabilities")]
    NoAmplifier,

    /// Format or configuration the codec cannot handle
    #[error("unsupported audio configuration: {0}")]
    Unsupported(String),

    /// Driver-level failure
    #[error("audio device error: {0}")]
    Device(String),
}

/// Failure raised by the external picker renderer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ViewError(pub String);

impl ViewError {
    /// Creates a view error from any message
    pub fn new(reason: impl Into<String>) -> Self {
        ViewError(reason.into())
    }
}

/// Defect in the audio file id numbering
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The alphanumeric range does not hold exactly 36 ids
    #[error("alphanumeric range holds {found} ids, expected {expected}")]
    AlphanumericCount {
        /// Ids actually covered by the range
        found: u32,
        /// Required count (10 digits + 26 letters)
        expected: u32,
    },

    /// Letters do not start right after the last digit
    #[error("letter range starts at {found:#06x}, expected {expected:#06x}")]
    LetterOffset {
        /// Configured first letter id
        found: u32,
        /// Id right after digit 9
        expected: u32,
    },

    /// Phrase ids overlap the alphanumeric range or exceed the sentinel
    #[error("phrase range {start:#06x}..{end:#06x} is invalid")]
    PhraseRange {
        /// First phrase id
        start: u32,
        /// Sentinel
        end: u32,
    },
}

/// The main error type for voice-over and picker operations
#[derive(Error, Debug)]
pub enum VoiceOverError {
    /// Asset provider failure
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Hardware output failure
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// File id layout defect detected at construction
    #[error("file id layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Visual/audio session context could not be built
    #[error("failed to initialize picker session: {0}")]
    SessionInit(String),

    /// A boot entry could not be registered with the view
    #[error("failed to register boot entry {index}: {source}")]
    EntryRegistration {
        /// Zero-based entry index
        index: usize,
        /// Renderer failure
        source: ViewError,
    },

    /// Session interrupted by a refresh request
    #[error("picker session aborted")]
    Aborted,

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse failure
    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl VoiceOverError {
    /// Whether this is the refresh signal rather than a real failure
    pub fn is_aborted(&self) -> bool {
        matches!(self, VoiceOverError::Aborted)
    }
}

impl From<String> for VoiceOverError {
    fn from(msg: String) -> Self {
        VoiceOverError::Other(msg)
    }
}

impl From<&str> for VoiceOverError {
    fn from(msg: &str) -> Self {
        VoiceOverError::Other(msg.to_string())
    }
}

/// Result type for voice-over operations
pub type Result<T> = std::result::Result<T, VoiceOverError>;
