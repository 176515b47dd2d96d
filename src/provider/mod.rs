//! Audio asset provider contract
//!
//! A provider resolves `(file id, language)` to raw PCM plus format metadata.
//! Buffers are lent, not given: the engine returns each one through
//! [`AudioAssetProvider::release`] exactly once, unless the provider declares
//! [`BufferOwnership::Retained`], in which case release is never called.
//!
//! [`LentBuffer`] enforces this. It holds the provider that lent the buffer,
//! so a provider swap while a track plays still returns the buffer to its
//! owner, and it releases on drop if no explicit release happened.

mod table;

pub use table::AssetTable;

use crate::codec::AudioFormat;
use crate::error::ProviderError;
use crate::voiceover::{AudioFileId, LanguageCode};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Raw audio lent by a provider
#[derive(Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    file: AudioFileId,
    language: LanguageCode,
    data: Arc<[u8]>,
    format: AudioFormat,
}

impl AudioBuffer {
    /// Wrap provider data for one file
    pub fn new(
        file: AudioFileId,
        language: LanguageCode,
        data: impl Into<Arc<[u8]>>,
        format: AudioFormat,
    ) -> Self {
        AudioBuffer {
            file,
            language,
            data: data.into(),
            format,
        }
    }

    /// File this buffer holds
    pub fn file(&self) -> AudioFileId {
        self.file
    }

    /// Language the buffer was resolved for (may be a fallback)
    pub fn language(&self) -> LanguageCode {
        self.language
    }

    /// Raw sample bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Sample format
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Whether two buffers share the same storage
    pub fn same_storage(&self, other: &AudioBuffer) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for AudioBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioBuffer")
            .field("file", &self.file)
            .field("language", &self.language)
            .field("len", &self.data.len())
            .field("format", &self.format)
            .finish()
    }
}

/// Who owns buffers after `acquire`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferOwnership {
    /// The engine must hand every buffer back through `release`
    #[default]
    Lent,
    /// The provider keeps static ownership; `release` is never called
    Retained,
}

/// Resolver of voice-over assets
pub trait AudioAssetProvider: Send {
    /// Look up the asset for a file in a language
    ///
    /// Failure is expected for assets that are not localized and must not be
    /// treated as fatal by callers.
    fn acquire(
        &mut self,
        file: AudioFileId,
        language: LanguageCode,
    ) -> Result<AudioBuffer, ProviderError>;

    /// Take back a buffer returned by `acquire`
    fn release(&mut self, buffer: AudioBuffer) -> Result<(), ProviderError> {
        drop(buffer);
        Ok(())
    }

    /// Buffer ownership policy, [`BufferOwnership::Lent`] unless overridden
    fn ownership(&self) -> BufferOwnership {
        BufferOwnership::Lent
    }
}

/// Handle to the provider installed on an engine
pub type SharedProvider = Arc<Mutex<Box<dyn AudioAssetProvider>>>;

/// Wrap a provider for installation
pub fn share(provider: Box<dyn AudioAssetProvider>) -> SharedProvider {
    Arc::new(Mutex::new(provider))
}

/// Scope-bound borrow of a provider buffer
///
/// Exactly one release reaches the provider: either through [`LentBuffer::release`]
/// or, on any other exit path, when the guard is dropped.
#[must_use = "dropping a LentBuffer releases it immediately"]
pub struct LentBuffer {
    provider: SharedProvider,
    buffer: Option<AudioBuffer>,
    ownership: BufferOwnership,
}

impl LentBuffer {
    /// Acquire from `provider`, remembering it for the matching release
    pub fn acquire(
        provider: &SharedProvider,
        file: AudioFileId,
        language: LanguageCode,
    ) -> Result<Self, ProviderError> {
        let mut guard = provider.lock();
        let ownership = guard.ownership();
        let buffer = guard.acquire(file, language)?;
        drop(guard);

        tracing::debug!(%file, %language, len = buffer.data().len(), "acquired audio buffer");
        Ok(LentBuffer {
            provider: Arc::clone(provider),
            buffer: Some(buffer),
            ownership,
        })
    }

    /// The borrowed buffer
    pub fn buffer(&self) -> Option<&AudioBuffer> {
        self.buffer.as_ref()
    }

    /// Hand the buffer back, surfacing release errors
    pub fn release(mut self) -> Result<(), ProviderError> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> Result<(), ProviderError> {
        let Some(buffer) = self.buffer.take() else {
            return Ok(());
        };
        if self.ownership == BufferOwnership::Retained {
            return Ok(());
        }

        let file = buffer.file();
        tracing::debug!(%file, "releasing audio buffer");
        self.provider.lock().release(buffer)
    }
}

impl Drop for LentBuffer {
    fn drop(&mut self) {
        if let Err(err) = self.release_inner() {
            tracing::warn!(error = %err, "audio buffer release failed");
        }
    }
}

impl fmt::Debug for LentBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LentBuffer")
            .field("buffer", &self.buffer)
            .field("ownership", &self.ownership)
            .finish()
    }
}

type AcquireFn = dyn FnMut(AudioFileId, LanguageCode) -> Result<AudioBuffer, ProviderError> + Send;
type ReleaseFn = dyn FnMut(AudioBuffer) -> Result<(), ProviderError> + Send;

/// Provider assembled from an acquire handler and an optional release handler
///
/// Handler context is whatever the closures capture. Without a release
/// handler the provider reports [`BufferOwnership::Retained`].
pub struct CallbackProvider {
    acquire: Box<AcquireFn>,
    release: Option<Box<ReleaseFn>>,
}

impl CallbackProvider {
    /// Provider with only an acquire handler
    pub fn new(
        acquire: impl FnMut(AudioFileId, LanguageCode) -> Result<AudioBuffer, ProviderError> + Send + 'static,
    ) -> Self {
        CallbackProvider {
            acquire: Box::new(acquire),
            release: None,
        }
    }

    /// Add a release handler
    pub fn with_release(
        mut self,
        release: impl FnMut(AudioBuffer) -> Result<(), ProviderError> + Send + 'static,
    ) -> Self {
        self.release = Some(Box::new(release));
        self
    }
}

impl AudioAssetProvider for CallbackProvider {
    fn acquire(
        &mut self,
        file: AudioFileId,
        language: LanguageCode,
    ) -> Result<AudioBuffer, ProviderError> {
        (self.acquire)(file, language)
    }

    fn release(&mut self, buffer: AudioBuffer) -> Result<(), ProviderError> {
        match self.release.as_mut() {
            Some(release) => release(buffer),
            None => Ok(()),
        }
    }

    fn ownership(&self) -> BufferOwnership {
        if self.release.is_some() {
            BufferOwnership::Lent
        } else {
            BufferOwnership::Retained
        }
    }
}
