//! In-memory asset table provider

use super::{AudioAssetProvider, AudioBuffer};
use crate::codec::AudioFormat;
use crate::error::ProviderError;
use crate::voiceover::{AudioFileId, LanguageCode};
use std::collections::HashMap;
use std::sync::Arc;

/// Provider backed by a map of preloaded PCM assets
///
/// Lookups that miss in the requested language retry in the fallback language
/// (English unless changed). Outstanding loans are counted so leaks show up.
#[derive(Debug, Clone)]
pub struct AssetTable {
    assets: HashMap<(AudioFileId, LanguageCode), (Arc<[u8]>, AudioFormat)>,
    fallback: Option<LanguageCode>,
    outstanding: usize,
}

impl Default for AssetTable {
    fn default() -> Self {
        AssetTable::new()
    }
}

impl AssetTable {
    /// Empty table with English fallback
    pub fn new() -> Self {
        AssetTable {
            assets: HashMap::new(),
            fallback: Some(LanguageCode::English),
            outstanding: 0,
        }
    }

    /// Change or disable the fallback language
    pub fn with_fallback(mut self, fallback: Option<LanguageCode>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Add or replace one asset
    pub fn insert(
        &mut self,
        file: AudioFileId,
        language: LanguageCode,
        data: impl Into<Arc<[u8]>>,
        format: AudioFormat,
    ) {
        self.assets.insert((file, language), (data.into(), format));
    }

    /// Builder form of [`AssetTable::insert`]
    pub fn with_asset(
        mut self,
        file: AudioFileId,
        language: LanguageCode,
        data: impl Into<Arc<[u8]>>,
        format: AudioFormat,
    ) -> Self {
        self.insert(file, language, data, format);
        self
    }

    /// Whether an asset exists for exactly this language
    pub fn contains(&self, file: AudioFileId, language: LanguageCode) -> bool {
        self.assets.contains_key(&(file, language))
    }

    /// Number of stored assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Buffers lent and not yet released
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    fn lookup(&self, file: AudioFileId, language: LanguageCode) -> Option<AudioBuffer> {
        self.assets
            .get(&(file, language))
            .map(|(data, format)| AudioBuffer::new(file, language, Arc::clone(data), *format))
    }
}

impl AudioAssetProvider for AssetTable {
    fn acquire(
        &mut self,
        file: AudioFileId,
        language: LanguageCode,
    ) -> Result<AudioBuffer, ProviderError> {
        let buffer = match self.lookup(file, language) {
            Some(buffer) => buffer,
            None => {
                let fallback = self
                    .fallback
                    .filter(|fallback| *fallback != language)
                    .and_then(|fallback| self.lookup(file, fallback))
                    .ok_or(ProviderError::NotFound { file, language })?;
                tracing::debug!(%file, %language, fallback = %fallback.language(), "using fallback language");
                fallback
            }
        };

        if buffer.data().is_empty() {
            return Err(ProviderError::InvalidData {
                file,
                reason: "empty buffer".into(),
            });
        }

        self.outstanding += 1;
        Ok(buffer)
    }

    fn release(&mut self, buffer: AudioBuffer) -> Result<(), ProviderError> {
        let owned = self
            .assets
            .get(&(buffer.file(), buffer.language()))
            .is_some_and(|(data, _)| Arc::ptr_eq(data, &buffer.data));
        if !owned || self.outstanding == 0 {
            return Err(ProviderError::UnknownBuffer { file: buffer.file() });
        }
        self.outstanding -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AssetTable {
        AssetTable::new()
            .with_asset(AudioFileId::WELCOME, LanguageCode::English, vec![1u8, 2], AudioFormat::signal())
            .with_asset(AudioFileId::WELCOME, LanguageCode::German, vec![3u8, 4], AudioFormat::signal())
            .with_asset(AudioFileId::WINDOWS, LanguageCode::English, vec![5u8, 6], AudioFormat::signal())
    }

    #[test]
    fn test_exact_language_preferred() {
        let mut table = table();
        let buffer = table.acquire(AudioFileId::WELCOME, LanguageCode::German).unwrap();
        assert_eq!(buffer.data(), &[3, 4]);
        assert_eq!(buffer.language(), LanguageCode::German);
    }

    #[test]
    fn test_fallback_to_english() {
        let mut table = table();
        let buffer = table.acquire(AudioFileId::WINDOWS, LanguageCode::German).unwrap();
        assert_eq!(buffer.language(), LanguageCode::English);
    }

    #[test]
    fn test_fallback_disabled() {
        let mut table = table().with_fallback(None);
        let err = table.acquire(AudioFileId::WINDOWS, LanguageCode::German).unwrap_err();
        assert_eq!(
            err,
            ProviderError::NotFound {
                file: AudioFileId::WINDOWS,
                language: LanguageCode::German
            }
        );
    }

    #[test]
    fn test_loans_are_counted() {
        let mut table = table();
        let first = table.acquire(AudioFileId::WELCOME, LanguageCode::English).unwrap();
        let second = table.acquire(AudioFileId::WINDOWS, LanguageCode::English).unwrap();
        assert_eq!(table.outstanding(), 2);

        table.release(first).unwrap();
        table.release(second).unwrap();
        assert_eq!(table.outstanding(), 0);
    }

    #[test]
    fn test_foreign_buffer_rejected() {
        let mut table = table();
        let foreign = AudioBuffer::new(AudioFileId::WELCOME, LanguageCode::English, vec![1u8, 2], AudioFormat::signal());
        assert!(matches!(table.release(foreign), Err(ProviderError::UnknownBuffer { .. })));
    }

    #[test]
    fn test_empty_asset_is_invalid() {
        let mut table = AssetTable::new().with_asset(AudioFileId::DEFAULT, LanguageCode::English, Vec::<u8>::new(), AudioFormat::signal());
        assert!(matches!(
            table.acquire(AudioFileId::DEFAULT, LanguageCode::English),
            Err(ProviderError::InvalidData { .. })
        ));
        assert_eq!(table.outstanding(), 0);
    }
}
