//! WAV dump of provider assets

use crate::codec::decode_pcm;
use crate::error::{ProviderError, Result};
use crate::provider::{AudioAssetProvider, AudioBuffer, BufferOwnership};
use crate::voiceover::{AudioFileId, LanguageCode};
use std::path::{Path, PathBuf};

/// What [`dump_assets`] wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpSummary {
    /// Files written, in id order
    pub written: Vec<(AudioFileId, PathBuf)>,
    /// Ids the provider could not supply
    pub missing: Vec<AudioFileId>,
}

/// Write every asset available for `language` into `dir`
///
/// Files are named `<language>_<asset>.wav` and always hold 16-bit integer
/// samples at the asset's rate and channel count. Missing assets are listed
/// in the summary rather than failing the dump.
///
/// # Examples
///
/// ```no_run
/// use canopy_voice::export::dump_assets;
/// use canopy_voice::provider::AssetTable;
/// use canopy_voice::voiceover::LanguageCode;
///
/// # fn main() -> canopy_voice::Result<()> {
/// let mut table = AssetTable::new();
/// let summary = dump_assets(&mut table, LanguageCode::English, "dump")?;
/// println!("{} written, {} missing", summary.written.len(), summary.missing.len());
/// # Ok(())
/// # }
/// ```
pub fn dump_assets<P: AsRef<Path>>(
    provider: &mut dyn AudioAssetProvider,
    language: LanguageCode,
    dir: P,
) -> Result<DumpSummary> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let retained = provider.ownership() == BufferOwnership::Retained;
    let mut summary = DumpSummary::default();

    for file in AudioFileId::all() {
        let buffer = match provider.acquire(file, language) {
            Ok(buffer) => buffer,
            Err(ProviderError::NotFound { .. }) => {
                summary.missing.push(file);
                continue;
            }
            Err(err) => {
                tracing::warn!(%file, error = %err, "asset could not be dumped");
                summary.missing.push(file);
                continue;
            }
        };

        let path = dir.join(format!("{}_{}.wav", language.as_str(), file.name()));
        let written = write_wav_file(&path, &buffer);
        if !retained {
            provider.release(buffer)?;
        }
        written?;

        tracing::debug!(%file, path = %path.display(), "dumped asset");
        summary.written.push((file, path));
    }

    tracing::info!(
        %language,
        written = summary.written.len(),
        missing = summary.missing.len(),
        "asset dump complete"
    );
    Ok(summary)
}

/// Write one buffer as 16-bit PCM
fn write_wav_file(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let format = buffer.format();
    format.validate()?;
    let spec = hound::WavSpec {
        channels: u16::from(format.channels),
        sample_rate: format.frequency.hz(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| format!("Failed to create WAV file: {}", e))?;

    for sample in decode_pcm(buffer.data(), format.bits) {
        let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| format!("Failed to write sample: {}", e))?;
    }

    writer
        .finalize()
        .map_err(|e| format!("Failed to finalize WAV file: {}", e))?;
    Ok(())
}
