//! Voice-over vocabulary: what can be spoken, in which language, how loud

mod file_id;
mod language;
mod volume;

pub use file_id::{AudioFileId, FileIdKind, FileIdLayout, DIGIT_COUNT, LETTER_COUNT};
pub use language::LanguageCode;
pub use volume::{
    VolumeLevel, DEFAULT_VOLUME_LEVEL, MAX_AMPLIFIER, SYSTEM_VOLUME_MASK, SYSTEM_VOLUME_MUTED,
};
