//! Voice-over audio file identifiers
//!
//! Ids fall into two ranges: single-character cues (digits `0-9` followed by
//! letters `A-Z`) and named phrases. Both live below a sentinel that rejects
//! anything out of range.

use crate::error::LayoutError;
use std::fmt;

/// Number of digit cues
pub const DIGIT_COUNT: u32 = 10;

/// Number of letter cues
pub const LETTER_COUNT: u32 = 26;

/// Numbering of the file id space, checked once when an engine is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdLayout {
    /// Id of digit `0`
    pub index_base: u32,
    /// Id of letter `A`
    pub alphabetical_base: u32,
    /// Id of letter `Z`
    pub index_max: u32,
    /// First phrase id
    pub phrase_base: u32,
    /// One past the last phrase id
    pub max: u32,
}

impl FileIdLayout {
    /// The layout used by [`AudioFileId`]
    pub const CANONICAL: FileIdLayout = FileIdLayout {
        index_base: 0x1000,
        alphabetical_base: 0x100A,
        index_max: 0x1023,
        phrase_base: 0x1030,
        max: 0x104F,
    };

    /// Reject layouts where the alphanumeric range is not exactly 36 contiguous ids
    pub fn validate(&self) -> Result<(), LayoutError> {
        let expected = DIGIT_COUNT + LETTER_COUNT;
        let found = self
            .index_max
            .checked_sub(self.index_base)
            .map_or(0, |span| span + 1);
        if found != expected {
            return Err(LayoutError::AlphanumericCount { found, expected });
        }

        let letters_at = self.index_base + DIGIT_COUNT;
        if self.alphabetical_base != letters_at {
            return Err(LayoutError::LetterOffset {
                found: self.alphabetical_base,
                expected: letters_at,
            });
        }

        if self.phrase_base <= self.index_max || self.max <= self.phrase_base {
            return Err(LayoutError::PhraseRange {
                start: self.phrase_base,
                end: self.max,
            });
        }

        Ok(())
    }
}

/// What an [`AudioFileId`] speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileIdKind {
    /// A single digit `0-9`
    Digit(u8),
    /// A single uppercase letter
    Letter(char),
    /// A named phrase
    Phrase,
}

/// Identifier of a spoken phrase or single-character cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AudioFileId(u32);

macro_rules! phrases {
    ($($name:ident = $value:literal => $label:literal),+ $(,)?) => {
        impl AudioFileId {
            $(
                #[doc = concat!("\"", $label, "\" phrase")]
                pub const $name: AudioFileId = AudioFileId($value);
            )+

            const PHRASES: &'static [(AudioFileId, &'static str)] = &[
                $((AudioFileId::$name, $label)),+
            ];
        }
    };
}

phrases! {
    ABORT_TIMEOUT = 0x1030 => "AbortTimeout",
    CHOOSE_OS = 0x1031 => "ChooseOS",
    DEFAULT = 0x1032 => "Default",
    DISK_IMAGE = 0x1033 => "DiskImage",
    ENTER_PASSWORD = 0x1034 => "EnterPassword",
    EXECUTION_FAILURE = 0x1035 => "ExecutionFailure",
    EXECUTION_SUCCESSFUL = 0x1036 => "ExecutionSuccessful",
    EXTERNAL = 0x1037 => "External",
    EXTERNAL_OS = 0x1038 => "ExternalOS",
    EXTERNAL_TOOL = 0x1039 => "ExternalTool",
    LOADING = 0x103A => "Loading",
    MAC_OS = 0x103B => "macOS",
    MAC_OS_RECOVERY = 0x103C => "macOS_Recovery",
    MAC_OS_TIME_MACHINE = 0x103D => "macOS_TimeMachine",
    MAC_OS_UPDATE_FW = 0x103E => "macOS_UpdateFw",
    OTHER_OS = 0x103F => "OtherOS",
    PASSWORD_ACCEPTED = 0x1040 => "PasswordAccepted",
    PASSWORD_INCORRECT = 0x1041 => "PasswordIncorrect",
    PASSWORD_RETRY_LIMIT = 0x1042 => "PasswordRetryLimit",
    RELOADING = 0x1043 => "Reloading",
    RESET_NVRAM = 0x1044 => "ResetNVRAM",
    RESTART = 0x1045 => "Restart",
    SELECTED = 0x1046 => "Selected",
    SHOW_AUXILIARY = 0x1047 => "ShowAuxiliary",
    SHUT_DOWN = 0x1048 => "ShutDown",
    SIP_IS_DISABLED = 0x1049 => "SIPIsDisabled",
    SIP_IS_ENABLED = 0x104A => "SIPIsEnabled",
    TIMEOUT = 0x104B => "Timeout",
    UEFI_SHELL = 0x104C => "UEFI_Shell",
    WELCOME = 0x104D => "Welcome",
    WINDOWS = 0x104E => "Windows",
}

impl AudioFileId {
    const LAYOUT: FileIdLayout = FileIdLayout::CANONICAL;

    /// Validate a raw id, rejecting gaps between the ranges and the sentinel
    pub fn new(raw: u32) -> Option<Self> {
        let layout = Self::LAYOUT;
        let alphanumeric = (layout.index_base..=layout.index_max).contains(&raw);
        let phrase = (layout.phrase_base..layout.max).contains(&raw);
        (alphanumeric || phrase).then_some(AudioFileId(raw))
    }

    /// Cue for a single digit
    pub fn digit(value: u8) -> Option<Self> {
        (u32::from(value) < DIGIT_COUNT).then(|| AudioFileId(Self::LAYOUT.index_base + u32::from(value)))
    }

    /// Cue for a single ASCII letter, case-insensitive
    pub fn letter(ch: char) -> Option<Self> {
        let upper = ch.to_ascii_uppercase();
        upper
            .is_ascii_uppercase()
            .then(|| AudioFileId(Self::LAYOUT.alphabetical_base + (upper as u32 - 'A' as u32)))
    }

    /// Cue for an ASCII digit or letter
    pub fn from_char(ch: char) -> Option<Self> {
        match ch.to_digit(10) {
            Some(value) => Self::digit(value as u8),
            None => Self::letter(ch),
        }
    }

    /// Raw protocol value
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Classify the id
    pub fn kind(self) -> FileIdKind {
        let layout = Self::LAYOUT;
        if self.0 < layout.alphabetical_base {
            FileIdKind::Digit((self.0 - layout.index_base) as u8)
        } else if self.0 <= layout.index_max {
            let offset = (self.0 - layout.alphabetical_base) as u8;
            FileIdKind::Letter((b'A' + offset) as char)
        } else {
            FileIdKind::Phrase
        }
    }

    /// Asset name used for logging and dumped file names
    pub fn name(self) -> String {
        match self.kind() {
            FileIdKind::Digit(value) => value.to_string(),
            FileIdKind::Letter(ch) => ch.to_string(),
            FileIdKind::Phrase => Self::PHRASES
                .iter()
                .find(|(id, _)| *id == self)
                .map(|(_, label)| (*label).to_string())
                .unwrap_or_else(|| format!("{:#06x}", self.0)),
        }
    }

    /// Every valid id in ascending order
    pub fn all() -> impl Iterator<Item = AudioFileId> {
        let layout = Self::LAYOUT;
        (layout.index_base..=layout.index_max)
            .chain(layout.phrase_base..layout.max)
            .map(AudioFileId)
    }
}

impl fmt::Display for AudioFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#06x})", self.name(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_layout_is_valid() {
        assert_eq!(FileIdLayout::CANONICAL.validate(), Ok(()));
    }

    #[test]
    fn test_short_alphanumeric_range_rejected() {
        let layout = FileIdLayout {
            index_max: 0x1022,
            ..FileIdLayout::CANONICAL
        };
        assert_eq!(
            layout.validate(),
            Err(LayoutError::AlphanumericCount {
                found: 35,
                expected: 36
            })
        );
    }

    #[test]
    fn test_misplaced_letters_rejected() {
        let layout = FileIdLayout {
            alphabetical_base: 0x100B,
            ..FileIdLayout::CANONICAL
        };
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::LetterOffset { .. })
        ));
    }

    #[test]
    fn test_overlapping_phrases_rejected() {
        let layout = FileIdLayout {
            phrase_base: 0x1020,
            ..FileIdLayout::CANONICAL
        };
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::PhraseRange { .. })
        ));
    }

    #[test]
    fn test_alphanumeric_range_is_contiguous() {
        let ids: Vec<u32> = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ"
            .chars()
            .map(|ch| AudioFileId::from_char(ch).unwrap().raw())
            .collect();
        assert_eq!(ids.len(), 36);
        assert!(ids.windows(2).all(|pair| pair[1] == pair[0] + 1));
        assert_eq!(ids[0], 0x1000);
        assert_eq!(ids[35], 0x1023);
    }

    #[test]
    fn test_lowercase_letters_map_to_uppercase() {
        assert_eq!(AudioFileId::from_char('q'), AudioFileId::from_char('Q'));
        assert_eq!(AudioFileId::from_char('-'), None);
    }

    #[test]
    fn test_new_rejects_gap_and_sentinel() {
        assert!(AudioFileId::new(0x1024).is_none());
        assert!(AudioFileId::new(0x104F).is_none());
        assert!(AudioFileId::new(0x0FFF).is_none());
        assert_eq!(AudioFileId::new(0x1031), Some(AudioFileId::CHOOSE_OS));
    }

    #[test]
    fn test_kind_and_name() {
        assert_eq!(AudioFileId::from_char('7').unwrap().kind(), FileIdKind::Digit(7));
        assert_eq!(AudioFileId::from_char('z').unwrap().kind(), FileIdKind::Letter('Z'));
        assert_eq!(AudioFileId::WINDOWS.kind(), FileIdKind::Phrase);
        assert_eq!(AudioFileId::WINDOWS.name(), "Windows");
        assert_eq!(AudioFileId::CHOOSE_OS.to_string(), "ChooseOS (0x1031)");
    }

    #[test]
    fn test_all_covers_both_ranges() {
        let all: Vec<AudioFileId> = AudioFileId::all().collect();
        assert_eq!(all.len(), 36 + 31);
        assert_eq!(all.first(), AudioFileId::digit(0).as_ref());
        assert_eq!(all.last(), Some(&AudioFileId::WINDOWS));
    }
}
