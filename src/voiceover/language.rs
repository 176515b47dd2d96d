//! Voice-over language codes
//!
//! The engine hands the language to the asset provider untouched; only the
//! provider decides what a code means for asset lookup.

use crate::error::VoiceOverError;
use std::fmt;
use std::str::FromStr;

macro_rules! languages {
    ($($(#[$meta:meta])* $variant:ident => $code:literal),+ $(,)?) => {
        /// Locale selector passed to the asset provider
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum LanguageCode {
            $(
                #[doc = concat!("`", $code, "`")]
                $(#[$meta])*
                $variant,
            )+
        }

        impl LanguageCode {
            /// Every supported language
            pub const ALL: &'static [LanguageCode] = &[$(LanguageCode::$variant),+];

            /// Two-letter code
            pub fn as_str(self) -> &'static str {
                match self {
                    $(LanguageCode::$variant => $code),+
                }
            }
        }
    };
}

languages! {
    Arabic => "ar",
    Catalan => "ca",
    Czech => "cs",
    Danish => "da",
    German => "de",
    Greek => "el",
    #[default]
    English => "en",
    Spanish => "es",
    Finnish => "fi",
    French => "fr",
    Hebrew => "he",
    Hindi => "hi",
    Croatian => "hr",
    Hungarian => "hu",
    Indonesian => "id",
    Italian => "it",
    Japanese => "ja",
    Korean => "ko",
    Malay => "ms",
    Norwegian => "nb",
    Dutch => "nl",
    Polish => "pl",
    Portuguese => "pt",
    Romanian => "ro",
    Russian => "ru",
    Slovak => "sk",
    Swedish => "sv",
    Thai => "th",
    Turkish => "tr",
    Ukrainian => "uk",
    Vietnamese => "vi",
    Chinese => "zh",
}

impl LanguageCode {
    /// Resolve an optional locale string, defaulting to English when absent
    ///
    /// Unknown locales fall back to English as well; the fallback is logged.
    pub fn from_locale(locale: Option<&str>) -> Self {
        match locale {
            None => LanguageCode::default(),
            Some(text) => text.parse().unwrap_or_else(|_| {
                tracing::warn!(locale = text, "unsupported voice-over language, using English");
                LanguageCode::default()
            }),
        }
    }
}

impl FromStr for LanguageCode {
    type Err = VoiceOverError;

    /// Parses `"ru"`, `"pt-BR"`, `"en_US"` and similar; only the primary subtag matters
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s
            .split(['-', '_', ':'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        // Legacy Norwegian code
        let primary = if primary == "no" { "nb".to_string() } else { primary };

        LanguageCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == primary)
            .ok_or_else(|| VoiceOverError::Config(format!("unknown voice-over language '{s}'")))
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
