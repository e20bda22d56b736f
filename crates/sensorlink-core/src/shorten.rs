//! Text shortening for the voice box
//!
//! Transcribed speech is usually far longer than the display can show. A
//! [`TextShortener`] reduces it to a short upper-case label before it is
//! encoded as a voice command.

use crate::command::VOICE_MAX_CHARS;
use regex::Regex;
use std::sync::LazyLock;

/// Reduces free text to a display label of bounded length
pub trait TextShortener: Send + Sync {
    /// Shorten `text`. The result holds at most the shortener's limit in characters.
    fn shorten(&self, text: &str) -> String;
}

/// Ordered phrase patterns and the label each one maps to. First match wins.
const INTENTS: &[(&str, &str)] = &[
    // Lights
    (r"turn on.*light", "LIGHTS ON"),
    (r"turn off.*light", "LIGHTS OFF"),
    (r"lights on", "LIGHTS ON"),
    (r"lights off", "LIGHTS OFF"),
    (r"bedroom light", "BED LIGHT"),
    (r"living room light", "LR LIGHT"),
    (r"kitchen light", "KIT LIGHT"),
    // Temperature
    (r"(what('s| is) the|check) temp", "CHECK TEMP"),
    (r"too (hot|warm)", "TOO HOT"),
    (r"too cold", "TOO COLD"),
    (r"set temp", "SET TEMP"),
    // Humidity and moisture
    (r"(what('s| is) the|check) humid", "CHECK HUMID"),
    (r"(what('s| is) the|check) moist", "CHECK MOIST"),
    (r"water.*plant", "WATER PLANT"),
    (r"plant.*dry", "PLANT DRY"),
    // General
    (r"\b(hello|hi|hey)\b", "HELLO"),
    (r"\bthank", "THANKS"),
    (r"\bhelp\b", "HELP"),
    (r"\b(status|report)\b", "STATUS"),
    (r"\b(stop|cancel)\b", "CANCEL"),
    (r"\b(yes|confirm|ok)\b", "OK"),
    (r"\b(no|deny|nope)\b", "NO"),
];

const FILLER_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "please", "could", "would", "can",
    "should", "just", "like", "um", "uh", "ah", "oh", "well", "so", "very", "really", "i", "me",
    "my", "you", "your", "we", "our", "it", "its",
];

static INTENT_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    INTENTS
        .iter()
        .filter_map(|(pattern, label)| match Regex::new(pattern) {
            Ok(re) => Some((re, *label)),
            Err(e) => {
                tracing::error!("Invalid intent pattern {:?}: {}", pattern, e);
                None
            }
        })
        .collect()
});

/// Intent table first, then keyword extraction, then plain truncation
#[derive(Debug, Clone)]
pub struct IntentShortener {
    max_chars: usize,
    max_keywords: usize,
}

impl Default for IntentShortener {
    fn default() -> Self {
        Self {
            max_chars: VOICE_MAX_CHARS,
            max_keywords: 3,
        }
    }
}

impl IntentShortener {
    /// Create a shortener with the given output limit
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            ..Self::default()
        }
    }

    /// Output limit in characters
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Label of the first intent matching `text`, if any
    pub fn match_intent(&self, text: &str) -> Option<&'static str> {
        let lower = text.trim().to_lowercase();
        INTENT_PATTERNS
            .iter()
            .find(|(re, _)| re.is_match(&lower))
            .map(|(_, label)| *label)
    }

    /// First few non-filler words, upper-cased
    pub fn extract_keywords(&self, text: &str) -> String {
        text.to_lowercase()
            .split_whitespace()
            .filter(|w| w.chars().count() > 1 && !FILLER_WORDS.contains(w))
            .take(self.max_keywords)
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    }

    fn truncate(&self, text: &str) -> String {
        text.chars().take(self.max_chars).collect()
    }
}

impl TextShortener for IntentShortener {
    fn shorten(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }

        if let Some(label) = self.match_intent(text) {
            return self.truncate(label);
        }

        let keywords = self.extract_keywords(text);
        if !keywords.is_empty() {
            return self.truncate(&keywords);
        }

        self.truncate(&text.to_uppercase())
    }
}
