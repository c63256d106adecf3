//! Service and dialogue configuration

use crate::catalog::Catalog;
use crate::locale::Language;
use std::time::Duration;

pub const DEFAULT_AUDIO_BASE_URL: &str =
    "https://raw.githubusercontent.com/debdip4/agrikartwhatsappbot/main/Audio_files";

/// Exact length of an Indian postal pincode
pub const PINCODE_LEN: usize = 6;

/// Process configuration, read from the environment
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub backend_base_url: String,
    /// WhatsApp Cloud API bearer token
    pub access_token: Option<String>,
    /// Token echoed back during webhook verification
    pub verify_token: Option<String>,
    pub phone_number_id: Option<String>,
    pub audio_base_url: String,
    pub agmarknet_url: Option<String>,
    pub port: u16,
    pub price_lookup_timeout: Duration,
    pub registry_timeout: Duration,
    /// How long an identity's inbox worker waits before exiting
    pub inbox_idle_timeout: Duration,
}

impl BotConfig {
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        let secs = |key: &str, default: u64| {
            Duration::from_secs(
                std::env::var(key)
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default),
            )
        };

        Self {
            backend_base_url: non_empty("BACKEND_API_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8000".to_string()),
            access_token: non_empty("ACCESS_TOKEN"),
            verify_token: non_empty("VERIFY_TOKEN"),
            phone_number_id: non_empty("PHONE_NUMBER_ID"),
            audio_base_url: non_empty("PUBLIC_AUDIO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_AUDIO_BASE_URL.to_string()),
            agmarknet_url: non_empty("AGMARKNET_SEARCH_URL"),
            port: std::env::var("AGRIKART_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            price_lookup_timeout: secs("PRICE_LOOKUP_TIMEOUT_SECS", 45),
            registry_timeout: secs("REGISTRY_TIMEOUT_SECS", 15),
            inbox_idle_timeout: secs("INBOX_IDLE_SECS", 300),
        }
    }
}

/// Keywords, grouped by the language they belong to
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    pub en: Vec<String>,
    pub hi: Vec<String>,
}

impl KeywordSet {
    pub fn new(en: &[&str], hi: &[&str]) -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_lowercase()).collect();
        Self {
            en: owned(en),
            hi: owned(hi),
        }
    }

    /// `folded` must already be trimmed and lowercased
    pub fn matches(&self, folded: &str) -> bool {
        self.en.iter().chain(&self.hi).any(|k| k == folded)
    }
}

/// Values the dialogue matches user input against
#[derive(Debug, Clone)]
pub struct DialogueConfig {
    pub greetings: KeywordSet,
    pub affirmatives: KeywordSet,
    pub catalog: Catalog,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            greetings: KeywordSet::new(
                &["hi", "hello", "hey", "start", "namaste"],
                &["नमस्ते", "हाय", "हेलो"],
            ),
            affirmatives: KeywordSet::new(
                &["yes", "y", "yeah", "haan", "ha"],
                &["हाँ", "हां", "जी"],
            ),
            catalog: Catalog::default(),
        }
    }
}

impl DialogueConfig {
    pub fn is_greeting(&self, folded: &str) -> bool {
        self.greetings.matches(folded)
    }

    pub fn is_affirmative(&self, folded: &str) -> bool {
        self.affirmatives.matches(folded)
    }

    /// Resolve a reply to the language menu
    pub fn parse_language(folded: &str) -> Option<Language> {
        match folded {
            "1" | "english" | "en" | "eng" => Some(Language::En),
            "2" | "hindi" | "हिंदी" | "हिन्दी" => Some(Language::Hi),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greetings_match_both_languages() {
        let config = DialogueConfig::default();
        assert!(config.is_greeting("hi"));
        assert!(config.is_greeting("नमस्ते"));
        assert!(!config.is_greeting("hii there"));
    }

    #[test]
    fn test_affirmatives() {
        let config = DialogueConfig::default();
        assert!(config.is_affirmative("yes"));
        assert!(config.is_affirmative("हाँ"));
        assert!(!config.is_affirmative("no"));
    }

    #[test]
    fn test_language_menu_replies() {
        assert_eq!(DialogueConfig::parse_language("1"), Some(Language::En));
        assert_eq!(DialogueConfig::parse_language("हिंदी"), Some(Language::Hi));
        assert_eq!(DialogueConfig::parse_language("3"), None);
    }

    #[test]
    fn test_keyword_set_lowercases_entries() {
        let set = KeywordSet::new(&["YES"], &[]);
        assert!(set.matches("yes"));
    }
}
