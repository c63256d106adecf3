//! WhatsApp Cloud API transport

mod client;
mod payload;

pub use client::WhatsAppClient;
pub use payload::WebhookPayload;

use crate::locale::{AudioClip, Language};

/// Resolves audio cue keys to public clip URLs
#[derive(Debug, Clone)]
pub struct AudioCatalog {
    base_url: String,
}

impl AudioCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// `{base}/{lang}_{key}.mp3`, or `{base}/{key}.mp3` for clips shared by
    /// both languages
    pub fn resolve(&self, clip: AudioClip, language: Language) -> String {
        let base = self.base_url.trim_end_matches('/');
        if clip.is_localized() {
            format!("{base}/{}_{}.mp3", language.code(), clip.key())
        } else {
            format!("{base}/{}.mp3", clip.key())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_localized_clip() {
        let catalog = AudioCatalog::new("https://cdn.example/audio/");
        assert_eq!(
            catalog.resolve(AudioClip::AskLoginPassword, Language::Hi),
            "https://cdn.example/audio/hi_ask_loginpassword.mp3"
        );
        assert_eq!(
            catalog.resolve(AudioClip::AskPincode, Language::En),
            "https://cdn.example/audio/en_ask_pincode.mp3"
        );
    }

    #[test]
    fn test_welcome_clip_is_shared() {
        let catalog = AudioCatalog::new("https://cdn.example/audio");
        assert_eq!(
            catalog.resolve(AudioClip::Welcome, Language::Hi),
            "https://cdn.example/audio/welcome.mp3"
        );
    }
}
