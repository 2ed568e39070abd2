//! Language negotiation for user-facing messages

use serde::{Deserialize, Serialize};

/// Languages the API can answer in. Brazilian Portuguese is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "pt-br")]
    Portuguese,
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Pick the highest-weighted supported language from an
    /// `Accept-Language` header value, e.g. `en-US,en;q=0.9,pt;q=0.8`
    pub fn from_accept_language(header: &str) -> Self {
        let mut preferred = Language::default();
        let mut best_quality = 0.0_f32;

        for entry in header.split(',') {
            let mut parts = entry.trim().split(';');
            let tag = parts.next().unwrap_or("").trim().to_lowercase();
            let quality = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);

            let candidate = if tag.starts_with("pt") {
                Some(Language::Portuguese)
            } else if tag.starts_with("en") {
                Some(Language::English)
            } else {
                None
            };

            if let Some(language) = candidate {
                if quality > best_quality {
                    preferred = language;
                    best_quality = quality;
                }
            }
        }

        preferred
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Portuguese => "pt-br",
            Language::English => "en",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
