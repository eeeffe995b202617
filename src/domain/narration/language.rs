use serde::{Deserialize, Serialize};

/// Languages the narration catalog ships voices for. A closed set supplied by
/// the client, not detected from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrationLang {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "te")]
    Telugu,
}

impl NarrationLang {
    /// Get the ISO 639-1 code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            NarrationLang::English => "en",
            NarrationLang::Telugu => "te",
        }
    }

    /// Parse a client-supplied language code, tolerating case and whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "en" => Some(NarrationLang::English),
            "te" => Some(NarrationLang::Telugu),
            _ => None,
        }
    }
}

impl std::fmt::Display for NarrationLang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
