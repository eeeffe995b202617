use async_trait::async_trait;

/// Voice-tuning parameters forwarded to the provider. Unset fields fall back
/// to the provider defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VoiceSettings {
    pub stability: Option<f32>,
    pub similarity_boost: Option<f32>,
}

/// Repository for speech synthesis operations.
/// Abstracts the underlying provider (ElevenLabs, or anything with the same
/// voice-id + text contract).
///
/// Implementations are responsible for:
/// - Provider-specific request/response formats
/// - Surfacing provider error detail as the error string
#[async_trait]
pub trait SynthesisRepository: Send + Sync {
    /// Synthesize text with a specific voice.
    ///
    /// Returns encoded audio ready for storage (MP3 format).
    ///
    /// # Errors
    /// Returns error if the provider call fails or is rejected
    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, String>;

    /// Create a new provider voice from a recorded sample.
    ///
    /// Returns the provider's id for the created voice.
    async fn create_voice(
        &self,
        name: &str,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, String>;
}
