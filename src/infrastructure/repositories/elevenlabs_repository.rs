use async_trait::async_trait;
use serde_json::json;

use super::synthesis_repository::{SynthesisRepository, VoiceSettings};

const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";
const DEFAULT_STABILITY: f32 = 0.4;
const DEFAULT_SIMILARITY_BOOST: f32 = 0.75;

/// ElevenLabs implementation of the synthesis repository
pub struct ElevenLabsRepository {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ElevenLabsRepository {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl SynthesisRepository for ElevenLabsRepository {
    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, voice_id.trim());

        let body = json!({
            "text": text,
            "model_id": DEFAULT_MODEL_ID,
            "voice_settings": {
                "stability": settings.stability.unwrap_or(DEFAULT_STABILITY),
                "similarity_boost": settings.similarity_boost.unwrap_or(DEFAULT_SIMILARITY_BOOST),
            },
        });

        tracing::info!(
            voice_id = %voice_id,
            text_length = text.len(),
            model_id = DEFAULT_MODEL_ID,
            "Calling ElevenLabs text-to-speech"
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("ElevenLabs request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                detail = %detail,
                voice_id = %voice_id,
                "ElevenLabs text-to-speech failed"
            );
            return Err(format!("ElevenLabs TTS failed ({}): {}", status, detail));
        }

        let audio_bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read ElevenLabs audio stream: {}", e))?
            .to_vec();

        tracing::info!(
            provider = "elevenlabs",
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.len(),
            audio_size_bytes = audio_bytes.len(),
            "Synthesis completed"
        );

        Ok(audio_bytes)
    }

    async fn create_voice(
        &self,
        name: &str,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, String> {
        let url = format!("{}/v1/voices/add", self.base_url);

        let sample = reqwest::multipart::Part::bytes(audio)
            .file_name("voice_sample.m4a")
            .mime_str(mime_type)
            .map_err(|e| format!("Invalid mime type '{}': {}", mime_type, e))?;

        let form = reqwest::multipart::Form::new()
            .text("name", name.to_string())
            .part("files", sample);

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("ElevenLabs request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                detail = %detail,
                "ElevenLabs voice create failed"
            );
            return Err(format!(
                "ElevenLabs voice create failed ({}): {}",
                status, detail
            ));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| format!("Invalid response from ElevenLabs: {}", e))?;

        let voice_id = payload
            .get("voice_id")
            .and_then(|v| v.as_str())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "Invalid response from ElevenLabs: missing voice_id".to_string())?;

        tracing::info!(voice_id = %voice_id, "Provider voice created");

        Ok(voice_id)
    }
}
