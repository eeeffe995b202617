use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use super::dto::{CreateVoiceRequest, CreateVoiceResponse};
use crate::domain::admission::{Admission, RateLimiter};
use crate::error::{AppError, AppResult};
use crate::infrastructure::records::RecordStore;
use crate::infrastructure::repositories::SynthesisRepository;

const MIN_SAMPLE_BYTES: usize = 200;
const MAX_SAMPLE_BYTES: usize = 12 * 1024 * 1024;
const DEFAULT_VOICE_NAME: &str = "Parent Voice";
const RATE_LIMIT_ACTION: &str = "create_voice";

/// Settings for voice creation admission.
#[derive(Debug, Clone)]
pub struct VoiceCreateSettings {
    pub rate_limit_window: Duration,
    pub rate_limit_max: u32,
}

pub struct VoiceService {
    store: Arc<dyn RecordStore>,
    limiter: RateLimiter,
    synthesis_repo: Arc<dyn SynthesisRepository>,
    settings: VoiceCreateSettings,
}

impl VoiceService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        synthesis_repo: Arc<dyn SynthesisRepository>,
        settings: VoiceCreateSettings,
    ) -> Self {
        let limiter = RateLimiter::new(store.clone());
        Self {
            store,
            limiter,
            synthesis_repo,
            settings,
        }
    }
}

#[async_trait::async_trait]
pub trait VoiceServiceApi: Send + Sync {
    /// Create a provider voice from a caller-recorded sample and remember it
    /// as the caller's narration voice.
    async fn create_voice(
        &self,
        user_id: &str,
        request: CreateVoiceRequest,
    ) -> AppResult<CreateVoiceResponse>;
}

#[async_trait::async_trait]
impl VoiceServiceApi for VoiceService {
    async fn create_voice(
        &self,
        user_id: &str,
        request: CreateVoiceRequest,
    ) -> AppResult<CreateVoiceResponse> {
        match self
            .limiter
            .admit(
                user_id,
                RATE_LIMIT_ACTION,
                self.settings.rate_limit_window,
                self.settings.rate_limit_max,
            )
            .await?
        {
            Admission::Allowed => {}
            Admission::Rejected { retry_after_ms } => {
                return Err(AppError::RateLimitExceeded(format!(
                    "Too many voice creations, retry in {}ms",
                    retry_after_ms
                )));
            }
        }

        if request.audio_base64.trim().is_empty() {
            return Err(AppError::BadRequest("Missing audioBase64".to_string()));
        }
        let mime_type = request.mime_type.trim().to_string();
        if mime_type.is_empty() {
            return Err(AppError::BadRequest("Missing mimeType".to_string()));
        }

        let audio = BASE64
            .decode(request.audio_base64.trim())
            .map_err(|_| AppError::BadRequest("Invalid audioBase64".to_string()))?;

        tracing::info!(
            user_id = %user_id,
            sample_bytes = audio.len(),
            mime_type = %mime_type,
            "Voice create request"
        );

        if audio.len() < MIN_SAMPLE_BYTES {
            return Err(AppError::BadRequest("Audio too short".to_string()));
        }
        if audio.len() > MAX_SAMPLE_BYTES {
            return Err(AppError::PayloadTooLarge(
                "Audio too large (max 12MB)".to_string(),
            ));
        }

        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_VOICE_NAME);

        let voice_id = self
            .synthesis_repo
            .create_voice(name, audio, &mime_type)
            .await
            .map_err(AppError::ExternalService)?;

        // Remember the voice as the caller's narration default
        let settings_key = format!("settings:{}", user_id);
        self.store
            .merge(
                &settings_key,
                json!({
                    "voice_id": voice_id,
                    "updated_at": Utc::now().timestamp_millis(),
                }),
            )
            .await?;

        tracing::info!(user_id = %user_id, voice_id = %voice_id, "Voice created and saved");

        Ok(CreateVoiceResponse { voice_id })
    }
}
