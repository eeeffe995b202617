use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    domain::voice::{CreateVoiceRequest, CreateVoiceResponse, VoiceService, VoiceServiceApi},
    error::AppResult,
    infrastructure::auth::AuthUser,
};

pub struct VoiceController {
    voice_service: Arc<VoiceService>,
}

impl VoiceController {
    pub fn new(voice_service: Arc<VoiceService>) -> Self {
        Self { voice_service }
    }

    /// POST /api/voice/create - create a provider voice from a recorded sample
    pub async fn create(
        State(controller): State<Arc<VoiceController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<CreateVoiceRequest>,
    ) -> AppResult<Json<CreateVoiceResponse>> {
        let response = controller
            .voice_service
            .create_voice(&auth_user.user_id, request)
            .await?;

        Ok(Json(response))
    }
}
