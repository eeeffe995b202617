use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    domain::narration::{
        GenerateNarrationRequest, NarrationOutcome, NarrationScope, NarrationService,
        NarrationServiceApi,
    },
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

pub struct NarrationController {
    narration_service: Arc<NarrationService>,
}

impl NarrationController {
    pub fn new(narration_service: Arc<NarrationService>) -> Self {
        Self { narration_service }
    }

    /// POST /api/narration/generate - shared, content-addressed narration
    pub async fn generate(
        State(controller): State<Arc<NarrationController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<GenerateNarrationRequest>,
    ) -> AppResult<Response> {
        let outcome = controller
            .narration_service
            .generate(&auth_user.user_id, NarrationScope::Shared, request)
            .await
            .map_err(AppError::from)?;

        Ok(respond(outcome))
    }

    /// POST /api/narration/generate-personal - narration keyed per caller
    pub async fn generate_personal(
        State(controller): State<Arc<NarrationController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<GenerateNarrationRequest>,
    ) -> AppResult<Response> {
        let outcome = controller
            .narration_service
            .generate(&auth_user.user_id, NarrationScope::PerUser, request)
            .await
            .map_err(AppError::from)?;

        Ok(respond(outcome))
    }
}

/// Ready is a plain 200; Generating is a retry instruction, not an error,
/// surfaced as 202 Accepted.
fn respond(outcome: NarrationOutcome) -> Response {
    let status = match &outcome {
        NarrationOutcome::Ready { .. } => StatusCode::OK,
        NarrationOutcome::Generating { .. } => StatusCode::ACCEPTED,
    };
    (status, Json(outcome)).into_response()
}
