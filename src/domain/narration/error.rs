use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum NarrationServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("text too long: {0}")]
    TooLong(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("contended record: {0}")]
    Conflict(String),
    #[error("synthesis provider failed: {0}")]
    Provider(String),
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl From<NarrationServiceError> for AppError {
    fn from(err: NarrationServiceError) -> Self {
        match err {
            NarrationServiceError::Invalid(msg) => AppError::BadRequest(msg),
            NarrationServiceError::TooLong(msg) => AppError::PayloadTooLarge(msg),
            NarrationServiceError::RateLimited(msg) => AppError::RateLimitExceeded(msg),
            NarrationServiceError::Conflict(msg) => AppError::Conflict(msg),
            NarrationServiceError::Provider(msg) => AppError::ExternalService(msg),
            NarrationServiceError::Dependency(msg) => AppError::Internal(msg),
        }
    }
}
