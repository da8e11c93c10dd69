use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use chapterdesk_types::api::ActionResponse;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid request")]
    InvalidRequest,

    #[error("Invalid action")]
    InvalidAction,

    #[error("{0} is required")]
    MissingField(&'static str),

    /// Same message for unknown user and wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid or expired session")]
    InvalidSession,

    #[error("Not allowed")]
    Forbidden,

    #[error("Username already exists")]
    Conflict,

    #[error("Not found")]
    NotFound,

    #[error("Server error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Status used by the REST routes. The action endpoint answers 200 for
    /// everything but `Internal`.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest | Self::InvalidAction | Self::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCredentials | Self::InvalidSession => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Conflict => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Failure envelope. Internal detail never leaves the process.
    pub fn envelope(&self) -> ActionResponse {
        ActionResponse::failure(self.to_string())
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    pub fn log(&self) {
        if let Self::Internal(e) = self {
            error!("Backend fault: {:#}", e);
        }
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(anyhow::anyhow!("spawn_blocking join error: {}", e))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.envelope())).into_response()
    }
}
