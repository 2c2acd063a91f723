use axum::{
    Json,
    extract::{
        Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;
use pixgram_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Extractors whose rejections render as `ApiError`.
pub type ApiJson<T> = WithRejection<Json<T>, ApiError>;
pub type ApiPath<T> = WithRejection<Path<T>, ApiError>;
pub type ApiQuery<T> = WithRejection<Query<T>, ApiError>;

/// Handler error. Rendered as `{ "detail": ... }` with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("you do not have permission to perform this action")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => Self::NotFound(what),
            // Duplicate unique rows are client validation errors, same as
            // data-model violations.
            DbError::Conflict(msg) | DbError::Invalid(msg) => Self::BadRequest(msg),
            other => {
                error!("Database error: {}", other);
                Self::Internal
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        error!("spawn_blocking join error: {}", err);
        Self::Internal
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}
