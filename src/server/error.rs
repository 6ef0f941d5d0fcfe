use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    /// The query string could not be decoded.
    MalformedQuery(String),
    /// A query parameter was present but could not be interpreted.
    InvalidParameter(String),
    /// The upstream call failed or returned an unusable body.
    Upstream(anyhow::Error),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::MalformedQuery(msg) => write!(f, "{}", msg),
            ApiError::InvalidParameter(msg) => write!(f, "{}", msg),
            ApiError::Upstream(e) => write!(f, "Upstream error: {:#}", e),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Upstream(e)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedQuery(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidParameter(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => {
                error!(error = %self, "Upstream request failed");
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
