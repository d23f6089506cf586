use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scheduling::ServiceError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error("Invalid path parameter: {0}")]
    Path(#[from] PathRejection),
    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),
    #[error("No route for {0}")]
    NoRoute(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Body(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Path(rejection) => rejection.status(),
            AppError::Query(rejection) => rejection.status(),
            AppError::NoRoute(_) => StatusCode::NOT_FOUND,
            AppError::Service(err) => match err {
                ServiceError::Validation { .. } | ServiceError::InvalidReference(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ServiceError::DependencyConflict { .. }
                | ServiceError::DuplicateKey { .. }
                | ServiceError::AlreadySeeded { .. } => StatusCode::CONFLICT,
                ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
                ServiceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Body(_) => "invalid_body",
            AppError::Path(_) => "invalid_path",
            AppError::Query(_) => "invalid_query",
            AppError::NoRoute(_) => "not_found",
            AppError::Service(err) => err.kind(),
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Service(ServiceError::Storage(db_err)) => {
                tracing::error!(error = ?db_err, "Storage error.");
                "An internal storage error occurred".to_string()
            }
            AppError::Service(ServiceError::StoreUnavailable(reason)) => {
                tracing::error!(%reason, "Store unavailable.");
                self.to_string()
            }
            AppError::Service(err) => err.primary_message(),
            AppError::Body(rejection) => rejection.body_text(),
            AppError::Path(rejection) => rejection.body_text(),
            AppError::Query(rejection) => rejection.body_text(),
            AppError::NoRoute(_) => self.to_string(),
        };

        let body = Json(json!({ "error": message, "kind": self.kind() }));
        (status, body).into_response()
    }
}
