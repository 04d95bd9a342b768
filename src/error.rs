use std::collections::HashMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::catalog::CatalogError;
use crate::query::QueryError;
use crate::validation::ValidationErrors;

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationErrors),
    Internal(String),
}

/// Body of a 400 response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorBody {
    #[schema(example = "Invalid parameters")]
    pub message: String,
    #[schema(value_type = HashMap<String, Vec<String>>)]
    pub errors: ValidationErrors,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let body = ValidationErrorBody {
                    message: "Invalid parameters".into(),
                    errors,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        ApiError::Validation(value)
    }
}

impl From<CatalogError> for ApiError {
    fn from(value: CatalogError) -> Self {
        error!(error = %value, "course catalog unavailable");
        ApiError::Internal("Course catalog unavailable".into())
    }
}

impl From<QueryError> for ApiError {
    fn from(value: QueryError) -> Self {
        error!(error = %value, "malformed course record");
        ApiError::Internal(format!("Malformed course data: {value}"))
    }
}
