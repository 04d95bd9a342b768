use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, warn};

use crate::{
    AppState,
    error::{ApiError, ValidationErrorBody},
    models::{Course, CourseQuery},
    query::{CourseFilter, ScheduleType, find_courses},
    validation::{ValidationErrors, validate_course_query},
};

#[utoipa::path(get, path = "/", tag = "courses")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Course Catalog API",
        "endpoints": {
            "/api/courses": "List courses, filtered by month, venue and type, with duplicate listings merged"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "courses")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses(
        (status = 200, description = "Catalog can be loaded"),
        (status = 503, description = "Catalog source unavailable")
    ),
    tag = "courses"
)]
pub async fn healthz_ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog.load().await {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))),
        Err(err) => {
            warn!(error = %err, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "unavailable"})),
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/courses",
    params(
        ("month" = Option<String>, Query, description = "Start month, YYYY-MM", example = "2024-10"),
        ("venue" = Option<String>, Query, description = "Exact venue name"),
        ("type" = Option<String>, Query, description = "Monday to Friday, Day Release or Weekend")
    ),
    responses(
        (status = 200, description = "Matching courses, duplicate listings merged", body = [Course]),
        (status = 400, description = "Invalid parameters", body = ValidationErrorBody),
        (status = 500, description = "Catalog unavailable or malformed")
    ),
    tag = "courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
    query: Result<Query<CourseQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        let mut errors = ValidationErrors::default();
        errors.add("query", rejection.body_text());
        ApiError::Validation(errors)
    })?;
    validate_course_query(&query)?;
    let filter = CourseFilter::from(query);

    let catalog = state.catalog.load().await?;
    let total = catalog.len();
    let courses = find_courses(catalog, &filter)?;
    debug!(
        total,
        returned = courses.len(),
        month = filter.month.as_deref(),
        venue = filter.venue.as_deref(),
        schedule = filter.schedule.as_ref().map(ScheduleType::label),
        "course query evaluated"
    );

    Ok(Json(courses))
}
