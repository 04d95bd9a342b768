use utoipa::OpenApi;

use crate::error::ValidationErrorBody;
use crate::models::{Course, CourseDay, Venue};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::list_courses
    ),
    components(schemas(Course, Venue, CourseDay, ValidationErrorBody)),
    tags(
        (name = "courses", description = "Course catalog queries")
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_course_endpoint() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/courses"));
        let schemas = &doc.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("Course"));
        assert!(schemas.contains_key("ValidationErrorBody"));
    }
}
