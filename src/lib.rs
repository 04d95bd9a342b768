pub mod catalog;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod query;
pub mod settings;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use handlers::{healthz_live, healthz_ready, list_courses, root};
use http::Method;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::catalog::CatalogSource;
use crate::openapi::ApiDoc;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub catalog: Arc<dyn CatalogSource>,
}

impl AppState {
    pub fn new(settings: Settings, catalog: Arc<dyn CatalogSource>) -> Self {
        Self { settings, catalog }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let catalog = catalog::from_settings(&settings);
    match &settings.catalog_url {
        Some(url) => info!("Serving course catalog from {url}"),
        None => info!("Serving course catalog from {}", settings.catalog_path.display()),
    }

    let state = AppState::new(settings, catalog);
    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    let app = build_router(state);

    info!("Starting Course Catalog API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    let enable_swagger = state.settings.enable_swagger;
    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/api/courses", get(list_courses))
        .with_state(state);

    if enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(cors).layer(trace_layer)
}
