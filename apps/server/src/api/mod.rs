use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::Config,
    error::ApiError,
    main_lib::AppState,
    models::{AnalysisRequest, ExpiriesResponse, ExpiryRequest},
};

mod analysis;
mod expiries;
mod symbols;

#[utoipa::path(get, path = "/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[derive(OpenApi)]
#[openapi(
    paths(
        healthz,
        symbols::index,
        expiries::get_expiries,
        analysis::stream_analysis
    ),
    components(schemas(ExpiryRequest, ExpiriesResponse, AnalysisRequest)),
    tags((name = "chainsight"))
)]
struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allow
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    }
    .allow_methods([Method::GET, Method::POST])
    .allow_headers(Any);

    let openapi = ApiDoc::openapi();

    Router::new()
        .route("/", get(symbols::index))
        .route("/get_expiries", post(expiries::get_expiries))
        .route("/stream_analysis", post(analysis::stream_analysis))
        .route("/healthz", get(healthz))
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
