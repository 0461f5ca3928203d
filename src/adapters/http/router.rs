//! Top-level router and middleware stack.

use axum::{routing::get, Router};
use http::{header, HeaderName, HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;

use super::networking::{health, networking_routes, NetworkingAppState, REQUEST_ID_HEADER};

/// Builds the application router.
///
/// Layers, outermost first: request id assignment, tracing, request id
/// propagation onto the response, timeout, CORS.
pub fn build_router(state: NetworkingAppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(networking_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(config.request_timeout()))
                .layer(cors_layer(config)),
        )
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)]);

    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}
