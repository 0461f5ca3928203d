//! HTTP routes for the public event endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{
    cancel_request, create_request, get_directory, get_profile, respond_to_request,
    update_availability, update_profile, verify_access, NetworkingAppState,
};

/// Prefix shared by every attendee-facing route.
pub const EVENT_ROUTE_PREFIX: &str = "/api/public/events/:event_code";

/// Creates the networking router with all endpoints.
pub fn networking_routes(state: NetworkingAppState) -> Router {
    let event_routes = Router::new()
        .route("/verify", post(verify_access))
        .route("/profile", get(get_profile).patch(update_profile))
        .route("/availability", patch(update_availability))
        .route("/networking/request", post(create_request))
        .route(
            "/networking/:request_id",
            patch(respond_to_request).delete(cancel_request),
        )
        .route("/directory", get(get_directory))
        .with_state(state);

    Router::new().nest(EVENT_ROUTE_PREFIX, event_routes)
}
