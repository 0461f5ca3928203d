//! HTTP handlers for the public event endpoints.
//!
//! Every call carries the attendee's access code. It is resolved through the
//! access gate before any handler runs; the resulting identity is the only
//! actor the application layer ever sees.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::application::handlers::{
    CancelRequestCommand, CancelRequestHandler, GetDirectoryHandler, GetDirectoryQuery,
    GetProfileHandler, GetProfileQuery, RequestSlotCommand, RequestSlotHandler,
    RespondToRequestCommand, RespondToRequestHandler, SetAvailabilityCommand,
    SetAvailabilityHandler, UpdateProfileCommand, UpdateProfileHandler, VerifyAccessHandler,
};
use crate::domain::attendee::AccessCode;
use crate::domain::event::{EventCode, TimeSlot};
use crate::domain::foundation::{
    AttendeeId, AuthError, AuthenticatedAttendee, CommandMetadata, RequestId,
};
use crate::domain::networking::NetworkingError;
use crate::ports::{AccessGate, DirectoryReader, EventPublisher, LedgerRepository};

use super::dto::{
    AccessCodeQuery, AvailabilityResponse, CreateNetworkingRequest, DirectoryResponse,
    ErrorResponse, HealthResponse, NetworkingRequestResponse, ProfileResponse, RespondRequest,
    UpdateAvailabilityRequest, UpdateProfileRequest, VerifyRequest, VerifyResponse,
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct NetworkingAppState {
    access_gate: Arc<dyn AccessGate>,
    verify_handler: Arc<VerifyAccessHandler>,
    profile_handler: Arc<GetProfileHandler>,
    profile_update_handler: Arc<UpdateProfileHandler>,
    availability_handler: Arc<SetAvailabilityHandler>,
    directory_handler: Arc<GetDirectoryHandler>,
    request_handler: Arc<RequestSlotHandler>,
    respond_handler: Arc<RespondToRequestHandler>,
    cancel_handler: Arc<CancelRequestHandler>,
}

impl NetworkingAppState {
    /// Wires every handler over one set of ports.
    pub fn new(
        ledger: Arc<dyn LedgerRepository>,
        directory: Arc<dyn DirectoryReader>,
        access_gate: Arc<dyn AccessGate>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            access_gate,
            verify_handler: Arc::new(VerifyAccessHandler::new(
                ledger.clone(),
                directory.clone(),
                event_publisher.clone(),
            )),
            profile_handler: Arc::new(GetProfileHandler::new(directory.clone())),
            profile_update_handler: Arc::new(UpdateProfileHandler::new(
                ledger.clone(),
                directory.clone(),
                event_publisher.clone(),
            )),
            availability_handler: Arc::new(SetAvailabilityHandler::new(
                ledger.clone(),
                event_publisher.clone(),
            )),
            directory_handler: Arc::new(GetDirectoryHandler::new(directory)),
            request_handler: Arc::new(RequestSlotHandler::new(
                ledger.clone(),
                event_publisher.clone(),
            )),
            respond_handler: Arc::new(RespondToRequestHandler::new(
                ledger.clone(),
                event_publisher.clone(),
            )),
            cancel_handler: Arc::new(CancelRequestHandler::new(ledger, event_publisher)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /health - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// POST /api/public/events/:event_code/verify - Confirm an access code
pub async fn verify_access(
    State(state): State<NetworkingAppState>,
    Path(event_code): Path<String>,
    headers: HeaderMap,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(rejection),
    };
    let actor = match authenticate(&state, &event_code, &req.access_code).await {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match state
        .verify_handler
        .handle(command_metadata(&actor, &headers))
        .await
    {
        Ok(result) => {
            let response = VerifyResponse {
                verified: true,
                profile: result.profile.into(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_networking_error(e),
    }
}

/// GET /api/public/events/:event_code/profile - The caller's profile
pub async fn get_profile(
    State(state): State<NetworkingAppState>,
    Path(event_code): Path<String>,
    Query(query): Query<AccessCodeQuery>,
) -> Response {
    let actor = match authenticate(&state, &event_code, &query.access_code).await {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match state.profile_handler.handle(GetProfileQuery { actor }).await {
        Ok(view) => {
            let response: ProfileResponse = view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_networking_error(e),
    }
}

/// PATCH /api/public/events/:event_code/profile - Edit the caller's profile
pub async fn update_profile(
    State(state): State<NetworkingAppState>,
    Path(event_code): Path<String>,
    headers: HeaderMap,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(rejection),
    };
    let actor = match authenticate(&state, &event_code, &req.access_code).await {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let cmd = UpdateProfileCommand {
        changes: req.into_changes(),
    };
    match state
        .profile_update_handler
        .handle(cmd, command_metadata(&actor, &headers))
        .await
    {
        Ok(result) => {
            let response: ProfileResponse = result.profile.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_networking_error(e),
    }
}

/// PATCH /api/public/events/:event_code/availability - Replace declared slots
pub async fn update_availability(
    State(state): State<NetworkingAppState>,
    Path(event_code): Path<String>,
    headers: HeaderMap,
    body: Result<Json<UpdateAvailabilityRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(rejection),
    };
    let actor = match authenticate(&state, &event_code, &req.access_code).await {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let slots = match req
        .slots
        .into_iter()
        .map(TimeSlot::new)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(slots) => slots,
        Err(e) => return handle_networking_error(e.into()),
    };

    let cmd = SetAvailabilityCommand { slots };
    match state
        .availability_handler
        .handle(cmd, command_metadata(&actor, &headers))
        .await
    {
        Ok(result) => {
            let response = AvailabilityResponse::from(&result.attendee);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_networking_error(e),
    }
}

/// POST /api/public/events/:event_code/networking/request - Propose a meeting
pub async fn create_request(
    State(state): State<NetworkingAppState>,
    Path(event_code): Path<String>,
    headers: HeaderMap,
    body: Result<Json<CreateNetworkingRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(rejection),
    };
    let actor = match authenticate(&state, &event_code, &req.access_code).await {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let target_id = match req.profile_id.parse::<AttendeeId>() {
        Ok(id) => id,
        Err(_) => {
            return handle_networking_error(NetworkingError::validation(
                "profile_id",
                "must be an attendee id",
            ))
        }
    };
    let time_slot = match TimeSlot::new(req.time_slot) {
        Ok(slot) => slot,
        Err(e) => return handle_networking_error(e.into()),
    };

    let cmd = RequestSlotCommand {
        target_id,
        time_slot,
        message: req.message,
    };
    match state
        .request_handler
        .handle(cmd, command_metadata(&actor, &headers))
        .await
    {
        Ok(result) => {
            let response: NetworkingRequestResponse = result.view.into();
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_networking_error(e),
    }
}

/// PATCH /api/public/events/:event_code/networking/:request_id - Accept or reject
pub async fn respond_to_request(
    State(state): State<NetworkingAppState>,
    Path((event_code, request_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Result<Json<RespondRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(rejection),
    };
    let actor = match authenticate(&state, &event_code, &req.access_code).await {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let request_id = match parse_request_id(&request_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = RespondToRequestCommand {
        request_id,
        decision: req.status.into(),
    };
    match state
        .respond_handler
        .handle(cmd, command_metadata(&actor, &headers))
        .await
    {
        Ok(result) => {
            let response: NetworkingRequestResponse = result.view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_networking_error(e),
    }
}

/// DELETE /api/public/events/:event_code/networking/:request_id - Withdraw a request
pub async fn cancel_request(
    State(state): State<NetworkingAppState>,
    Path((event_code, request_id)): Path<(String, String)>,
    Query(query): Query<AccessCodeQuery>,
    headers: HeaderMap,
) -> Response {
    let actor = match authenticate(&state, &event_code, &query.access_code).await {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let request_id = match parse_request_id(&request_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state
        .cancel_handler
        .handle(CancelRequestCommand { request_id }, command_metadata(&actor, &headers))
        .await
    {
        Ok(result) => {
            let response: NetworkingRequestResponse = result.view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_networking_error(e),
    }
}

/// GET /api/public/events/:event_code/directory - Verified attendees and open slots
pub async fn get_directory(
    State(state): State<NetworkingAppState>,
    Path(event_code): Path<String>,
    Query(query): Query<AccessCodeQuery>,
) -> Response {
    let actor = match authenticate(&state, &event_code, &query.access_code).await {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match state
        .directory_handler
        .handle(GetDirectoryQuery { actor })
        .await
    {
        Ok(view) => {
            let response: DirectoryResponse = view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_networking_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

/// Resolves the credential pair. A malformed event code is reported the same
/// way as an unknown one.
async fn authenticate(
    state: &NetworkingAppState,
    event_code: &str,
    access_code: &str,
) -> Result<AuthenticatedAttendee, Response> {
    let access_code =
        AccessCode::parse(access_code).map_err(|e| handle_networking_error(e.into()))?;

    let resolved = match EventCode::parse(event_code) {
        Ok(code) => state.access_gate.resolve(&code, &access_code).await,
        Err(_) => Err(AuthError::InvalidCredential),
    };

    resolved.map_err(|e| {
        if matches!(e, AuthError::InvalidCredential) {
            tracing::warn!(event_code = %event_code, "Rejected access code");
        }
        handle_networking_error(e.into())
    })
}

fn command_metadata(actor: &AuthenticatedAttendee, headers: &HeaderMap) -> CommandMetadata {
    let metadata = CommandMetadata::new(actor).with_source("http");
    match headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(request_id) => metadata.with_correlation_id(request_id),
        None => metadata,
    }
}

fn parse_request_id(raw: &str) -> Result<RequestId, Response> {
    raw.parse::<RequestId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid request ID")),
        )
            .into_response()
    })
}

fn json_rejection(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(rejection.body_text())),
    )
        .into_response()
}

pub(crate) fn status_for(error: &NetworkingError) -> StatusCode {
    match error {
        NetworkingError::ValidationFailed { .. } | NetworkingError::InvalidSlot(_) => {
            StatusCode::BAD_REQUEST
        }
        NetworkingError::Unauthorized(AuthError::InvalidCredential) => StatusCode::UNAUTHORIZED,
        NetworkingError::Unauthorized(AuthError::ServiceUnavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        NetworkingError::Forbidden => StatusCode::FORBIDDEN,
        NetworkingError::SlotUnavailable { .. }
        | NetworkingError::DuplicateRequest { .. }
        | NetworkingError::InvalidTransition(_) => StatusCode::CONFLICT,
        NetworkingError::EventNotFound(_)
        | NetworkingError::AttendeeNotFound(_)
        | NetworkingError::RequestNotFound(_) => StatusCode::NOT_FOUND,
        NetworkingError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps networking errors to HTTP responses.
pub(crate) fn handle_networking_error(error: NetworkingError) -> Response {
    let status = status_for(&error);
    let body = match &error {
        NetworkingError::ValidationFailed { field, .. } => {
            ErrorResponse::new(error.code(), error.message()).with_details(json!({ "field": field }))
        }
        NetworkingError::InvalidSlot(slot)
        | NetworkingError::SlotUnavailable { slot, .. }
        | NetworkingError::DuplicateRequest { slot } => {
            ErrorResponse::new(error.code(), error.message()).with_details(json!({ "slot": slot }))
        }
        NetworkingError::Infrastructure(msg) => {
            tracing::error!(error = %msg, "Networking operation failed");
            ErrorResponse::new(error.code(), "Internal server error")
        }
        _ => ErrorResponse::new(error.code(), error.message()),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn conflicts_map_to_409() {
        for error in [
            NetworkingError::slot_unavailable("10:00-10:30", "taken"),
            NetworkingError::duplicate("10:00-10:30"),
            NetworkingError::invalid_transition("request is accepted"),
        ] {
            assert_eq!(status_for(&error), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn credential_errors_split_between_401_and_503() {
        assert_eq!(
            status_for(&NetworkingError::Unauthorized(AuthError::InvalidCredential)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&NetworkingError::Unauthorized(AuthError::service_unavailable(
                "pool closed"
            ))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_for(&NetworkingError::Forbidden), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_things_map_to_404() {
        assert_eq!(
            status_for(&NetworkingError::RequestNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&NetworkingError::EventNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn slot_errors_carry_the_slot_in_details() {
        let response = handle_networking_error(NetworkingError::invalid_slot("23:00-23:30"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["code"], "INVALID_SLOT");
        assert_eq!(json["details"]["slot"], "23:00-23:30");
    }

    #[tokio::test]
    async fn infrastructure_errors_hide_the_cause() {
        let response =
            handle_networking_error(NetworkingError::infrastructure("connection refused on 5432"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["message"], "Internal server error");
    }

    #[test]
    fn metadata_takes_correlation_id_from_request_header() {
        let actor = AuthenticatedAttendee::new(AttendeeId::new(), Default::default());
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, "req-42".parse().unwrap());

        let metadata = command_metadata(&actor, &headers);
        assert_eq!(metadata.correlation_id(), "req-42");
        assert_eq!(metadata.attendee_id, actor.attendee_id);
    }
}
