use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use sage_service::{Error as ServiceError, InboundEvent};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/webhook", post(webhook))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/codes", post(mint_code)).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

/// Replies go out through the messenger client, never through this response.
/// The webhook returns 200 as soon as the event has been handled so the
/// platform does not retry it.
async fn webhook(
	State(state): State<AppState>,
	Json(event): Json<InboundEvent>,
) -> StatusCode {
	state.service.process_event(event).await;

	StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct MintCodeRequest {
	secret: String,
}

#[derive(Debug, Serialize)]
struct MintCodeResponse {
	code: String,
}

async fn mint_code(
	State(state): State<AppState>,
	Json(payload): Json<MintCodeRequest>,
) -> Result<Json<MintCodeResponse>, ApiError> {
	let code = state.service.mint_code(&payload.secret).await?;

	Ok(Json(MintCodeResponse { code }))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, error_code) = match &err {
			ServiceError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
			ServiceError::Provider { .. } => (StatusCode::BAD_GATEWAY, "provider_error"),
			ServiceError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
		};

		Self { status, error_code: error_code.to_string(), message: err.to_string() }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
