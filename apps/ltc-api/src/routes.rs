use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use ltc_service::{ComposeRequest, ComposeResponse, Error, SearchRequest, SearchResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/disposition/partners/search", post(search_partners))
		.route("/v1/disposition/outreach/compose", post(compose_outreach))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search_partners(
	State(state): State<AppState>,
	payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.search_partners(payload).await?;

	Ok(Json(response))
}

async fn compose_outreach(
	State(state): State<AppState>,
	payload: Result<Json<ComposeRequest>, JsonRejection>,
) -> Result<Json<ComposeResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.compose_outreach(payload)?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
		Self { status, error_code, message: message.into() }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			Error::UpstreamUnavailable { message } => {
				tracing::error!(error = %message, "Discovery upstream unavailable.");

				Self::new(StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE", message)
			},
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code.to_string(), message: self.message };

		(self.status, Json(body)).into_response()
	}
}
