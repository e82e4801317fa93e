use axum::{
	Json, Router,
	extract::{Path, State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rapport_domain::{BandingScheme, ImportanceEntry, IndicatorBand, PriorityCalculation};
use rapport_service::{Error as ServiceError, FilterState, QuerySpec, SkippedInput, SortConfig};
use rapport_storage::{Cursor, OrderBy, Row};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/priority/catalog", get(catalog))
		.route("/v1/priority/calculate", post(calculate))
		.route("/v1/feeds/{entity}/page", post(feed_page))
		.route("/v1/tasks/{task_id}/prioritize", post(prioritize))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
	#[serde(default)]
	pub engagement_score: Option<u8>,
	pub activity_type: String,
	/// Table used for `band_label`; the stored level always uses four bands.
	#[serde(default)]
	pub banding: BandingScheme,
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
	#[serde(flatten)]
	pub calculation: PriorityCalculation,
	pub indicator_band: IndicatorBand,
	pub band_label: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct FeedPageRequest {
	pub user_id: Uuid,
	#[serde(default)]
	pub search: Option<String>,
	#[serde(default)]
	pub filters: FilterState,
	#[serde(default)]
	pub sort: Option<SortConfig>,
	#[serde(default)]
	pub cursor: Option<Cursor>,
	#[serde(default)]
	pub page_size: Option<u32>,
	/// Switches to offset paging, which also reports `total_count`.
	#[serde(default)]
	pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct FeedPageResponse {
	pub items: Vec<Row>,
	pub has_more: bool,
	pub next_cursor: Option<Cursor>,
	pub total_count: Option<u64>,
	pub order: OrderBy,
	pub skipped: Vec<SkippedInput>,
}

#[derive(Debug, Deserialize)]
pub struct PrioritizeRequest {
	pub user_id: Uuid,
	pub contact_id: Uuid,
	pub activity_type: String,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn catalog(State(state): State<AppState>) -> Json<Vec<ImportanceEntry>> {
	Json(state.service.importance_catalog())
}

async fn calculate(
	State(state): State<AppState>,
	payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
	let Json(payload) = payload?;
	let calculation =
		state.service.calculate_priority(payload.engagement_score, &payload.activity_type);
	let indicator_band = IndicatorBand::from_score(calculation.calculated_score);
	let band_label = payload.banding.label_for(calculation.calculated_score);

	Ok(Json(CalculateResponse { calculation, indicator_band, band_label }))
}

async fn feed_page(
	State(state): State<AppState>,
	Path(entity): Path<String>,
	payload: Result<Json<FeedPageRequest>, JsonRejection>,
) -> Result<Json<FeedPageResponse>, ApiError> {
	let Json(payload) = payload?;
	let spec =
		QuerySpec { filters: payload.filters, search: payload.search, sort: payload.sort };
	let page_size = payload.page_size.unwrap_or(0);
	let page = match (payload.offset, payload.cursor) {
		(Some(_), Some(_)) =>
			return Err(json_error(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				"cursor and offset are mutually exclusive.",
				Some(vec!["cursor".to_string(), "offset".to_string()]),
			)),
		(Some(offset), None) =>
			state
				.service
				.fetch_offset_page(payload.user_id, &entity, &spec, offset, page_size)
				.await?,
		(None, cursor) =>
			state.service.fetch_page(payload.user_id, &entity, &spec, cursor, page_size).await?,
	};

	Ok(Json(FeedPageResponse {
		items: page.rows,
		has_more: page.has_more,
		next_cursor: page.next_cursor,
		total_count: page.total_count,
		order: page.order,
		skipped: page.skipped,
	}))
}

async fn prioritize(
	State(state): State<AppState>,
	Path(task_id): Path<Uuid>,
	payload: Result<Json<PrioritizeRequest>, JsonRejection>,
) -> Result<Json<PriorityCalculation>, ApiError> {
	let Json(payload) = payload?;
	let calculation = state
		.service
		.prioritize_task(payload.user_id, task_id, payload.contact_id, &payload.activity_type)
		.await?;

	Ok(Json(calculation))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			ServiceError::TenantResolution { message } =>
				json_error(StatusCode::FORBIDDEN, "tenant_unresolved", message, None),
			ServiceError::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "not_found", message, None),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Request failed in storage.");

				json_error(
					StatusCode::BAD_GATEWAY,
					"storage_unavailable",
					"Storage request failed.",
					None,
				)
			},
			ServiceError::Superseded =>
				json_error(StatusCode::CONFLICT, "superseded", "Request was superseded.", None),
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text(), None)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
