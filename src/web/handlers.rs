use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use rust_i18n::t;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::AppState;
use crate::components::calendar::models::{EventFields, EventId, NewEvent};
use crate::components::prompt_relay::RelayError;
use crate::error::Error;
use crate::utils::time::{parse_date, today, YearMonth};

/// Body of the prompt endpoints; field aliases match the original front end
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleRequest {
    #[serde(default, alias = "userInput")]
    pub text: Option<String>,
    /// Date relative expressions resolve against, defaults to the server's date
    #[serde(default, alias = "date")]
    pub today: Option<String>,
}

impl ScheduleRequest {
    fn resolve_today(&self) -> Result<NaiveDate, ApiError> {
        match self.today.as_deref().map(str::trim) {
            None | Some("") => Ok(today()),
            Some(raw) => parse_date(raw).ok_or_else(|| ApiError::InvalidDate(raw.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failure of one request, rendered as `{ "error": ... }` with a localized message
#[derive(Debug)]
pub enum ApiError {
    App(Error),
    InvalidBody(String),
    InvalidDate(String),
    InvalidMonth(i32, u32),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::InvalidDate(_) | ApiError::InvalidMonth(..) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::App(err) => match err {
                Error::Relay(RelayError::MissingInput)
                | Error::Validation(_)
                | Error::IdOutOfRange(_) => StatusCode::BAD_REQUEST,
                Error::Relay(RelayError::Service(_)) => StatusCode::BAD_GATEWAY,
                Error::Relay(RelayError::Malformed(_) | RelayError::Incomplete { .. }) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                Error::Busy | Error::DuplicateId(_) => StatusCode::CONFLICT,
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// User-facing message in the current locale
    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidBody(_) => t!("error_invalid_body").to_string(),
            ApiError::InvalidDate(_) => t!("error_invalid_date").to_string(),
            ApiError::InvalidMonth(..) => t!("error_invalid_month").to_string(),
            ApiError::App(err) => match err {
                Error::Relay(RelayError::MissingInput) => t!("error_missing_input").to_string(),
                Error::Relay(RelayError::Service(_)) => t!("error_service_unavailable").to_string(),
                Error::Relay(_) => t!("error_not_understood").to_string(),
                Error::Busy => t!("error_busy").to_string(),
                Error::Validation(reason) => {
                    t!("error_invalid_event", reason = reason.to_string()).to_string()
                }
                Error::NotFound(_) => t!("error_not_found").to_string(),
                Error::DuplicateId(_) => t!("error_duplicate_id").to_string(),
                Error::IdOutOfRange(_) => t!("error_invalid_id").to_string(),
                Error::Storage(_) | Error::Io(_) | Error::Serialization(_) => {
                    t!("error_storage").to_string()
                }
                _ => t!("error_internal").to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {:?}", status, self);
        } else {
            warn!("Request rejected with {}: {:?}", status, self);
        }

        (status, Json(ErrorBody { error: self.message() })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Health check endpoint
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Relay only: free text in, validated event fields out
pub async fn schedule_handler(
    State(state): State<AppState>,
    body: Result<Json<ScheduleRequest>, JsonRejection>,
) -> ApiResult<Json<EventFields>> {
    let Json(body) = body?;
    let today = body.resolve_today()?;
    debug!("Schedule request for {}", today);

    let fields = state
        .controller
        .extract(body.text.as_deref().unwrap_or_default(), today)
        .await?;
    Ok(Json(fields))
}

/// Extract an event from free text and store it
pub async fn prompt_event_handler(
    State(state): State<AppState>,
    body: Result<Json<ScheduleRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let today = body.resolve_today()?;

    let text = body.text.unwrap_or_default();

    // Detached so a client disconnect does not cancel the extraction
    let controller = state.controller.clone();
    let event = tokio::spawn(async move { controller.submit_prompt(&text, today).await })
        .await
        .map_err(|e| Error::Other(format!("Prompt task failed: {}", e)))??;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.events().await)
}

/// Manual entry
pub async fn create_event_handler(
    State(state): State<AppState>,
    body: Result<Json<NewEvent>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(new_event) = body?;
    let event = state.controller.create_event(new_event).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_event_handler(
    State(state): State<AppState>,
    path: Result<Path<EventId>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let event = state
        .controller
        .event(id)
        .await
        .ok_or(Error::NotFound(id))?;
    Ok(Json(event))
}

/// Full replacement of an event's fields
pub async fn update_event_handler(
    State(state): State<AppState>,
    path: Result<Path<EventId>, PathRejection>,
    body: Result<Json<EventFields>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let Json(fields) = body?;
    let event = state.controller.update_event(id, fields).await?;
    Ok(Json(event))
}

pub async fn delete_event_handler(
    State(state): State<AppState>,
    path: Result<Path<EventId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.controller.delete_event(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The currently displayed month
pub async fn calendar_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.view(today()).await)
}

/// Any month, without moving the display
pub async fn month_handler(
    State(state): State<AppState>,
    path: Result<Path<(i32, u32)>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path((year, month)) = path?;
    let month = YearMonth::new(year, month).ok_or(ApiError::InvalidMonth(year, month))?;
    Ok(Json(state.controller.view_month(month, today()).await))
}

pub async fn next_month_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.next_month(today()).await)
}

pub async fn prev_month_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.prev_month(today()).await)
}

pub async fn today_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.show_today(today()).await)
}
