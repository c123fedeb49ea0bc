//! Route handlers

pub mod health;
pub mod task;
pub mod user;

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json, Router};
use serde::{Deserialize, Deserializer, Serialize};
use taskboard_core::query::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use taskboard_core::Error;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

pub fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn map_core_error(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::TaskNotFound(_) | Error::UserNotFound(_) => StatusCode::NOT_FOUND,
    };
    tracing::debug!(%status, error = %err, "Request failed");
    error_response(status, err.to_string())
}

/// Unwrap a JSON body, answering 400 when it is missing or malformed
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        error_response(StatusCode::BAD_REQUEST, "Missing JSON body")
    })
}

/// Distinguishes an explicit `null` from an absent field when combined with
/// `#[serde(default)]` on an `Option<Option<T>>`.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Parse `page` / `page_size` query values, applying defaults.
///
/// Negative numbers are passed through as 0 so pagination reports the range
/// error itself.
pub fn parse_pagination(page: Option<&str>, page_size: Option<&str>) -> ApiResult<(usize, usize)> {
    fn parse(raw: Option<&str>, default: usize) -> Option<usize> {
        match raw {
            None => Some(default),
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .map(|value| usize::try_from(value).unwrap_or(0)),
        }
    }

    match (parse(page, DEFAULT_PAGE), parse(page_size, DEFAULT_PAGE_SIZE)) {
        (Some(page), Some(page_size)) => Ok((page, page_size)),
        _ => Err(error_response(
            StatusCode::BAD_REQUEST,
            "Invalid pagination parameters. 'page' and 'page_size' must be integers.",
        )),
    }
}

/// All REST routes
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(task::router())
        .merge(user::router())
}
