use axum::{extract::rejection::JsonRejection, Json};

use crate::database::models::WhiskeyId;
use crate::error::ApiError;

pub const NOT_FOUND: &str = "Whiskey not found";

/// Ids that do not parse are reported like ids that do not exist
pub fn parse_id(raw: &str) -> Result<WhiskeyId, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(NOT_FOUND))
}

/// Unwrap a JSON body, turning extractor rejections into API errors
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(data)| data)
        .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))
}

/// Query values that are empty after trimming count as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
