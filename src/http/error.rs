//! Mapping of core errors onto HTTP responses.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::OccupancyError;

/// Error message carried in response extensions for the request observer.
#[derive(Clone, Debug)]
pub struct ErrorMessage(pub String);

/// Everything a handler or middleware can answer with on failure.
#[derive(Debug)]
pub enum ApiError {
    Occupancy(OccupancyError),
    Unauthorized,
    PayloadTooLarge,
    RouteNotFound,
    /// Unhandled fault (e.g. a panicking handler).
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Occupancy(e) => match e {
                OccupancyError::Validation(_) => StatusCode::BAD_REQUEST,
                OccupancyError::RoomNotFound(_) | OccupancyError::VisitNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                OccupancyError::RoomAtCapacity { .. } | OccupancyError::Conflict(_) => {
                    StatusCode::CONFLICT
                }
                OccupancyError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Occupancy(e) => e.to_string(),
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::PayloadTooLarge => "Payload too large".to_string(),
            ApiError::RouteNotFound => "Route not found".to_string(),
            ApiError::Internal(message) if message.is_empty() => "Internal Server Error".to_string(),
            ApiError::Internal(message) => message.clone(),
        }
    }
}

impl From<OccupancyError> for ApiError {
    fn from(e: OccupancyError) -> Self {
        ApiError::Occupancy(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Occupancy(OccupancyError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Occupancy(OccupancyError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Request failed");
        }

        let mut response = (
            status,
            Json(json!({ "error": message, "statusCode": status.as_u16() })),
        )
            .into_response();
        response.extensions_mut().insert(ErrorMessage(message));
        response
    }
}
