//! Mapping of booking failures onto HTTP responses.

use api_shared::ErrorRes;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use evervault_core::{BookingError, EquipmentId};

/// Error returned by every handler. Renders as `{message, error}` JSON.
#[derive(Debug)]
pub enum ApiError {
    Booking(BookingError),
    /// `call next` found nothing queued for the unit.
    EmptyQueue(EquipmentId),
    /// The request body or a field in it could not be understood.
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Booking(err) => match err {
                BookingError::EquipmentNotFound(_) | BookingError::BookingNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                BookingError::InvalidReference(_)
                | BookingError::InvalidInput(_)
                | BookingError::PastSlotRejected => StatusCode::BAD_REQUEST,
                BookingError::InvalidState { .. } | BookingError::Unavailable { .. } => {
                    StatusCode::CONFLICT
                }
                BookingError::CatalogueRead { .. }
                | BookingError::CatalogueParse(_)
                | BookingError::InvalidCatalogue(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::EmptyQueue(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> ErrorRes {
        match self {
            ApiError::Booking(err) => ErrorRes::from(err),
            ApiError::EmptyQueue(id) => ErrorRes::new(
                "EMPTY_QUEUE",
                format!("no patients are queued for equipment {id}"),
            ),
            ApiError::BadRequest(message) => ErrorRes::new("INVALID_INPUT", message.clone()),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError::Booking(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        if status.is_server_error() {
            tracing::error!("request failed: {}", body.message);
        } else {
            tracing::warn!("request rejected ({}): {}", body.error, body.message);
        }
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
