//! Contact pipeline error type.
//!
//! Every terminal outcome of `POST /api/contact` other than success is a
//! [`ContactError`]. It implements [`axum::response::IntoResponse`], so the
//! mapping below is the single place that decides status codes and bodies.
//!
//! **Security note:** the honeypot rejection shares the 400 status and
//! `{"error": ...}` shape of every other client error, so automated senders
//! get no distinguishing signal. Delivery failures are logged with full detail
//! at the point of failure; clients only see a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::schemas::ErrorResponse;

/// All terminal failures of a contact submission. None are retried.
#[derive(Debug, Error)]
pub enum ContactError {
    /// The endpoint only accepts POST.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The body is not a JSON object of the expected shape.
    #[error("Invalid JSON")]
    InvalidPayload,

    /// The honeypot field was filled in.
    #[error("Rejected")]
    Rejected,

    /// `name`, `email` or `message` is absent or blank.
    #[error("Missing required fields")]
    MissingFields,

    /// `email` does not parse as an address.
    #[error("Invalid email")]
    InvalidEmail,

    /// The notification could not be handed to the mail transport.
    #[error("Unable to send message")]
    DeliveryFailed,
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            ContactError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ContactError::InvalidPayload
            | ContactError::Rejected
            | ContactError::MissingFields
            | ContactError::InvalidEmail => StatusCode::BAD_REQUEST,
            ContactError::DeliveryFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
