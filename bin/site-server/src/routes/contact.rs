//! Contact-form endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header;
use axum::routing::post;
use axum::{Json, Router};
use tracing::debug;
use utoipa::OpenApi;

use crate::contact::submission::SubmissionRequest;
use crate::contact::RequestMeta;
use crate::error::ContactError;
use crate::schemas::{ContactAccepted, ErrorResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(submit_contact),
    components(schemas(SubmissionRequest, ContactAccepted, ErrorResponse))
)]
pub struct ContactApi;

/// Register contact routes. Every method except POST gets the JSON 405 body.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/contact", post(submit_contact).fallback(method_not_allowed))
}

#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = SubmissionRequest,
    responses(
        (status = 200, description = "Notification sent", body = ContactAccepted),
        (status = 400, description = "Invalid JSON, rejected, missing fields or invalid email", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Unable to send message", body = ErrorResponse),
    )
)]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ContactAccepted>, ContactError> {
    let meta = request_meta(&request);

    let body = axum::body::to_bytes(request.into_body(), state.config.max_body_bytes)
        .await
        .map_err(|e| {
            debug!(error = %e, "could not read contact body");
            ContactError::InvalidPayload
        })?;

    state.contact.submit(&body, meta).await?;
    Ok(Json(ContactAccepted { ok: true }))
}

async fn method_not_allowed() -> ContactError {
    ContactError::MethodNotAllowed
}

fn request_meta(request: &Request) -> RequestMeta {
    RequestMeta {
        source_address: request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string()),
        user_agent: request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::body::Body;
    use axum::http;

    #[test]
    fn meta_reads_peer_address_and_user_agent() {
        let mut request = http::Request::builder()
            .header(header::USER_AGENT, "Mozilla/5.0")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 7], 51234))));

        let meta = request_meta(&request);
        assert_eq!(meta.source_address.as_deref(), Some("192.0.2.7"));
        assert_eq!(meta.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn meta_is_empty_without_connection_info() {
        let request = http::Request::builder().body(Body::empty()).unwrap();
        let meta = request_meta(&request);
        assert!(meta.source_address.is_none());
        assert!(meta.user_agent.is_none());
    }
}
