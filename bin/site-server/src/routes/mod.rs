//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, trace-ID injection, `Referrer-Policy`)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `SITE_ENABLE_SWAGGER=false`)
//! - `/api/contact` and `/api/health`

mod contact;
pub mod doc;
mod health;

use axum::http::{header, HeaderValue};
use axum::{middleware, Router};
use crate::middleware::{cors, trace};
use crate::state::AppState;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use utoipa_swagger_ui::SwaggerUi;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(contact::router())
        .merge(health::router());

    let mut app = Router::new().nest("/api", api_router);

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(trace::trace_middleware))
                .layer(SetResponseHeaderLayer::overriding(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(cors::cors_layer(state.clone())),
        )
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
