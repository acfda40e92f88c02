//! Response bodies shared by the route handlers and the OpenAPI document.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{"ok": true}`, returned once the notification has been handed off.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactAccepted {
    pub ok: bool,
}

/// Body of every non-2xx contact response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Current UTC time, ISO-8601.
    pub timestamp: String,
}
