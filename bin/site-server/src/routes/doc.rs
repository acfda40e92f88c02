use crate::routes::{contact, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "site-server",
    description = "Institutional website backend: contact form relay and health check",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(contact::ContactApi::openapi());
    root.merge(health::HealthApi::openapi());
    root
}
