//! `OpenAPI` documentation and Swagger UI configuration.

use axum::Router;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use samhandling_api::{COUNTY_KEY_HEADER, COUNTY_KEY_QUERY};

use crate::health::HealthResponse;

/// Security scheme modifier for the county key.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "countyKeyHeader",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(COUNTY_KEY_HEADER))),
            );
            components.add_security_scheme(
                "countyKeyQuery",
                SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new(COUNTY_KEY_QUERY))),
            );
        }
    }
}

/// `OpenAPI` documentation for the members API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Samhandling Members API",
        description = "County-scoped management of Entra ID group membership"
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Members", description = "Group membership scoped by county key"),
    ),
    paths(
        crate::health::health_handler,
        samhandling_api::handlers::list::list_members_handler,
        samhandling_api::handlers::add::add_member_handler,
        samhandling_api::handlers::add::add_member_by_path_handler,
        samhandling_api::handlers::remove::remove_member_handler,
    ),
    components(schemas(
        HealthResponse,
        samhandling_api::AddMemberRequest,
        samhandling_api::AddMemberOptions,
        samhandling_api::MemberResponse,
    ))
)]
pub struct ApiDoc;

/// Swagger UI at `/docs`, spec at `/api-doc/openapi.json`.
pub fn swagger_routes() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
}
