use crate::{controller::health_check_controller, AppState};
use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::controller::{oauth_controller, user_controller};

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Social Login API"
        ),
        paths(
            oauth_controller::authorize,
            oauth_controller::callback,
            user_controller::read_me,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                domain::users::Model,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "social_login", description = "Social Login & Identity API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our bearer token based authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(auth_routes(app_state.clone()))
        .merge(health_routes())
        .merge(user_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes())
}

/// Routes for the social login flow
fn auth_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/auth/authorize/:provider",
            get(oauth_controller::authorize),
        )
        // Callback doesn't require one of our tokens (the browser is redirected back
        // from the provider before it has one)
        .route("/auth/callback/:provider", get(oauth_controller::callback))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// Authentication happens in the AuthenticatedUser extractor, which rejects requests
// that don't carry a verifiable bearer token.
pub fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/users/me", get(user_controller::read_me))
        .with_state(app_state)
}

// This will serve static files that we can use as a "fallback" for when the server panics
pub fn static_routes() -> Router {
    Router::new().nest_service("/", ServeDir::new("./"))
}
