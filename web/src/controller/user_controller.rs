use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::Error;
use axum::{http::StatusCode, response::IntoResponse, Json};
use domain::users;

use log::*;

/// GET the currently authenticated User
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Successfully returned the authenticated User", body = [users::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User record no longer exists")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn read_me(
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, Error> {
    debug!("GET User from bearer token: {}", user.id);

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}

// We need to gate seaORM's mock feature behind conditional compilation because the feature
// removes the Clone trait implementation from seaORM's DatabaseConnection. see
// https://github.com/SeaQL/sea-orm/issues/830
#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use chrono::Utc;
    use domain::{users, Id};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use serial_test::serial;
    use service::config::Config;
    use std::env;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn build_app(app_state: crate::AppState) -> Router {
        Router::new()
            .route("/api/users/me", get(read_me))
            .with_state(app_state)
    }

    fn test_user() -> users::Model {
        users::Model {
            id: Id::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    async fn get_me(app: Router, bearer_token: Option<&str>) -> axum::http::Response<Body> {
        let mut builder = Request::builder().uri("/api/users/me");
        if let Some(token) = bearer_token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn test_read_me_without_token_returns_401() {
        env::set_var("JWT_SECRET_KEY", "test_jwt_secret_key");
        let db: Arc<DatabaseConnection> =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let app = build_app(crate::AppState::new(Config::default(), &db));

        let response = get_me(app, None).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[serial]
    async fn test_read_me_with_invalid_token_returns_401() {
        env::set_var("JWT_SECRET_KEY", "test_jwt_secret_key");
        let db: Arc<DatabaseConnection> =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let app = build_app(crate::AppState::new(Config::default(), &db));

        let response = get_me(app, Some("not.a.token")).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[serial]
    async fn test_read_me_returns_the_token_holder() {
        env::set_var("JWT_SECRET_KEY", "test_jwt_secret_key");
        let user = test_user();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]]) // For the id lookup in the extractor
                .into_connection(),
        );
        let config = Config::default();
        let jwt = domain::jwt::generate_access_token(&config, user.id).unwrap();
        let app = build_app(crate::AppState::new(config, &db));

        let response = get_me(app, Some(&jwt.token)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["status_code"], 200);
        assert_eq!(payload["data"]["email"], "alice@example.com");
        assert_eq!(payload["data"]["username"], "alice");
    }

    #[tokio::test]
    #[serial]
    async fn test_read_me_for_missing_user_returns_404() {
        env::set_var("JWT_SECRET_KEY", "test_jwt_secret_key");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<users::Model>::new()]) // For the id lookup finding nothing
                .into_connection(),
        );
        let config = Config::default();
        let jwt = domain::jwt::generate_access_token(&config, Id::new_v4()).unwrap();
        let app = build_app(crate::AppState::new(config, &db));

        let response = get_me(app, Some(&jwt.token)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
