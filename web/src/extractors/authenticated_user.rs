use crate::extractors::RejectionType;
use crate::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};
use domain::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
use domain::{jwt, user as UserApi, users};
use log::*;

pub(crate) struct AuthenticatedUser(pub users::Model);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = RejectionType;

    // This extractor pulls the bearer token out of the Authorization header, verifies its
    // signature and expiry, and loads the referenced user. Handlers taking an
    // AuthenticatedUser therefore never run for requests without a live, valid token.
    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))?;

        let user_id = jwt::verify_access_token(&state.config, token).map_err(|err| {
            debug!("Rejected access token: {:?}", err);
            (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
        })?;

        match UserApi::find_by_id(state.db_conn_ref(), user_id).await {
            Ok(user) => Ok(AuthenticatedUser(user)),
            Err(err) => match err.error_kind {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound)) => {
                    warn!("Valid access token for missing user {user_id}");
                    Err((StatusCode::NOT_FOUND, "NOT FOUND".to_string()))
                }
                _ => {
                    error!("Failed to load user {user_id}: {err:?}");
                    Err((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL SERVER ERROR".to_string(),
                    ))
                }
            },
        }
    }
}
