//! OAuth2 login flows against third-party identity providers.
//!
//! A login runs in two legs. The authorization leg builds the provider's
//! consent URL for a fresh state token; the caller stores that token in the
//! user's session before redirecting. The callback leg validates what the
//! provider sent back, exchanges the authorization code for an access token,
//! fetches the subject's email address and resolves it to a user, minting a
//! login access token for the frontend.

use crate::error::{DomainErrorKind, Error, OauthErrorKind};
use crate::gateway::oauth::OauthProviderClient;
use crate::jwt::{self, Jwt};
use crate::user;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;

pub mod provider;
pub mod state;

pub use provider::ProviderKind;
pub use state::generate_state_token;

/// Query parameters a provider appended to the callback request.
#[derive(Debug, Default)]
pub struct CallbackValues {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Build the provider authorization URL carrying the given state token.
pub fn authorization_url(config: &Config, kind: ProviderKind, state: &str) -> Result<String, Error> {
    let settings = provider::provider_settings(config, kind)?;
    let redirect_uri = provider::callback_url(config, kind);
    let client = OauthProviderClient::new(settings, &redirect_uri)?;

    info!("Redirecting login attempt to {kind} for consent");
    Ok(client.authorization_url(state))
}

/// Complete a login from a provider callback.
///
/// Validations run in the order the flow's steps can fail: a provider-reported
/// error, the state token against the value stored when the flow began, the
/// presence of an authorization code, the code-for-token exchange, and the
/// userinfo fetch. The first failure aborts the flow; its error kind names the
/// failed step.
pub async fn complete_login(
    db: &DatabaseConnection,
    config: &Config,
    kind: ProviderKind,
    expected_state: Option<String>,
    values: CallbackValues,
) -> Result<Jwt, Error> {
    if let Some(error) = values.error {
        let description = values.error_description.unwrap_or(error);
        warn!("{kind} reported an authorization error: {description}");
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Oauth(OauthErrorKind::ProviderReported(description)),
        });
    }

    match (&expected_state, &values.state) {
        (Some(expected), Some(returned)) if expected == returned => {}
        _ => {
            warn!("{kind} callback state token did not match the pending login");
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::Oauth(OauthErrorKind::StateMismatch),
            });
        }
    }

    let code = values.code.ok_or_else(|| {
        warn!("{kind} callback carried no authorization code");
        Error {
            source: None,
            error_kind: DomainErrorKind::Oauth(OauthErrorKind::MissingCode),
        }
    })?;

    let settings = provider::provider_settings(config, kind)?;
    let redirect_uri = provider::callback_url(config, kind);
    let client = OauthProviderClient::new(settings, &redirect_uri)?;

    let access_token = client.exchange_code(&code).await?;
    let userinfo = client.fetch_userinfo(&access_token).await?;

    let email = provider::extract_email(kind, &userinfo).ok_or_else(|| {
        warn!("{kind} userinfo response carried no email address");
        Error {
            source: None,
            error_kind: DomainErrorKind::Oauth(OauthErrorKind::Userinfo),
        }
    })?;

    let user = user::find_or_create_by_email(db, &email).await?;
    info!("Login via {kind} resolved to user {}", user.id);

    jwt::generate_access_token(config, user.id)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serial_test::serial;

    fn mock_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    fn error_kind(result: Result<Jwt, Error>) -> DomainErrorKind {
        match result {
            Err(error) => error.error_kind,
            Ok(_) => panic!("expected the login to fail"),
        }
    }

    #[tokio::test]
    #[serial]
    async fn provider_reported_errors_win_over_all_other_validations() {
        let db = mock_db();
        let config = Config::default();

        // No pending state and no code, yet the provider's own error comes first.
        let values = CallbackValues {
            error: Some("access_denied".to_string()),
            error_description: Some("The user denied the request".to_string()),
            ..Default::default()
        };

        let kind = error_kind(
            complete_login(&db, &config, ProviderKind::Google, None, values).await,
        );
        assert_eq!(
            kind,
            DomainErrorKind::Oauth(OauthErrorKind::ProviderReported(
                "The user denied the request".to_string()
            ))
        );
    }

    #[tokio::test]
    #[serial]
    async fn provider_errors_fall_back_to_the_error_code_without_a_description() {
        let db = mock_db();
        let config = Config::default();

        let values = CallbackValues {
            error: Some("access_denied".to_string()),
            ..Default::default()
        };

        let kind = error_kind(
            complete_login(&db, &config, ProviderKind::Google, None, values).await,
        );
        assert_eq!(
            kind,
            DomainErrorKind::Oauth(OauthErrorKind::ProviderReported(
                "access_denied".to_string()
            ))
        );
    }

    #[tokio::test]
    #[serial]
    async fn missing_pending_state_fails_the_state_check() {
        let db = mock_db();
        let config = Config::default();

        let values = CallbackValues {
            code: Some("test_code".to_string()),
            state: Some("returned_state".to_string()),
            ..Default::default()
        };

        let kind =
            error_kind(complete_login(&db, &config, ProviderKind::Google, None, values).await);
        assert_eq!(kind, DomainErrorKind::Oauth(OauthErrorKind::StateMismatch));
    }

    #[tokio::test]
    #[serial]
    async fn mismatched_state_fails_the_state_check() {
        let db = mock_db();
        let config = Config::default();

        let values = CallbackValues {
            code: Some("test_code".to_string()),
            state: Some("attacker_state".to_string()),
            ..Default::default()
        };

        let kind = error_kind(
            complete_login(
                &db,
                &config,
                ProviderKind::Google,
                Some("stored_state".to_string()),
                values,
            )
            .await,
        );
        assert_eq!(kind, DomainErrorKind::Oauth(OauthErrorKind::StateMismatch));
    }

    #[tokio::test]
    #[serial]
    async fn missing_code_fails_after_the_state_check_passes() {
        let db = mock_db();
        let config = Config::default();

        let values = CallbackValues {
            state: Some("stored_state".to_string()),
            ..Default::default()
        };

        let kind = error_kind(
            complete_login(
                &db,
                &config,
                ProviderKind::Google,
                Some("stored_state".to_string()),
                values,
            )
            .await,
        );
        assert_eq!(kind, DomainErrorKind::Oauth(OauthErrorKind::MissingCode));
    }
}
