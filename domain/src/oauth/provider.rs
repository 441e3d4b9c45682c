//! Identity provider registry for OAuth2 logins.
//!
//! Each supported provider is described by a [`ProviderSettings`] value carrying
//! its endpoint URLs, credentials and scopes, resolved from the application
//! config. Adding a provider means adding a [`ProviderKind`] variant and its
//! settings arm here; the rest of the login flow is provider-agnostic apart
//! from how an email address is pulled out of the userinfo payload.

use crate::error::{DomainErrorKind, Error, InternalErrorKind, OauthErrorKind};
use log::*;
use service::config::Config;
use std::fmt;
use std::str::FromStr;

/// The set of identity providers this service can complete a login against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
    Github,
}

impl FromStr for ProviderKind {
    type Err = Error;
    fn from_str(name: &str) -> Result<ProviderKind, Self::Err> {
        match name.to_lowercase().as_str() {
            "google" => Ok(ProviderKind::Google),
            "github" => Ok(ProviderKind::Github),
            _ => Err(Error {
                source: None,
                error_kind: DomainErrorKind::Oauth(OauthErrorKind::ProviderNotFound),
            }),
        }
    }
}

// The lowercase form doubles as the provider's path segment in callback URLs.
impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProviderKind::Google => write!(f, "google"),
            ProviderKind::Github => write!(f, "github"),
        }
    }
}

/// Endpoint URLs, credentials and scopes for one provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scopes: &'static [&'static str],
}

/// Resolve the settings for a provider from the application config.
///
/// Fails with a config error when the provider's client credentials have not
/// been configured.
pub fn provider_settings(config: &Config, kind: ProviderKind) -> Result<ProviderSettings, Error> {
    match kind {
        ProviderKind::Google => Ok(ProviderSettings {
            kind,
            client_id: config.google_client_id().ok_or_else(|| credentials_error(kind))?,
            client_secret: config
                .google_client_secret()
                .ok_or_else(|| credentials_error(kind))?,
            authorize_url: format!("{}/o/oauth2/auth", config.google_auth_base_url()),
            token_url: format!("{}/o/oauth2/token", config.google_auth_base_url()),
            userinfo_url: format!("{}/oauth2/v3/userinfo", config.google_api_base_url()),
            scopes: &["https://www.googleapis.com/auth/userinfo.email"],
        }),
        ProviderKind::Github => Ok(ProviderSettings {
            kind,
            client_id: config.github_client_id().ok_or_else(|| credentials_error(kind))?,
            client_secret: config
                .github_client_secret()
                .ok_or_else(|| credentials_error(kind))?,
            authorize_url: format!("{}/login/oauth/authorize", config.github_auth_base_url()),
            token_url: format!("{}/login/oauth/access_token", config.github_auth_base_url()),
            userinfo_url: format!("{}/user/emails", config.github_api_base_url()),
            scopes: &["user:email"],
        }),
    }
}

/// The redirect URI registered with the provider for a given kind.
pub fn callback_url(config: &Config, kind: ProviderKind) -> String {
    format!("{}/auth/callback/{}", config.public_base_url(), kind)
}

/// Pull the subject's email address out of a provider's userinfo payload.
///
/// Google returns a flat object carrying an `email` field. GitHub returns an
/// array of email records and the first entry's `email` field is used.
pub fn extract_email(kind: ProviderKind, payload: &serde_json::Value) -> Option<String> {
    match kind {
        ProviderKind::Google => payload.get("email")?.as_str().map(str::to_string),
        ProviderKind::Github => payload.get(0)?.get("email")?.as_str().map(str::to_string),
    }
}

fn credentials_error(kind: ProviderKind) -> Error {
    warn!("Failed to get {kind} OAuth client credentials from config");
    Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use std::env;

    #[test]
    fn provider_kind_parses_known_names_case_insensitively() {
        assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
        assert_eq!("GitHub".parse::<ProviderKind>().unwrap(), ProviderKind::Github);
    }

    #[test]
    fn provider_kind_rejects_unknown_names() {
        let result = "gitlab".parse::<ProviderKind>();

        match result {
            Err(error) => assert_eq!(
                error.error_kind,
                DomainErrorKind::Oauth(OauthErrorKind::ProviderNotFound)
            ),
            Ok(_) => panic!("expected a ProviderNotFound error"),
        }
    }

    #[test]
    fn extract_email_reads_googles_flat_payload() {
        let payload = json!({"sub": "1234", "email": "test@test.com", "email_verified": true});
        assert_eq!(
            extract_email(ProviderKind::Google, &payload),
            Some("test@test.com".to_string())
        );
    }

    #[test]
    fn extract_email_reads_the_first_github_email_record() {
        let payload = json!([
            {"email": "primary@test.com", "primary": true, "verified": true},
            {"email": "secondary@test.com", "primary": false, "verified": true}
        ]);
        assert_eq!(
            extract_email(ProviderKind::Github, &payload),
            Some("primary@test.com".to_string())
        );
    }

    #[test]
    fn extract_email_returns_none_for_unusable_payloads() {
        assert_eq!(extract_email(ProviderKind::Google, &json!({"sub": "1234"})), None);
        assert_eq!(extract_email(ProviderKind::Github, &json!([])), None);
        assert_eq!(extract_email(ProviderKind::Github, &json!({"email": "x@y.com"})), None);
    }

    #[test]
    #[serial]
    fn provider_settings_resolves_google_endpoints() {
        env::set_var("GOOGLE_CLIENT_ID", "google_client_id");
        env::set_var("GOOGLE_CLIENT_SECRET", "google_client_secret");
        let config = Config::default();

        let settings = provider_settings(&config, ProviderKind::Google).unwrap();

        assert_eq!(settings.client_id, "google_client_id");
        assert_eq!(
            settings.authorize_url,
            "https://accounts.google.com/o/oauth2/auth"
        );
        assert_eq!(
            settings.token_url,
            "https://accounts.google.com/o/oauth2/token"
        );
        assert_eq!(
            settings.userinfo_url,
            "https://www.googleapis.com/oauth2/v3/userinfo"
        );
    }

    #[test]
    #[serial]
    fn provider_settings_resolves_github_endpoints() {
        env::set_var("GITHUB_CLIENT_ID", "github_client_id");
        env::set_var("GITHUB_CLIENT_SECRET", "github_client_secret");
        let config = Config::default();

        let settings = provider_settings(&config, ProviderKind::Github).unwrap();

        assert_eq!(settings.client_id, "github_client_id");
        assert_eq!(
            settings.authorize_url,
            "https://github.com/login/oauth/authorize"
        );
        assert_eq!(
            settings.token_url,
            "https://github.com/login/oauth/access_token"
        );
        assert_eq!(settings.userinfo_url, "https://api.github.com/user/emails");
    }

    #[test]
    #[serial]
    fn provider_settings_requires_client_credentials() {
        env::remove_var("GOOGLE_CLIENT_ID");
        env::remove_var("GOOGLE_CLIENT_SECRET");
        let config = Config::default();

        let result = provider_settings(&config, ProviderKind::Google);

        match result {
            Err(error) => assert_eq!(
                error.error_kind,
                DomainErrorKind::Internal(InternalErrorKind::Config)
            ),
            Ok(_) => panic!("expected a config error"),
        }
    }

    #[test]
    #[serial]
    fn callback_url_names_the_provider_path_segment() {
        let config = Config::default();
        assert_eq!(
            callback_url(&config, ProviderKind::Github),
            "http://localhost:4000/auth/callback/github"
        );
    }
}
