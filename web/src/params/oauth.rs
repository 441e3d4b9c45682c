use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters a provider appends when redirecting back to our callback endpoint.
///
/// On success the provider sends `code` and echoes the `state` we passed along with the
/// consent redirect. On failure it sends `error` and, for most providers, a human readable
/// `error_description` instead.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct CallbackParams {
    pub(crate) code: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) error: Option<String>,
    pub(crate) error_description: Option<String>,
}
