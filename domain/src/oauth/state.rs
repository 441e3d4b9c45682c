//! CSRF state tokens for OAuth2 login flows.
//!
//! A fresh token is generated when a login begins and stored in the caller's
//! session. The provider echoes it back on the callback, where it is compared
//! against the stored value and consumed.

use rand::Rng;

/// Generate a cryptographically random state token.
pub fn generate_state_token() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}
