//! This module defines the claims used in JSON Web Tokens (JWTs) within the domain layer.
//!
//! The current implementation includes `AccessTokenClaims`, the registered claims
//! minted into every login access token. New claim types can be added here as
//! other token kinds become necessary.

use serde::{Deserialize, Serialize};

/// Represents the claims carried by a login access token.
///
/// `sub` holds the user's id, `iat` the issue time and `exp` the expiry time,
/// both as Unix timestamps in seconds.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AccessTokenClaims {
    pub(crate) sub: String,
    pub(crate) iat: usize,
    pub(crate) exp: usize,
}
