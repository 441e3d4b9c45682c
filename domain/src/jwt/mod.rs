//! This module provides functionality for handling JSON Web Tokens (JWTs) within the domain layer.
//! It includes the definition of claims used in JWTs, as well as functions for generating and validating tokens.
//!
//! The primary use case for this module is to mint access tokens for users that have completed
//! a social login, and to verify those tokens when they are presented back to the API. Tokens
//! are signed with the HS256 algorithm using the configured secret key.
//!
//! The module also re-exports the `Jwt` struct from the `entity` module for convenience.
//!
//! # Example
//!
//! ```rust
//! use domain::jwt::generate_access_token;
//! use entity::Id;
//! use service::config::Config;
//!
//! fn example(config: &Config, user_id: Id) {
//!     match generate_access_token(config, user_id) {
//!         Ok(jwt) => println!("Generated JWT: {:?}", jwt),
//!         Err(e) => eprintln!("Error generating JWT: {:?}", e),
//!     }
//! }
//! ```

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use chrono::{Duration, Utc};
use claims::AccessTokenClaims;
use entity::Id;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use service::config::Config;

// re-export the Jwt struct from the entity module
pub use entity::jwt::Jwt;

pub(crate) mod claims;

/// Generates an access token for a user that has completed a login.
///
/// The token's subject is the user's id and its lifetime comes from the
/// configured access token expiry.
pub fn generate_access_token(config: &Config, user_id: Id) -> Result<Jwt, Error> {
    let secret_key = config.jwt_secret_key().ok_or_else(|| {
        warn!("Failed to get JWT secret key from config");
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    })?;

    let now = Utc::now();
    let expires_at = now + Duration::minutes(config.access_token_expiry_minutes);

    let claims = AccessTokenClaims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };

    // Encode the claims into a JWT
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret_key.as_bytes()),
    )?;

    Ok(Jwt {
        token,
        sub: claims.sub,
    })
}

/// Verifies a presented access token and returns the user id it names.
///
/// Fails if the signature is invalid, the token is expired, or the subject
/// claim is not a valid user id.
pub fn verify_access_token(config: &Config, token: &str) -> Result<Id, Error> {
    let secret_key = config.jwt_secret_key().ok_or_else(|| {
        warn!("Failed to get JWT secret key from config");
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    })?;

    let token_data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret_key.as_bytes()),
        &Validation::default(),
    )?;

    Ok(entity_api::uuid_parse_str(&token_data.claims.sub)?)
}
