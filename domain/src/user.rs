use crate::{error::Error, users, Id};
use entity_api::error::EntityApiErrorKind;
use entity_api::user;
use log::*;
use sea_orm::DatabaseConnection;

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<users::Model, Error> {
    Ok(user::find_by_id(db, id).await?)
}

/// Find the user a social login resolves to, creating one on first login.
///
/// A new user's username is the local part of their email address. Two first
/// logins racing on the same email are settled by the unique constraint on
/// email: the losing insert re-reads the winner's row.
pub async fn find_or_create_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<users::Model, Error> {
    if let Some(existing_user) = user::find_by_email(db, email).await? {
        debug!("Resolved email to existing user {}", existing_user.id);
        return Ok(existing_user);
    }

    match user::create(db, derive_username(email), email).await {
        Ok(created_user) => {
            info!("Created user {} on first social login", created_user.id);
            Ok(created_user)
        }
        Err(err) if err.error_kind == EntityApiErrorKind::UniqueViolation => {
            match user::find_by_email(db, email).await? {
                Some(existing_user) => Ok(existing_user),
                None => Err(err.into()),
            }
        }
        Err(err) => Err(err.into()),
    }
}

fn derive_username(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
