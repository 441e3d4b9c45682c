use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;

use entity::users::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};

pub async fn create(db: &impl ConnectionTrait, username: &str, email: &str) -> Result<Model, Error> {
    debug!("New User Model to be inserted: username: {username}, email: {email}");

    let now = Utc::now();
    let user_active_model: ActiveModel = ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(user_active_model.insert(db).await?)
}

pub async fn find_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    match Entity::find_by_id(id).one(db).await? {
        Some(user) => Ok(user),
        None => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }),
    }
}
