use serde::Serialize;
use time::OffsetDateTime;

use super::repo::User;
use crate::{
    error::AppResult,
    id::ObjectId,
    validation::{Payload, Validate},
};

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// `GET /users/:userId`
#[derive(Debug)]
pub struct UserIdPath {
    pub user_id: ObjectId,
}

impl Validate for UserIdPath {
    fn validate(p: &Payload) -> AppResult<Self> {
        let user_id = p.field("userId").required()?.object_id()?;
        Ok(Self { user_id })
    }
}
