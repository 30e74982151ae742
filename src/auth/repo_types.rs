use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String, // Argon2 hash, never serialized
    pub full_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

/// Fields accepted when creating a user.
#[derive(Debug, Clone, Default)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub full_name: Option<&'a str>,
    pub age: Option<i32>,
    pub gender: Option<&'a str>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
}

/// Profile returned by `/users/me`; also the shape kept in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            full_name: u.full_name,
            age: u.age,
            gender: u.gender,
            height_cm: u.height_cm,
            weight_kg: u.weight_kg,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}
