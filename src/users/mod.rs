use crate::errors::AuthError;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub mod postgres;

#[cfg(test)]
pub mod memory;

/// User record as stored. Username and email are unique across all users;
/// `password_hash` only ever holds an Argon2 hash and is never serialized.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields the caller supplies for a new user; id and timestamps are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Persistence capabilities the auth service needs. Concrete stores are
/// injected at construction so tests can substitute an in-memory fake.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Inserts a new record and returns it as stored. Uniqueness of username
    /// and email is enforced atomically at the storage layer; a violation
    /// surfaces as `AuthError::Conflict`, which closes the race between the
    /// service's pre-checks and the insert.
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;

    /// Fails with `AuthError::NotFound` if no user has this username.
    async fn get_by_username(&self, username: &str) -> Result<User, AuthError>;

    /// Fails with `AuthError::NotFound` if no user has this email.
    async fn get_by_email(&self, email: &str) -> Result<User, AuthError>;

    /// Deletes every user. Test teardown only, not part of the production
    /// contract.
    async fn truncate(&self) -> Result<(), AuthError>;
}
