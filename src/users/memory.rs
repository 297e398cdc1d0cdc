use crate::errors::{AuthError, ConflictField};
use crate::users::{NewUser, User, UserRepo};
use async_trait::async_trait;
use std::sync::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

/// In-memory `UserRepo` for unit tests. Uniqueness is checked and the row
/// inserted under one lock, mirroring the atomicity the database constraint
/// gives the Postgres repo.
#[derive(Debug, Default)]
pub struct InMemoryUserRepo {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.username == user.username) {
            return Err(AuthError::Conflict {
                field: ConflictField::Username,
            });
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::Conflict {
                field: ConflictField::Email,
            });
        }

        let now = OffsetDateTime::now_utc();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn get_by_username(&self, username: &str) -> Result<User, AuthError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(AuthError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, AuthError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(AuthError::NotFound)
    }

    async fn truncate(&self) -> Result<(), AuthError> {
        self.users.lock().unwrap().clear();
        Ok(())
    }
}
