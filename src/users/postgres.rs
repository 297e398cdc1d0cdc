use crate::errors::AuthError;
use crate::users::{NewUser, User, UserRepo};
use async_trait::async_trait;
use sqlx::PgPool;

/// `UserRepo` backed by Postgres. The unique constraints on
/// `users.username` and `users.email` are the source of truth for
/// uniqueness; see the migration in `migrations/`.
#[derive(Clone)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AuthError::Internal(anyhow::Error::new(e).context("begin transaction")))?;

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, name, password_hash, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(AuthError::from_insert)?;

        tx.commit()
            .await
            .map_err(|e| AuthError::Internal(anyhow::Error::new(e).context("commit transaction")))?;

        Ok(created)
    }

    async fn get_by_username(&self, username: &str) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, name, password_hash, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Internal(anyhow::Error::new(e).context("select by username")))?;

        user.ok_or(AuthError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, name, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Internal(anyhow::Error::new(e).context("select by email")))?;

        user.ok_or(AuthError::NotFound)
    }

    async fn truncate(&self) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Internal(anyhow::Error::new(e).context("truncate users")))?;
        Ok(())
    }
}

impl std::fmt::Debug for PgUserRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgUserRepo").finish_non_exhaustive()
    }
}
