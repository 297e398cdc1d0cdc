use crate::auth::password::Hasher;
use crate::auth::token::TokenIssuer;
use crate::auth::validate::{LoginInput, RegisterInput, Validator};
use crate::errors::{AuthError, ConflictField};
use crate::users::{NewUser, User, UserRepo};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of a successful register or login: a signed access token plus the
/// user as stored. The password hash is stripped by `User`'s serialization.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

/// Register/login orchestration over an injected `UserRepo`.
///
/// Each call is stateless; the only cross-request hazard is the
/// check-then-insert race on registration, which the repository closes with
/// its storage-level uniqueness constraint.
#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepo>,
    validator: Validator,
    hasher: Hasher,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(
        repo: Arc<dyn UserRepo>,
        validator: Validator,
        hasher: Hasher,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            repo,
            validator,
            hasher,
            tokens,
        }
    }

    /// Registers a new user. On success exactly one row was created; any
    /// failure leaves the store untouched.
    ///
    /// Uniqueness pre-checks run username-then-email, so a request where
    /// both are taken always reports the username first. A conflict raised
    /// by the insert itself (two registrations racing past the pre-checks)
    /// is mapped to the same taken errors.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, mut input: RegisterInput) -> Result<AuthResponse, AuthError> {
        input.sanitize();
        self.validator.validate_register(&input)?;

        match self.repo.get_by_username(&input.username).await {
            Err(AuthError::NotFound) => {}
            Ok(_) => return Err(AuthError::UsernameTaken),
            Err(err) => return Err(err),
        }

        match self.repo.get_by_email(&input.email).await {
            Err(AuthError::NotFound) => {}
            Ok(_) => return Err(AuthError::EmailTaken),
            Err(err) => return Err(err),
        }

        // Hashing failure aborts before any persistence attempt.
        let password_hash = self
            .hasher
            .hash(&input.password)
            .map_err(|e| AuthError::Internal(e.context("hash password")))?;

        let user = match self
            .repo
            .create(NewUser {
                name: input.name,
                username: input.username,
                email: input.email,
                password_hash,
            })
            .await
        {
            Ok(user) => user,
            Err(AuthError::Conflict {
                field: ConflictField::Username,
            }) => return Err(AuthError::UsernameTaken),
            Err(AuthError::Conflict {
                field: ConflictField::Email,
            }) => return Err(AuthError::EmailTaken),
            Err(err) => return Err(err),
        };

        let access_token = self
            .tokens
            .issue(user.id)
            .map_err(|e| AuthError::Internal(e.context("issue access token")))?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(AuthResponse { access_token, user })
    }

    /// Authenticates by email and password. An unknown email and a wrong
    /// password both fail with `BadCredentials` so callers cannot enumerate
    /// accounts. No side effects beyond the lookup.
    #[instrument(skip(self, input))]
    pub async fn login(&self, mut input: LoginInput) -> Result<AuthResponse, AuthError> {
        input.sanitize();
        self.validator.validate_login(&input)?;

        let user = match self.repo.get_by_email(&input.email).await {
            Ok(user) => user,
            Err(AuthError::NotFound) => return Err(AuthError::BadCredentials),
            Err(err) => return Err(err),
        };

        let matches = self
            .hasher
            .verify(&input.password, &user.password_hash)
            .map_err(|e| AuthError::Internal(e.context("verify password")))?;
        if !matches {
            return Err(AuthError::BadCredentials);
        }

        let access_token = self
            .tokens
            .issue(user.id)
            .map_err(|e| AuthError::Internal(e.context("issue access token")))?;

        info!(user_id = %user.id, "user logged in");
        Ok(AuthResponse { access_token, user })
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::HashConfig;
    use crate::auth::token::TokenConfig;
    use crate::auth::validate::ValidationConfig;
    use crate::users::memory::InMemoryUserRepo;

    fn service() -> (AuthService, Arc<InMemoryUserRepo>) {
        let repo = Arc::new(InMemoryUserRepo::new());
        let service = AuthService::new(
            repo.clone(),
            Validator::new(ValidationConfig::default()),
            Hasher::new(&HashConfig::fast()).expect("fast params are valid"),
            TokenIssuer::new(&TokenConfig {
                secret: "test-secret".to_string(),
                issuer: "test-issuer".to_string(),
                audience: "test-aud".to_string(),
                ttl_minutes: 5,
            }),
        );
        (service, repo)
    }

    fn valid_input() -> RegisterInput {
        RegisterInput {
            username: "doubleO7".to_string(),
            name: "James Bond".to_string(),
            email: "james.bond007@mi.six".to_string(),
            password: "password".to_string(),
            confirm_password: "password".to_string(),
        }
    }

    #[tokio::test]
    async fn register_creates_a_user() {
        let (service, _repo) = service();

        let res = service.register(valid_input()).await.expect("register");

        assert!(!res.user.id.is_nil());
        assert_eq!(res.user.email, "james.bond007@mi.six");
        assert_ne!(res.user.password_hash, "password");
        assert!(!res.access_token.is_empty());
    }

    #[tokio::test]
    async fn register_sanitizes_before_persisting() {
        let (service, _repo) = service();

        let res = service
            .register(RegisterInput {
                username: " Bob ".to_string(),
                email: " BOB@email.com ".to_string(),
                ..valid_input()
            })
            .await
            .expect("register");

        assert_eq!(res.user.username, "Bob");
        assert_eq!(res.user.email, "bob@email.com");
    }

    #[tokio::test]
    async fn register_rejects_invalid_input_without_side_effects() {
        let (service, repo) = service();

        let err = service
            .register(RegisterInput {
                confirm_password: "different".to_string(),
                ..valid_input()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let (service, repo) = service();

        service.register(valid_input()).await.expect("first register");

        let err = service
            .register(RegisterInput {
                username: "doubleO7".to_string(),
                name: "Jackson Green".to_string(),
                email: "james.bond008@mi.six".to_string(),
                password: "password".to_string(),
                confirm_password: "password".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::UsernameTaken));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let (service, _repo) = service();

        service.register(valid_input()).await.expect("first register");

        let err = service
            .register(RegisterInput {
                username: "doubleO8".to_string(),
                ..valid_input()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn register_reports_username_before_email_when_both_taken() {
        let (service, _repo) = service();

        service.register(valid_input()).await.expect("first register");

        let err = service.register(valid_input()).await.unwrap_err();

        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[tokio::test]
    async fn login_with_correct_credentials() {
        let (service, _repo) = service();
        service.register(valid_input()).await.expect("register");

        let res = service
            .login(LoginInput {
                email: "james.bond007@mi.six".to_string(),
                password: "password".to_string(),
            })
            .await
            .expect("login");

        assert_eq!(res.user.email, "james.bond007@mi.six");
        assert!(!res.access_token.is_empty());
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails_with_bad_credentials() {
        let (service, _repo) = service();
        service.register(valid_input()).await.expect("register");

        let err = service
            .login(LoginInput {
                email: "james.bond007@mi.six".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::BadCredentials));
    }

    #[tokio::test]
    async fn login_with_unknown_email_fails_with_bad_credentials() {
        let (service, _repo) = service();

        let err = service
            .login(LoginInput {
                email: "nobody@nowhere.net".to_string(),
                password: "password".to_string(),
            })
            .await
            .unwrap_err();

        // Deliberately not NotFound, so accounts cannot be enumerated.
        assert!(matches!(err, AuthError::BadCredentials));
    }

    #[tokio::test]
    async fn concurrent_registration_with_same_username_creates_one_row() {
        let (service, repo) = service();

        let first = service.register(valid_input());
        let second = service.register(RegisterInput {
            email: "james.bond008@mi.six".to_string(),
            ..valid_input()
        });

        let (a, b) = tokio::join!(first, second);

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1, "exactly one registration may win");
        assert_eq!(repo.len(), 1, "no duplicate row");

        for result in [a, b] {
            if let Err(err) = result {
                assert!(
                    matches!(err, AuthError::UsernameTaken | AuthError::Conflict { .. }),
                    "loser must see a taken/conflict error, got {err:?}"
                );
            }
        }
    }
}
