use crate::auth::password::HashConfig;
use crate::auth::token::TokenConfig;
use crate::auth::validate::ValidationConfig;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_host: String,
    pub listen_port: u16,
    pub token: TokenConfig,
    pub validation: ValidationConfig,
    pub hashing: HashConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let token = TokenConfig {
            secret: std::env::var("TOKEN_SECRET")?,
            issuer: std::env::var("TOKEN_ISSUER").unwrap_or_else(|_| "rollcall".into()),
            audience: std::env::var("TOKEN_AUDIENCE").unwrap_or_else(|_| "rollcall-users".into()),
            ttl_minutes: env_or("TOKEN_TTL_MINUTES", 60),
        };
        let validation_defaults = ValidationConfig::default();
        let validation = ValidationConfig {
            username_min_len: env_or("USERNAME_MIN_LEN", validation_defaults.username_min_len),
            password_min_len: env_or("PASSWORD_MIN_LEN", validation_defaults.password_min_len),
        };
        let hashing_defaults = HashConfig::default();
        let hashing = HashConfig {
            memory_kib: env_or("ARGON2_MEMORY_KIB", hashing_defaults.memory_kib),
            iterations: env_or("ARGON2_ITERATIONS", hashing_defaults.iterations),
            parallelism: env_or("ARGON2_PARALLELISM", hashing_defaults.parallelism),
        };

        Ok(Self {
            database_url,
            listen_host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            listen_port: env_or("APP_PORT", 8080),
            token,
            validation,
            hashing,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
