use crate::auth::password::Hasher;
use crate::auth::service::AuthService;
use crate::auth::token::TokenIssuer;
use crate::auth::validate::Validator;
use crate::config::AppConfig;
use crate::db;
use crate::users::postgres::PgUserRepo;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = db::connect(&config.database_url).await?;
        Self::from_parts(pool, config)
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let repo = Arc::new(PgUserRepo::new(db.clone()));
        let auth = AuthService::new(
            repo,
            Validator::new(config.validation.clone()),
            Hasher::new(&config.hashing)?,
            TokenIssuer::new(&config.token),
        );
        Ok(Self { db, config, auth })
    }
}
