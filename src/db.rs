use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::{info, warn};

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")?;
    Ok(pool)
}

/// One versioned schema change. The matching `*.down.sql` files live next to
/// the up scripts in `migrations/` for manual rollback; the runner only ever
/// moves forward.
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up: &'static str,
}

/// Versioned migration runner with golang-migrate style bookkeeping: a
/// single-row `schema_migrations (version, dirty)` table. A migration is
/// marked dirty before its SQL runs and clean after, so a crash mid-apply is
/// visible on the next start.
pub struct Migrator {
    migrations: Vec<Migration>,
}

impl Migrator {
    pub fn embedded() -> Self {
        Self {
            migrations: vec![Migration {
                version: 1,
                name: "create_users",
                up: include_str!("../migrations/0001_create_users.up.sql"),
            }],
        }
    }

    /// Applies all pending migrations. Idempotent: nothing pending is a
    /// success. A dirty state is recovered by forcing the recorded version
    /// back one step (or to zero) and reapplying from there; blunt, since a
    /// half-applied change made outside this runner can still be lost.
    pub async fn run(&self, pool: &PgPool) -> anyhow::Result<()> {
        pool.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (version bigint NOT NULL, dirty boolean NOT NULL)",
        )
        .await
        .context("create schema_migrations table")?;

        let state: Option<(i64, bool)> =
            sqlx::query_as("SELECT version, dirty FROM schema_migrations LIMIT 1")
                .fetch_optional(pool)
                .await
                .context("read migration state")?;

        let (mut version, dirty) = match state {
            Some(row) => row,
            None => {
                sqlx::query("INSERT INTO schema_migrations (version, dirty) VALUES (0, false)")
                    .execute(pool)
                    .await
                    .context("seed migration state")?;
                (0, false)
            }
        };

        if dirty {
            let target = recovery_target(version);
            warn!(version, target, "dirty migration state, forcing version back");
            sqlx::query("UPDATE schema_migrations SET version = $1, dirty = false")
                .bind(target)
                .execute(pool)
                .await
                .context("force migration version")?;
            version = target;
        }

        let pending: Vec<&Migration> = self
            .migrations
            .iter()
            .filter(|m| m.version > version)
            .collect();

        if pending.is_empty() {
            info!(version, "no pending migrations");
            return Ok(());
        }

        for migration in pending {
            info!(version = migration.version, name = migration.name, "applying migration");

            sqlx::query("UPDATE schema_migrations SET version = $1, dirty = true")
                .bind(migration.version)
                .execute(pool)
                .await
                .context("mark migration dirty")?;

            pool.execute(migration.up)
                .await
                .with_context(|| format!("apply migration {} {}", migration.version, migration.name))?;

            sqlx::query("UPDATE schema_migrations SET version = $1, dirty = false")
                .bind(migration.version)
                .execute(pool)
                .await
                .context("mark migration clean")?;
        }

        info!("migration complete");
        Ok(())
    }
}

/// Where to force the version when the state is dirty: one step back, or
/// zero when already at the earliest version.
fn recovery_target(version: i64) -> i64 {
    if version > 1 {
        version - 1
    } else {
        0
    }
}
