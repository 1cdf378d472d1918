//! PostgreSQL pool factory and module migration runner.

use std::collections::HashSet;

use anyhow::Context;
use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::Migration;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _bookshelf_migrations (
        module TEXT NOT NULL,
        id TEXT NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (module, id)
    )
"#;

/// Open the shared connection pool.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    tracing::info!(
        target: "bookshelf-db",
        url = %settings.redacted_url(),
        max_connections = settings.max_connections,
        "connecting to database"
    );

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await
        .with_context(|| format!("failed to connect to {}", settings.redacted_url()))
}

/// Build a pool that only connects on first use. Requires a Tokio runtime.
pub fn connect_lazy(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_lazy(&settings.url)
        .with_context(|| format!("invalid database url {}", settings.redacted_url()))
}

/// Apply every migration that has not been recorded yet.
///
/// `migrations` must already be in execution order (see
/// `ModuleRegistry::collect_migrations`). Returns the number applied.
pub async fn run_migrations(pool: &PgPool, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
    pool.execute(MIGRATIONS_TABLE)
        .await
        .context("failed to create migrations table")?;

    let applied: HashSet<(String, String)> =
        sqlx::query_as::<_, (String, String)>("SELECT module, id FROM _bookshelf_migrations")
            .fetch_all(pool)
            .await
            .context("failed to read applied migrations")?
            .into_iter()
            .collect();

    let pending = pending_migrations(migrations, &applied);
    for (module, migration) in &pending {
        tracing::info!(target: "bookshelf-db", module = %module, id = migration.id, "applying migration");

        // Unparameterised so that multi-statement scripts use the simple query protocol.
        pool.execute(migration.up)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;

        sqlx::query("INSERT INTO _bookshelf_migrations (module, id) VALUES ($1, $2)")
            .bind(module.as_str())
            .bind(migration.id)
            .execute(pool)
            .await
            .with_context(|| format!("failed to record migration {}/{}", module, migration.id))?;
    }

    if pending.is_empty() {
        tracing::info!(target: "bookshelf-db", "database schema is up to date");
    }

    Ok(pending.len())
}

fn pending_migrations<'a>(
    migrations: &'a [(String, Migration)],
    applied: &HashSet<(String, String)>,
) -> Vec<&'a (String, Migration)> {
    migrations
        .iter()
        .filter(|(module, migration)| !applied.contains(&(module.clone(), migration.id.to_string())))
        .collect()
}
