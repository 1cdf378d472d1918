//! Bookshelf application library
//!
//! Wires the application modules onto the kernel, database and HTTP crates.

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::PgPool;

pub mod modules;

/// Build the registry with every application module over `pool`.
pub fn build_registry(pool: PgPool) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, pool);
    registry
}

/// Apply pending module migrations and return how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let pool = bookshelf_db::connect(&settings.database).await?;
    let registry = build_registry(pool.clone());

    let applied = bookshelf_db::run_migrations(&pool, &registry.collect_migrations()).await?;
    pool.close().await;
    Ok(applied)
}

/// Connect, migrate, and serve HTTP until a shutdown signal arrives.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let pool = bookshelf_db::connect(&settings.database).await?;
    let registry = build_registry(pool.clone());

    bookshelf_db::run_migrations(&pool, &registry.collect_migrations())
        .await
        .context("failed to migrate database")?;

    let ctx = InitCtx { settings };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, settings, bookshelf_http::shutdown_signal()).await;

    registry.stop_modules().await?;
    pool.close().await;
    served
}

/// `METHOD path` lines for every documented route, sorted by path.
pub fn route_table(settings: &Settings) -> anyhow::Result<Vec<String>> {
    // Never used for queries; only needed to construct the modules.
    let pool = bookshelf_db::connect_lazy(&settings.database)?;
    let registry = build_registry(pool);
    let document = bookshelf_http::router::openapi_document(&registry, &settings.server.base_path);

    let mut lines = Vec::new();
    if let Some(paths) = document["paths"].as_object() {
        for (path, item) in paths {
            if let Some(methods) = item.as_object() {
                for method in methods.keys() {
                    lines.push(format!("{:<7} {}", method.to_uppercase(), path));
                }
            }
        }
    }
    Ok(lines)
}
