//! Bookstore application library
//!
//! Provides the `books` module and the service lifecycle shared by the
//! `bookstore-app` binary and the CLI.

pub mod modules;
pub mod utils;

use anyhow::Context;
use bookstore_db::Database;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::*;

/// Registry holding every application module
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Open the store for the active environment.
pub async fn open_database(settings: &Settings) -> anyhow::Result<Database> {
    let url = settings.database_url();
    Database::connect(&url, settings.database.max_connections)
        .await
        .with_context(|| format!("failed to open store for {:?}", settings.environment))
}

/// Run the service until a shutdown signal arrives.
///
/// The store is closed on every exit path once it has been opened.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let db = open_database(settings).await?;
    run_with(settings, &db).await
}

/// Run the service over an already-open store, closing it on the way out.
pub async fn run_with(settings: &Settings, db: &Database) -> anyhow::Result<()> {
    let result = serve(settings, db).await;
    db.close().await;
    result
}

/// Apply pending migrations and exit.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let db = open_database(settings).await?;
    let result = registry().apply_migrations(&db).await;
    db.close().await;
    result
}

async fn serve(settings: &Settings, db: &Database) -> anyhow::Result<()> {
    let registry = registry();
    registry
        .apply_migrations(db)
        .await
        .context("failed to apply migrations")?;

    let ctx = InitCtx { settings, db };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served =
        bookstore_http::start_server(&registry, &ctx, bookstore_http::shutdown_signal()).await;
    let stopped = registry.stop_modules().await;

    served.and(stopped)
}
