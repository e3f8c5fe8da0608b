use async_trait::async_trait;
use axum::Router;
use bookstore_db::Database;

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
    pub db: &'a Database,
}

/// Migration definition for modules
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Core module trait that all bookstore modules must implement
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module
    fn name(&self) -> &'static str;

    /// Initialize the module with the provided context
    /// Called during application startup after migrations
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the Axum router for this module's routes
    /// Routes will be mounted under `/{module_name}`
    fn routes(&self, _ctx: &InitCtx<'_>) -> Router {
        Router::new()
    }

    /// Return the OpenAPI document describing this module's routes
    /// Will be merged with other modules' documents
    fn openapi(&self) -> Option<utoipa::openapi::OpenApi> {
        None
    }

    /// Return migrations contributed by this module
    ///
    /// The registry applies migrations from all modules sorted by module
    /// name, then by id, regardless of the order returned here.
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Start background tasks for this module
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources
    /// Called during application shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
