use anyhow::Context;
use std::sync::Arc;

use bookstore_db::Database;

use crate::module::{InitCtx, Migration, Module};

/// Module registry managing lifecycle in registration order
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module with the registry
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.push(module);
    }

    /// Get all registered modules
    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    /// Get a module by name
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Initialize modules in registration order
    pub async fn init_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start modules in registration order
    pub async fn start_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("starting {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop modules in reverse registration order
    pub async fn stop_modules(&self) -> anyhow::Result<()> {
        tracing::info!("stopping {} modules", self.modules.len());

        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Collect all migrations from all modules
    pub fn collect_migrations(&self) -> Vec<(String, Migration)> {
        let mut migrations = Vec::new();

        for module in &self.modules {
            for migration in module.migrations() {
                migrations.push((module.name().to_string(), migration));
            }
        }

        // Sort by module name and migration ID for deterministic ordering
        migrations.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(b.1.id)));

        migrations
    }

    /// Apply every pending migration, returning how many ran
    pub async fn apply_migrations(&self, db: &Database) -> anyhow::Result<usize> {
        let mut applied = 0;

        for (module, migration) in self.collect_migrations() {
            if db.apply_migration(&module, migration.id, migration.up).await? {
                applied += 1;
            }
        }

        tracing::info!(applied, "migrations complete");
        Ok(applied)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
