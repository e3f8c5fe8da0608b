//! HTTP server facade for the bookstore service with Axum, error handling, and OpenAPI support.

use std::future::Future;

use anyhow::Context;
use axum::{routing::get, Router};

use bookstore_kernel::{InitCtx, ModuleRegistry};

pub mod error;
pub mod router;

use router::RouterBuilder;

/// Start the HTTP server and serve until `shutdown` resolves
pub async fn start_server<F>(
    registry: &ModuleRegistry,
    ctx: &InitCtx<'_>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let server = &ctx.settings.server;
    tracing::info!("starting HTTP server on {}:{}", server.host, server.port);

    let app = build_router(registry, ctx);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", server.host, server.port))
        .await
        .context("failed to bind to address")?;

    tracing::info!(
        "HTTP server listening on http://{}",
        listener
            .local_addr()
            .context("failed to read listener address")?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, ctx: &InitCtx<'_>) -> Router {
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        let module_name = module.name();
        tracing::info!(
            module = module_name,
            "mounting module routes under /{}",
            module_name
        );
        router_builder = router_builder.mount_module(module_name, module.routes(ctx));
    }

    router_builder
        .with_openapi(registry)
        .with_fallback()
        .with_timeout(ctx.settings.server.request_timeout_ms)
        .with_tracing()
        .with_request_id()
        .with_cors()
        .build()
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
