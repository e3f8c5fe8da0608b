//! Router builder for the bookstore HTTP server
//!
//! `axum` layers only wrap the routes that exist when they are applied, so
//! routes and the fallback are added first and middleware last.

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};
use uuid::{Timestamp, Uuid};

use bookstore_kernel::ModuleRegistry;

use crate::error::not_found_fallback;

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let path = format!("/{}", module_name);
        self.router = self.router.nest(&path, module_router);
        self
    }

    /// Answer unmatched paths with the standard 404 body
    pub fn with_fallback(mut self) -> Self {
        self.router = self.router.fallback(not_found_fallback);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Set `x-request-id` on incoming requests and echo it on responses
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Answer requests slower than `timeout_ms` with 408
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self.router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(timeout_ms),
        ));
        self
    }

    /// Serve the merged OpenAPI document of every module at `/docs/openapi.json`
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi = merged_openapi(registry);
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi) }),
        );
        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge the documents contributed by all modules into one
pub fn merged_openapi(registry: &ModuleRegistry) -> OpenApi {
    let mut openapi = OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Bookstore API")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("CRUD over the books resource"))
                .build(),
        )
        .build();

    for module in registry.modules() {
        if let Some(module_spec) = module.openapi() {
            tracing::debug!(module = module.name(), "merging module OpenAPI document");
            openapi.merge(module_spec);
        }
    }

    openapi
}

/// Request ID generator producing time-ordered UUIDs
#[derive(Clone, Copy, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
