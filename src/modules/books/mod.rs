pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Migration, Module};
use utoipa::OpenApi;

use repository::BookRepository;

/// OpenAPI description of the `/books` routes
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::list_books,
        routes::get_book,
        routes::create_book,
        routes::update_book,
        routes::delete_book,
    ),
    components(schemas(
        models::Book,
        models::BookChanges,
        models::BookResponse,
        models::BooksResponse,
        models::MessageResponse,
        bookstore_http::error::ValidationBody,
        bookstore_http::error::ErrorBody,
        bookstore_http::error::ErrorDetail,
    )),
    tags((name = "books", description = "CRUD over books keyed by ISBN"))
)]
struct BooksApi;

/// The `books` resource: table, repository, and HTTP routes
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        routes::router(BookRepository::new(ctx.db.pool().clone()))
    }

    fn openapi(&self) -> Option<utoipa::openapi::OpenApi> {
        Some(BooksApi::openapi())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    isbn TEXT PRIMARY KEY,
                    amazon_url TEXT NOT NULL,
                    author TEXT NOT NULL,
                    language TEXT NOT NULL,
                    pages INTEGER NOT NULL,
                    publisher TEXT NOT NULL,
                    title TEXT NOT NULL,
                    year INTEGER NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_every_route() {
        let doc = BooksModule::new().openapi().unwrap();
        assert!(doc.paths.paths.contains_key("/books"));
        assert!(doc.paths.paths.contains_key("/books/{isbn}"));
    }

    #[test]
    fn contributes_books_table_migration() {
        let migrations = BooksModule::new().migrations();
        assert_eq!(migrations.len(), 1);
        assert!(migrations[0].up.contains("CREATE TABLE IF NOT EXISTS books"));
    }
}
