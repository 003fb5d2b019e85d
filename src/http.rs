mod authors;
mod books;
pub mod handler;

use crate::repositories::Store;
use anyhow::Context;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug)]
pub struct AppState<S: Store> {
    store: Arc<S>,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }
}

impl<S: Store> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

#[derive(Debug)]
pub struct HttpServerConfig {
    port: u16,
}

impl HttpServerConfig {
    pub const fn new(port: u16) -> Self {
        Self { port }
    }
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<S: Store>(state: AppState<S>, config: HttpServerConfig) -> anyhow::Result<Self> {
        let router = router(state);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("Failed to bind to port {}", config.port))?;

        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self
            .listener
            .local_addr()
            .context("Failed to read listener address")?;
        info!("listening on {addr}");

        axum::serve(self.listener, self.router)
            .await
            .context("Received error from running server")?;
        Ok(())
    }
}

/// The full application router, with request tracing.
pub fn router<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/books",
            get(books::list_books::<S>)
                .post(books::create_book::<S>)
                .delete(books::delete_books_by_title::<S>),
        )
        .route(
            "/books/{id}",
            get(books::get_book::<S>)
                .put(books::update_book::<S>)
                .delete(books::delete_book::<S>),
        )
        .route(
            "/authors",
            get(authors::list_authors::<S>).post(authors::create_author::<S>),
        )
        .route(
            "/author/{id}",
            get(authors::get_author::<S>)
                .put(authors::update_author::<S>)
                .delete(authors::delete_author::<S>),
        )
        .route(
            "/authors/{author_id}/books",
            get(authors::list_author_books::<S>).delete(authors::delete_author_books::<S>),
        )
}
