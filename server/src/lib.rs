//! HTTP CRUD service for todo items.
//!
//! # Overview
//! A single collection of todo records behind five routes. Handlers are
//! stateless; the only shared value is the store handle carried in
//! `AppState`.
//!
//! # Design
//! - The store is opened explicitly by the caller (`store::connect`) and
//!   closed explicitly after the server stops.
//! - `TodoItem` is the one canonical record shape; legacy field names are
//!   accepted on input only (see `model`).
//! - Store failures become 500 responses carrying the error text; a missing
//!   id becomes a 404. Nothing is retried.

pub mod config;
pub mod error;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod store;
pub mod telemetry;

use std::future::Future;
use std::sync::Arc;

use axum::{middleware::from_fn, middleware::from_fn_with_state, routing::get, Router};
use tokio::net::TcpListener;

pub use config::ServerConfig;
pub use error::{ApiError, StoreError};
pub use middleware::CorsPolicy;
pub use model::{Deleted, TodoItem};
pub use store::{MemoryStore, SqliteStore, TodoStore};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub cors: Arc<CorsPolicy>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, cors: CorsPolicy) -> Self {
        Self {
            store,
            cors: Arc::new(cors),
        }
    }

    /// Fresh in-memory store that accepts requests from any origin.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), CorsPolicy::allow_any())
    }
}

pub fn app(state: AppState) -> Router {
    let cors = Arc::clone(&state.cors);
    Router::new()
        .route("/", get(routes::health))
        .route("/todos", get(routes::list_todos).post(routes::create_todo))
        .route(
            "/todos/{id}",
            get(routes::get_todo)
                .put(routes::update_todo)
                .delete(routes::delete_todo),
        )
        .layer(from_fn_with_state(cors, middleware::cors_middleware))
        .layer(from_fn(middleware::log_requests))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

/// Serve until `shutdown` resolves, letting in-flight requests finish.
pub async fn run_until<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}
