//! Record store abstraction and backend selection.
//!
//! # Design
//! Handlers hold an `Arc<dyn TodoStore>` handed to them through `AppState`;
//! there is no process-global connection. `connect` picks a backend from a
//! connection string and the caller owns the handle until `close`.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{NewTodo, TodoItem, TodoPatch};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// CRUD operations over the single todo collection.
#[async_trait]
pub trait TodoStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Every record, in store-native (insertion) order.
    async fn list(&self) -> Result<Vec<TodoItem>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<TodoItem>, StoreError>;

    async fn create(&self, input: NewTodo) -> Result<TodoItem, StoreError>;

    /// Returns `None` when `id` has no record. Never inserts.
    async fn update(&self, id: Uuid, patch: TodoPatch) -> Result<Option<TodoItem>, StoreError>;

    /// Returns the removed record, or `None` when `id` has no record.
    async fn delete(&self, id: Uuid) -> Result<Option<TodoItem>, StoreError>;

    /// Release the backend. Later calls fail with `StoreError::Closed`.
    async fn close(&self) -> Result<(), StoreError>;
}

/// Parse a path segment into a record id.
pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|source| StoreError::InvalidId {
        id: raw.to_string(),
        source,
    })
}

/// Open the backend named by `url`.
///
/// - `memory://` keeps records in process memory.
/// - `sqlite::memory:` opens a private in-memory SQLite database.
/// - `sqlite://<path>` opens (or creates) a SQLite file.
pub async fn connect(url: &str) -> Result<Arc<dyn TodoStore>, StoreError> {
    let store: Arc<dyn TodoStore> = if url == "memory://" {
        Arc::new(MemoryStore::new())
    } else if url == "sqlite::memory:" {
        Arc::new(SqliteStore::open_in_memory()?)
    } else if let Some(path) = url.strip_prefix("sqlite://") {
        if path.is_empty() {
            return Err(StoreError::UnsupportedUrl(url.to_string()));
        }
        let path = path.split('?').next().unwrap_or(path).to_string();
        Arc::new(SqliteStore::open(path).await?)
    } else {
        return Err(StoreError::UnsupportedUrl(url.to_string()));
    };
    tracing::info!(backend = store.backend_tag(), "todo store connected");
    Ok(store)
}
