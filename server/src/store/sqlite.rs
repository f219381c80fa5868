use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::TodoStore;
use crate::error::StoreError;
use crate::model::{NewTodo, TodoItem, TodoPatch};

/// SQLite-backed document store.
///
/// Each record is kept as one JSON document keyed by its id; `seq` preserves
/// insertion order for listing. All statements run on the blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, StoreError> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let conn = Connection::open(&path)?;
            migrate(&conn)?;
            tracing::debug!(path = %path.display(), "opened sqlite todo store");
            Ok(conn)
        })
        .await??;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        }
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let conn = guard.as_ref().ok_or(StoreError::Closed)?;
            f(conn)
        })
        .await?
    }
}

fn migrate(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS todos (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          id TEXT NOT NULL UNIQUE,
          doc TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn load(conn: &Connection, id: Uuid) -> Result<Option<TodoItem>, StoreError> {
    let doc: Option<String> = conn
        .query_row(
            "SELECT doc FROM todos WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    doc.map(|d| serde_json::from_str(&d).map_err(StoreError::from))
        .transpose()
}

#[async_trait]
impl TodoStore for SqliteStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT doc FROM todos ORDER BY seq")?;
            let docs = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            docs.iter()
                .map(|d| serde_json::from_str(d).map_err(StoreError::from))
                .collect()
        })
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<TodoItem>, StoreError> {
        self.with_conn(move |conn| load(conn, id)).await
    }

    async fn create(&self, input: NewTodo) -> Result<TodoItem, StoreError> {
        self.with_conn(move |conn| {
            let todo = TodoItem::create(input);
            conn.execute(
                "INSERT INTO todos (id, doc) VALUES (?1, ?2)",
                params![todo.id.to_string(), serde_json::to_string(&todo)?],
            )?;
            Ok(todo)
        })
        .await
    }

    async fn update(&self, id: Uuid, patch: TodoPatch) -> Result<Option<TodoItem>, StoreError> {
        self.with_conn(move |conn| {
            let Some(mut todo) = load(conn, id)? else {
                return Ok(None);
            };
            todo.apply(&patch);
            conn.execute(
                "UPDATE todos SET doc = ?2 WHERE id = ?1",
                params![id.to_string(), serde_json::to_string(&todo)?],
            )?;
            Ok(Some(todo))
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<Option<TodoItem>, StoreError> {
        self.with_conn(move |conn| {
            let Some(todo) = load(conn, id)? else {
                return Ok(None);
            };
            conn.execute("DELETE FROM todos WHERE id = ?1", params![id.to_string()])?;
            Ok(Some(todo))
        })
        .await
    }

    async fn close(&self) -> Result<(), StoreError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let taken = conn
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .take();
            match taken {
                Some(conn) => conn.close().map_err(|(_, err)| StoreError::Sqlite(err)),
                None => Ok(()),
            }
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: Some(title.to_string()),
            ..NewTodo::default()
        }
    }

    #[tokio::test]
    async fn crud_round_trip_in_memory_database() {
        let store = SqliteStore::open_in_memory().unwrap();
        let created = store.create(new_todo("Buy milk")).await.unwrap();
        assert!(!created.completed);

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let updated = store
            .update(created.id, TodoPatch { completed: Some(true), ..TodoPatch::default() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title.as_deref(), Some("Buy milk"));
        assert!(updated.completed);

        let deleted = store.delete(created.id).await.unwrap().unwrap();
        assert!(deleted.completed);
        assert!(store.delete(created.id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_orders_by_insertion() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = store.create(new_todo("first")).await.unwrap();
        let second = store.create(new_todo("second")).await.unwrap();
        store
            .update(first.id, TodoPatch { title: Some("first!".into()), ..TodoPatch::default() })
            .await
            .unwrap();
        let titles: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| (t.id, t.title.unwrap_or_default()))
            .collect();
        assert_eq!(
            titles,
            vec![(first.id, "first!".to_string()), (second.id, "second".to_string())]
        );
    }

    #[tokio::test]
    async fn update_unknown_id_creates_nothing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.update(Uuid::new_v4(), TodoPatch::default()).await.unwrap();
        assert!(result.is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_survive_reopening_the_file() {
        let dir = std::env::temp_dir().join(format!("todo-store-{}", Uuid::new_v4()));
        let path = dir.join("todo.db");

        let store = SqliteStore::open(&path).await.unwrap();
        let created = store.create(new_todo("persisted")).await.unwrap();
        store.close().await.unwrap();

        let reopened = SqliteStore::open(&path).await.unwrap();
        let todos = reopened.list().await.unwrap();
        assert_eq!(todos, vec![created]);
        reopened.close().await.unwrap();

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn closed_store_reports_closed() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.close().await.unwrap();
        assert!(matches!(store.list().await, Err(StoreError::Closed)));
        store.close().await.unwrap();
    }
}
