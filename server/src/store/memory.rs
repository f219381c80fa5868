use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::TodoStore;
use crate::error::StoreError;
use crate::model::{NewTodo, TodoItem, TodoPatch};

/// In-process store. Records live in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    todos: RwLock<Vec<TodoItem>>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
        self.ensure_open()?;
        Ok(self.todos.read().await.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TodoItem>, StoreError> {
        self.ensure_open()?;
        let todos = self.todos.read().await;
        Ok(todos.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, input: NewTodo) -> Result<TodoItem, StoreError> {
        self.ensure_open()?;
        let todo = TodoItem::create(input);
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: Uuid, patch: TodoPatch) -> Result<Option<TodoItem>, StoreError> {
        self.ensure_open()?;
        let mut todos = self.todos.write().await;
        Ok(todos.iter_mut().find(|t| t.id == id).map(|todo| {
            todo.apply(&patch);
            todo.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<TodoItem>, StoreError> {
        self.ensure_open()?;
        let mut todos = self.todos.write().await;
        Ok(todos
            .iter()
            .position(|t| t.id == id)
            .map(|idx| todos.remove(idx)))
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        self.todos.write().await.clear();
        Ok(())
    }
}
