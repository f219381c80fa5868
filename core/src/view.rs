//! Client-side view state for the todo table and its add form.
//!
//! # Design
//! `TodoView` is the whole UI minus the terminal: the cached list, the row in
//! edit mode with its edit buffer, and the draft for a new item. Every user
//! action either mutates that state or hands back an `HttpRequest` for the
//! host to execute; the matching `apply_*` call patches the cached list from
//! the response. The list is never refetched after a mutation, so it can
//! drift from the server when another client writes concurrently.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, UpdateTodo};

/// `datetime-local` layout used by the edit buffer and the draft.
pub const DEADLINE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// `datetime-local` spellings accepted when reading form input.
const DEADLINE_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", DEADLINE_INPUT_FORMAT];

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("All fields must be filled out.")]
    IncompleteForm,

    #[error("invalid deadline `{0}`, expected YYYY-MM-DDTHH:MM")]
    InvalidDeadline(String),

    #[error("no row with id {0}")]
    UnknownRow(Uuid),

    #[error("no row is being edited")]
    NotEditing,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One of the three editable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Deadline,
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" | "task" => Ok(Field::Title),
            "description" | "status" => Ok(Field::Description),
            "deadline" => Ok(Field::Deadline),
            other => Err(format!("unknown field `{other}`")),
        }
    }
}

/// Text buffer behind the add form and the inline row editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub title: String,
    pub description: String,
    pub deadline: String,
}

impl FormFields {
    fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone().unwrap_or_default(),
            description: todo.description.clone().unwrap_or_default(),
            deadline: todo
                .deadline
                .map(|d| d.format(DEADLINE_INPUT_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Title => self.title = value,
            Field::Description => self.description = value,
            Field::Deadline => self.deadline = value,
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.title, &self.description, &self.deadline]
            .iter()
            .all(|v| !v.is_empty())
    }

    /// Validate and split into the values sent to the server.
    fn checked(&self) -> Result<(String, String, DateTime<Utc>), ViewError> {
        if !self.is_complete() {
            return Err(ViewError::IncompleteForm);
        }
        let deadline = parse_deadline_input(&self.deadline)
            .ok_or_else(|| ViewError::InvalidDeadline(self.deadline.clone()))?;
        Ok((self.title.clone(), self.description.clone(), deadline))
    }
}

/// Parse a `datetime-local` value (read as UTC) or an RFC 3339 timestamp.
pub fn parse_deadline_input(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    DEADLINE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// State of the single todo view.
#[derive(Debug, Clone)]
pub struct TodoView {
    client: TodoClient,
    todos: Vec<Todo>,
    editing: Option<Uuid>,
    edit: FormFields,
    draft: FormFields,
}

impl TodoView {
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            todos: Vec::new(),
            editing: None,
            edit: FormFields::default(),
            draft: FormFields::default(),
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn edit_buffer(&self) -> &FormFields {
        &self.edit
    }

    pub fn draft(&self) -> &FormFields {
        &self.draft
    }

    /// Id of the 1-based table row `row`.
    pub fn row_id(&self, row: usize) -> Option<Uuid> {
        row.checked_sub(1)
            .and_then(|idx| self.todos.get(idx))
            .map(|t| t.id)
    }

    fn find(&self, id: Uuid) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    // --- load ---

    /// The one fetch issued when the view is first shown.
    pub fn mount(&self) -> HttpRequest {
        self.client.build_list_todos()
    }

    pub fn apply_list(&mut self, response: HttpResponse) -> Result<(), ViewError> {
        self.todos = self.client.parse_list_todos(response)?;
        if let Some(id) = self.editing {
            if self.find(id).is_none() {
                self.clear_edit();
            }
        }
        Ok(())
    }

    // --- create ---

    pub fn set_draft(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    pub fn submit_draft(&self) -> Result<HttpRequest, ViewError> {
        let (title, description, deadline) = self.draft.checked()?;
        let input = CreateTodo {
            title: Some(title),
            description: Some(description),
            completed: false,
            deadline: Some(deadline),
        };
        Ok(self.client.build_create_todo(&input)?)
    }

    pub fn apply_created(&mut self, response: HttpResponse) -> Result<&Todo, ViewError> {
        let todo = self.client.parse_create_todo(response)?;
        self.todos.push(todo);
        self.draft = FormFields::default();
        Ok(&self.todos[self.todos.len() - 1])
    }

    // --- edit ---

    /// Put `id` into edit mode, seeding the buffer from the row. An id that
    /// is not in the list leaves edit mode instead.
    pub fn toggle_edit(&mut self, id: Uuid) {
        match self.find(id).map(FormFields::from_todo) {
            Some(buffer) => {
                self.editing = Some(id);
                self.edit = buffer;
            }
            None => self.clear_edit(),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.clear_edit();
    }

    fn clear_edit(&mut self) {
        self.editing = None;
        self.edit = FormFields::default();
    }

    pub fn set_edit(&mut self, field: Field, value: impl Into<String>) -> Result<(), ViewError> {
        if self.editing.is_none() {
            return Err(ViewError::NotEditing);
        }
        self.edit.set(field, value);
        Ok(())
    }

    pub fn save_edit(&self) -> Result<HttpRequest, ViewError> {
        let id = self.editing.ok_or(ViewError::NotEditing)?;
        let (title, description, deadline) = self.edit.checked()?;
        let input = UpdateTodo {
            title: Some(title),
            description: Some(description),
            completed: None,
            deadline: Some(deadline),
        };
        Ok(self.client.build_update_todo(id, &input)?)
    }

    /// Replace the row with the server's copy. Leaves edit mode when the
    /// updated row was the one being edited.
    pub fn apply_updated(&mut self, response: HttpResponse) -> Result<&Todo, ViewError> {
        let todo = self.client.parse_update_todo(response)?;
        let id = todo.id;
        let idx = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(ViewError::UnknownRow(id))?;
        self.todos[idx] = todo;
        if self.editing == Some(id) {
            self.clear_edit();
        }
        Ok(&self.todos[idx])
    }

    pub fn toggle_completed(&self, id: Uuid) -> Result<HttpRequest, ViewError> {
        let todo = self.find(id).ok_or(ViewError::UnknownRow(id))?;
        let input = UpdateTodo {
            completed: Some(!todo.completed),
            ..UpdateTodo::default()
        };
        Ok(self.client.build_update_todo(id, &input)?)
    }

    // --- delete ---

    pub fn delete(&self, id: Uuid) -> HttpRequest {
        self.client.build_delete_todo(id)
    }

    /// Drop `id` from the cached list once the server confirms the delete.
    pub fn apply_deleted(&mut self, id: Uuid, response: HttpResponse) -> Result<(), ViewError> {
        self.client.parse_delete_todo(response)?;
        self.todos.retain(|t| t.id != id);
        if self.editing == Some(id) {
            self.clear_edit();
        }
        Ok(())
    }

    // --- render ---

    /// Render the table as text. The row in edit mode shows its buffer,
    /// bracketed.
    pub fn render(&self) -> String {
        const HEADER: [&str; 5] = ["#", "Title", "Description", "Deadline", "Done"];

        let rows: Vec<[String; 5]> = self
            .todos
            .iter()
            .enumerate()
            .map(|(idx, todo)| {
                let (title, description, deadline) = if self.editing == Some(todo.id) {
                    (
                        format!("[{}]", self.edit.title),
                        format!("[{}]", self.edit.description),
                        format!("[{}]", self.edit.deadline),
                    )
                } else {
                    (
                        todo.title.clone().unwrap_or_default(),
                        todo.description.clone().unwrap_or_default(),
                        todo.deadline
                            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default(),
                    )
                };
                let done = if todo.completed { "x" } else { "" };
                [(idx + 1).to_string(), title, description, deadline, done.to_string()]
            })
            .collect();

        let mut widths = HEADER.map(str::len);
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let line = |out: &mut String, cells: &[&str]| {
            let padded: Vec<String> = cells
                .iter()
                .zip(widths)
                .map(|(c, w)| format!("{c:<w$}"))
                .collect();
            let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
        };
        line(&mut out, &HEADER);
        let _ = writeln!(
            out,
            "{}",
            widths.map(|w| "-".repeat(w)).join("-+-")
        );
        if rows.is_empty() {
            let _ = writeln!(out, "No tasks found");
        }
        for row in &rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            line(&mut out, &cells);
        }
        out
    }
}
