//! Todo record shapes.
//!
//! # Design
//! `TodoItem` is the one canonical stored shape. Older clients send the
//! `task`/`status` field names; `TodoFields` accepts both spellings on input
//! and folds them into the canonical `title`/`description` before anything
//! reaches the store. Responses only ever carry the canonical names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored todo item.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TodoItem {
    /// Build a fresh record with a generated id.
    pub fn create(input: NewTodo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            completed: input.completed,
            deadline: input.deadline,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the fields carried by `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = Some(deadline);
        }
        self.updated_at = Utc::now();
    }
}

/// Request body accepted by create and update.
///
/// Both the canonical and the legacy field names are accepted. Unknown keys
/// are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TodoFields {
    pub title: Option<String>,
    pub task: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "deadline::deserialize")]
    pub deadline: Option<DateTime<Utc>>,
}

impl TodoFields {
    /// Resolve aliases into the fixed update field list.
    pub fn into_patch(self) -> TodoPatch {
        TodoPatch {
            title: self.title.or(self.task),
            description: self.description.or(self.status),
            completed: self.completed,
            deadline: self.deadline,
        }
    }

    pub fn into_new(self) -> NewTodo {
        let patch = self.into_patch();
        NewTodo {
            title: patch.title,
            description: patch.description,
            completed: patch.completed.unwrap_or(false),
            deadline: patch.deadline,
        }
    }
}

/// Field values for a record about to be created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: bool,
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial update. `None` leaves the stored value as it is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Body returned by a successful delete.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
    pub todo: TodoItem,
}

/// Lenient deadline parsing.
///
/// Browsers post `datetime-local` values without seconds or zone
/// (`2025-08-30T12:00`); those are read as UTC.
pub mod deadline {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid deadline `{s}`"))),
        }
    }
}
