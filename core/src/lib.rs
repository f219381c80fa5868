//! API client core and view state for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO). On top of the client, `TodoView`
//! holds the state of the single todo table: the cached list, the row being
//! edited, and the add-form draft.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each CRUD operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the view can be driven by any transport.
//! - DTOs are defined independently from the server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;
pub mod view;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, Deleted, Todo, UpdateTodo};
pub use view::{Field, FormFields, TodoView, ViewError};
