//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Each CRUD operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The caller executes the round-trip.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Deleted, Todo, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn item_url(&self, id: Uuid) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest::bodyless(HttpMethod::Get, self.collection_url())
    }

    pub fn build_get_todo(&self, id: Uuid) -> HttpRequest {
        HttpRequest::bodyless(HttpMethod::Get, self.item_url(id))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::json(HttpMethod::Post, self.collection_url(), body))
    }

    pub fn build_update_todo(&self, id: Uuid, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::json(HttpMethod::Put, self.item_url(id), body))
    }

    pub fn build_delete_todo(&self, id: Uuid) -> HttpRequest {
        HttpRequest::bodyless(HttpMethod::Delete, self.item_url(id))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(&response, 201)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<Deleted, ApiError> {
        parse_json(&response, 200)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

fn parse_json<T: DeserializeOwned>(response: &HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .map(|b| b.error)
        .unwrap_or_else(|_| response.body.clone());
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}
