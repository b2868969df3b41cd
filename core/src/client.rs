//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only the collection URL and carries no mutable state
//! between calls. Each CRUD operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Executing the round-trip is left to a `Transport`, which
//! keeps this module deterministic and free of I/O.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, ListQuery, ListResponse, Todo, UpdateTodo};

/// Request builder and response parser bound to one todo collection URL,
/// e.g. `http://localhost:3000/api/v1/todos`.
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

    pub fn build_list_todos(&self, query: &ListQuery) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!(
                "{}?skip={}&limit={}&paginate={}",
                self.base_url, query.skip, query.limit, query.paginate
            ),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.base_url.clone(),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    /// Partial update: only the fields set on `input` are sent.
    pub fn build_update_todo(&self, id: i64, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            path: format!("{}/{id}/", self.base_url),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<ListResponse, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)?;
        Ok(())
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json<T: serde::Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Any 2xx is success; everything else maps to an `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound {
            body: response.body.clone(),
        });
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
