//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch schema drift between the two crates.
//!
//! The list endpoint answers with either a bare array or a paginated
//! envelope depending on the `paginate` flag. Both shapes decode into
//! [`ListResponse`], and [`ListResponse::into_items`] is the single place that
//! normalizes them into a `Vec<Todo>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single todo item returned by the API. `id` and the timestamps are
/// assigned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request payload for creating a new todo. A `None` description is left
/// out of the JSON entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// An update that only flips the completion flag.
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// An update carrying the fields of the inline edit form.
    pub fn edit(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: Some(title.into()),
            description,
            completed: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// Paginated envelope returned when the list is requested with
/// `paginate=true`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPage {
    pub items: Vec<Todo>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

/// Either shape the list endpoint may answer with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ListResponse {
    Items(Vec<Todo>),
    Page(TodoPage),
}

impl ListResponse {
    /// Unwrap the envelope if there is one, preserving server order.
    pub fn into_items(self) -> Vec<Todo> {
        match self {
            ListResponse::Items(items) => items,
            ListResponse::Page(page) => page.items,
        }
    }

    pub fn is_paginated(&self) -> bool {
        matches!(self, ListResponse::Page(_))
    }
}

/// Query parameters for the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub skip: u32,
    pub limit: u32,
    pub paginate: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 10,
            paginate: false,
        }
    }
}

/// Timestamps arrive either as RFC 3339 (`...Z`) or as naive ISO datetimes
/// without an offset, which are taken to be UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw).map(Some).map_err(de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
