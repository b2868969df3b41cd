//! Error types for the todo API client.
//!
//! # Design
//! Two layers. [`ApiError`] describes what went wrong on the wire: a
//! transport failure, an unexpected status, or a body that would not decode.
//! [`TodoError`] is what the public operations return: it tags the failure
//! with the operation kind and item id, and carries the human-readable
//! message picked by [`ApiError::extract_message`]. Callers branch on
//! [`ErrorKind`] instead of parsing the rendered text.

use serde_json::Value;
use thiserror::Error;

/// Wire-level failures produced by `TodoClient` and transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404 for the requested todo.
    #[error("resource not found")]
    NotFound { body: String },

    /// The server returned a non-success status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The message the server put in the error body, if any.
    ///
    /// Looks for a string `message` field first and falls back to a string
    /// `detail` field.
    pub fn server_message(&self) -> Option<String> {
        let body = match self {
            ApiError::NotFound { body } | ApiError::HttpError { body, .. } => body,
            _ => return None,
        };
        let value: Value = serde_json::from_str(body).ok()?;
        ["message", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str))
            .filter(|msg| !msg.is_empty())
            .map(str::to_string)
    }

    /// Server-provided message when present, otherwise this error's own text.
    pub fn extract_message(&self) -> String {
        self.server_message().unwrap_or_else(|| self.to_string())
    }
}

/// The public operation a [`TodoError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    Create,
    Update,
    Delete,
}

impl ErrorKind {
    /// Generic text shown to the user; details only go to the log.
    pub fn banner(self) -> &'static str {
        match self {
            ErrorKind::Load => "Failed to load todos",
            ErrorKind::Create => "Failed to create todo",
            ErrorKind::Update => "Failed to update todo",
            ErrorKind::Delete => "Failed to delete todo",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            ErrorKind::Load => "loading",
            ErrorKind::Create => "creating",
            ErrorKind::Update => "updating",
            ErrorKind::Delete => "deleting",
        }
    }
}

fn action_prefix(kind: &ErrorKind, id: &Option<i64>) -> String {
    match (kind, id) {
        (ErrorKind::Load, None) => "Error loading todos".to_string(),
        (kind, Some(id)) => format!("Error {} todo {id}", kind.verb()),
        (kind, None) => format!("Error {} todo", kind.verb()),
    }
}

/// Failure of one public API operation.
#[derive(Debug, Error)]
#[error("{}: {message}", action_prefix(.kind, .id))]
pub struct TodoError {
    pub kind: ErrorKind,
    pub id: Option<i64>,
    pub message: String,
    #[source]
    pub source: ApiError,
}

impl TodoError {
    pub fn new(kind: ErrorKind, id: Option<i64>, source: ApiError) -> Self {
        Self {
            kind,
            id,
            message: source.extract_message(),
            source,
        }
    }

    pub fn banner(&self) -> &'static str {
        self.kind.banner()
    }
}
