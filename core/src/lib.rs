//! Client library for a REST todo service.
//!
//! # Overview
//! - [`TodoClient`] builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - [`Transport`] executes the round-trip; [`UreqTransport`] is the
//!   blocking implementation.
//! - [`TodoApi`] is the operation-level interface; [`HttpTodoApi`] wires the
//!   two together and turns failures into kind-tagged [`TodoError`]s.
//! - [`TodoListController`] owns the in-memory list and reconciles it with
//!   whatever the server returns.
//!
//! # Design
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//! - The list is mutated only after a call succeeds. There is no local-only
//!   item state, no retry and no cache.

pub mod api;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod http;
pub mod logging;
pub mod transport;
pub mod types;

pub use api::{HttpTodoApi, TodoApi};
pub use client::TodoClient;
pub use config::{ClientConfig, ConfigError, LogFormat};
pub use controller::{ControllerError, ListView, TodoListController};
pub use error::{ApiError, ErrorKind, TodoError};
pub use form::{FormError, TodoDraft};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use logging::{init_tracing, LogBuffer, LogEntry};
pub use transport::{Transport, UreqTransport};
pub use types::{CreateTodo, ListQuery, ListResponse, Todo, TodoPage, UpdateTodo};
