//! The todo API as a set of fallible operations.
//!
//! `HttpTodoApi` glues `TodoClient` to a `Transport`: build, execute, parse.
//! Every failure leaves here as a `TodoError` tagged with the operation that
//! produced it.

use tracing::{debug, error, info};

use crate::client::TodoClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, ErrorKind, TodoError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{CreateTodo, ListQuery, ListResponse, Todo, UpdateTodo};

/// Operations the list controller needs from the backend.
pub trait TodoApi {
    fn list_items(&self, query: &ListQuery) -> Result<ListResponse, TodoError>;
    fn get_item(&self, id: i64) -> Result<Todo, TodoError>;
    fn create_item(&self, input: &CreateTodo) -> Result<Todo, TodoError>;
    fn update_item(&self, id: i64, input: &UpdateTodo) -> Result<Todo, TodoError>;
    fn delete_item(&self, id: i64) -> Result<(), TodoError>;
}

/// `TodoApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTodoApi<T> {
    client: TodoClient,
    transport: T,
}

impl HttpTodoApi<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(TodoClient::new(&config.todos_url()), UreqTransport::new())
    }
}

impl<T: Transport> HttpTodoApi<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(
            method = %request.method,
            url = %request.path,
            body = request.body.as_deref().unwrap_or(""),
            "api request"
        );
        match self.transport.execute(request) {
            Ok(response) => {
                debug!(status = response.status, body = %response.body, "api response");
                Ok(response)
            }
            Err(e) => {
                debug!(error = %e, "api request failed");
                Err(e)
            }
        }
    }
}

fn wrap(kind: ErrorKind, id: Option<i64>, source: ApiError) -> TodoError {
    let err = TodoError::new(kind, id, source);
    error!(kind = ?err.kind, id = ?err.id, status = ?err.source.status(), "{err}");
    err
}

impl<T: Transport> TodoApi for HttpTodoApi<T> {
    fn list_items(&self, query: &ListQuery) -> Result<ListResponse, TodoError> {
        info!(skip = query.skip, limit = query.limit, paginate = query.paginate, "fetching todos");
        let request = self.client.build_list_todos(query);
        self.round_trip(request)
            .and_then(|response| self.client.parse_list_todos(response))
            .map_err(|e| wrap(ErrorKind::Load, None, e))
    }

    fn get_item(&self, id: i64) -> Result<Todo, TodoError> {
        info!(id, "fetching todo");
        let request = self.client.build_get_todo(id);
        self.round_trip(request)
            .and_then(|response| self.client.parse_get_todo(response))
            .map_err(|e| wrap(ErrorKind::Load, Some(id), e))
    }

    fn create_item(&self, input: &CreateTodo) -> Result<Todo, TodoError> {
        info!(title = %input.title, "creating todo");
        self.client
            .build_create_todo(input)
            .and_then(|request| self.round_trip(request))
            .and_then(|response| self.client.parse_create_todo(response))
            .map_err(|e| wrap(ErrorKind::Create, None, e))
    }

    fn update_item(&self, id: i64, input: &UpdateTodo) -> Result<Todo, TodoError> {
        info!(id, update = ?input, "updating todo");
        self.client
            .build_update_todo(id, input)
            .and_then(|request| self.round_trip(request))
            .and_then(|response| self.client.parse_update_todo(response))
            .map_err(|e| wrap(ErrorKind::Update, Some(id), e))
    }

    fn delete_item(&self, id: i64) -> Result<(), TodoError> {
        info!(id, "deleting todo");
        let request = self.client.build_delete_todo(id);
        self.round_trip(request)
            .and_then(|response| self.client.parse_delete_todo(response))
            .map_err(|e| wrap(ErrorKind::Delete, Some(id), e))
    }
}
