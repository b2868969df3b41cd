use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const TODOS_PATH: &str = "/api/v1/todos";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub paginate: bool,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoPage {
    pub items: Vec<Todo>,
    pub total: usize,
    pub page: usize,
    pub size: usize,
}

/// List payload: bare array, or an envelope when `paginate=true`.
#[derive(Serialize)]
#[serde(untagged)]
pub enum TodoList {
    Items(Vec<Todo>),
    Page(TodoPage),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
}

/// Extractor rejections keep axum's status but use the JSON error body.
fn rejected(status: StatusCode, text: String) -> ApiError {
    tracing::warn!(%status, %text, "rejected request");
    (status, Json(ErrorBody { message: text }))
}

fn json_rejected(rejection: JsonRejection) -> ApiError {
    rejected(rejection.status(), rejection.body_text())
}

fn path_rejected(rejection: PathRejection) -> ApiError {
    rejected(rejection.status(), rejection.body_text())
}

fn query_rejected(rejection: QueryRejection) -> ApiError {
    rejected(rejection.status(), rejection.body_text())
}

fn not_found() -> ApiError {
    error(StatusCode::NOT_FOUND, "Todo not found")
}

#[derive(Default)]
pub struct Store {
    next_id: i64,
    todos: BTreeMap<i64, Todo>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let item = format!("{TODOS_PATH}/{{id}}");
    Router::new()
        .route("/health", get(health))
        .route(TODOS_PATH, get(list_todos).post(create_todo))
        .route(&item, get(get_todo).patch(update_todo).delete(delete_todo))
        .route(&format!("{item}/"), patch(update_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy"}))
}

async fn list_todos(
    State(db): State<Db>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<TodoList>, ApiError> {
    let Query(params) = params.map_err(query_rejected)?;
    if !(1..=100).contains(&params.limit) {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "limit must be between 1 and 100",
        ));
    }
    let store = db.read().await;
    let items: Vec<Todo> = store
        .todos
        .values()
        .skip(params.skip)
        .take(params.limit)
        .cloned()
        .collect();
    tracing::info!(skip = params.skip, limit = params.limit, paginate = params.paginate, "list todos");

    if !params.paginate {
        return Ok(Json(TodoList::Items(items)));
    }
    Ok(Json(TodoList::Page(TodoPage {
        items,
        total: store.todos.len(),
        page: params.skip / params.limit + 1,
        size: params.limit,
    })))
}

async fn create_todo(
    State(db): State<Db>,
    input: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(input) = input.map_err(json_rejected)?;
    if input.title.trim().is_empty() {
        return Err(error(StatusCode::UNPROCESSABLE_ENTITY, "title must not be empty"));
    }
    let mut store = db.write().await;
    store.next_id += 1;
    let todo = Todo {
        id: store.next_id,
        title: input.title,
        description: input.description,
        completed: false,
        created_at: Utc::now(),
        updated_at: None,
    };
    store.todos.insert(todo.id, todo.clone());
    tracing::info!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(db): State<Db>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id.map_err(path_rejected)?;
    let store = db.read().await;
    store.todos.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_todo(
    State(db): State<Db>,
    id: Result<Path<i64>, PathRejection>,
    input: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id.map_err(path_rejected)?;
    let Json(input) = input.map_err(json_rejected)?;
    if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(error(StatusCode::UNPROCESSABLE_ENTITY, "title must not be empty"));
    }
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or_else(not_found)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(description) = input.description {
        todo.description = Some(description);
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    todo.updated_at = Some(Utc::now());
    tracing::info!(id, "updated todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(path_rejected)?;
    let mut store = db.write().await;
    store
        .todos
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}
