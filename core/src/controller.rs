//! View state for the todo list.
//!
//! # Design
//! `TodoListController` owns the item list and mutates it only with what the
//! server returned: created items are prepended, updated items replace the
//! entry with the same id in place, deleted items are removed after the
//! delete succeeds. A failed call records a generic banner in `error` and
//! leaves `items` as it was. Overlapping updates to one id are not
//! coordinated; whichever response is applied last wins.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{error, warn};

use crate::api::TodoApi;
use crate::config::ClientConfig;
use crate::error::TodoError;
use crate::form::{FormError, TodoDraft};
use crate::types::{CreateTodo, ListQuery, Todo, UpdateTodo};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Invalid(#[from] FormError),
    #[error(transparent)]
    Api(#[from] TodoError),
    #[error("todo {0} is not in the list")]
    UnknownItem(i64),
}

/// What the list area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView<'a> {
    Loading,
    Empty,
    Items(&'a [Todo]),
}

/// Resets the loading flag on every exit path of `load`.
struct LoadingGuard<'a>(&'a mut bool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct TodoListController<A> {
    api: A,
    query: ListQuery,
    items: Vec<Todo>,
    loading: bool,
    error: Option<String>,
    create_form: Option<TodoDraft>,
    edit_forms: BTreeMap<i64, TodoDraft>,
}

impl<A: TodoApi> TodoListController<A> {
    /// Starts in the loading state; the first `load` settles it.
    pub fn new(api: A) -> Self {
        Self::with_query(api, ListQuery::default())
    }

    /// Lists with the page size from `config.page_limit`.
    pub fn from_config(api: A, config: &ClientConfig) -> Self {
        Self::with_query(api, config.list_query())
    }

    pub fn with_query(api: A, query: ListQuery) -> Self {
        Self {
            api,
            query,
            items: Vec::new(),
            loading: true,
            error: None,
            create_form: None,
            edit_forms: BTreeMap::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn item(&self, id: i64) -> Option<&Todo> {
        self.items.iter().find(|todo| todo.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn view(&self) -> ListView<'_> {
        if self.loading {
            ListView::Loading
        } else if self.items.is_empty() {
            ListView::Empty
        } else {
            ListView::Items(&self.items)
        }
    }

    /// Fetch the list and replace `items` with it, envelope unwrapped.
    pub fn load(&mut self) -> Result<(), ControllerError> {
        let _loading = LoadingGuard::start(&mut self.loading);
        match self.api.list_items(&self.query) {
            Ok(response) => {
                self.items = response.into_items();
                self.error = None;
                Ok(())
            }
            Err(e) => Err(record(&mut self.error, e)),
        }
    }

    /// Create from already-validated input and prepend the server's copy.
    pub fn create(&mut self, input: &CreateTodo) -> Result<(), ControllerError> {
        match self.api.create_item(input) {
            Ok(created) => {
                self.items.insert(0, created);
                Ok(())
            }
            Err(e) => Err(record(&mut self.error, e)),
        }
    }

    pub fn toggle_complete(&mut self, id: i64) -> Result<(), ControllerError> {
        let completed = self
            .item(id)
            .map(|todo| todo.completed)
            .ok_or(ControllerError::UnknownItem(id))?;
        self.set_completed(id, !completed)
    }

    pub fn set_completed(&mut self, id: i64, completed: bool) -> Result<(), ControllerError> {
        self.update(id, &UpdateTodo::completed(completed))
    }

    /// Send the edit form's fields. A blank title never reaches the API.
    pub fn edit(&mut self, id: i64, draft: &TodoDraft) -> Result<(), ControllerError> {
        let update = draft.to_update()?;
        self.update(id, &update)
    }

    pub fn delete(&mut self, id: i64) -> Result<(), ControllerError> {
        match self.api.delete_item(id) {
            Ok(()) => {
                self.items.retain(|todo| todo.id != id);
                self.edit_forms.remove(&id);
                Ok(())
            }
            Err(e) => Err(record(&mut self.error, e)),
        }
    }

    fn update(&mut self, id: i64, update: &UpdateTodo) -> Result<(), ControllerError> {
        match self.api.update_item(id, update) {
            Ok(updated) => {
                match self.items.iter_mut().find(|todo| todo.id == id) {
                    Some(slot) => *slot = updated,
                    None => warn!(id, "updated todo is no longer in the list"),
                }
                Ok(())
            }
            Err(e) => Err(record(&mut self.error, e)),
        }
    }

    // Create form

    pub fn open_create_form(&mut self) -> &mut TodoDraft {
        self.create_form.get_or_insert_with(TodoDraft::default)
    }

    pub fn create_form(&self) -> Option<&TodoDraft> {
        self.create_form.as_ref()
    }

    pub fn create_form_mut(&mut self) -> Option<&mut TodoDraft> {
        self.create_form.as_mut()
    }

    pub fn cancel_create(&mut self) {
        self.create_form = None;
    }

    /// Submit the open create form. The form closes only when the server
    /// confirmed the new item; on failure the typed input is kept.
    pub fn submit_create(&mut self) -> Result<(), ControllerError> {
        let input = self
            .create_form
            .as_ref()
            .map(TodoDraft::to_create)
            .unwrap_or(Err(FormError::EmptyTitle))?;
        self.create(&input)?;
        self.create_form = None;
        Ok(())
    }

    // Inline edit forms

    pub fn begin_edit(&mut self, id: i64) -> Result<&mut TodoDraft, ControllerError> {
        let draft = self
            .item(id)
            .map(TodoDraft::from_todo)
            .ok_or(ControllerError::UnknownItem(id))?;
        Ok(self.edit_forms.entry(id).or_insert(draft))
    }

    pub fn edit_form(&self, id: i64) -> Option<&TodoDraft> {
        self.edit_forms.get(&id)
    }

    pub fn edit_form_mut(&mut self, id: i64) -> Option<&mut TodoDraft> {
        self.edit_forms.get_mut(&id)
    }

    pub fn is_editing(&self, id: i64) -> bool {
        self.edit_forms.contains_key(&id)
    }

    pub fn cancel_edit(&mut self, id: i64) {
        self.edit_forms.remove(&id);
    }

    pub fn submit_edit(&mut self, id: i64) -> Result<(), ControllerError> {
        let draft = self
            .edit_forms
            .get(&id)
            .cloned()
            .ok_or(ControllerError::UnknownItem(id))?;
        self.edit(id, &draft)?;
        self.edit_forms.remove(&id);
        Ok(())
    }
}

fn record(banner: &mut Option<String>, err: TodoError) -> ControllerError {
    error!(error = %err, "{}", err.banner());
    *banner = Some(err.banner().to_string());
    ControllerError::Api(err)
}
