//! Local input for the create form and the inline edit form.
//!
//! A draft never touches the item list. It is validated into a request
//! payload on submit, or dropped on cancel.

use thiserror::Error;

use crate::types::{CreateTodo, Todo, UpdateTodo};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("title is required")]
    EmptyTitle,
}

/// Title and description as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
}

impl TodoDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Pre-filled from an existing item, for editing.
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
        }
    }

    /// Whitespace-only titles count as empty.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::EmptyTitle);
        }
        Ok(())
    }

    pub fn to_create(&self) -> Result<CreateTodo, FormError> {
        self.validate()?;
        Ok(CreateTodo {
            title: self.title.clone(),
            description: self.description_field(),
        })
    }

    pub fn to_update(&self) -> Result<UpdateTodo, FormError> {
        self.validate()?;
        Ok(UpdateTodo::edit(self.title.clone(), self.description_field()))
    }

    // Empty means "no description": the field is omitted, never sent as "".
    fn description_field(&self) -> Option<String> {
        Some(self.description.clone()).filter(|d| !d.is_empty())
    }
}
