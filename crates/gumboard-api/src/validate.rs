//! Request body validation applied uniformly at the API boundary.
//!
//! Handlers take `ValidJson<T>` instead of `Json<T>`: the body is decoded,
//! then [`Validate::validate`] runs, and any problem is reported as
//! `ValidationFailed` with per-field detail. Query strings go through
//! `ValidQuery<T>` so a malformed one is reported the same way.

use std::collections::HashSet;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use gumboard_types::api::{
    BulkActionRequest, CommentRequest, CreateBoardRequest, CreateItemRequest, CreateNoteRequest,
    FieldError, NoteIdsRequest, ReorderRequest, ToggleReactionRequest, UpdateBoardRequest,
    UpdateItemRequest, UpdateNoteRequest,
};

use crate::error::ApiError;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_CONTENT_LEN: usize = 10_000;
pub const MAX_COLOR_LEN: usize = 32;
pub const MAX_EMOJI_LEN: usize = 32;
pub const MAX_BULK_IDS: usize = 500;

pub trait Validate {
    fn validate(&self, errors: &mut FieldErrors);
}

/// Accumulates field-level problems for a single request.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "must not be empty");
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("must be at most {} characters", max));
        }
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationFailed(self.0))
        }
    }
}

/// Query string extractor whose rejection is a `ValidationFailed` on
/// `query` instead of a plain-text 400.
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::invalid("query", rejection.body_text()))?;
        Ok(ValidQuery(value))
    }
}

/// JSON body extractor that also runs [`Validate`].
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid("body", rejection.body_text()))?;

        let mut errors = FieldErrors::default();
        value.validate(&mut errors);
        errors.into_result()?;
        Ok(ValidJson(value))
    }
}

fn validate_note_ids(errors: &mut FieldErrors, ids: &[String]) {
    if ids.is_empty() {
        errors.add("noteIds", "must contain at least one id");
    }
    if ids.len() > MAX_BULK_IDS {
        errors.add("noteIds", format!("must contain at most {} ids", MAX_BULK_IDS));
    }
    if ids.iter().any(|id| id.trim().is_empty()) {
        errors.add("noteIds", "must not contain empty ids");
    }
}

impl Validate for CreateBoardRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.required("name", &self.name);
        errors.max_len("name", &self.name, MAX_NAME_LEN);
        if let Some(description) = &self.description {
            errors.max_len("description", description, MAX_CONTENT_LEN);
        }
    }
}

impl Validate for UpdateBoardRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        if let Some(name) = &self.name {
            errors.required("name", name);
            errors.max_len("name", name, MAX_NAME_LEN);
        }
        if let Some(description) = &self.description {
            errors.max_len("description", description, MAX_CONTENT_LEN);
        }
    }
}

impl Validate for CreateNoteRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        if let Some(color) = &self.color {
            errors.required("color", color);
            errors.max_len("color", color, MAX_COLOR_LEN);
        }
        for content in &self.checklist_items {
            errors.max_len("checklistItems", content, MAX_CONTENT_LEN);
        }
    }
}

impl Validate for UpdateNoteRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        if let Some(color) = &self.color {
            errors.required("color", color);
            errors.max_len("color", color, MAX_COLOR_LEN);
        }
        if self.color.is_none() && self.archived.is_none() {
            errors.add("body", "at least one field must be provided");
        }
    }
}

impl Validate for BulkActionRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        validate_note_ids(errors, self.note_ids());
    }
}

impl Validate for NoteIdsRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        validate_note_ids(errors, &self.note_ids);
    }
}

impl Validate for CreateItemRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.max_len("content", &self.content, MAX_CONTENT_LEN);
    }
}

impl Validate for UpdateItemRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        if let Some(content) = &self.content {
            errors.max_len("content", content, MAX_CONTENT_LEN);
        }
        if self.content.is_none() && self.checked.is_none() {
            errors.add("body", "at least one of content or checked must be provided");
        }
    }
}

impl Validate for ReorderRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        let mut seen = HashSet::new();
        for position in &self.items {
            if !seen.insert(position.id.as_str()) {
                errors.add("items", format!("duplicate item id {}", position.id));
            }
            if position.order < 0 {
                errors.add("items", format!("order for {} must not be negative", position.id));
            }
        }
    }
}

impl Validate for CommentRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.required("content", &self.content);
        errors.max_len("content", &self.content, MAX_CONTENT_LEN);
    }
}

impl Validate for ToggleReactionRequest {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.required("emoji", &self.emoji);
        errors.max_len("emoji", &self.emoji, MAX_EMOJI_LEN);
    }
}
