//! Request handlers.
//!
//! Each submodule serves one resource. Page handlers return a [`Page`] for a
//! named client view; mutations return a
//! [`MessageResponse`](crate::response::MessageResponse) carrying flash text.
//! Handlers delegate to `netcrm_db` repositories and map errors via [`AppError`].
//!
//! [`Page`]: crate::response::Page

pub mod auth;
pub mod customer;
pub mod lead;
pub mod notification;
pub mod portal;
pub mod product;
pub mod project;

use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use netcrm_core::error::CoreError;
use netcrm_core::types::DbId;

use crate::error::{AppError, AppResult};

pub(crate) fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

/// `204 No Content` if a row was deleted, otherwise 404.
pub(crate) fn deleted(found: bool, entity: &'static str, id: DbId) -> AppResult<StatusCode> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(entity, id))
    }
}

/// Today's date in UTC; the reference date for generated codes.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
