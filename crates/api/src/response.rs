//! Shared response envelope types for API handlers.
//!
//! Three shapes leave this server:
//!
//! - [`DataResponse`] -- `{ "data": ... }` for plain reads.
//! - [`MessageResponse`] -- `{ "data": ..., "message": ... }` for mutations,
//!   where `message` is the flash text a client shows after the action.
//! - [`Page`] -- `{ "component": ..., "props": ... }` for page endpoints that
//!   feed a named client-side view.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": T, "message": "..." }` returned by create, update and workflow actions.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize> {
    pub data: T,
    pub message: String,
}

impl<T: Serialize> MessageResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
        }
    }

    /// `201 Created` with this body.
    pub fn created(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for MessageResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// A page payload: the client view to render and its props.
#[derive(Debug, Serialize)]
pub struct Page {
    pub component: &'static str,
    pub props: Value,
}

impl Page {
    pub fn new(component: &'static str, props: Value) -> Self {
        Self { component, props }
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
