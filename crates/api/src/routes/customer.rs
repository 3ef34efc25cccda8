//! Route definitions for `/customers`, including the services sub-resource.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::customer;
use crate::state::AppState;

/// Routes mounted at `/customers`.
///
/// ```text
/// GET    /                                   -> index
/// POST   /                                   -> store
/// GET    /create                             -> create
/// GET    /{id}                               -> show
/// PUT    /{id}                               -> update
/// DELETE /{id}                               -> destroy
/// GET    /{id}/edit                          -> edit
///
/// POST   /{id}/services                      -> add_service
/// DELETE /{id}/services/{service_id}         -> terminate_service
/// PATCH  /{id}/services/{service_id}/suspend -> suspend_service
/// PATCH  /{id}/services/{service_id}/activate -> activate_service
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(customer::index).post(customer::store))
        .route("/create", get(customer::create))
        .route(
            "/{id}",
            get(customer::show)
                .put(customer::update)
                .delete(customer::destroy),
        )
        .route("/{id}/edit", get(customer::edit))
        .route("/{id}/services", post(customer::add_service))
        .route(
            "/{id}/services/{service_id}",
            delete(customer::terminate_service),
        )
        .route(
            "/{id}/services/{service_id}/suspend",
            patch(customer::suspend_service),
        )
        .route(
            "/{id}/services/{service_id}/activate",
            patch(customer::activate_service),
        )
}
