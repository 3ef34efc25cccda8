pub mod auth;
pub mod customer;
pub mod health;
pub mod lead;
pub mod notification;
pub mod portal;
pub mod product;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                                  login (public)
/// /auth/me                                     current user
///
/// /leads, /products, /projects, /customers     index, create, store, show,
///                                              edit, update, destroy
///
/// /projects/pending-approval                   approval queue (manager)
/// /projects/{id}/start                         pending -> in_progress
/// /projects/{id}/submit-for-approval           -> waiting_approval
/// /projects/{id}/approve                       -> approved (manager)
/// /projects/{id}/reject                        -> rejected (manager)
/// /projects/{id}/complete                      approved -> completed
///
/// /customers/{id}/services                     add service
/// /customers/{id}/services/{service_id}        terminate (DELETE)
/// /customers/{id}/services/{service_id}/...    suspend, activate
///
/// /notifications                               inbox, unread-count,
///                                              read-all, {id}/read
///
/// /portal                                      customer dashboard
/// /portal/services/{id}                        customer service detail
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/leads", lead::router())
        .nest("/products", product::router())
        .nest("/projects", project::router())
        .nest("/customers", customer::router())
        .nest("/notifications", notification::router())
        .nest("/portal", portal::router())
}
