//! Route definitions for the `/projects` resource and its workflow actions.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                           -> index
/// POST   /                           -> store
/// GET    /create                     -> create
/// GET    /pending-approval           -> pending_approval   (manager)
/// GET    /{id}                       -> show
/// PUT    /{id}                       -> update
/// DELETE /{id}                       -> destroy
/// GET    /{id}/edit                  -> edit
/// PATCH  /{id}/start                 -> start
/// POST   /{id}/submit-for-approval   -> submit_for_approval
/// PATCH  /{id}/approve               -> approve            (manager)
/// PATCH  /{id}/reject                -> reject             (manager)
/// PATCH  /{id}/complete              -> complete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::index).post(project::store))
        .route("/create", get(project::create))
        .route("/pending-approval", get(project::pending_approval))
        .route(
            "/{id}",
            get(project::show)
                .put(project::update)
                .delete(project::destroy),
        )
        .route("/{id}/edit", get(project::edit))
        .route("/{id}/start", patch(project::start))
        .route(
            "/{id}/submit-for-approval",
            post(project::submit_for_approval),
        )
        .route("/{id}/approve", patch(project::approve))
        .route("/{id}/reject", patch(project::reject))
        .route("/{id}/complete", patch(project::complete))
}
