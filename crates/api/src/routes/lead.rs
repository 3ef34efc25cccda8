use axum::routing::get;
use axum::Router;

use crate::handlers::lead;
use crate::state::AppState;

/// Routes mounted at `/leads`.
///
/// ```text
/// GET    /            -> index
/// POST   /            -> store
/// GET    /create      -> create
/// GET    /{id}        -> show
/// PUT    /{id}        -> update
/// DELETE /{id}        -> destroy
/// GET    /{id}/edit   -> edit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lead::index).post(lead::store))
        .route("/create", get(lead::create))
        .route(
            "/{id}",
            get(lead::show).put(lead::update).delete(lead::destroy),
        )
        .route("/{id}/edit", get(lead::edit))
}
