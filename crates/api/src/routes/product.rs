use axum::routing::get;
use axum::Router;

use crate::handlers::product;
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /            -> index
/// POST   /            -> store    (manager)
/// GET    /create      -> create   (manager)
/// GET    /{id}        -> show
/// PUT    /{id}        -> update   (manager)
/// DELETE /{id}        -> destroy  (admin)
/// GET    /{id}/edit   -> edit     (manager)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(product::index).post(product::store))
        .route("/create", get(product::create))
        .route(
            "/{id}",
            get(product::show)
                .put(product::update)
                .delete(product::destroy),
        )
        .route("/{id}/edit", get(product::edit))
}
