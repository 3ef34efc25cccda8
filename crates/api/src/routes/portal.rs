use axum::routing::get;
use axum::Router;

use crate::handlers::portal;
use crate::state::AppState;

/// Routes mounted at `/portal` (customer role).
///
/// ```text
/// GET /                -> dashboard
/// GET /services/{id}   -> service
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(portal::dashboard))
        .route("/services/{id}", get(portal::service))
}
