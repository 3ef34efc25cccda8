//! Handlers for the `/products` resource.
//!
//! Any staff member may browse the catalog; managers maintain it and only
//! admins remove products.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use netcrm_core::pagination::{PageRequest, Paginated};
use netcrm_core::status::{BillingCycle, ProductType};
use netcrm_core::types::DbId;
use netcrm_db::models::product::{CreateProduct, Product, ProductFilter, UpdateProduct};
use netcrm_db::repositories::ProductRepo;
use serde_json::{json, Value};

use super::{deleted, not_found};
use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireManager, RequireStaff};
use crate::response::{MessageResponse, Page};
use crate::state::AppState;

const PRODUCT: &str = "Product";

fn form_options() -> Value {
    json!({
        "types": ProductType::options(),
        "billing_cycles": BillingCycle::options(),
    })
}

/// GET /api/v1/products
pub async fn index(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Page> {
    let request = PageRequest::new(filter.page, filter.per_page);
    let (rows, total) = ProductRepo::list(&state.pool, &filter, request).await?;
    let products = Paginated::new(rows, total, request, uri.path(), &filter.query_pairs());

    let mut props = form_options();
    props["products"] = json!(products);
    props["filters"] = json!(filter);
    Ok(Page::new("Products/Index", props))
}

/// GET /api/v1/products/create
pub async fn create(RequireManager(_user): RequireManager) -> AppResult<Page> {
    Ok(Page::new("Products/Create", form_options()))
}

/// POST /api/v1/products
pub async fn store(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> AppResult<Response> {
    let (product_type, billing_cycle) = input.validate()?;
    let product = ProductRepo::create(&state.pool, &input, product_type, billing_cycle).await?;
    tracing::info!(product_id = product.id, user_id = user.user_id, "Product created");
    Ok(MessageResponse::new(product, "Product created successfully.").created())
}

/// GET /api/v1/products/{id}
pub async fn show(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Page> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(PRODUCT, id))?;
    Ok(Page::new("Products/Show", json!({ "product": product })))
}

/// GET /api/v1/products/{id}/edit
pub async fn edit(
    RequireManager(_user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Page> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(PRODUCT, id))?;
    let mut props = form_options();
    props["product"] = json!(product);
    Ok(Page::new("Products/Edit", props))
}

/// PUT /api/v1/products/{id}
pub async fn update(
    RequireManager(_user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<MessageResponse<Product>> {
    let choices = input.validate()?;
    let product = ProductRepo::update(&state.pool, id, &input, choices)
        .await?
        .ok_or_else(|| not_found(PRODUCT, id))?;
    Ok(MessageResponse::new(product, "Product updated successfully."))
}

/// DELETE /api/v1/products/{id}
///
/// Products still referenced by projects or services cannot be removed (409).
pub async fn destroy(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let found = ProductRepo::delete(&state.pool, id).await?;
    if found {
        tracing::info!(product_id = id, user_id = user.user_id, "Product deleted");
    }
    deleted(found, PRODUCT, id)
}
