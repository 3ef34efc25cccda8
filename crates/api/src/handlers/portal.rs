//! Customer self-service portal.
//!
//! A `customer`-role user sees the customer record linked to their account
//! through `customers.user_id`, and nothing else.

use axum::extract::{Path, State};
use netcrm_core::error::CoreError;
use netcrm_core::types::DbId;
use netcrm_db::models::customer::Customer;
use netcrm_db::repositories::{CustomerRepo, CustomerServiceRepo};
use serde_json::json;

use super::not_found;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireCustomer;
use crate::response::Page;
use crate::state::AppState;

async fn linked_customer(state: &AppState, user: &AuthUser) -> AppResult<Customer> {
    CustomerRepo::find_by_user_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| {
            CoreError::Forbidden("No customer account is linked to this user".into()).into()
        })
}

/// GET /api/v1/portal
pub async fn dashboard(
    RequireCustomer(user): RequireCustomer,
    State(state): State<AppState>,
) -> AppResult<Page> {
    let customer = linked_customer(&state, &user).await?;
    let services = CustomerServiceRepo::list_for_customer(&state.pool, customer.id).await?;
    Ok(Page::new(
        "Portal/Dashboard",
        json!({
            "customer": customer,
            "services": services,
        }),
    ))
}

/// GET /api/v1/portal/services/{id}
pub async fn service(
    RequireCustomer(user): RequireCustomer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Page> {
    let customer = linked_customer(&state, &user).await?;
    let service = CustomerServiceRepo::find_for_customer(&state.pool, customer.id, id)
        .await?
        .ok_or_else(|| not_found("CustomerService", id))?;
    Ok(Page::new(
        "Portal/Service",
        json!({
            "customer": customer,
            "service": service,
        }),
    ))
}
