//! Handlers for the `/customers` resource and its services sub-resource.
//!
//! Customer codes and service numbers are allocated through
//! [`codegen::allocate`](crate::codegen::allocate).

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use netcrm_core::error::CoreError;
use netcrm_core::pagination::{PageRequest, Paginated};
use netcrm_core::status::CustomerStatus;
use netcrm_core::types::DbId;
use netcrm_core::validation::FieldErrors;
use netcrm_core::workflow::ServiceAction;
use netcrm_db::models::customer::{
    CreateCustomer, Customer, CustomerFilter, UpdateCustomer, CUSTOMER_SORT_COLUMNS,
};
use netcrm_db::models::customer_service::{CreateCustomerService, CustomerService};
use netcrm_db::repositories::{
    CodeKind, CustomerRepo, CustomerServiceRepo, LeadRepo, ProductRepo,
};
use serde_json::json;

use super::{deleted, not_found, today};
use crate::codegen;
use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::response::{MessageResponse, Page};
use crate::state::AppState;
use crate::workflow;

const CUSTOMER: &str = "Customer";

async fn find_customer(state: &AppState, id: DbId) -> AppResult<Customer> {
    CustomerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(CUSTOMER, id))
}

/// GET /api/v1/customers
pub async fn index(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(filter): Query<CustomerFilter>,
) -> AppResult<Page> {
    let request = PageRequest::new(filter.page, filter.per_page);
    let (rows, total) = CustomerRepo::list(&state.pool, &filter, request).await?;
    let customers = Paginated::new(rows, total, request, uri.path(), &filter.query_pairs());

    Ok(Page::new(
        "Customers/Index",
        json!({
            "customers": customers,
            "filters": filter,
            "statuses": CustomerStatus::options(),
            "sort_columns": CUSTOMER_SORT_COLUMNS,
        }),
    ))
}

/// GET /api/v1/customers/create
pub async fn create(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Page> {
    let leads = LeadRepo::options(&state.pool).await?;
    Ok(Page::new(
        "Customers/Create",
        json!({
            "statuses": CustomerStatus::options(),
            "leads": leads,
        }),
    ))
}

/// POST /api/v1/customers
pub async fn store(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<CreateCustomer>,
) -> AppResult<Response> {
    let status = input.validate()?;
    let today = today();
    let registration_date = input.registration_date.unwrap_or(today);

    let pool = &state.pool;
    let input = &input;
    let customer = codegen::allocate(pool, CodeKind::CustomerCode, today, |code| async move {
        CustomerRepo::create(pool, &code, input, status, registration_date).await
    })
    .await?;

    tracing::info!(
        customer_id = customer.id,
        customer_code = %customer.customer_code,
        user_id = user.user_id,
        "Customer created"
    );
    Ok(MessageResponse::new(customer, "Customer created successfully.").created())
}

/// GET /api/v1/customers/{id}
pub async fn show(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Page> {
    let customer = find_customer(&state, id).await?;
    let services = CustomerServiceRepo::list_for_customer(&state.pool, id).await?;
    let products = ProductRepo::active_options(&state.pool).await?;

    Ok(Page::new(
        "Customers/Show",
        json!({
            "customer": customer,
            "services": services,
            "products": products,
        }),
    ))
}

/// GET /api/v1/customers/{id}/edit
pub async fn edit(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Page> {
    let customer = find_customer(&state, id).await?;
    let leads = LeadRepo::options(&state.pool).await?;
    Ok(Page::new(
        "Customers/Edit",
        json!({
            "customer": customer,
            "statuses": CustomerStatus::options(),
            "leads": leads,
        }),
    ))
}

/// PUT /api/v1/customers/{id}
pub async fn update(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCustomer>,
) -> AppResult<MessageResponse<Customer>> {
    let status = input.validate()?;
    let customer = CustomerRepo::update(&state.pool, id, &input, status)
        .await?
        .ok_or_else(|| not_found(CUSTOMER, id))?;
    Ok(MessageResponse::new(customer, "Customer updated successfully."))
}

/// DELETE /api/v1/customers/{id}
///
/// Removes the customer together with its services.
pub async fn destroy(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let found = CustomerRepo::delete(&state.pool, id).await?;
    if found {
        tracing::info!(customer_id = id, user_id = user.user_id, "Customer deleted");
    }
    deleted(found, CUSTOMER, id)
}

/// POST /api/v1/customers/{id}/services
///
/// The monthly fee is copied from the product's current price.
pub async fn add_service(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateCustomerService>,
) -> AppResult<Response> {
    let customer = find_customer(&state, id).await?;
    let today = today();
    let activation_date = input.activation_date.unwrap_or(today);
    input.validate(activation_date)?;

    let product = ProductRepo::find_by_id(&state.pool, input.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| {
            let mut errors = FieldErrors::new();
            errors.add("product_id", "The selected product id is invalid");
            CoreError::InvalidFields(errors)
        })?;

    let pool = &state.pool;
    let input = &input;
    let customer_id = customer.id;
    let monthly_fee = product.price;
    let service = codegen::allocate(pool, CodeKind::ServiceNumber, today, |number| async move {
        CustomerServiceRepo::create(
            pool,
            customer_id,
            &number,
            input,
            activation_date,
            monthly_fee,
        )
        .await
    })
    .await?;

    tracing::info!(
        customer_id,
        service_id = service.id,
        service_number = %service.service_number,
        user_id = user.user_id,
        "Service added"
    );
    Ok(MessageResponse::new(service, "Service added successfully.").created())
}

/// DELETE /api/v1/customers/{id}/services/{service_id}
///
/// Terminates the service. The row is kept for history.
pub async fn terminate_service(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path((id, service_id)): Path<(DbId, DbId)>,
) -> AppResult<MessageResponse<CustomerService>> {
    let service =
        workflow::apply_service(&state.pool, id, service_id, ServiceAction::Terminate).await?;
    Ok(MessageResponse::new(service, "Service terminated."))
}

/// PATCH /api/v1/customers/{id}/services/{service_id}/suspend
pub async fn suspend_service(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path((id, service_id)): Path<(DbId, DbId)>,
) -> AppResult<MessageResponse<CustomerService>> {
    let service =
        workflow::apply_service(&state.pool, id, service_id, ServiceAction::Suspend).await?;
    Ok(MessageResponse::new(service, "Service suspended."))
}

/// PATCH /api/v1/customers/{id}/services/{service_id}/activate
pub async fn activate_service(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path((id, service_id)): Path<(DbId, DbId)>,
) -> AppResult<MessageResponse<CustomerService>> {
    let service =
        workflow::apply_service(&state.pool, id, service_id, ServiceAction::Activate).await?;
    Ok(MessageResponse::new(service, "Service activated."))
}
