//! Handlers for the `/leads` resource.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use netcrm_core::pagination::{PageRequest, Paginated};
use netcrm_core::roles::ROLE_SALES;
use netcrm_core::status::LeadStatus;
use netcrm_core::types::DbId;
use netcrm_db::models::lead::{CreateLead, Lead, LeadFilter, UpdateLead};
use netcrm_db::repositories::{LeadRepo, UserRepo};
use serde_json::json;

use super::{deleted, not_found};
use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::response::{MessageResponse, Page};
use crate::state::AppState;

const LEAD: &str = "Lead";

/// GET /api/v1/leads
pub async fn index(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(filter): Query<LeadFilter>,
) -> AppResult<Page> {
    let request = PageRequest::new(filter.page, filter.per_page);
    let (rows, total) = LeadRepo::list(&state.pool, &filter, request).await?;
    let leads = Paginated::new(rows, total, request, uri.path(), &filter.query_pairs());

    Ok(Page::new(
        "Leads/Index",
        json!({
            "leads": leads,
            "filters": filter,
            "statuses": LeadStatus::options(),
        }),
    ))
}

/// GET /api/v1/leads/create
pub async fn create(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Page> {
    let salespeople = UserRepo::list_by_role(&state.pool, ROLE_SALES).await?;
    Ok(Page::new(
        "Leads/Create",
        json!({
            "statuses": LeadStatus::options(),
            "salespeople": salespeople,
        }),
    ))
}

/// POST /api/v1/leads
pub async fn store(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<CreateLead>,
) -> AppResult<Response> {
    let status = input.validate()?;
    let lead = LeadRepo::create(&state.pool, &input, status).await?;
    tracing::info!(lead_id = lead.id, user_id = user.user_id, "Lead created");
    Ok(MessageResponse::new(lead, "Lead created successfully.").created())
}

/// GET /api/v1/leads/{id}
pub async fn show(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Page> {
    let lead = LeadRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(LEAD, id))?;
    Ok(Page::new("Leads/Show", json!({ "lead": lead })))
}

/// GET /api/v1/leads/{id}/edit
pub async fn edit(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Page> {
    let lead = LeadRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(LEAD, id))?;
    let salespeople = UserRepo::list_by_role(&state.pool, ROLE_SALES).await?;
    Ok(Page::new(
        "Leads/Edit",
        json!({
            "lead": lead,
            "statuses": LeadStatus::options(),
            "salespeople": salespeople,
        }),
    ))
}

/// PUT /api/v1/leads/{id}
pub async fn update(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLead>,
) -> AppResult<MessageResponse<Lead>> {
    let status = input.validate()?;
    let lead = LeadRepo::update(&state.pool, id, &input, status)
        .await?
        .ok_or_else(|| not_found(LEAD, id))?;
    Ok(MessageResponse::new(lead, "Lead updated successfully."))
}

/// DELETE /api/v1/leads/{id}
pub async fn destroy(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let found = LeadRepo::delete(&state.pool, id).await?;
    if found {
        tracing::info!(lead_id = id, user_id = user.user_id, "Lead deleted");
    }
    deleted(found, LEAD, id)
}
