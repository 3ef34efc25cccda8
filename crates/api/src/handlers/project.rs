//! Handlers for the `/projects` resource and its approval workflow.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use netcrm_core::pagination::{PageRequest, Paginated};
use netcrm_core::roles;
use netcrm_core::status::{humanize, ProjectStatus, SelectOption};
use netcrm_core::types::DbId;
use netcrm_core::workflow::{self, ProjectAction};
use netcrm_db::models::project::{CreateProject, Project, ProjectFilter, UpdateProject};
use netcrm_db::repositories::{LeadRepo, ProductRepo, ProjectRepo, UserRepo};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{deleted, not_found};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireManager, RequireStaff};
use crate::response::{MessageResponse, Page};
use crate::state::AppState;
use crate::workflow as flow;

const PROJECT: &str = "Project";

/// Request body for `PATCH /projects/{id}/reject`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// Query parameters for the approval queue.
#[derive(Debug, Default, Deserialize)]
pub struct QueueParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Key a client uses to call an action route.
fn action_key(action: ProjectAction) -> &'static str {
    match action {
        ProjectAction::Start => "start",
        ProjectAction::Submit => "submit",
        ProjectAction::Approve => "approve",
        ProjectAction::Reject => "reject",
        ProjectAction::Complete => "complete",
    }
}

/// Workflow actions `role` may take on a project in `status`.
fn available_actions(status: ProjectStatus, role: &str) -> Vec<&'static str> {
    ProjectAction::ALL
        .iter()
        .copied()
        .filter(|action| workflow::next_status(status, *action).is_some())
        .filter(|action| match action {
            ProjectAction::Approve | ProjectAction::Reject => roles::can_approve(role),
            _ => true,
        })
        .map(action_key)
        .collect()
}

fn initial_statuses() -> Vec<SelectOption> {
    ProjectStatus::ALL
        .iter()
        .filter(|status| workflow::is_initial(**status))
        .map(|status| SelectOption {
            value: status.as_str(),
            label: humanize(status.as_str()),
        })
        .collect()
}

/// Select options shared by the create and edit forms.
async fn form_options(state: &AppState) -> AppResult<Value> {
    let leads = LeadRepo::options(&state.pool).await?;
    let products = ProductRepo::active_options(&state.pool).await?;
    let managers = UserRepo::list_managers(&state.pool).await?;
    Ok(json!({
        "leads": leads,
        "products": products,
        "managers": managers,
    }))
}

/// GET /api/v1/projects
pub async fn index(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(filter): Query<ProjectFilter>,
) -> AppResult<Page> {
    let request = PageRequest::new(filter.page, filter.per_page);
    let (rows, total) = ProjectRepo::list(&state.pool, &filter, request).await?;
    let projects = Paginated::new(rows, total, request, uri.path(), &filter.query_pairs());
    let leads = LeadRepo::options(&state.pool).await?;
    let products = ProductRepo::active_options(&state.pool).await?;

    Ok(Page::new(
        "Projects/Index",
        json!({
            "projects": projects,
            "filters": filter,
            "statuses": ProjectStatus::options(),
            "leads": leads,
            "products": products,
        }),
    ))
}

/// GET /api/v1/projects/create
pub async fn create(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Page> {
    let mut props = form_options(&state).await?;
    props["statuses"] = json!(initial_statuses());
    Ok(Page::new("Projects/Create", props))
}

/// POST /api/v1/projects
pub async fn store(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<Response> {
    let status = input.validate()?;
    let project = ProjectRepo::create(&state.pool, &input, status, user.user_id).await?;
    tracing::info!(
        project_id = project.id,
        status = %project.status,
        user_id = user.user_id,
        "Project created"
    );
    Ok(MessageResponse::new(project, "Project created successfully.").created())
}

/// GET /api/v1/projects/{id}
pub async fn show(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Page> {
    let project = ProjectRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(PROJECT, id))?;
    let status = project.project.status;

    Ok(Page::new(
        "Projects/Show",
        json!({
            "project": project,
            "can_edit": workflow::is_editable(status),
            "actions": available_actions(status, &user.role),
        }),
    ))
}

/// GET /api/v1/projects/{id}/edit
///
/// Refused with 409 once the project has left the editable statuses.
pub async fn edit(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Page> {
    let project = ProjectRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(PROJECT, id))?;
    if !workflow::is_editable(project.project.status) {
        return Err(flow::not_editable(id, project.project.status).into());
    }

    let mut props = form_options(&state).await?;
    props["project"] = json!(project);
    Ok(Page::new("Projects/Edit", props))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<MessageResponse<Project>> {
    let current = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(PROJECT, id))?;
    let project = flow::update(&state.pool, &current, &input).await?;
    Ok(MessageResponse::new(project, "Project updated successfully."))
}

/// DELETE /api/v1/projects/{id}
pub async fn destroy(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let found = ProjectRepo::delete(&state.pool, id).await?;
    if found {
        tracing::info!(project_id = id, user_id = user.user_id, "Project deleted");
    }
    deleted(found, PROJECT, id)
}

async fn act(
    state: &AppState,
    id: DbId,
    action: ProjectAction,
    user: &AuthUser,
    reason: Option<&str>,
    message: &str,
) -> AppResult<MessageResponse<Project>> {
    let project = flow::apply(state, id, action, user, reason).await?;
    Ok(MessageResponse::new(project, message))
}

/// PATCH /api/v1/projects/{id}/start
pub async fn start(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<MessageResponse<Project>> {
    act(&state, id, ProjectAction::Start, &user, None, "Project started.").await
}

/// POST /api/v1/projects/{id}/submit-for-approval
pub async fn submit_for_approval(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<MessageResponse<Project>> {
    act(
        &state,
        id,
        ProjectAction::Submit,
        &user,
        None,
        "Project submitted for approval.",
    )
    .await
}

/// PATCH /api/v1/projects/{id}/approve
pub async fn approve(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<MessageResponse<Project>> {
    act(&state, id, ProjectAction::Approve, &user, None, "Project approved.").await
}

/// PATCH /api/v1/projects/{id}/reject
///
/// The body is optional; without one the project is rejected with no reason.
pub async fn reject(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<RejectRequest>>,
) -> AppResult<MessageResponse<Project>> {
    let reason = input.as_ref().and_then(|Json(body)| body.reason.as_deref());
    act(
        &state,
        id,
        ProjectAction::Reject,
        &user,
        reason,
        "Project rejected.",
    )
    .await
}

/// PATCH /api/v1/projects/{id}/complete
pub async fn complete(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<MessageResponse<Project>> {
    act(&state, id, ProjectAction::Complete, &user, None, "Project completed.").await
}

/// GET /api/v1/projects/pending-approval
pub async fn pending_approval(
    RequireManager(_user): RequireManager,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<QueueParams>,
) -> AppResult<Page> {
    let request = PageRequest::new(params.page, params.per_page);
    let (rows, total) = ProjectRepo::list_waiting_approval(&state.pool, request).await?;
    let mut query = Vec::new();
    if let Some(per_page) = params.per_page {
        query.push(("per_page".to_string(), per_page.to_string()));
    }
    let projects = Paginated::new(rows, total, request, uri.path(), &query);
    Ok(Page::new(
        "Projects/PendingApproval",
        json!({ "projects": projects }),
    ))
}
