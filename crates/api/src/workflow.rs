//! Project approval workflow and service lifecycle orchestration.
//!
//! Each action is one conditional update in the repository. When no row
//! matches, the current status is re-read to tell a missing project (404)
//! from an illegal transition (409). Notifications are published on the event
//! bus only after the update has committed.

use netcrm_core::error::CoreError;
use netcrm_core::status::ProjectStatus;
use netcrm_core::types::DbId;
use netcrm_core::workflow::{self, ProjectAction, ServiceAction, EDITABLE_STATUSES};
use netcrm_db::models::customer_service::CustomerService;
use netcrm_db::models::project::{Project, UpdateProject};
use netcrm_db::repositories::{CustomerServiceRepo, ProjectRepo};
use netcrm_db::DbPool;
use netcrm_events::project as events;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const PROJECT: &str = "Project";
const CUSTOMER_SERVICE: &str = "CustomerService";

/// Apply `action` to project `id` on behalf of `actor`.
///
/// `reason` is only stored for [`ProjectAction::Reject`].
pub async fn apply(
    state: &AppState,
    id: DbId,
    action: ProjectAction,
    actor: &AuthUser,
    reason: Option<&str>,
) -> AppResult<Project> {
    if matches!(action, ProjectAction::Approve | ProjectAction::Reject) {
        warn_if_not_assigned_manager(&state.pool, id, action, actor).await?;
    }

    let reason = reason.filter(|r| !r.is_empty());
    let project = match ProjectRepo::transition(&state.pool, id, action, actor.user_id, reason)
        .await?
    {
        Some(project) => project,
        None => return Err(rejection(&state.pool, id, action).await),
    };

    tracing::info!(
        project_id = id,
        action = action.verb(),
        status = %project.status,
        actor_id = actor.user_id,
        "Project transitioned"
    );

    publish(state, &project, action, actor.user_id, reason);
    Ok(project)
}

/// Apply a plain field update while the project is still editable.
pub async fn update(pool: &DbPool, current: &Project, input: &UpdateProject) -> AppResult<Project> {
    input.validate(current)?;
    match ProjectRepo::update(pool, current.id, input, EDITABLE_STATUSES).await? {
        Some(project) => Ok(project),
        None => match ProjectRepo::status_of(pool, current.id).await? {
            None => Err(not_found(PROJECT, current.id)),
            Some(status) => Err(not_editable(current.id, status).into()),
        },
    }
}

/// The error for an update attempted outside [`EDITABLE_STATUSES`].
pub fn not_editable(id: DbId, status: ProjectStatus) -> CoreError {
    CoreError::InvalidTransition {
        entity: PROJECT,
        id,
        from: status.to_string(),
        action: "edit",
    }
}

/// Apply a lifecycle action to a service owned by `customer_id`.
pub async fn apply_service(
    pool: &DbPool,
    customer_id: DbId,
    service_id: DbId,
    action: ServiceAction,
) -> AppResult<CustomerService> {
    if let Some(service) =
        CustomerServiceRepo::transition(pool, customer_id, service_id, action).await?
    {
        tracing::info!(
            customer_id,
            service_id,
            action = action.verb(),
            status = %service.status,
            "Service transitioned"
        );
        return Ok(service);
    }

    let current = CustomerServiceRepo::find_for_customer(pool, customer_id, service_id)
        .await?
        .ok_or_else(|| not_found(CUSTOMER_SERVICE, service_id))?;
    workflow::service_transition(service_id, current.service.status, action)?;
    Err(changed_concurrently(CUSTOMER_SERVICE, service_id))
}

/// Explain why a conditional transition matched no row.
async fn rejection(pool: &DbPool, id: DbId, action: ProjectAction) -> crate::error::AppError {
    match ProjectRepo::status_of(pool, id).await {
        Err(e) => e.into(),
        Ok(None) => not_found(PROJECT, id),
        Ok(Some(status)) => match workflow::transition(id, status, action) {
            Err(e) => e.into(),
            Ok(_) => changed_concurrently(PROJECT, id),
        },
    }
}

/// Approvers are not required to be the assigned manager; record when they differ.
async fn warn_if_not_assigned_manager(
    pool: &DbPool,
    id: DbId,
    action: ProjectAction,
    actor: &AuthUser,
) -> AppResult<()> {
    if let Some(project) = ProjectRepo::find_by_id(pool, id).await? {
        if let Some(manager_id) = project.manager_id.filter(|m| *m != actor.user_id) {
            tracing::warn!(
                project_id = id,
                action = action.verb(),
                actor_id = actor.user_id,
                assigned_manager_id = manager_id,
                "Project decided by a manager other than the assigned one"
            );
        }
    }
    Ok(())
}

fn publish(
    state: &AppState,
    project: &Project,
    action: ProjectAction,
    actor_id: DbId,
    reason: Option<&str>,
) {
    let event = match action {
        ProjectAction::Submit => match project.manager_id {
            Some(manager_id) => {
                events::approval_requested(project.id, &project.name, actor_id, manager_id)
            }
            None => {
                tracing::debug!(project_id = project.id, "No manager assigned, nobody to notify");
                return;
            }
        },
        ProjectAction::Approve => {
            events::approved(project.id, &project.name, actor_id, project.created_by)
        }
        ProjectAction::Reject => {
            events::rejected(project.id, &project.name, actor_id, project.created_by, reason)
        }
        ProjectAction::Start | ProjectAction::Complete => return,
    };
    state.event_bus.publish(event);
}

fn not_found(entity: &'static str, id: DbId) -> crate::error::AppError {
    CoreError::NotFound { entity, id }.into()
}

/// The row moved into an allowed status between the update and the re-read.
fn changed_concurrently(entity: &'static str, id: DbId) -> crate::error::AppError {
    CoreError::Conflict(format!("{entity} {id} changed concurrently, please retry")).into()
}
