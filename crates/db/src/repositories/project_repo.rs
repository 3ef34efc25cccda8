//! Repository for the `projects` table.
//!
//! Status changes are conditional updates: the `WHERE` clause carries the
//! statuses an action is allowed from, so a stale read can never push a
//! project through an illegal transition. `None` from a transition method
//! means no row matched; the caller re-reads to tell "missing" from
//! "wrong status".

use netcrm_core::pagination::PageRequest;
use netcrm_core::search::search_pattern;
use netcrm_core::status::ProjectStatus;
use netcrm_core::types::DbId;
use netcrm_core::workflow::ProjectAction;
use sqlx::PgPool;

use crate::models::non_blank;
use crate::models::project::{CreateProject, Project, ProjectDetail, ProjectFilter, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, status, estimated_value, start_date, end_date, \
                       lead_id, product_id, manager_id, created_by, approved_at, rejected_at, \
                       rejection_reason, completed_at, notes, created_at, updated_at";

/// Project columns under the `p` alias plus joined display names.
const DETAIL_SELECT: &str = "SELECT p.id, p.name, p.description, p.status, p.estimated_value, \
                                    p.start_date, p.end_date, p.lead_id, p.product_id, \
                                    p.manager_id, p.created_by, p.approved_at, p.rejected_at, \
                                    p.rejection_reason, p.completed_at, p.notes, \
                                    p.created_at, p.updated_at, \
                                    l.name AS lead_name, pr.name AS product_name, \
                                    m.name AS manager_name, u.name AS creator_name \
                             FROM projects p \
                             LEFT JOIN leads l ON l.id = p.lead_id \
                             LEFT JOIN products pr ON pr.id = p.product_id \
                             LEFT JOIN users m ON m.id = p.manager_id \
                             LEFT JOIN users u ON u.id = p.created_by";

const FILTER: &str = "WHERE ($1::TEXT IS NULL OR p.name ILIKE $1 OR p.description ILIKE $1)
                       AND ($2::TEXT IS NULL OR p.status = $2)
                       AND ($3::BIGINT IS NULL OR p.lead_id = $3)
                       AND ($4::BIGINT IS NULL OR p.product_id = $4)
                       AND ($5::DATE IS NULL OR p.created_at::date >= $5)
                       AND ($6::DATE IS NULL OR p.created_at::date <= $6)";

fn status_values(statuses: &[ProjectStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// Provides CRUD and workflow operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProject,
        status: ProjectStatus,
        created_by: DbId,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (name, description, status, estimated_value, start_date, end_date,
                 lead_id, product_id, manager_id, created_by, notes)
             VALUES ($1, $2, $3, COALESCE($4, 0), $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.name.trim())
            .bind(input.description.trim())
            .bind(status.as_str())
            .bind(input.estimated_value)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.lead_id)
            .bind(input.product_id)
            .bind(input.manager_id)
            .bind(created_by)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by ID with lead, product, manager and creator names.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, ProjectDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of projects matching `filter`, newest first, with the total count.
    pub async fn list(
        pool: &PgPool,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> Result<(Vec<ProjectDetail>, i64), sqlx::Error> {
        let search = search_pattern(filter.search.as_deref());
        let status = non_blank(filter.status.as_deref());

        let query = format!(
            "{DETAIL_SELECT} {FILTER}
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $7 OFFSET $8"
        );
        let rows = sqlx::query_as::<_, ProjectDetail>(&query)
            .bind(&search)
            .bind(status)
            .bind(filter.lead_id)
            .bind(filter.product_id)
            .bind(filter.date_from)
            .bind(filter.date_to)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM projects p {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&search)
            .bind(status)
            .bind(filter.lead_id)
            .bind(filter.product_id)
            .bind(filter.date_from)
            .bind(filter.date_to)
            .fetch_one(pool)
            .await?;

        Ok((rows, total))
    }

    /// Projects waiting for approval, oldest submission first.
    pub async fn list_waiting_approval(
        pool: &PgPool,
        page: PageRequest,
    ) -> Result<(Vec<ProjectDetail>, i64), sqlx::Error> {
        let status = ProjectStatus::WaitingApproval.as_str();
        let query = format!(
            "{DETAIL_SELECT} WHERE p.status = $1
             ORDER BY p.updated_at ASC, p.id ASC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, ProjectDetail>(&query)
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE status = $1")
            .bind(status)
            .fetch_one(pool)
            .await?;
        Ok((rows, total))
    }

    /// Update plain fields while the project is in one of `editable` statuses.
    ///
    /// Only non-`None` fields in `input` are applied. Returns `None` when the
    /// row is missing or no longer editable.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
        editable: &[ProjectStatus],
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                estimated_value = COALESCE($5, estimated_value),
                start_date = COALESCE($6, start_date),
                end_date = COALESCE($7, end_date),
                lead_id = COALESCE($8, lead_id),
                product_id = COALESCE($9, product_id),
                manager_id = COALESCE($10, manager_id),
                notes = COALESCE($11, notes)
             WHERE id = $1 AND status = ANY($2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(status_values(editable))
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.description.as_deref().map(str::trim))
            .bind(input.estimated_value)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.lead_id)
            .bind(input.product_id)
            .bind(input.manager_id)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Apply a workflow action if the project is in an allowed status.
    ///
    /// `actor_id` becomes the project manager on approve/reject; `reason` is
    /// stored verbatim on reject. Returns `None` when no row matched.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        action: ProjectAction,
        actor_id: DbId,
        reason: Option<&str>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let set = match action {
            ProjectAction::Start => "status = $3",
            ProjectAction::Submit => {
                "status = $3, rejected_at = NULL, rejection_reason = NULL"
            }
            ProjectAction::Approve => "status = $3, manager_id = $4, approved_at = NOW()",
            ProjectAction::Reject => {
                "status = $3, manager_id = $4, rejected_at = NOW(), rejection_reason = $5"
            }
            ProjectAction::Complete => "status = $3, completed_at = NOW()",
        };
        let query = format!(
            "UPDATE projects SET {set}
             WHERE id = $1 AND status = ANY($2)
             RETURNING {COLUMNS}"
        );
        let mut stmt = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(status_values(action.allowed_from()))
            .bind(action.target().as_str());
        match action {
            ProjectAction::Approve => stmt = stmt.bind(actor_id),
            ProjectAction::Reject => stmt = stmt.bind(actor_id).bind(reason),
            ProjectAction::Start | ProjectAction::Submit | ProjectAction::Complete => {}
        }
        stmt.fetch_optional(pool).await
    }

    /// Current status of a project, if it exists.
    pub async fn status_of(pool: &PgPool, id: DbId) -> Result<Option<ProjectStatus>, sqlx::Error> {
        let raw: Option<String> = sqlx::query_scalar("SELECT status FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        raw.map(|s| {
            s.parse::<ProjectStatus>()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))
        })
        .transpose()
    }

    /// Permanently delete a project by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
