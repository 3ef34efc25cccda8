//! Repository for the `leads` table.

use netcrm_core::pagination::PageRequest;
use netcrm_core::search::search_pattern;
use netcrm_core::status::LeadStatus;
use netcrm_core::types::DbId;
use sqlx::PgPool;

use crate::models::lead::{CreateLead, Lead, LeadDetail, LeadFilter, LeadOption, UpdateLead};
use crate::models::non_blank;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, phone, company, address, source, status, \
                       assigned_to, notes, created_at, updated_at";

/// `COLUMNS` qualified with the `l` alias plus the salesperson name.
const DETAIL_SELECT: &str = "SELECT l.id, l.name, l.email, l.phone, l.company, l.address, \
                                    l.source, l.status, l.assigned_to, l.notes, \
                                    l.created_at, l.updated_at, \
                                    u.name AS assigned_to_name \
                             FROM leads l \
                             LEFT JOIN users u ON u.id = l.assigned_to";

/// Shared `WHERE` clause for list and count.
const FILTER: &str = "WHERE ($1::TEXT IS NULL
                             OR l.name ILIKE $1 OR l.email ILIKE $1
                             OR l.phone ILIKE $1 OR l.company ILIKE $1)
                       AND ($2::TEXT IS NULL OR l.status = $2)
                       AND ($3::TEXT IS NULL OR l.source = $3)
                       AND ($4::BIGINT IS NULL OR l.assigned_to = $4)";

/// Provides CRUD operations for leads.
pub struct LeadRepo;

impl LeadRepo {
    /// Insert a new lead, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateLead,
        status: LeadStatus,
    ) -> Result<Lead, sqlx::Error> {
        let query = format!(
            "INSERT INTO leads (name, email, phone, company, address, source, status, assigned_to, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(input.name.trim())
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.address)
            .bind(&input.source)
            .bind(status.as_str())
            .bind(input.assigned_to)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a lead by ID, including the salesperson's name.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LeadDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE l.id = $1");
        sqlx::query_as::<_, LeadDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of leads matching `filter`, newest first, with the total count.
    pub async fn list(
        pool: &PgPool,
        filter: &LeadFilter,
        page: PageRequest,
    ) -> Result<(Vec<LeadDetail>, i64), sqlx::Error> {
        let search = search_pattern(filter.search.as_deref());
        let status = non_blank(filter.status.as_deref());
        let source = non_blank(filter.source.as_deref());

        let query = format!(
            "{DETAIL_SELECT} {FILTER}
             ORDER BY l.created_at DESC, l.id DESC
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, LeadDetail>(&query)
            .bind(&search)
            .bind(status)
            .bind(source)
            .bind(filter.assigned_to)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM leads l {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&search)
            .bind(status)
            .bind(source)
            .bind(filter.assigned_to)
            .fetch_one(pool)
            .await?;

        Ok((rows, total))
    }

    /// `{ id, name, company }` for every lead, for form selects.
    pub async fn options(pool: &PgPool) -> Result<Vec<LeadOption>, sqlx::Error> {
        sqlx::query_as::<_, LeadOption>("SELECT id, name, company FROM leads ORDER BY name")
            .fetch_all(pool)
            .await
    }

    /// Update a lead. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLead,
        status: Option<LeadStatus>,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!(
            "UPDATE leads SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                company = COALESCE($5, company),
                address = COALESCE($6, address),
                source = COALESCE($7, source),
                status = COALESCE($8, status),
                assigned_to = COALESCE($9, assigned_to),
                notes = COALESCE($10, notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.address)
            .bind(&input.source)
            .bind(status.map(LeadStatus::as_str))
            .bind(input.assigned_to)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a lead by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
