//! Repository for the `customers` table.

use chrono::NaiveDate;
use netcrm_core::pagination::PageRequest;
use netcrm_core::search::search_pattern;
use netcrm_core::status::CustomerStatus;
use netcrm_core::types::DbId;
use sqlx::PgPool;

use crate::models::customer::{
    CreateCustomer, Customer, CustomerFilter, CustomerSummary, UpdateCustomer,
};
use crate::models::non_blank;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, customer_code, name, email, phone, company, billing_address, \
                       installation_address, status, registration_date, lead_id, user_id, \
                       notes, created_at, updated_at";

const FILTER: &str = "WHERE ($1::TEXT IS NULL
                             OR customer_code ILIKE $1 OR name ILIKE $1
                             OR email ILIKE $1 OR company ILIKE $1)
                       AND ($2::TEXT IS NULL OR status = $2)";

/// Provides CRUD operations for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Insert a new customer under an already allocated `code`.
    ///
    /// A clash on `uq_customers_code` surfaces as a unique violation for the
    /// caller to retry with a fresh code.
    pub async fn create(
        pool: &PgPool,
        code: &str,
        input: &CreateCustomer,
        status: CustomerStatus,
        registration_date: NaiveDate,
    ) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers
                (customer_code, name, email, phone, company, billing_address,
                 installation_address, status, registration_date, lead_id, user_id, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(code)
            .bind(input.name.trim())
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.billing_address)
            .bind(&input.installation_address)
            .bind(status.as_str())
            .bind(registration_date)
            .bind(input.lead_id)
            .bind(input.user_id)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a customer by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the customer record linked to a portal user.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE user_id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// One page of customers matching `filter` with the total count.
    ///
    /// The sort column comes from a whitelist; `id` breaks ties in the same
    /// direction.
    pub async fn list(
        pool: &PgPool,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<(Vec<CustomerSummary>, i64), sqlx::Error> {
        let search = search_pattern(filter.search.as_deref());
        let status = non_blank(filter.status.as_deref());
        let column = filter.sort_column();
        let dir = filter.sort_dir().as_sql();

        let query = format!(
            "SELECT {COLUMNS},
                    (SELECT COUNT(*) FROM customer_services s WHERE s.customer_id = customers.id)
                        AS services_count
             FROM customers {FILTER}
             ORDER BY {column} {dir}, id {dir}
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, CustomerSummary>(&query)
            .bind(&search)
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM customers {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&search)
            .bind(status)
            .fetch_one(pool)
            .await?;

        Ok((rows, total))
    }

    /// Update a customer. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCustomer,
        status: Option<CustomerStatus>,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                company = COALESCE($5, company),
                billing_address = COALESCE($6, billing_address),
                installation_address = COALESCE($7, installation_address),
                status = COALESCE($8, status),
                registration_date = COALESCE($9, registration_date),
                lead_id = COALESCE($10, lead_id),
                user_id = COALESCE($11, user_id),
                notes = COALESCE($12, notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.billing_address)
            .bind(&input.installation_address)
            .bind(status.map(CustomerStatus::as_str))
            .bind(input.registration_date)
            .bind(input.lead_id)
            .bind(input.user_id)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a customer and, by cascade, its services.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
