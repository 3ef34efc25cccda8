//! Repository for the `customer_services` table.

use chrono::NaiveDate;
use netcrm_core::status::ServiceStatus;
use netcrm_core::types::{DbId, Money};
use netcrm_core::workflow::ServiceAction;
use sqlx::PgPool;

use crate::models::customer_service::{
    CreateCustomerService, CustomerService, CustomerServiceDetail,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, service_number, customer_id, product_id, status, activation_date, \
                       expiry_date, monthly_fee, installation_notes, technical_notes, \
                       created_at, updated_at";

const DETAIL_SELECT: &str = "SELECT s.id, s.service_number, s.customer_id, s.product_id, \
                                    s.status, s.activation_date, s.expiry_date, s.monthly_fee, \
                                    s.installation_notes, s.technical_notes, \
                                    s.created_at, s.updated_at, \
                                    p.name AS product_name, p.type AS product_type \
                             FROM customer_services s \
                             LEFT JOIN products p ON p.id = s.product_id";

/// Provides operations on a customer's service subscriptions.
pub struct CustomerServiceRepo;

impl CustomerServiceRepo {
    /// Insert a service under an already allocated `number`.
    pub async fn create(
        pool: &PgPool,
        customer_id: DbId,
        number: &str,
        input: &CreateCustomerService,
        activation_date: NaiveDate,
        monthly_fee: Money,
    ) -> Result<CustomerService, sqlx::Error> {
        let query = format!(
            "INSERT INTO customer_services
                (service_number, customer_id, product_id, status, activation_date,
                 expiry_date, monthly_fee, installation_notes, technical_notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomerService>(&query)
            .bind(number)
            .bind(customer_id)
            .bind(input.product_id)
            .bind(ServiceStatus::Active.as_str())
            .bind(activation_date)
            .bind(input.expiry_date)
            .bind(monthly_fee)
            .bind(&input.installation_notes)
            .bind(&input.technical_notes)
            .fetch_one(pool)
            .await
    }

    /// Every service of a customer, newest first.
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Vec<CustomerServiceDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} WHERE s.customer_id = $1 ORDER BY s.created_at DESC, s.id DESC"
        );
        sqlx::query_as::<_, CustomerServiceDetail>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }

    /// Find a service scoped to its owning customer.
    pub async fn find_for_customer(
        pool: &PgPool,
        customer_id: DbId,
        id: DbId,
    ) -> Result<Option<CustomerServiceDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE s.customer_id = $1 AND s.id = $2");
        sqlx::query_as::<_, CustomerServiceDetail>(&query)
            .bind(customer_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a lifecycle action if the service is in an allowed status.
    ///
    /// Terminating fills in today's date as expiry when none is set. Returns
    /// `None` when no row matched.
    pub async fn transition(
        pool: &PgPool,
        customer_id: DbId,
        id: DbId,
        action: ServiceAction,
    ) -> Result<Option<CustomerService>, sqlx::Error> {
        let set = match action {
            ServiceAction::Terminate => "status = $4, expiry_date = COALESCE(expiry_date, CURRENT_DATE)",
            ServiceAction::Activate | ServiceAction::Suspend => "status = $4",
        };
        let allowed: Vec<String> = action
            .allowed_from()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        let query = format!(
            "UPDATE customer_services SET {set}
             WHERE customer_id = $1 AND id = $2 AND status = ANY($3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomerService>(&query)
            .bind(customer_id)
            .bind(id)
            .bind(allowed)
            .bind(action.target().as_str())
            .fetch_optional(pool)
            .await
    }
}
