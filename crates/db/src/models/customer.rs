//! Customer entity model, DTOs and list filter.

use chrono::NaiveDate;
use netcrm_core::error::CoreError;
use netcrm_core::search::{sort_column, SortDir};
use netcrm_core::status::CustomerStatus;
use netcrm_core::types::{DbId, Timestamp};
use netcrm_core::validation::{self, FieldErrors, MAX_NAME_LEN};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::push_pair;

/// Columns the customer index may be sorted by. The first is the default.
pub const CUSTOMER_SORT_COLUMNS: &[&str] =
    &["created_at", "name", "customer_code", "registration_date"];

/// A customer row from the `customers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Customer {
    pub id: DbId,
    pub customer_code: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub billing_address: Option<String>,
    pub installation_address: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: CustomerStatus,
    pub registration_date: NaiveDate,
    pub lead_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Customer row for the index, with its service count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomerSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub customer: Customer,
    pub services_count: i64,
}

/// DTO for creating a new customer. The code is generated on insert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCustomer {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub billing_address: Option<String>,
    pub installation_address: Option<String>,
    /// Defaults to `active` if omitted.
    pub status: Option<String>,
    /// Defaults to today if omitted.
    pub registration_date: Option<NaiveDate>,
    pub lead_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub notes: Option<String>,
}

impl CreateCustomer {
    pub fn validate(&self) -> Result<CustomerStatus, CoreError> {
        let mut errors = FieldErrors::new();
        errors.check("name", validation::required_text(&self.name, MAX_NAME_LEN));
        check_common(&mut errors, self.email.as_deref(), self.phone.as_deref(), self.lead_id, self.user_id);
        let status = match self.status.as_deref() {
            Some(raw) => errors.parse("status", raw),
            None => Some(CustomerStatus::default()),
        };
        errors.into_result()?;
        Ok(status.unwrap_or_default())
    }
}

/// DTO for updating an existing customer. All fields are optional; the
/// customer code is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub billing_address: Option<String>,
    pub installation_address: Option<String>,
    pub status: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub lead_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub notes: Option<String>,
}

impl UpdateCustomer {
    pub fn validate(&self) -> Result<Option<CustomerStatus>, CoreError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.check("name", validation::required_text(name, MAX_NAME_LEN));
        }
        check_common(&mut errors, self.email.as_deref(), self.phone.as_deref(), self.lead_id, self.user_id);
        let status = self
            .status
            .as_deref()
            .and_then(|raw| errors.parse::<CustomerStatus>("status", raw));
        errors.into_result()?;
        Ok(status)
    }
}

fn check_common(
    errors: &mut FieldErrors,
    email: Option<&str>,
    phone: Option<&str>,
    lead_id: Option<DbId>,
    user_id: Option<DbId>,
) {
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        errors.check("email", validation::email(email));
    }
    if let Some(phone) = phone.filter(|p| !p.is_empty()) {
        errors.check("phone", validation::phone(phone));
    }
    if let Some(id) = lead_id {
        errors.check("lead_id", validation::positive_id(id));
    }
    if let Some(id) = user_id {
        errors.check("user_id", validation::positive_id(id));
    }
}

/// Query-string filter for the customer index.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl CustomerFilter {
    /// Whitelisted `ORDER BY` column.
    pub fn sort_column(&self) -> &'static str {
        sort_column(self.sort_by.as_deref(), CUSTOMER_SORT_COLUMNS)
    }

    pub fn sort_dir(&self) -> SortDir {
        SortDir::parse(self.sort_dir.as_deref())
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_pair(&mut pairs, "search", self.search.as_deref());
        push_pair(&mut pairs, "status", self.status.as_deref());
        push_pair(&mut pairs, "sort_by", self.sort_by.as_deref());
        push_pair(&mut pairs, "sort_dir", self.sort_dir.as_deref());
        push_pair(&mut pairs, "per_page", self.per_page.map(|v| v.to_string()).as_deref());
        pairs
    }
}
