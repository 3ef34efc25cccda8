//! Customer service subscription model and DTOs.

use chrono::NaiveDate;
use netcrm_core::error::CoreError;
use netcrm_core::status::ServiceStatus;
use netcrm_core::types::{DbId, Money, Timestamp};
use netcrm_core::validation::{self, FieldErrors};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `customer_services` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomerService {
    pub id: DbId,
    pub service_number: String,
    pub customer_id: DbId,
    pub product_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: ServiceStatus,
    pub activation_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    /// Product price at the time the service was added.
    pub monthly_fee: Money,
    pub installation_notes: Option<String>,
    pub technical_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Service joined with its product name and type.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomerServiceDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub service: CustomerService,
    pub product_name: Option<String>,
    pub product_type: Option<String>,
}

/// DTO for adding a service to a customer. The number is generated on insert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCustomerService {
    #[serde(default)]
    pub product_id: DbId,
    /// Defaults to today if omitted.
    pub activation_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub installation_notes: Option<String>,
    pub technical_notes: Option<String>,
}

impl CreateCustomerService {
    /// Validate against the effective activation date.
    pub fn validate(&self, activation_date: NaiveDate) -> Result<(), CoreError> {
        let mut errors = FieldErrors::new();
        errors.check("product_id", validation::positive_id(self.product_id));
        errors.check(
            "expiry_date",
            validation::date_after(Some(activation_date), self.expiry_date),
        );
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn expiry_must_follow_activation() {
        let activation = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let input = CreateCustomerService {
            product_id: 3,
            expiry_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..Default::default()
        };
        assert_matches!(input.validate(activation), Err(CoreError::InvalidFields(errors)) => {
            assert!(errors.get("expiry_date").is_some());
        });
    }

    #[test]
    fn product_is_required() {
        let activation = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_matches!(
            CreateCustomerService::default().validate(activation),
            Err(CoreError::InvalidFields(_))
        );
    }
}
