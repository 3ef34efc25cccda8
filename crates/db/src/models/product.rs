//! Product catalog model and DTOs.

use netcrm_core::error::CoreError;
use netcrm_core::status::{BillingCycle, ProductType};
use netcrm_core::types::{DbId, Money, Timestamp};
use netcrm_core::validation::{self, FieldErrors, MAX_NAME_LEN};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::push_pair;

/// A product row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "type", try_from = "String")]
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub price: Money,
    #[sqlx(try_from = "String")]
    pub billing_cycle: BillingCycle,
    pub speed_mbps: Option<i32>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// `{ id, name, price }` for product selects on project and service forms.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductOption {
    pub id: DbId,
    pub name: String,
    pub price: Money,
}

/// DTO for creating a new product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProduct {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub product_type: String,
    pub price: Option<Money>,
    /// Defaults to `monthly` if omitted.
    pub billing_cycle: Option<String>,
    pub speed_mbps: Option<i32>,
    /// Defaults to `true` if omitted.
    pub is_active: Option<bool>,
}

/// Closed values parsed from an update payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductChoices {
    pub product_type: Option<ProductType>,
    pub billing_cycle: Option<BillingCycle>,
}

impl CreateProduct {
    /// Validate every field and parse the product type and billing cycle.
    pub fn validate(&self) -> Result<(ProductType, BillingCycle), CoreError> {
        let mut errors = FieldErrors::new();
        errors.check("name", validation::required_text(&self.name, MAX_NAME_LEN));
        let product_type = errors.parse::<ProductType>("type", &self.product_type);
        match self.price {
            Some(price) => errors.check("price", validation::non_negative(price)),
            None => errors.add("price", "This field is required"),
        }
        let billing_cycle = match self.billing_cycle.as_deref() {
            Some(raw) => errors.parse("billing_cycle", raw),
            None => Some(BillingCycle::default()),
        };
        if let Some(speed) = self.speed_mbps {
            errors.check("speed_mbps", validation::positive_int(speed));
        }
        errors.into_result()?;
        product_type
            .zip(billing_cycle)
            .ok_or_else(|| CoreError::Validation("Invalid product type".to_string()))
    }
}

/// DTO for updating an existing product. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub price: Option<Money>,
    pub billing_cycle: Option<String>,
    pub speed_mbps: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateProduct {
    pub fn validate(&self) -> Result<ProductChoices, CoreError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.check("name", validation::required_text(name, MAX_NAME_LEN));
        }
        let product_type = self
            .product_type
            .as_deref()
            .and_then(|raw| errors.parse::<ProductType>("type", raw));
        if let Some(price) = self.price {
            errors.check("price", validation::non_negative(price));
        }
        let billing_cycle = self
            .billing_cycle
            .as_deref()
            .and_then(|raw| errors.parse::<BillingCycle>("billing_cycle", raw));
        if let Some(speed) = self.speed_mbps {
            errors.check("speed_mbps", validation::positive_int(speed));
        }
        errors.into_result()?;
        Ok(ProductChoices {
            product_type,
            billing_cycle,
        })
    }
}

/// Query-string filter for the product index.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub billing_cycle: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ProductFilter {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_pair(&mut pairs, "search", self.search.as_deref());
        push_pair(&mut pairs, "type", self.product_type.as_deref());
        push_pair(&mut pairs, "billing_cycle", self.billing_cycle.as_deref());
        push_pair(&mut pairs, "is_active", self.is_active.map(|v| v.to_string()).as_deref());
        push_pair(&mut pairs, "per_page", self.per_page.map(|v| v.to_string()).as_deref());
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn valid_product_defaults_to_monthly() {
        let input = CreateProduct {
            name: "Fiber 100".into(),
            product_type: "internet".into(),
            price: Some("350000.00".parse().unwrap()),
            speed_mbps: Some(100),
            ..Default::default()
        };
        let (product_type, billing_cycle) = input.validate().unwrap();
        assert_eq!(product_type, ProductType::Internet);
        assert_eq!(billing_cycle, BillingCycle::Monthly);
    }

    #[test]
    fn negative_price_and_zero_speed_are_rejected() {
        let input = CreateProduct {
            name: "Broken".into(),
            product_type: "satellite".into(),
            price: Some("-1".parse().unwrap()),
            speed_mbps: Some(0),
            ..Default::default()
        };
        assert_matches!(input.validate(), Err(CoreError::InvalidFields(errors)) => {
            let fields: Vec<_> = errors.fields().collect();
            assert_eq!(fields, vec!["price", "speed_mbps", "type"]);
        });
    }

    #[test]
    fn missing_price_is_required() {
        let input = CreateProduct {
            name: "Voice".into(),
            product_type: "voip".into(),
            ..Default::default()
        };
        assert_matches!(input.validate(), Err(CoreError::InvalidFields(errors)) => {
            assert_eq!(errors.get("price"), Some("This field is required"));
        });
    }
}
