//! Lead entity model, DTOs and list filter.

use netcrm_core::error::CoreError;
use netcrm_core::status::LeadStatus;
use netcrm_core::types::{DbId, Timestamp};
use netcrm_core::validation::{self, FieldErrors, MAX_NAME_LEN};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::push_pair;

/// A lead row from the `leads` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub source: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: LeadStatus,
    pub assigned_to: Option<DbId>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Lead joined with the assigned salesperson's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeadDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub lead: Lead,
    pub assigned_to_name: Option<String>,
}

/// `{ id, name }` pair for the lead select on project and customer forms.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeadOption {
    pub id: DbId,
    pub name: String,
    pub company: Option<String>,
}

/// DTO for creating a new lead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLead {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub source: Option<String>,
    /// Defaults to `new` if omitted.
    pub status: Option<String>,
    pub assigned_to: Option<DbId>,
    pub notes: Option<String>,
}

impl CreateLead {
    /// Validate the input and resolve the initial status.
    pub fn validate(&self) -> Result<LeadStatus, CoreError> {
        let mut errors = FieldErrors::new();
        errors.check("name", validation::required_text(&self.name, MAX_NAME_LEN));
        check_contact(&mut errors, self.email.as_deref(), self.phone.as_deref());
        if let Some(id) = self.assigned_to {
            errors.check("assigned_to", validation::positive_id(id));
        }
        let status = match self.status.as_deref() {
            Some(raw) => errors.parse("status", raw),
            None => Some(LeadStatus::New),
        };
        errors.into_result()?;
        Ok(status.unwrap_or_default())
    }
}

/// DTO for updating an existing lead. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLead {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<DbId>,
    pub notes: Option<String>,
}

impl UpdateLead {
    /// Validate the supplied fields and parse the new status, if any.
    pub fn validate(&self) -> Result<Option<LeadStatus>, CoreError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.check("name", validation::required_text(name, MAX_NAME_LEN));
        }
        check_contact(&mut errors, self.email.as_deref(), self.phone.as_deref());
        if let Some(id) = self.assigned_to {
            errors.check("assigned_to", validation::positive_id(id));
        }
        let status = self
            .status
            .as_deref()
            .and_then(|raw| errors.parse::<LeadStatus>("status", raw));
        errors.into_result()?;
        Ok(status)
    }
}

fn check_contact(errors: &mut FieldErrors, email: Option<&str>, phone: Option<&str>) {
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        errors.check("email", validation::email(email));
    }
    if let Some(phone) = phone.filter(|p| !p.is_empty()) {
        errors.check("phone", validation::phone(phone));
    }
}

/// Query-string filter for the lead index.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeadFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub assigned_to: Option<DbId>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl LeadFilter {
    /// Active filters as `(key, value)` pairs for pagination links.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_pair(&mut pairs, "search", self.search.as_deref());
        push_pair(&mut pairs, "status", self.status.as_deref());
        push_pair(&mut pairs, "source", self.source.as_deref());
        push_pair(&mut pairs, "assigned_to", self.assigned_to.map(|v| v.to_string()).as_deref());
        push_pair(&mut pairs, "per_page", self.per_page.map(|v| v.to_string()).as_deref());
        pairs
    }
}
