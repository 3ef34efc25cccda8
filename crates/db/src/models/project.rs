//! Project entity model, DTOs and list filter.
//!
//! Status is owned by the workflow: it is set on create and afterwards only
//! changes through the transition methods on `ProjectRepo`.

use chrono::NaiveDate;
use netcrm_core::error::CoreError;
use netcrm_core::status::ProjectStatus;
use netcrm_core::types::{DbId, Money, Timestamp};
use netcrm_core::validation::{self, FieldErrors, MAX_NAME_LEN};
use netcrm_core::workflow;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::push_pair;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub estimated_value: Money,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub lead_id: DbId,
    pub product_id: DbId,
    pub manager_id: Option<DbId>,
    pub created_by: DbId,
    pub approved_at: Option<Timestamp>,
    pub rejected_at: Option<Timestamp>,
    pub rejection_reason: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Project joined with the names of its lead, product, manager and creator.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,
    pub lead_name: Option<String>,
    pub product_name: Option<String>,
    pub manager_name: Option<String>,
    pub creator_name: Option<String>,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// `pending` or `in_progress`; defaults to `pending` if omitted.
    pub status: Option<String>,
    pub estimated_value: Option<Money>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub lead_id: DbId,
    #[serde(default)]
    pub product_id: DbId,
    pub manager_id: Option<DbId>,
    pub notes: Option<String>,
}

impl CreateProject {
    /// Validate every field and resolve the initial status.
    ///
    /// All failures are collected into one [`CoreError::InvalidFields`].
    pub fn validate(&self) -> Result<ProjectStatus, CoreError> {
        let mut errors = FieldErrors::new();
        errors.check("name", validation::required_text(&self.name, MAX_NAME_LEN));
        errors.check(
            "description",
            validation::required_text(&self.description, usize::MAX),
        );
        errors.check("lead_id", validation::positive_id(self.lead_id));
        errors.check("product_id", validation::positive_id(self.product_id));
        if let Some(value) = self.estimated_value {
            errors.check("estimated_value", validation::non_negative(value));
        }
        if let Some(id) = self.manager_id {
            errors.check("manager_id", validation::positive_id(id));
        }
        errors.check(
            "end_date",
            validation::date_after(self.start_date, self.end_date),
        );

        let status = match self.status.as_deref() {
            None => Some(ProjectStatus::default()),
            Some(raw) => match errors.parse::<ProjectStatus>("status", raw) {
                Some(status) if workflow::is_initial(status) => Some(status),
                Some(_) => {
                    errors.add("status", "A new project must be pending or in_progress");
                    None
                }
                None => None,
            },
        };
        errors.into_result()?;
        Ok(status.unwrap_or_default())
    }
}

/// DTO for updating an existing project. All fields are optional.
///
/// Has no `status` field. A submitted status is ignored; status changes go
/// through the workflow transitions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub estimated_value: Option<Money>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub lead_id: Option<DbId>,
    pub product_id: Option<DbId>,
    pub manager_id: Option<DbId>,
    pub notes: Option<String>,
}

impl UpdateProject {
    /// Validate the supplied fields against the stored project.
    ///
    /// Date ordering is checked on the merged result, so moving only the end
    /// date before the stored start date is caught.
    pub fn validate(&self, current: &Project) -> Result<(), CoreError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.check("name", validation::required_text(name, MAX_NAME_LEN));
        }
        if let Some(description) = &self.description {
            errors.check(
                "description",
                validation::required_text(description, usize::MAX),
            );
        }
        if let Some(id) = self.lead_id {
            errors.check("lead_id", validation::positive_id(id));
        }
        if let Some(id) = self.product_id {
            errors.check("product_id", validation::positive_id(id));
        }
        if let Some(id) = self.manager_id {
            errors.check("manager_id", validation::positive_id(id));
        }
        if let Some(value) = self.estimated_value {
            errors.check("estimated_value", validation::non_negative(value));
        }
        errors.check(
            "end_date",
            validation::date_after(
                self.start_date.or(current.start_date),
                self.end_date.or(current.end_date),
            ),
        );
        errors.into_result()
    }
}

/// Query-string filter for the project index.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub lead_id: Option<DbId>,
    pub product_id: Option<DbId>,
    /// Inclusive lower bound on the creation date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date.
    pub date_to: Option<NaiveDate>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ProjectFilter {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_pair(&mut pairs, "search", self.search.as_deref());
        push_pair(&mut pairs, "status", self.status.as_deref());
        push_pair(&mut pairs, "lead_id", self.lead_id.map(|v| v.to_string()).as_deref());
        push_pair(&mut pairs, "product_id", self.product_id.map(|v| v.to_string()).as_deref());
        push_pair(&mut pairs, "date_from", self.date_from.map(|v| v.to_string()).as_deref());
        push_pair(&mut pairs, "date_to", self.date_to.map(|v| v.to_string()).as_deref());
        push_pair(&mut pairs, "per_page", self.per_page.map(|v| v.to_string()).as_deref());
        pairs
    }
}
