//! Domain rules for the netcrm backend.
//!
//! Everything in this crate is pure: no database, no HTTP. The db and api
//! crates lean on it for status enums, the project workflow state machine,
//! month-scoped code sequencing, input validation and pagination math.

pub mod codes;
pub mod error;
pub mod pagination;
pub mod roles;
pub mod search;
pub mod status;
pub mod types;
pub mod validation;
pub mod workflow;
