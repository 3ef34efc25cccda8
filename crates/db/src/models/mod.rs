//! Row models and input DTOs, one module per table.

pub mod customer;
pub mod customer_service;
pub mod lead;
pub mod notification;
pub mod product;
pub mod project;
pub mod user;

/// Append `key=value` when `value` is present and non-blank.
pub(crate) fn push_pair(pairs: &mut Vec<(String, String)>, key: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((key.to_string(), value.to_string()));
    }
}

/// Blank filter values behave like absent ones.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
