//! Field-level input validation.
//!
//! Handlers collect every failing field into a [`FieldErrors`] map before
//! returning, so a client sees all problems with a submission at once.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidateEmail;

use crate::error::CoreError;

/// Maximum length of short text columns (`VARCHAR(255)`).
pub const MAX_NAME_LEN: usize = 255;

/// Digits with optional leading `+` and common separators.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-.]{4,30}$").expect("valid regex"));

/// Failing fields mapped to their first error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`. The first message per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Record the error from a check, if any.
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    /// Parse `raw` into `T`, recording the failure against `field`.
    pub fn parse<T>(&mut self, field: &str, raw: &str) -> Option<T>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        match one_of::<T>(raw) {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing failed, otherwise [`CoreError::InvalidFields`].
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidFields(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Non-blank text no longer than `max` characters.
pub fn required_text(value: &str, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("This field is required".to_string());
    }
    max_len(value, max)
}

pub fn max_len(value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("Must not exceed {max} characters"));
    }
    Ok(())
}

pub fn positive_id(value: i64) -> Result<(), String> {
    if value <= 0 {
        return Err("Must reference an existing record".to_string());
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), String> {
    if value.validate_email() {
        Ok(())
    } else {
        Err("Must be a valid email address".to_string())
    }
}

pub fn phone(value: &str) -> Result<(), String> {
    if PHONE_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err("Must be a valid phone number".to_string())
    }
}

pub fn non_negative(value: Decimal) -> Result<(), String> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err("Must be zero or greater".to_string());
    }
    Ok(())
}

pub fn positive_int(value: i32) -> Result<(), String> {
    if value <= 0 {
        return Err("Must be greater than zero".to_string());
    }
    Ok(())
}

/// `end` must fall strictly after `start`. Passes when either is absent.
pub fn date_after(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), String> {
    match (start, end) {
        (Some(start), Some(end)) if end <= start => {
            Err("Must be a date after the start date".to_string())
        }
        _ => Ok(()),
    }
}

/// Parse a closed enum value, producing the field message on failure.
pub fn one_of<T>(value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.parse::<T>().map_err(|e| e.to_string())
}
