//! Month-scoped sequential codes for customers and service subscriptions.
//!
//! A code is `{prefix}{YYYY}{MM}{seq}` where `seq` is a zero-padded 4-digit
//! counter that restarts every month, e.g. `CST2024030007`. The database
//! layer looks up the largest code issued for the month; [`next_code`]
//! derives the successor. Concurrent allocations are resolved by the unique
//! constraint on the code column and a bounded retry in the caller.

use chrono::{Datelike, NaiveDate};

use crate::error::CoreError;

pub const CUSTOMER_CODE_PREFIX: &str = "CST";
pub const SERVICE_NUMBER_PREFIX: &str = "SRV";

/// Width of the numeric suffix.
pub const SEQUENCE_WIDTH: usize = 4;

/// Largest suffix that fits in [`SEQUENCE_WIDTH`] digits.
pub const MAX_SEQUENCE: u32 = 9999;

/// Number of generate-and-insert attempts before giving up on a code.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 5;

/// `{prefix}{YYYY}{MM}` for the month containing `date`.
pub fn month_prefix(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}{:04}{:02}", date.year(), date.month())
}

/// `LIKE` pattern matching every code issued in the month of `date`.
pub fn scan_pattern(prefix: &str, date: NaiveDate) -> String {
    format!("{}%", month_prefix(prefix, date))
}

/// Derive the next code after `last` (the largest code issued this month).
pub fn next_code(prefix: &str, date: NaiveDate, last: Option<&str>) -> Result<String, CoreError> {
    let head = month_prefix(prefix, date);
    let next = match last {
        None => 1,
        Some(code) => parse_sequence(&head, code)? + 1,
    };
    if next > MAX_SEQUENCE {
        return Err(CoreError::Conflict(format!(
            "code sequence exhausted for {head}"
        )));
    }
    Ok(format!("{head}{next:0width$}", width = SEQUENCE_WIDTH))
}

fn parse_sequence(head: &str, code: &str) -> Result<u32, CoreError> {
    let malformed = || CoreError::Internal(format!("Malformed sequential code '{code}'"));
    let suffix = code.strip_prefix(head).ok_or_else(malformed)?;
    if suffix.len() != SEQUENCE_WIDTH || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    suffix.parse().map_err(|_| malformed())
}
