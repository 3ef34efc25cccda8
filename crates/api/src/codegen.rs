//! Allocation of month-scoped sequential codes (`CST…`, `SRV…`).
//!
//! The next code is derived from the largest one issued this month and the
//! row is inserted under it. Two concurrent allocations can derive the same
//! code; the loser hits the unique constraint and retries with a fresh read.

use std::future::Future;

use chrono::NaiveDate;
use netcrm_core::codes::{self, MAX_ALLOCATION_ATTEMPTS};
use netcrm_core::error::CoreError;
use netcrm_db::repositories::{CodeKind, CodeRepo};
use netcrm_db::DbPool;

use crate::error::AppResult;

/// Allocate the next code of `kind` for the month of `date` and run `insert`
/// with it, retrying on a unique violation of the code column.
///
/// Any other insert error is returned unchanged.
pub async fn allocate<T, F, Fut>(
    pool: &DbPool,
    kind: CodeKind,
    date: NaiveDate,
    mut insert: F,
) -> AppResult<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let pattern = codes::scan_pattern(kind.prefix(), date);

    for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
        let last = CodeRepo::last_issued(pool, kind, &pattern).await?;
        let code = codes::next_code(kind.prefix(), date, last.as_deref())?;

        match insert(code.clone()).await {
            Ok(row) => {
                tracing::debug!(%code, attempt, "Allocated sequential code");
                return Ok(row);
            }
            Err(err) if netcrm_db::is_unique_violation(&err, kind.constraint()) => {
                tracing::warn!(%code, attempt, "Sequential code taken concurrently, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(CoreError::Conflict(format!(
        "Could not allocate a unique {} code after {MAX_ALLOCATION_ATTEMPTS} attempts",
        kind.prefix()
    ))
    .into())
}
