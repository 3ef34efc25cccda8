//! Lookup of the last issued month-scoped code.

use sqlx::PgPool;

/// Which generated code column to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    CustomerCode,
    ServiceNumber,
}

impl CodeKind {
    pub fn prefix(self) -> &'static str {
        match self {
            CodeKind::CustomerCode => netcrm_core::codes::CUSTOMER_CODE_PREFIX,
            CodeKind::ServiceNumber => netcrm_core::codes::SERVICE_NUMBER_PREFIX,
        }
    }

    /// Unique constraint guarding the column.
    pub fn constraint(self) -> &'static str {
        match self {
            CodeKind::CustomerCode => "uq_customers_code",
            CodeKind::ServiceNumber => "uq_customer_services_number",
        }
    }

    fn table_and_column(self) -> (&'static str, &'static str) {
        match self {
            CodeKind::CustomerCode => ("customers", "customer_code"),
            CodeKind::ServiceNumber => ("customer_services", "service_number"),
        }
    }
}

/// Reads sequential codes back for allocation.
pub struct CodeRepo;

impl CodeRepo {
    /// Lexicographically largest code matching the `LIKE` pattern.
    pub async fn last_issued(
        pool: &PgPool,
        kind: CodeKind,
        pattern: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let (table, column) = kind.table_and_column();
        let query = format!("SELECT MAX({column}) FROM {table} WHERE {column} LIKE $1");
        let last = sqlx::query_scalar::<_, Option<String>>(&query)
            .bind(pattern)
            .fetch_one(pool)
            .await?;
        tracing::debug!(table, pattern, last = ?last, "Scanned last issued code");
        Ok(last)
    }
}
