//! List filtering helpers shared by every index endpoint.
//!
//! Repositories take the output of these functions as bind parameters, so
//! raw user input never reaches SQL text.

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of rows per page.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Maximum number of rows per page.
pub const MAX_PER_PAGE: i64 = 100;

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a user-provided page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

// ---------------------------------------------------------------------------
// Text search
// ---------------------------------------------------------------------------

/// Trim a search term, treating blank input as "no search".
pub fn normalize_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build a substring `ILIKE` pattern, escaping `\`, `%` and `_`.
pub fn ilike_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// [`normalize_search`] followed by [`ilike_pattern`].
pub fn search_pattern(search: Option<&str>) -> Option<String> {
    normalize_search(search).map(|s| ilike_pattern(&s))
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    /// Lenient parse: anything other than `asc` sorts descending.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "asc" => SortDir::Asc,
            _ => SortDir::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Resolve a requested sort column against a whitelist.
///
/// Returns the first whitelist entry when the request is absent or unknown.
pub fn sort_column<'a>(requested: Option<&str>, allowed: &[&'a str]) -> &'a str {
    requested
        .and_then(|r| allowed.iter().find(|a| **a == r).copied())
        .or_else(|| allowed.first().copied())
        .unwrap_or("created_at")
}
