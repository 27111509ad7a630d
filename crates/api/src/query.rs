//! Shared query parameter types for API handlers.
//!
//! Common query structs that appear across multiple handler modules are
//! extracted here to avoid duplication.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Used by any handler that supports paginated listing. Values are
/// clamped in the handlers via [`PaginationParams::clamp`].
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Maximum page size for any listing endpoint.
const MAX_LIMIT: i64 = 100;

/// Default page size for listing endpoints.
const DEFAULT_LIMIT: i64 = 50;

impl PaginationParams {
    /// Resolve to a concrete `(limit, offset)` pair with the project
    /// defaults and cap applied.
    pub fn clamp(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}
