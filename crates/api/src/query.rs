//! Query parameter types shared by several handler modules.

use chrono::NaiveDate;
use serde::Deserialize;

/// Default page size when `limit` is omitted.
pub const DEFAULT_LIMIT: i64 = 50;

/// Hard upper bound on any page size.
pub const MAX_LIMIT: i64 = 100;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Query parameters for list endpoints that support an `include_inactive` flag.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Optional inclusive date window (`?from=&to=`).
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        let p = PaginationParams { limit: Some(1000), offset: Some(-5) };
        assert_eq!(p.limit(), MAX_LIMIT);
        assert_eq!(p.offset(), 0);
        assert_eq!(PaginationParams::default().limit(), DEFAULT_LIMIT);
    }
}
