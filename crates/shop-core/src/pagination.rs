//! Page/limit arithmetic for list endpoints.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub offset: u64,
}

impl Pagination {
    /// Build from optional query values; zero is treated as one
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = limit.unwrap_or(DEFAULT_LIMIT).max(1);
        Self {
            page,
            limit,
            offset: u64::from(limit) * u64::from(page - 1),
        }
    }

    pub fn meta(&self, total_records: u64, current_page_size: usize) -> PageMeta {
        PageMeta {
            current_page: self.page,
            total_pages: total_records.div_ceil(u64::from(self.limit)),
            current_page_size,
            total_records,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u32,
    pub total_pages: u64,
    pub current_page_size: usize,
    pub total_records: u64,
}

/// One page of results plus the total count
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: u64,
}
