//! Page arithmetic shared by the Postgres and in-memory repositories.

pub const MAX_PAGE_SIZE: u64 = 100;

/// Largest offset Postgres accepts (`OFFSET` is a signed bigint).
const MAX_OFFSET: u64 = i64::MAX as u64;

/// A 1-based page request with a bounded page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Normalize raw query values: limit is clamped to `1..=MAX_PAGE_SIZE`
    /// and falls back to `default_limit` when absent. Page is at least 1 and
    /// at most the last page whose offset still fits in a bigint.
    pub fn new(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> Self {
        let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_OFFSET / limit),
            limit,
        }
    }

    /// Zero-based page index, as sea-orm's paginator expects it.
    pub fn index(&self) -> u64 {
        self.page - 1
    }

    pub fn offset(&self) -> u64 {
        self.index().saturating_mul(self.limit)
    }

    /// Cut the requested page out of an already filtered and ordered list.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl PageInfo {
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        Self {
            current_page: request.page,
            total_pages: total_items.div_ceil(request.limit),
            total_items,
        }
    }
}
