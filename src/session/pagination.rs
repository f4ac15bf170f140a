use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use crate::error::ValidationError;

/// `{limit, offset}` slice requested from the service.
///
/// Navigation steps by exactly `limit`, so `offset` stays a multiple of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationWindow {
    limit: NonZeroUsize,
    offset: usize,
}

impl PaginationWindow {
    pub fn new(limit: usize, offset: usize) -> Result<Self, ValidationError> {
        let limit = NonZeroUsize::new(limit).ok_or(ValidationError::InvalidPageLimit)?;
        Ok(Self { limit, offset })
    }

    pub fn first_page(limit: NonZeroUsize) -> Self {
        Self { limit, offset: 0 }
    }

    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 1-based page number.
    pub fn page_number(&self) -> usize {
        self.offset / self.limit.get() + 1
    }

    /// `offset += limit`, with no upper bound check.
    pub fn advance(&mut self) {
        self.offset = self.offset.saturating_add(self.limit.get());
    }

    /// Step back one page. Returns false, leaving the window alone, at offset 0.
    pub fn retreat(&mut self) -> bool {
        if self.offset == 0 {
            return false;
        }
        self.offset = self.offset.saturating_sub(self.limit.get());
        true
    }

    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }

    /// Whether another page may follow, given the data rows (header excluded)
    /// of the last loaded page.
    ///
    /// Closed when `offset + limit >= total_rows - 1`.
    pub fn has_next(&self, total_rows: usize) -> bool {
        self.offset
            .saturating_add(self.limit.get())
            .saturating_add(1)
            < total_rows
    }

    /// Same page size change, back to the first page.
    pub fn with_limit(self, limit: NonZeroUsize) -> Self {
        Self::first_page(limit)
    }
}
