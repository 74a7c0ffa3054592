//! Pagination options for ordered listings.

use serde::{Deserialize, Serialize};

/// Pagination applied to an ordered listing.
///
/// `offset` leading records are skipped first, then at most `limit`
/// records are returned. A `limit` of zero is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOptions {
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl FindOptions {
    /// Unbounded listing from the start.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            limit: 0,
            offset: 0,
        }
    }

    /// Returns a copy with the given limit. Zero removes the limit.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Returns a copy with the given offset.
    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Whether a listing that has already collected `collected` records
    /// can stop scanning.
    #[must_use]
    pub const fn is_satisfied(&self, collected: usize) -> bool {
        self.limit > 0 && collected >= self.limit
    }
}
