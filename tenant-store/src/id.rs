//! Identifier allocation for records created without an id.

use std::sync::atomic::{AtomicU64, Ordering};
use tenant_types::Id;

/// How many ids are drawn before allocation gives up.
pub const MAX_ID_GENERATION_ATTEMPTS: usize = 100;

/// Source of candidate ids. The store skips candidates that are invalid
/// or already taken.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Id;
}

/// Uniformly random 64-bit ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> Id {
        Id::new(rand::random::<u64>())
    }
}

/// Monotonically increasing ids, starting at a given value.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> Id {
        Id::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
