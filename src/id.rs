use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Stable external identifier of a confirmed track
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Issues identifiers that never repeat for the lifetime of the allocator.
///
/// Clones share the same sequence, so trackers of different classes may
/// draw from it concurrently.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    seq: Arc<AtomicU64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            seq: Arc::new(AtomicU64::new(first)),
        }
    }

    #[inline]
    pub fn next_id(&self) -> TrackId {
        TrackId(self.seq.fetch_add(1, Ordering::Relaxed))
    }

    /// Identifier the next call to `next_id` will return.
    #[inline]
    pub fn peek(&self) -> TrackId {
        TrackId(self.seq.load(Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
