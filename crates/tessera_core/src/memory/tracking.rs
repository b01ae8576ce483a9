//! # Tracking Allocator
//!
//! Wraps another allocator and keeps live block and byte counts, so hosts
//! and tests can verify that every buffer the database allocates is freed
//! exactly once.

use parking_lot::Mutex;

use super::allocator::{AllocError, Allocator, SystemAllocator};

/// Snapshot of a [`TrackingAllocator`]'s counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocationStats {
    /// Blocks currently handed out.
    pub live_blocks: usize,
    /// Bytes currently handed out.
    pub live_bytes: usize,
    /// Highest value `live_bytes` has reached.
    pub peak_bytes: usize,
    /// Successful `allocate` calls since creation.
    pub total_allocations: u64,
    /// `free` calls since creation.
    pub total_frees: u64,
}

/// Allocator decorator that records allocation statistics.
///
/// # Thread Safety
///
/// Counters sit behind a mutex so one tracker can be shared by several
/// databases; the database itself still assumes exclusive access.
///
/// # Example
///
/// ```rust,ignore
/// let alloc = TrackingAllocator::new(SystemAllocator);
/// let mut db = Database::with_allocator(&alloc, DatabaseConfig::default());
/// // ... create and destroy objects ...
/// drop(db);
/// assert_eq!(alloc.stats().live_blocks, 0);
/// ```
#[derive(Debug, Default)]
pub struct TrackingAllocator<A = SystemAllocator> {
    inner: A,
    stats: Mutex<AllocationStats>,
}

impl<A: Allocator> TrackingAllocator<A> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            stats: Mutex::new(AllocationStats::default()),
        }
    }

    /// Returns a snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> AllocationStats {
        *self.stats.lock()
    }

    /// Returns the wrapped allocator.
    #[must_use]
    pub const fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: Allocator> Allocator for TrackingAllocator<A> {
    fn allocate(&self, size: usize) -> Result<Box<[u8]>, AllocError> {
        let block = self.inner.allocate(size)?;

        let mut stats = self.stats.lock();
        stats.live_blocks += 1;
        stats.live_bytes += size;
        stats.peak_bytes = stats.peak_bytes.max(stats.live_bytes);
        stats.total_allocations += 1;

        Ok(block)
    }

    fn reallocate(&self, block: &mut Box<[u8]>, new_size: usize) -> Result<(), AllocError> {
        let old_size = block.len();
        self.inner.reallocate(block, new_size)?;

        let mut stats = self.stats.lock();
        stats.live_bytes = stats.live_bytes - old_size + new_size;
        stats.peak_bytes = stats.peak_bytes.max(stats.live_bytes);

        Ok(())
    }

    fn free(&self, block: Box<[u8]>) {
        {
            let mut stats = self.stats.lock();
            debug_assert!(stats.live_blocks > 0, "free without matching allocate");
            stats.live_blocks = stats.live_blocks.saturating_sub(1);
            stats.live_bytes = stats.live_bytes.saturating_sub(block.len());
            stats.total_frees += 1;
        }
        self.inner.free(block);
    }
}
