//! # Budget Allocator
//!
//! An allocator with a fixed byte budget, for hosts that want a hard ceiling
//! on the memory a database may hold.

use std::cell::RefCell;

use super::allocator::{AllocError, Allocator, SystemAllocator};

/// An allocator that refuses requests once `capacity` bytes are in use.
///
/// Freed bytes are returned to the budget.
///
/// # Thread Safety
///
/// This allocator is NOT thread-safe. Use one budget per thread.
///
/// # Example
///
/// ```rust,ignore
/// let budget = BudgetAllocator::new(SystemAllocator, 1024 * 1024); // 1MB
/// let mut db = Database::with_allocator(&budget, DatabaseConfig::default());
/// ```
#[derive(Debug)]
pub struct BudgetAllocator<A = SystemAllocator> {
    inner: A,
    /// Bytes currently handed out.
    used: RefCell<usize>,
    /// Total capacity.
    capacity: usize,
}

impl<A: Allocator> BudgetAllocator<A> {
    /// Creates a budget of `capacity` bytes over `inner`.
    #[must_use]
    pub fn new(inner: A, capacity: usize) -> Self {
        Self {
            inner,
            used: RefCell::new(0),
            capacity,
        }
    }

    /// Returns the total capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current used space in bytes.
    #[inline]
    #[must_use]
    pub fn used(&self) -> usize {
        *self.used.borrow()
    }

    /// Returns the remaining free space in bytes.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.used()
    }
}

impl<A: Allocator> Allocator for BudgetAllocator<A> {
    fn allocate(&self, size: usize) -> Result<Box<[u8]>, AllocError> {
        if size > self.remaining() {
            return Err(AllocError { requested: size });
        }

        let block = self.inner.allocate(size)?;
        *self.used.borrow_mut() += size;
        Ok(block)
    }

    fn reallocate(&self, block: &mut Box<[u8]>, new_size: usize) -> Result<(), AllocError> {
        let old_size = block.len();
        if new_size > old_size && new_size - old_size > self.remaining() {
            return Err(AllocError {
                requested: new_size,
            });
        }

        self.inner.reallocate(block, new_size)?;
        let mut used = self.used.borrow_mut();
        *used = *used - old_size + new_size;
        Ok(())
    }

    fn free(&self, block: Box<[u8]>) {
        let mut used = self.used.borrow_mut();
        *used = used.saturating_sub(block.len());
        drop(used);
        self.inner.free(block);
    }
}
