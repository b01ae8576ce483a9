//! # Memory Management
//!
//! The allocator capability every instance and blob buffer is drawn from.
//!
//! ## Design Philosophy
//!
//! The database never allocates object memory on its own. The host hands it
//! an [`Allocator`] and every instance buffer and blob goes through it:
//! - [`SystemAllocator`] for plain heap memory
//! - [`TrackingAllocator`] to count live blocks and bytes
//! - [`BudgetAllocator`] to cap the total number of bytes handed out

mod allocator;
mod budget;
mod tracking;

pub use allocator::{AllocError, Allocator, SystemAllocator};
pub use budget::BudgetAllocator;
pub use tracking::{AllocationStats, TrackingAllocator};
