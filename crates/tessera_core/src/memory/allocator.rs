//! # Allocator Capability
//!
//! `alloc / realloc / free` by size, expressed over owned byte blocks.

use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

/// An allocator refused to hand out memory.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("out of memory: {requested} bytes requested")]
pub struct AllocError {
    /// Size of the refused request in bytes.
    pub requested: usize,
}

/// Capability-style allocator for database buffers.
///
/// Blocks are owned `Box<[u8]>` values, so the block carries its own size and
/// a free can never be handed the wrong length.
///
/// # Contract
///
/// - `allocate` returns a zero-filled block of exactly `size` bytes.
/// - `reallocate` preserves the first `min(old, new)` bytes and zero-fills
///   any growth. On failure the block is left untouched.
/// - `free` takes back a block previously produced by this allocator.
pub trait Allocator {
    /// Allocates a zeroed block of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the request cannot be satisfied.
    fn allocate(&self, size: usize) -> Result<Box<[u8]>, AllocError>;

    /// Resizes `block` in place to `new_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the request cannot be satisfied.
    fn reallocate(&self, block: &mut Box<[u8]>, new_size: usize) -> Result<(), AllocError>;

    /// Returns a block to the allocator.
    fn free(&self, block: Box<[u8]>);
}

/// Allocator backed by the global heap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, size: usize) -> Result<Box<[u8]>, AllocError> {
        Ok(vec![0u8; size].into_boxed_slice())
    }

    fn reallocate(&self, block: &mut Box<[u8]>, new_size: usize) -> Result<(), AllocError> {
        let mut bytes = std::mem::take(block).into_vec();
        bytes.resize(new_size, 0);
        *block = bytes.into_boxed_slice();
        Ok(())
    }

    fn free(&self, block: Box<[u8]>) {
        drop(block);
    }
}

impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, size: usize) -> Result<Box<[u8]>, AllocError> {
        (**self).allocate(size)
    }

    #[inline]
    fn reallocate(&self, block: &mut Box<[u8]>, new_size: usize) -> Result<(), AllocError> {
        (**self).reallocate(block, new_size)
    }

    #[inline]
    fn free(&self, block: Box<[u8]>) {
        (**self).free(block);
    }
}

macro_rules! forward_allocator {
    ($($wrapper:ident),*) => {
        $(
            impl<A: Allocator + ?Sized> Allocator for $wrapper<A> {
                #[inline]
                fn allocate(&self, size: usize) -> Result<Box<[u8]>, AllocError> {
                    (**self).allocate(size)
                }

                #[inline]
                fn reallocate(
                    &self,
                    block: &mut Box<[u8]>,
                    new_size: usize,
                ) -> Result<(), AllocError> {
                    (**self).reallocate(block, new_size)
                }

                #[inline]
                fn free(&self, block: Box<[u8]>) {
                    (**self).free(block);
                }
            }
        )*
    };
}

forward_allocator!(Box, Rc, Arc);
