//! # Blobs
//!
//! A blob property stores a 16-byte [`BlobDescriptor`] inline in its
//! object's instance bytes. The descriptor names a buffer in the database's
//! [`BlobStore`]; the buffer itself comes from the database allocator and is
//! owned by exactly one object.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::error::{DatabaseError, DbResult};
use crate::memory::Allocator;
use crate::schema::{PropertyLayout, PropertyType};

use super::database::Database;
use super::id::ObjectId;

/// Inline representation of a blob property.
///
/// A zeroed descriptor is an empty blob with no buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct BlobDescriptor {
    /// Current size in bytes.
    pub size: u64,
    /// Key of the buffer in the blob store, `0` when there is none.
    pub key: u64,
}

/// Storage for blob buffers, addressed by nonzero keys.
#[derive(Debug, Default)]
pub struct BlobStore {
    /// Key `k` lives at index `k - 1`.
    blocks: Vec<Option<Box<[u8]>>>,
    /// Indices of empty entries.
    free_list: Vec<usize>,
}

impl BlobStore {
    /// Stores a buffer and returns its key.
    pub fn insert(&mut self, block: Box<[u8]>) -> u64 {
        let index = if let Some(index) = self.free_list.pop() {
            self.blocks[index] = Some(block);
            index
        } else {
            self.blocks.push(Some(block));
            self.blocks.len() - 1
        };
        index as u64 + 1
    }

    /// Returns the buffer stored under `key`.
    #[must_use]
    pub fn get(&self, key: u64) -> Option<&[u8]> {
        self.blocks.get(Self::index(key)?)?.as_deref()
    }

    /// Returns the buffer stored under `key` for resizing or writing.
    pub fn get_mut(&mut self, key: u64) -> Option<&mut Box<[u8]>> {
        self.blocks.get_mut(Self::index(key)?)?.as_mut()
    }

    /// Removes and returns the buffer stored under `key`.
    pub fn take(&mut self, key: u64) -> Option<Box<[u8]>> {
        let index = Self::index(key)?;
        let block = self.blocks.get_mut(index)?.take()?;
        self.free_list.push(index);
        Some(block)
    }

    /// Number of stored buffers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len() - self.free_list.len()
    }

    /// Checks if no buffers are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every buffer.
    pub fn drain(&mut self) -> impl Iterator<Item = Box<[u8]>> + '_ {
        self.free_list.clear();
        self.blocks.drain(..).flatten()
    }

    fn index(key: u64) -> Option<usize> {
        usize::try_from(key.checked_sub(1)?).ok()
    }
}

/// Validates `offset..offset + len` against a blob of `size` bytes.
///
/// The range may end exactly at the end of the blob.
fn checked_range(offset: usize, len: usize, size: usize) -> DbResult<Range<usize>> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(offset..end),
        _ => Err(DatabaseError::OutOfBounds { offset, len, size }),
    }
}

impl<A: Allocator> Database<A> {
    /// Resizes a blob, keeping its first `min(old, new)` bytes.
    ///
    /// Growth is zero-filled. Resizing to `0` frees the buffer.
    ///
    /// # Errors
    ///
    /// Fails with the usual resolution errors, with
    /// [`DatabaseError::BlobTooLarge`] above the configured limit, and with
    /// [`DatabaseError::OutOfMemory`] if the allocator refuses (the blob is
    /// then left unchanged).
    pub fn reallocate_blob(&mut self, id: ObjectId, name: &str, size: usize) -> DbResult<()> {
        let layout = self.resolve_property(id, PropertyType::Blob, None, name)?;

        let limit = self.config.max_blob_bytes;
        if size as u64 > limit {
            return Err(DatabaseError::BlobTooLarge {
                requested: size,
                limit,
            });
        }

        let descriptor = self.read_blob_descriptor(id, &layout);
        let key = if size == 0 {
            if let Some(block) = self.blobs.take(descriptor.key) {
                self.allocator.free(block);
            }
            0
        } else if let Some(block) = self.blobs.get_mut(descriptor.key) {
            self.allocator.reallocate(block, size)?;
            descriptor.key
        } else {
            let block = self.allocator.allocate(size)?;
            self.blobs.insert(block)
        };

        self.write_blob_descriptor(
            id,
            &layout,
            BlobDescriptor {
                size: size as u64,
                key,
            },
        );

        tracing::trace!(object = %id, blob = name, from = descriptor.size, to = size, "resized blob");
        Ok(())
    }

    /// Returns the current size of a blob in bytes.
    ///
    /// # Errors
    ///
    /// Fails with the usual resolution errors.
    pub fn blob_len(&self, id: ObjectId, name: &str) -> DbResult<usize> {
        Ok(self.blob(id, name)?.len())
    }

    /// Borrows the full contents of a blob.
    ///
    /// # Errors
    ///
    /// Fails with the usual resolution errors.
    pub fn blob(&self, id: ObjectId, name: &str) -> DbResult<&[u8]> {
        let layout = self.resolve_property(id, PropertyType::Blob, None, name)?;
        let descriptor = self.read_blob_descriptor(id, &layout);
        Ok(self.blobs.get(descriptor.key).unwrap_or_default())
    }

    /// Copies `out.len()` bytes starting at `offset` out of a blob.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::OutOfBounds`] if the range does not fit in
    /// the blob; `out` is then left untouched.
    pub fn get_blob_data(
        &self,
        id: ObjectId,
        name: &str,
        offset: usize,
        out: &mut [u8],
    ) -> DbResult<()> {
        let bytes = self.blob(id, name)?;
        let range = checked_range(offset, out.len(), bytes.len())?;
        out.copy_from_slice(&bytes[range]);
        Ok(())
    }

    /// Copies `data` into a blob starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::OutOfBounds`] if the range does not fit in
    /// the blob; the blob is then left untouched.
    pub fn set_blob_data(
        &mut self,
        id: ObjectId,
        name: &str,
        offset: usize,
        data: &[u8],
    ) -> DbResult<()> {
        let layout = self.resolve_property(id, PropertyType::Blob, None, name)?;
        let descriptor = self.read_blob_descriptor(id, &layout);

        let Some(block) = self.blobs.get_mut(descriptor.key) else {
            return checked_range(offset, data.len(), 0).map(|_| ());
        };

        let range = checked_range(offset, data.len(), block.len())?;
        block[range].copy_from_slice(data);
        Ok(())
    }

    /// Frees the buffer behind a blob property of a live object.
    pub(super) fn free_blob(&mut self, id: ObjectId, layout: &PropertyLayout) {
        let descriptor = self.read_blob_descriptor(id, layout);
        if descriptor.key == 0 {
            return;
        }

        let block = self.blobs.take(descriptor.key);
        debug_assert!(block.is_some(), "blob key {} was never issued", descriptor.key);
        if let Some(block) = block {
            self.allocator.free(block);
        }
        self.write_blob_descriptor(id, layout, BlobDescriptor::default());
    }

    fn read_blob_descriptor(&self, id: ObjectId, layout: &PropertyLayout) -> BlobDescriptor {
        self.slots
            .get(id)
            .map(|object| bytemuck::pod_read_unaligned(&object.data[layout.range()]))
            .unwrap_or_default()
    }

    fn write_blob_descriptor(&mut self, id: ObjectId, layout: &PropertyLayout, value: BlobDescriptor) {
        if let Some(object) = self.slots.get_mut(id) {
            object.data[layout.range()].copy_from_slice(bytemuck::bytes_of(&value));
        }
    }
}
