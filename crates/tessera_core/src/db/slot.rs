//! # Slot Table
//!
//! Free-list managed storage cells. Each slot is either free (linked into
//! the free list) or live (holding one object's handle and instance bytes).
//!
//! Slot 0 never holds an object: its `next_free` is the free-list head, and
//! `0` as a link terminates the list.

use super::id::ObjectId;

/// A live object: its handle and its owned instance buffer.
#[derive(Debug)]
pub struct LiveObject {
    /// Handle the object was created with.
    pub id: ObjectId,
    /// Instance bytes, laid out by the object's type.
    pub data: Box<[u8]>,
}

/// A storage cell in the slot table.
#[derive(Debug)]
pub enum Slot {
    /// Unused; linked into the free list.
    Free {
        /// Next free slot, `0` for end of list.
        next_free: u32,
        /// Generation of the last object held here.
        generation: u16,
    },
    /// Holds one object.
    Live(LiveObject),
}

/// A slot reserved by [`SlotTable::acquire`] but not yet filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Reservation {
    /// Index of the reserved slot.
    pub slot: u32,
    /// Generation the next object in this slot must carry.
    pub generation: u16,
}

/// Free-list managed slot storage behind generational handles.
///
/// A handle is valid only while its slot is live and holds exactly that
/// handle. Generations advance when a slot is filled, never when it is
/// freed: a freed-but-not-reused handle misses because the slot is free.
#[derive(Debug)]
pub struct SlotTable {
    /// Slot 0 is the free-list head.
    slots: Vec<Slot>,
    /// Number of live slots.
    live_count: usize,
}

impl SlotTable {
    /// Creates a table with room for `capacity` objects before it grows.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity + 1);
        slots.push(Slot::Free {
            next_free: 0,
            generation: 0,
        });

        Self {
            slots,
            live_count: 0,
        }
    }

    /// Returns the number of live objects.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Returns the number of slots ever allocated (excluding the head).
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len() - 1
    }

    #[inline]
    fn head(&self) -> u32 {
        match self.slots[0] {
            Slot::Free { next_free, .. } => next_free,
            Slot::Live(_) => unreachable!("slot 0 never holds an object"),
        }
    }

    #[inline]
    fn set_head(&mut self, slot: u32) {
        if let Slot::Free { next_free, .. } = &mut self.slots[0] {
            *next_free = slot;
        }
    }

    /// Takes a slot off the free list, or grows the table by one.
    ///
    /// The slot stays free until [`Self::occupy`] fills it, so callers
    /// acquire only once nothing else can fail.
    ///
    /// Returns `None` only when slot indices are exhausted.
    pub fn acquire(&mut self) -> Option<Reservation> {
        let head = self.head();
        if head != 0 {
            let Slot::Free {
                next_free,
                generation,
            } = self.slots[head as usize]
            else {
                unreachable!("free list links a live slot");
            };
            self.set_head(next_free);
            return Some(Reservation {
                slot: head,
                generation: generation.wrapping_add(1),
            });
        }

        let slot = u32::try_from(self.slots.len()).ok()?;
        self.slots.push(Slot::Free {
            next_free: 0,
            generation: 0,
        });
        Some(Reservation {
            slot,
            generation: 1,
        })
    }

    /// Fills a reserved slot.
    pub fn occupy(&mut self, reservation: Reservation, object: LiveObject) {
        debug_assert_eq!(object.id.slot(), reservation.slot);
        debug_assert_eq!(object.id.generation(), reservation.generation);
        debug_assert!(matches!(
            self.slots[reservation.slot as usize],
            Slot::Free { .. }
        ));

        self.slots[reservation.slot as usize] = Slot::Live(object);
        self.live_count += 1;
    }

    /// Resolves a handle to its live object.
    ///
    /// Returns `None` if the slot is out of range, free, or holds another
    /// object. Generations wrap, so only equality is meaningful.
    #[inline]
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&LiveObject> {
        let index = self.checked_index(id)?;
        match &self.slots[index] {
            Slot::Live(object) if object.id == id => Some(object),
            _ => None,
        }
    }

    /// Mutable variant of [`Self::get`].
    #[inline]
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut LiveObject> {
        let index = self.checked_index(id)?;
        match &mut self.slots[index] {
            Slot::Live(object) if object.id == id => Some(object),
            _ => None,
        }
    }

    /// Frees the slot held by `id` and pushes it onto the free list.
    ///
    /// Returns the object so the caller can release its buffers, or `None`
    /// if the handle does not resolve.
    pub fn release(&mut self, id: ObjectId) -> Option<LiveObject> {
        self.get(id)?;

        let slot = id.slot();
        let next_free = self.head();
        let previous = std::mem::replace(
            &mut self.slots[slot as usize],
            Slot::Free {
                next_free,
                generation: id.generation(),
            },
        );
        self.set_head(slot);
        self.live_count -= 1;

        match previous {
            Slot::Live(object) => Some(object),
            Slot::Free { .. } => None,
        }
    }

    /// Removes every live object, leaving all slots free.
    pub fn drain_live(&mut self) -> impl Iterator<Item = LiveObject> + '_ {
        self.live_count = 0;
        self.set_head(0);
        self.slots.drain(1..).filter_map(|slot| match slot {
            Slot::Live(object) => Some(object),
            Slot::Free { .. } => None,
        })
    }

    /// Iterates over all live objects.
    pub fn iter_live(&self) -> impl Iterator<Item = &LiveObject> {
        self.slots.iter().skip(1).filter_map(|slot| match slot {
            Slot::Live(object) => Some(object),
            Slot::Free { .. } => None,
        })
    }

    fn checked_index(&self, id: ObjectId) -> Option<usize> {
        if id.is_null() || id.slot() == 0 {
            return None;
        }

        let index = id.slot() as usize;
        (index < self.slots.len()).then_some(index)
    }
}
