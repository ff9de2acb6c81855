//! Recency Index Module
//!
//! Arena-backed doubly linked list keeping entries in most-recently-used order.

// == Handle ==
/// Stable address of a value stored in a [`RecencyIndex`].
///
/// Handles carry the generation of their slot, so a handle kept after its
/// value was removed never resolves to a value inserted later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    prev: Option<usize>,
    next: Option<usize>,
    generation: u32,
}

// == Recency Index ==
/// Recency order over owned values.
///
/// - Front (head) = most recently used
/// - Back (tail) = least recently used
///
/// Push, promote and removal from any position are O(1).
#[derive(Debug)]
pub struct RecencyIndex<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for RecencyIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecencyIndex<T> {
    // == Constructor ==
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Push Front ==
    /// Inserts `value` as the most recently used element.
    pub fn push_front(&mut self, value: T) -> Handle {
        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.value = Some(value);
                slot.prev = None;
                slot.next = None;
                index
            }
            None => {
                self.slots.push(Slot {
                    value: Some(value),
                    prev: None,
                    next: None,
                    generation: 0,
                });
                self.slots.len() - 1
            }
        };

        self.link_front(index);
        self.len += 1;

        Handle {
            index,
            generation: self.slots[index].generation,
        }
    }

    // == Move To Front ==
    /// Promotes the element to most recently used.
    ///
    /// Returns false if the handle is stale.
    pub fn move_to_front(&mut self, handle: Handle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        if self.head != Some(handle.index) {
            self.unlink(handle.index);
            self.link_front(handle.index);
        }
        true
    }

    // == Remove ==
    /// Removes the element and returns its value.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.is_live(handle) {
            return None;
        }
        self.release(handle.index)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used value.
    pub fn pop_back(&mut self) -> Option<T> {
        let index = self.tail?;
        self.release(index)
    }

    /// Most recently used element.
    pub fn front(&self) -> Option<(Handle, &T)> {
        self.head.and_then(|index| self.entry_at(index))
    }

    /// Least recently used element.
    pub fn back(&self) -> Option<(Handle, &T)> {
        self.tail.and_then(|index| self.entry_at(index))
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        if !self.is_live(handle) {
            return None;
        }
        self.slots[handle.index].value.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if !self.is_live(handle) {
            return None;
        }
        self.slots[handle.index].value.as_mut()
    }

    // == Clear ==
    /// Drops every value. Outstanding handles become stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            slot.prev = None;
            slot.next = None;
            self.free.push(index);
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            index: self,
            cursor: self.head,
            from_back: false,
        }
    }

    /// Iterates from least to most recently used.
    pub fn iter_from_back(&self) -> Iter<'_, T> {
        Iter {
            index: self,
            cursor: self.tail,
            from_back: true,
        }
    }

    // --- Internal list operations ---

    fn is_live(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index)
            .map(|slot| slot.generation == handle.generation && slot.value.is_some())
            .unwrap_or(false)
    }

    fn entry_at(&self, index: usize) -> Option<(Handle, &T)> {
        let slot = &self.slots[index];
        slot.value.as_ref().map(|value| {
            (
                Handle {
                    index,
                    generation: slot.generation,
                },
                value,
            )
        })
    }

    /// Unlinks a live slot, frees it and returns its value.
    fn release(&mut self, index: usize) -> Option<T> {
        self.unlink(index);
        let slot = &mut self.slots[index];
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        Some(value)
    }

    fn unlink(&mut self, index: usize) {
        let prev = self.slots[index].prev;
        let next = self.slots[index].next;

        match prev {
            Some(prev) => self.slots[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None => self.tail = prev,
        }

        self.slots[index].prev = None;
        self.slots[index].next = None;
    }

    fn link_front(&mut self, index: usize) {
        self.slots[index].prev = None;
        self.slots[index].next = self.head;

        if let Some(head) = self.head {
            self.slots[head].prev = Some(index);
        }
        self.head = Some(index);

        if self.tail.is_none() {
            self.tail = Some(index);
        }
    }
}

// == Iterator ==
/// Walks a [`RecencyIndex`] in either direction.
pub struct Iter<'a, T> {
    index: &'a RecencyIndex<T>,
    cursor: Option<usize>,
    from_back: bool,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        let slot = &self.index.slots[current];
        self.cursor = if self.from_back { slot.prev } else { slot.next };
        self.index.entry_at(current)
    }
}
