//! DynArray: indexable slot storage with additive growth.
//!
//! Every slot below `capacity()` is addressable, whether or not it lies below
//! `len()`. Slots are either empty or hold one `T`. Capacity grows in fixed
//! `expand_rate` steps and contracts on `pop` once the array is far emptier
//! than a single step.

use crate::error::ArrayError;

/// Capacity step used by [`DynArray::init`].
pub const DEFAULT_EXPAND_RATE: usize = 300;

#[derive(Debug, Clone)]
pub struct DynArray<T> {
    end: usize,
    element_size: usize,
    expand_rate: usize,
    slots: Vec<Option<T>>, // slots.len() is the capacity
}

fn alloc_slots<T>(capacity: usize) -> Result<Vec<Option<T>>, ArrayError> {
    let mut slots = Vec::new();
    reserve_slots(&mut slots, capacity, capacity)?;
    slots.resize_with(capacity, || None);
    Ok(slots)
}

fn reserve_slots<T>(
    slots: &mut Vec<Option<T>>,
    additional: usize,
    requested: usize,
) -> Result<(), ArrayError> {
    slots.try_reserve_exact(additional).map_err(|_e| {
        #[cfg(feature = "logging")]
        log::warn!("dyn array failed to allocate {requested} slots: {_e}");
        ArrayError::AllocationFailure { requested }
    })
}

/// Iterator over the slots below `len()`; empty slots yield `None`.
pub struct Iter<'a, T> {
    it: core::slice::Iter<'a, Option<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = Option<&'a T>;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(Option::as_ref)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<T> DynArray<T> {
    /// Creates an array with `initial_capacity` empty slots and the default
    /// expand rate. `element_size` is recorded but never interpreted.
    pub fn init(element_size: usize, initial_capacity: usize) -> Result<Self, ArrayError> {
        Self::with_expand_rate(element_size, initial_capacity, DEFAULT_EXPAND_RATE)
    }

    pub fn with_expand_rate(
        element_size: usize,
        initial_capacity: usize,
        expand_rate: usize,
    ) -> Result<Self, ArrayError> {
        if initial_capacity == 0 {
            return Err(ArrayError::InvalidCapacity);
        }
        if expand_rate == 0 {
            return Err(ArrayError::InvalidExpandRate);
        }
        Ok(Self {
            end: 0,
            element_size,
            expand_rate,
            slots: alloc_slots(initial_capacity)?,
        })
    }

    /// Number of logically present slots (the high-water index).
    pub fn len(&self) -> usize {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub fn expand_rate(&self) -> usize {
        self.expand_rate
    }

    fn out_of_range(&self, index: usize) -> ArrayError {
        ArrayError::IndexOutOfRange {
            index,
            capacity: self.capacity(),
        }
    }

    /// Reads slot `index`. Any index below `capacity()` is valid; holes read
    /// as `Ok(None)`.
    pub fn get(&self, index: usize) -> Result<Option<&T>, ArrayError> {
        self.slots
            .get(index)
            .map(Option::as_ref)
            .ok_or_else(|| self.out_of_range(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<Option<&mut T>, ArrayError> {
        let err = self.out_of_range(index);
        self.slots.get_mut(index).map(Option::as_mut).ok_or(err)
    }

    /// Writes slot `index`, dropping whatever it held. Writing past `len()`
    /// moves `len()` up to `index` without filling the slots in between.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), ArrayError> {
        let err = self.out_of_range(index);
        let slot = self.slots.get_mut(index).ok_or(err)?;
        *slot = Some(value);
        if index > self.end {
            self.end = index;
        }
        Ok(())
    }

    /// Empties slot `index` and returns its content. Later slots are not
    /// shifted and `len()` is unchanged.
    pub fn remove(&mut self, index: usize) -> Result<Option<T>, ArrayError> {
        let err = self.out_of_range(index);
        self.slots.get_mut(index).map(Option::take).ok_or(err)
    }

    /// Appends `value` at `len()`. A full array is expanded first, so a failed
    /// expansion leaves the array untouched.
    pub fn push(&mut self, value: T) -> Result<(), ArrayError> {
        if self.end >= self.capacity() {
            self.expand()?;
        }
        self.slots[self.end] = Some(value);
        self.end += 1;
        Ok(())
    }

    /// Takes the slot at `len() - 1`. Contracts once `len()` drops to an exact
    /// multiple of the expand rate above the rate itself.
    pub fn pop(&mut self) -> Result<Option<T>, ArrayError> {
        if self.end == 0 {
            return Err(ArrayError::EmptyArray);
        }
        self.end -= 1;
        let value = self.slots[self.end].take();

        if self.end > self.expand_rate && self.end % self.expand_rate == 0 {
            self.contract()?;
        }
        Ok(value)
    }

    /// Grows capacity by exactly `expand_rate()` empty slots.
    pub fn expand(&mut self) -> Result<(), ArrayError> {
        let new_capacity = self
            .capacity()
            .checked_add(self.expand_rate)
            .ok_or(ArrayError::AllocationFailure {
                requested: usize::MAX,
            })?;
        self.resize(new_capacity)
    }

    /// Resizes capacity to `max(len(), expand_rate()) + 1`, which always
    /// leaves room for one more push.
    pub fn contract(&mut self) -> Result<(), ArrayError> {
        let new_capacity = self.end.max(self.expand_rate) + 1;
        self.resize(new_capacity)
    }

    fn resize(&mut self, new_capacity: usize) -> Result<(), ArrayError> {
        debug_assert!(new_capacity > self.end);
        let old_capacity = self.capacity();
        if new_capacity > old_capacity {
            reserve_slots(&mut self.slots, new_capacity - old_capacity, new_capacity)?;
            self.slots.resize_with(new_capacity, || None);
        } else {
            self.slots.truncate(new_capacity);
            self.slots.shrink_to(new_capacity);
        }
        #[cfg(feature = "logging")]
        log::trace!("dyn array resized from {old_capacity} to {new_capacity} slots");
        Ok(())
    }

    /// Marks every slot as logically present without writing to any of them.
    pub fn extend_to_capacity(&mut self) {
        self.end = self.capacity();
    }

    pub fn first(&self) -> Option<&T> {
        if self.end == 0 {
            return None;
        }
        self.slots[0].as_ref()
    }

    pub fn last(&self) -> Option<&T> {
        self.end
            .checked_sub(1)
            .and_then(|i| self.slots[i].as_ref())
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            it: self.slots[..self.end].iter(),
        }
    }

    /// Drops every element the array holds and resets `len()` to zero.
    /// Capacity is kept.
    pub fn clear_owned(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.end = 0;
    }

    /// Releases the slot storage. Elements are dropped as `T` dictates; for
    /// borrowed `T` nothing behind the reference is touched.
    pub fn destroy(self) {
        #[cfg(feature = "logging")]
        log::trace!("dyn array destroyed with {} slots", self.capacity());
        drop(self);
    }
}
