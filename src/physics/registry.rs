//! Generational registries for collision shapes and triangle meshes
//!
//! Shapes and meshes outlive the rigid bodies that reference them, so they
//! are tracked in arenas keyed by stable handles. Removal is O(1) and bumps
//! the slot generation, so a handle to a removed entry is rejected instead
//! of silently aliasing whatever reuses the slot.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A stable, generation-checked handle into a [`Registry`].
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index of this handle
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation this handle was issued at
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

/// One arena slot; the generation survives the value
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Arena keyed by generation-checked handles
pub struct Registry<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Registry<T> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Insert a value and return its handle
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Handle::new(index, 0)
    }

    /// Get a value, rejecting stale handles
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Check whether a handle refers to a live entry
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Remove a value, returning it if the handle was live.
    ///
    /// The slot generation is bumped so the removed handle (and any copy of
    /// it) can never resolve again.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation += 1;
        self.free.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    /// Number of live entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the registry has no live entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every entry, invalidating all outstanding handles
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation += 1;
                self.free.push(index as u32);
            }
        }
        self.len = 0;
    }

    /// Iterate over live entries
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| slot.value.as_ref())
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut registry = Registry::new();
        let handle = registry.insert("shape");

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(handle), Some(&"shape"));
        assert!(registry.contains(handle));
    }

    #[test]
    fn test_remove_rejects_stale_handle() {
        let mut registry = Registry::new();
        let handle = registry.insert(7_i32);

        assert_eq!(registry.remove(handle), Some(7));
        assert_eq!(registry.len(), 0);

        // The handle is dead now, in every way
        assert_eq!(registry.get(handle), None);
        assert_eq!(registry.remove(handle), None);
        assert!(!registry.contains(handle));
    }

    #[test]
    fn test_slot_reuse_gets_new_generation() {
        let mut registry = Registry::new();
        let first = registry.insert(1_i32);
        registry.remove(first);

        let second = registry.insert(2_i32);
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());

        assert_eq!(registry.get(first), None);
        assert_eq!(registry.get(second), Some(&2));
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut registry = Registry::new();
        let a = registry.insert("a");
        let b = registry.insert("b");

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.get(a), None);
        assert_eq!(registry.get(b), None);

        // Slots are reusable after a clear
        let c = registry.insert("c");
        assert_eq!(registry.get(c), Some(&"c"));
        assert_eq!(registry.len(), 1);
    }
}
