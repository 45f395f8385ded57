//! Dense id -> slot lookup tables
//!
//! Ids are small non-negative integers, so a flat array sized to the largest
//! id ever observed gives O(1) lookup without hashing.

use crate::world::EntityId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdIndex {
    slots: Vec<Option<usize>>,
}

impl IdIndex {
    /// Empty index able to hold ids `0..=max_id`
    pub fn with_max_id(max_id: EntityId) -> Self {
        Self {
            slots: vec![None; max_id as usize + 1],
        }
    }

    /// Reset and index `ids` by their position in the sequence
    ///
    /// # Panics
    /// If any id exceeds the capacity chosen at construction.
    pub fn rebuild<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = EntityId>,
    {
        self.slots.iter_mut().for_each(|s| *s = None);
        for (slot, id) in ids.into_iter().enumerate() {
            let cell = self.cell_mut(id);
            *cell = Some(slot);
        }
    }

    /// Slot of a live id, `None` when the id is not present
    ///
    /// # Panics
    /// If `id` is beyond the maximum id this index was sized for.
    pub fn get(&self, id: EntityId) -> Option<usize> {
        assert!(
            (id as usize) < self.slots.len(),
            "id {} outside index bounds (max {})",
            id,
            self.slots.len() - 1
        );
        self.slots[id as usize]
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn max_id(&self) -> EntityId {
        (self.slots.len() - 1) as EntityId
    }

    fn cell_mut(&mut self, id: EntityId) -> &mut Option<usize> {
        let len = self.slots.len();
        assert!(
            (id as usize) < len,
            "id {} outside index bounds (max {})",
            id,
            len - 1
        );
        &mut self.slots[id as usize]
    }
}
