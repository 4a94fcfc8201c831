use alloc::collections::BTreeMap;
use core::ops::Deref;

use crate::{StoreError, StoreResult};

/// Largest id handed out, matching the kernel IDR's `INT_MAX` bound.
pub const MAX_ID: u32 = i32::MAX as u32;

/// An integer-id allocator that owns its values.
///
/// Ids are allocated lowest-free-first starting at 0. Values are owning pointers, enumeration
/// borrows what they point to.
pub trait IdTable {
    type Value: Deref;

    /// Stores `value` under a free id and returns it. On failure `value` is dropped.
    fn insert(&mut self, value: Self::Value) -> StoreResult<u32>;

    /// Detaches the value stored under `id`.
    fn remove(&mut self, id: u32) -> Option<Self::Value>;

    /// Swaps the value stored under `id`, returning the displaced one.
    ///
    /// Fails with [`StoreError::NotFound`] and leaves the table as it was if `id` is free.
    fn replace(&mut self, id: u32, value: Self::Value) -> StoreResult<Self::Value>;

    /// Visits every entry in ascending id order, stopping at the first error.
    fn try_for_each<E, F>(&self, f: F) -> Result<(), E>
    where
        F: FnMut(u32, &<Self::Value as Deref>::Target) -> Result<(), E>;
}

/// An [`IdTable`] kept in a [`BTreeMap`].
#[derive(Debug)]
pub struct MapTable<V> {
    entries: BTreeMap<u32, V>,
    max_id: u32,
}

impl<V> MapTable<V> {
    pub fn new() -> Self {
        Self::with_max_id(MAX_ID)
    }

    /// Creates a table that hands out ids `0..=max_id` only.
    pub fn with_max_id(max_id: u32) -> Self {
        MapTable {
            entries: BTreeMap::new(),
            max_id,
        }
    }

    fn lowest_free_id(&self) -> Option<u32> {
        let mut candidate = 0u32;
        for &id in self.entries.keys() {
            if id != candidate {
                break;
            }
            candidate = candidate.checked_add(1)?;
        }
        (candidate <= self.max_id).then_some(candidate)
    }
}

impl<V> Default for MapTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Deref> IdTable for MapTable<V> {
    type Value = V;

    fn insert(&mut self, value: V) -> StoreResult<u32> {
        let id = self.lowest_free_id().ok_or(StoreError::NoSpace)?;
        self.entries.insert(id, value);
        Ok(id)
    }

    fn remove(&mut self, id: u32) -> Option<V> {
        self.entries.remove(&id)
    }

    fn replace(&mut self, id: u32, value: V) -> StoreResult<V> {
        let slot = self.entries.get_mut(&id).ok_or(StoreError::NotFound)?;
        Ok(core::mem::replace(slot, value))
    }

    fn try_for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(u32, &V::Target) -> Result<(), E>,
    {
        self.entries.iter().try_for_each(|(&id, value)| f(id, value))
    }
}

#[cfg(test)]
mod tests {
    use alloc::{
        string::{String, ToString},
        vec::Vec,
    };

    use super::*;

    fn ids(table: &MapTable<&'static str>) -> Vec<u32> {
        let mut ids = Vec::new();
        table
            .try_for_each(|id, _| {
                ids.push(id);
                Ok::<(), ()>(())
            })
            .unwrap();
        ids
    }

    #[test]
    fn allocates_lowest_free_id() {
        let mut table = MapTable::new();
        assert_eq!(table.insert("a"), Ok(0));
        assert_eq!(table.insert("b"), Ok(1));
        assert_eq!(table.insert("c"), Ok(2));
        assert_eq!(table.remove(1), Some("b"));
        assert_eq!(table.insert("d"), Ok(1));
        assert_eq!(table.insert("e"), Ok(3));
        assert_eq!(ids(&table), [0, 1, 2, 3]);
    }

    #[test]
    fn exhausted_id_space_is_reported() {
        let mut table = MapTable::with_max_id(1);
        assert_eq!(table.insert("a"), Ok(0));
        assert_eq!(table.insert("b"), Ok(1));
        assert_eq!(table.insert("c"), Err(StoreError::NoSpace));
        assert_eq!(ids(&table), [0, 1]);
    }

    #[test]
    fn replace_requires_an_existing_id() {
        let mut table = MapTable::new();
        assert_eq!(table.replace(0, "x"), Err(StoreError::NotFound));
        assert!(ids(&table).is_empty());

        table.insert("old").unwrap();
        assert_eq!(table.replace(0, "new"), Ok("old"));
        assert_eq!(table.remove(0), Some("new"));
    }

    #[test]
    fn for_each_stops_at_first_error() {
        let mut table = MapTable::new();
        for v in ["a", "b", "c"] {
            table.insert(v).unwrap();
        }
        let mut seen: Vec<String> = Vec::new();
        let res = table.try_for_each(|id, v| {
            seen.push(v.to_string());
            if id == 1 {
                Err(id)
            } else {
                Ok(())
            }
        });
        assert_eq!(res, Err(1));
        assert_eq!(seen, ["a", "b"]);
    }
}
