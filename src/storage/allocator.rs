//! Dense id allocation with a min-ordered garbage queue.
//!
//! Freed ids are handed out again, smallest first, before the high-water mark
//! grows. Live ids plus the queue always cover `[0, high_water)` exactly.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::StoreId;
use crate::{Error, Result};

/// Serialisable image of an id space, persisted verbatim by serializers so
/// store ids survive a save/load cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSpaceSnapshot {
    pub high_water: u32,
    pub garbage: Vec<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    garbage: BTreeSet<u32>,
    high_water: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator whose ids below `high_water` are all taken.
    pub fn starting_at(high_water: u32) -> Self {
        Self { garbage: BTreeSet::new(), high_water }
    }

    /// Next id to hand out, without taking it.
    pub fn peek(&self) -> StoreId {
        StoreId(self.garbage.first().copied().unwrap_or(self.high_water))
    }

    pub fn allocate(&mut self) -> Result<StoreId> {
        if let Some(id) = self.garbage.pop_first() {
            return Ok(StoreId(id));
        }
        if self.high_water == StoreId::NULL.0 {
            return Err(Error::CapacityExhausted("store id space".into()));
        }
        let id = self.high_water;
        self.high_water += 1;
        Ok(StoreId(id))
    }

    /// Takes a specific id. Ids between the old high-water mark and `id`
    /// become garbage.
    pub fn claim(&mut self, id: StoreId) -> Result<()> {
        if id.is_null() {
            return Err(Error::IdUnavailable(id));
        }
        if id.0 < self.high_water {
            if !self.garbage.remove(&id.0) {
                return Err(Error::IdUnavailable(id));
            }
            return Ok(());
        }
        self.garbage.extend(self.high_water..id.0);
        self.high_water = id.0 + 1;
        Ok(())
    }

    pub fn release(&mut self, id: StoreId) {
        debug_assert!(id.0 < self.high_water, "releasing id {id} beyond high-water mark");
        self.garbage.insert(id.0);
    }

    /// Lowers the high-water mark, dropping queued ids at or above it.
    pub fn truncate(&mut self, high_water: u32) {
        debug_assert!(high_water <= self.high_water);
        drop(self.garbage.split_off(&high_water));
        self.high_water = high_water;
    }

    pub fn is_free(&self, id: StoreId) -> bool {
        id.0 >= self.high_water || self.garbage.contains(&id.0)
    }

    #[inline]
    pub fn high_water(&self) -> u32 {
        self.high_water
    }

    pub fn garbage_len(&self) -> usize {
        self.garbage.len()
    }

    /// Number of ids currently handed out.
    pub fn live(&self) -> usize {
        self.high_water as usize - self.garbage.len()
    }

    pub fn snapshot(&self) -> IdSpaceSnapshot {
        IdSpaceSnapshot {
            high_water: self.high_water,
            garbage: self.garbage.iter().copied().collect(),
        }
    }

    pub fn clear(&mut self) {
        self.garbage.clear();
        self.high_water = 0;
    }
}
