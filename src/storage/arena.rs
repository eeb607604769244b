//! Id allocator, block pool and user-id dictionary for one element kind.
//!
//! Node and edge stores both embed an `ElementArena`; everything kind-specific
//! (adjacency, degrees) lives in those stores.

use hashbrown::HashMap;

use super::allocator::{IdAllocator, IdSpaceSnapshot};
use super::pool::BlockPool;
use super::version::Version;
use crate::model::{Element, ElementId, IdType, StoreId};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct ElementArena<T> {
    pool: BlockPool<T>,
    alloc: IdAllocator,
    dictionary: HashMap<ElementId, StoreId>,
    id_type: IdType,
    version: Version,
}

impl<T: Element> ElementArena<T> {
    pub fn new(block_size: usize, id_type: IdType) -> Self {
        Self {
            pool: BlockPool::new(block_size),
            alloc: IdAllocator::new(),
            dictionary: HashMap::new(),
            id_type,
            version: Version::default(),
        }
    }

    /// Every check `insert` performs, without mutating.
    pub fn check_insertable(&self, element: &T) -> Result<()> {
        if element.is_stored() {
            return Err(Error::AlreadyStored { kind: T::KIND, id: element.store_id() });
        }
        let got = element.id().id_type();
        if got != self.id_type {
            return Err(Error::IdTypeMismatch { kind: T::KIND, expected: self.id_type, got });
        }
        if self.dictionary.contains_key(element.id()) {
            return Err(Error::DuplicateId { kind: T::KIND, id: element.id().clone() });
        }
        Ok(())
    }

    /// Checks that `id` can be claimed by `insert_at`.
    pub fn check_claimable(&self, id: StoreId) -> Result<()> {
        if id.is_null() || !self.alloc.is_free(id) {
            return Err(Error::IdUnavailable(id));
        }
        Ok(())
    }

    /// Store id the next `insert` will use.
    pub fn next_id(&self) -> StoreId {
        self.alloc.peek()
    }

    pub fn insert(&mut self, mut element: T) -> Result<StoreId> {
        self.check_insertable(&element)?;
        let id = self.alloc.allocate()?;
        element.set_store_id(id);
        self.dictionary.insert(element.id().clone(), id);
        self.pool.insert(id, element);
        self.version.bump();
        Ok(id)
    }

    pub fn insert_at(&mut self, mut element: T, id: StoreId) -> Result<StoreId> {
        self.check_insertable(&element)?;
        self.check_claimable(id)?;
        self.alloc.claim(id)?;
        element.set_store_id(id);
        self.dictionary.insert(element.id().clone(), id);
        self.pool.insert(id, element);
        self.version.bump();
        Ok(id)
    }

    /// Removes the record, recycles its id and retires trailing blocks.
    /// The returned record has no store id and an empty attribute slot.
    pub fn remove(&mut self, id: StoreId) -> Result<T> {
        let mut element = self
            .pool
            .take(id)
            .ok_or(Error::InvalidStoreId { kind: T::KIND, id })?;
        self.dictionary.remove(element.id());
        self.alloc.release(id);
        if let Some(high_water) = self.pool.retire_trailing() {
            tracing::debug!(kind = ?T::KIND, high_water, blocks = self.pool.block_count(), "retired trailing blocks");
            self.alloc.truncate(high_water);
        }
        element.set_store_id(StoreId::NULL);
        element.attributes_mut().clear();
        self.version.bump();
        Ok(element)
    }

    #[inline]
    pub fn get(&self, id: StoreId) -> Result<&T> {
        self.pool.get(id).ok_or(Error::InvalidStoreId { kind: T::KIND, id })
    }

    #[inline]
    pub fn get_mut(&mut self, id: StoreId) -> Result<&mut T> {
        self.pool.get_mut(id).ok_or(Error::InvalidStoreId { kind: T::KIND, id })
    }

    #[inline]
    pub fn try_get(&self, id: StoreId) -> Option<&T> {
        self.pool.get(id)
    }

    #[inline]
    pub fn try_get_mut(&mut self, id: StoreId) -> Option<&mut T> {
        self.pool.get_mut(id)
    }

    #[inline]
    pub fn contains(&self, id: StoreId) -> bool {
        self.pool.contains(id)
    }

    pub fn store_id_of(&self, id: &ElementId) -> Option<StoreId> {
        self.dictionary.get(id).copied()
    }

    pub fn by_id(&self, id: &ElementId) -> Option<&T> {
        self.store_id_of(id).and_then(|sid| self.pool.get(sid))
    }

    pub fn contains_id(&self, id: &ElementId) -> bool {
        self.dictionary.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.alloc.live()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn high_water(&self) -> u32 {
        self.alloc.high_water()
    }

    pub fn block_count(&self) -> usize {
        self.pool.block_count()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn bump_version(&mut self) -> Version {
        self.version.bump()
    }

    pub fn id_space(&self) -> IdSpaceSnapshot {
        self.alloc.snapshot()
    }

    pub fn id_type(&self) -> IdType {
        self.id_type
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.pool.iter().map(|(_, e)| e)
    }

    pub fn ids(&self) -> impl Iterator<Item = StoreId> + '_ {
        self.pool.iter().map(|(id, _)| id)
    }

    pub fn next_live(&self, from: u32) -> Option<StoreId> {
        self.pool.next_live(from)
    }

    pub fn clear(&mut self) {
        self.pool.clear();
        self.alloc.clear();
        self.dictionary.clear();
        self.version.bump();
    }
}
