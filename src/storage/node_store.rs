//! Node store: element arena for nodes.
//!
//! Incident edges are detached by the graph store before `remove` runs, so
//! this layer only ever releases nodes with zero degree.

use super::allocator::IdSpaceSnapshot;
use super::arena::ElementArena;
use super::version::Version;
use crate::model::{ElementId, IdType, Node, StoreId};
use crate::Result;

#[derive(Debug, Clone)]
pub struct NodeStore {
    arena: ElementArena<Node>,
}

impl NodeStore {
    pub fn new(block_size: usize, id_type: IdType) -> Self {
        Self { arena: ElementArena::new(block_size, id_type) }
    }

    pub(crate) fn check_insertable(&self, node: &Node) -> Result<()> {
        self.arena.check_insertable(node)
    }

    pub(crate) fn add(&mut self, mut node: Node) -> Result<StoreId> {
        node.reset_adjacency();
        self.arena.insert(node)
    }

    pub(crate) fn add_at(&mut self, mut node: Node, id: StoreId) -> Result<StoreId> {
        node.reset_adjacency();
        self.arena.insert_at(node, id)
    }

    pub(crate) fn remove(&mut self, id: StoreId) -> Result<Node> {
        debug_assert!(
            self.arena.try_get(id).is_none_or(|n| n.out_degree == 0 && n.in_degree == 0),
            "node {id} removed with attached edges"
        );
        let mut node = self.arena.remove(id)?;
        node.reset_adjacency();
        node.owner = 0;
        Ok(node)
    }

    #[inline]
    pub fn get(&self, id: StoreId) -> Result<&Node> {
        self.arena.get(id)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: StoreId) -> Result<&mut Node> {
        self.arena.get_mut(id)
    }

    #[inline]
    pub(crate) fn try_get_mut(&mut self, id: StoreId) -> Option<&mut Node> {
        self.arena.try_get_mut(id)
    }

    #[inline]
    pub fn try_get(&self, id: StoreId) -> Option<&Node> {
        self.arena.try_get(id)
    }

    #[inline]
    pub fn contains(&self, id: StoreId) -> bool {
        self.arena.contains(id)
    }

    pub fn by_id(&self, id: &ElementId) -> Option<&Node> {
        self.arena.by_id(id)
    }

    pub fn store_id_of(&self, id: &ElementId) -> Option<StoreId> {
        self.arena.store_id_of(id)
    }

    pub fn contains_id(&self, id: &ElementId) -> bool {
        self.arena.contains_id(id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn high_water(&self) -> u32 {
        self.arena.high_water()
    }

    pub fn block_count(&self) -> usize {
        self.arena.block_count()
    }

    pub fn version(&self) -> Version {
        self.arena.version()
    }

    pub fn id_space(&self) -> IdSpaceSnapshot {
        self.arena.id_space()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.arena.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = StoreId> + '_ {
        self.arena.ids()
    }

    pub(crate) fn next_live(&self, from: u32) -> Option<StoreId> {
        self.arena.next_live(from)
    }

    pub(crate) fn clear(&mut self) {
        self.arena.clear();
    }
}
