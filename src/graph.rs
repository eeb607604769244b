//! Shared graph handle: a [`GraphStore`] behind a [`GraphLock`].
//!
//! ```rust
//! use densegraph::{Edge, EdgeTypeId, Graph, Node, StoreConfig};
//!
//! # fn main() -> densegraph::Result<()> {
//! let graph = Graph::new(StoreConfig::default())?;
//! {
//!     let mut store = graph.write()?;
//!     let a = store.add_node(Node::new(1))?;
//!     let b = store.add_node(Node::new(2))?;
//!     store.add_edge(Edge::directed(10, a, b, EdgeTypeId::DEFAULT))?;
//! }
//! assert_eq!(graph.read()?.edge_count(), 1);
//! # Ok(())
//! # }
//! ```

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

use crate::config::StoreConfig;
use crate::storage::{GraphLock, GraphStore, ReadLock, WriteLock};
use crate::{Error, Result};

pub struct Graph {
    lock: GraphLock,
    store: UnsafeCell<GraphStore>,
}

// SAFETY: the store is only reached through guards. Shared references exist
// only while read holds are active and the unique reference only while the
// write hold is, and `GraphLock` never grants both to different threads.
unsafe impl Sync for Graph {}
unsafe impl Send for Graph {}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph").field("lock", &self.lock).finish_non_exhaustive()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::from_store(GraphStore::default())
    }
}

impl Graph {
    pub fn new(config: StoreConfig) -> Result<Self> {
        Ok(Self::from_store(GraphStore::new(config)?))
    }

    pub fn from_store(store: GraphStore) -> Self {
        Self { lock: GraphLock::new(), store: UnsafeCell::new(store) }
    }

    /// Shared access. Blocks while another thread writes.
    ///
    /// The writer thread must read through [`GraphWriteGuard::read`]; calling
    /// this while holding the write lock fails with
    /// [`Error::ReadWhileWriting`].
    pub fn read(&self) -> Result<GraphReadGuard<'_>> {
        if self.lock.is_write_held_by_current() {
            return Err(Error::ReadWhileWriting);
        }
        let hold = self.lock.read()?;
        // SAFETY: a read hold is active and no write hold can coexist with it.
        let store = unsafe { &*self.store.get() };
        Ok(GraphReadGuard { store, _hold: hold })
    }

    /// Exclusive access. Fails instead of blocking when the calling thread
    /// already holds a read ([`Error::LockUpgrade`]) or the write
    /// ([`Error::LockReentry`]).
    pub fn write(&self) -> Result<GraphWriteGuard<'_>> {
        let hold = self.lock.write()?;
        // SAFETY: the write hold is exclusive.
        let store = unsafe { &mut *self.store.get() };
        Ok(GraphWriteGuard { store, hold })
    }

    pub fn lock(&self) -> &GraphLock {
        &self.lock
    }

    pub fn get_mut(&mut self) -> &mut GraphStore {
        self.store.get_mut()
    }

    pub fn into_inner(self) -> GraphStore {
        self.store.into_inner()
    }
}

pub struct GraphReadGuard<'a> {
    store: &'a GraphStore,
    _hold: ReadLock<'a>,
}

impl std::fmt::Debug for GraphReadGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("GraphReadGuard").field(self.store).finish()
    }
}

impl Deref for GraphReadGuard<'_> {
    type Target = GraphStore;

    fn deref(&self) -> &GraphStore {
        self.store
    }
}

pub struct GraphWriteGuard<'a> {
    store: &'a mut GraphStore,
    hold: WriteLock<'a>,
}

impl<'a> GraphWriteGuard<'a> {
    /// A read taken by the writer. Mutation is unavailable while it lives.
    pub fn read(&self) -> Result<GraphReadGuard<'_>> {
        let hold = self.hold.lock().read()?;
        Ok(GraphReadGuard { store: &*self.store, _hold: hold })
    }

    /// Releases the write lock while keeping shared access, with no window
    /// in which another writer could get in.
    pub fn downgrade(self) -> Result<GraphReadGuard<'a>> {
        let lock = self.hold.lock();
        let read = lock.read()?;
        let GraphWriteGuard { store, hold } = self;
        drop(hold);
        let store: &'a GraphStore = store;
        Ok(GraphReadGuard { store, _hold: read })
    }
}

impl std::fmt::Debug for GraphWriteGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("GraphWriteGuard").field(&*self.store).finish()
    }
}

impl Deref for GraphWriteGuard<'_> {
    type Target = GraphStore;

    fn deref(&self) -> &GraphStore {
        self.store
    }
}

impl DerefMut for GraphWriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut GraphStore {
        self.store
    }
}
