//! # Storage Engine
//!
//! Layers, leaves first:
//!
//! | Layer | Module | Role |
//! |-------|--------|------|
//! | `BitVector` | `bitvec` | dense bitset, word access for view algebra |
//! | `IdAllocator` | `allocator` | dense ids, min-ordered garbage queue |
//! | `BlockPool` | `pool` | records in fixed-size blocks addressed by id |
//! | `ElementArena` | `arena` | allocator + pool + user-id dictionary |
//! | `NodeStore` | `node_store` | nodes and their degree counters |
//! | `EdgeTypeRegistry` | `edge_types` | label ↔ code |
//! | `EdgeStore` | `edge_store` | adjacency lists, existence index, mutual pairs |
//! | `GraphStore` | `graph_store` | facade over all of the above plus views and observers |
//! | `GraphLock` | `lock` | non-upgradeable readers-writer lock |

pub mod adjacency;
pub mod allocator;
pub mod arena;
pub mod bitvec;
pub mod edge_store;
pub mod edge_types;
pub mod graph_store;
pub mod lock;
pub mod node_store;
pub mod pool;
pub mod version;

use crate::model::{EdgeTypeId, ElementKind, StoreId};
use crate::view::ViewId;

pub use adjacency::{AdjacencyCursor, Direction, EdgeCursor, EdgeScan, IncidentEdges, Neighbours, NodeCursor};
pub use allocator::{IdAllocator, IdSpaceSnapshot};
pub use bitvec::BitVector;
pub use edge_store::EdgeStore;
pub use edge_types::{EdgeTypeRegistry, DEFAULT_EDGE_TYPE_LABEL};
pub use graph_store::GraphStore;
pub use lock::{GraphLock, ReadLock, WriteLock};
pub use node_store::NodeStore;
pub use version::{GraphVersion, Version};

// ============================================================================
// Lifecycle callbacks
// ============================================================================

/// Hooks for layers kept outside the core (attribute columns, value and
/// temporal indices, per-view auxiliary indices).
///
/// Callbacks run synchronously under the write lock, after the change is
/// complete. They must not call back into the store.
pub trait StoreListener: Send + Sync {
    fn element_added(&self, _kind: ElementKind, _id: StoreId) {}

    /// The store id is already free when this runs.
    fn element_removed(&self, _kind: ElementKind, _id: StoreId) {}

    fn edge_type_changed(&self, _id: StoreId, _old: EdgeTypeId, _new: EdgeTypeId) {}

    fn view_destroyed(&self, _view: ViewId) {}
}
