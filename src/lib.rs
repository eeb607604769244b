//! # densegraph: In-Process Mutable Graph Storage
//!
//! A storage engine for large directed, undirected and mixed multigraphs
//! with dense reusable ids, O(1) typed adjacency, cheap bitset views and a
//! non-upgradeable readers-writer lock.
//!
//! ## Design Principles
//!
//! 1. **Dense ids**: every live node and edge has a `StoreId` that indexes
//!    straight into block storage; freed ids are reused smallest first
//! 2. **Intrusive adjacency**: per-type doubly linked lists threaded through
//!    the edge records by store id, no per-node containers
//! 3. **Incremental bookkeeping**: degrees, mutual pairs, per-type counts and
//!    versions are updated by every mutation, never recomputed by a scan
//! 4. **One mutation path**: `GraphStore` routes every change through views,
//!    observers and listeners in a fixed order
//!
//! ## Quick Start
//!
//! ```rust
//! use densegraph::{Direction, Edge, GraphStore, Node, StoreConfig};
//!
//! # fn main() -> densegraph::Result<()> {
//! let mut store = GraphStore::new(StoreConfig::default())?;
//! let knows = store.register_edge_type("KNOWS")?;
//!
//! let ada = store.add_node(Node::new(1))?;
//! let bob = store.add_node(Node::new(2))?;
//! store.add_edge(Edge::directed(10, ada, bob, knows))?;
//! store.add_edge(Edge::directed(11, bob, ada, knows))?;
//!
//! assert_eq!(store.mutual_edge_count(), 1);
//! let out: Vec<_> = store.neighbours(ada, Direction::Out, Some(knows))?.collect();
//! assert_eq!(out, vec![bob]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! | Handle | Access |
//! |--------|--------|
//! | `GraphStore` | plain `&`/`&mut`, single owner |
//! | `Graph` | `GraphLock` + store; `read()`/`write()` guards |

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod graph;
pub mod model;
pub mod observer;
pub mod storage;
pub mod view;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{AttributeSlot, Edge, EdgeTypeId, Element, ElementId, ElementKind, IdType, Node, StoreId};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use config::StoreConfig;
pub use storage::{
    AdjacencyCursor, Direction, EdgeCursor, GraphLock, GraphStore, GraphVersion,
    IdSpaceSnapshot, NodeCursor, StoreListener, Version,
};

// ============================================================================
// Re-exports: Views, observers, locking
// ============================================================================

pub use graph::{Graph, GraphReadGuard, GraphWriteGuard};
pub use observer::{GraphDiff, ObserverId};
pub use view::{ViewId, ViewMut, ViewRef};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{kind:?} id {id} already exists")]
    DuplicateId { kind: ElementKind, id: ElementId },

    #[error("{kind:?} store expects {expected:?} ids, got {got:?}")]
    IdTypeMismatch { kind: ElementKind, expected: IdType, got: IdType },

    #[error("{kind:?} is already stored at {id}")]
    AlreadyStored { kind: ElementKind, id: StoreId },

    #[error("no live {kind:?} at store id {id}")]
    InvalidStoreId { kind: ElementKind, id: StoreId },

    #[error("store id {0} is not free")]
    IdUnavailable(StoreId),

    #[error("node not found: {0}")]
    NodeNotFound(ElementId),

    #[error("edge not found: {0}")]
    EdgeNotFound(ElementId),

    #[error("endpoint {0} is not a live node")]
    MissingEndpoint(StoreId),

    #[error("endpoint {0} was taken from a node of another store")]
    ForeignEndpoint(StoreId),

    #[error("edge {from} -> {to} of type {edge_type} already exists")]
    EdgeExists { from: StoreId, to: StoreId, edge_type: EdgeTypeId },

    #[error("edge type {0} is not registered")]
    UnknownEdgeType(EdgeTypeId),

    #[error("no edge type labelled {0:?}")]
    UnknownEdgeTypeLabel(String),

    #[error("edge type {0} is still used by {1} edges")]
    EdgeTypeInUse(EdgeTypeId, usize),

    #[error("edge type conflict: {0}")]
    TypeConflict(String),

    #[error("capacity exhausted: {0}")]
    CapacityExhausted(String),

    #[error("{0} has been destroyed")]
    ViewDestroyed(view::ViewId),

    #[error("{0} belongs to another store")]
    ForeignView(view::ViewId),

    #[error("edge {edge} needs node {node}, which is not in {view}")]
    EndpointNotInView { view: view::ViewId, edge: StoreId, node: StoreId },

    #[error("invalid view operation: {0}")]
    InvalidViewOperation(String),

    #[error("{0} has been destroyed")]
    ObserverDestroyed(observer::ObserverId),

    #[error("{0} belongs to another store")]
    ForeignObserver(observer::ObserverId),

    #[error("{0} was created without diff recording")]
    DiffsNotRecorded(observer::ObserverId),

    #[error("cursor has no current element")]
    CursorNotPositioned,

    #[error("cannot take the write lock while holding a read lock")]
    LockUpgrade,

    #[error("write lock is already held by this thread")]
    LockReentry,

    #[error("the writer must read through its write guard")]
    ReadWhileWriting,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
