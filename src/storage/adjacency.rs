//! Cursors and iterators over the intrusive adjacency lists.
//!
//! A cursor holds no borrow of the store. It prefetches the next link before
//! yielding an element, so removing the yielded element through
//! [`AdjacencyCursor::remove`] (or the node/edge cursor equivalents) leaves the
//! traversal intact. Any other mutation during a traversal is unsupported.

use hashbrown::HashSet;

use super::edge_store::EdgeStore;
use super::graph_store::GraphStore;
use super::node_store::NodeStore;
use crate::model::{Edge, EdgeTypeId, Node, StoreId};
use crate::{Error, Result};

/// Which incident edges of a node a traversal visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Edges whose source is the node.
    Out,
    /// Edges whose target is the node.
    In,
    /// Both lists; a self-loop is yielded once.
    InOut,
    /// Both lists; a mutual pair is yielded once, through its outgoing half.
    Undirected,
    /// Self-loops only.
    SelfLoop,
}

impl Direction {
    /// List phases walked, `true` for the outgoing list.
    fn phases(self) -> &'static [bool] {
        match self {
            Direction::Out | Direction::SelfLoop => &[true],
            Direction::In => &[false],
            Direction::InOut | Direction::Undirected => &[true, false],
        }
    }
}

// ============================================================================
// Adjacency cursor
// ============================================================================

/// Walks the per-type lists of one node, optionally restricted to one type.
#[derive(Debug, Clone)]
pub struct AdjacencyCursor {
    node: StoreId,
    direction: Direction,
    edge_type: Option<EdgeTypeId>,
    fresh: bool,
    phase: usize,
    ty: usize,
    next: StoreId,
    current: StoreId,
}

impl AdjacencyCursor {
    pub fn new(node: StoreId, direction: Direction, edge_type: Option<EdgeTypeId>) -> Self {
        Self {
            node,
            direction,
            edge_type,
            fresh: true,
            phase: 0,
            ty: 0,
            next: StoreId::NULL,
            current: StoreId::NULL,
        }
    }

    pub fn node(&self) -> StoreId {
        self.node
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The edge most recently yielded, unless it was removed.
    pub fn current(&self) -> Option<StoreId> {
        (!self.current.is_null()).then_some(self.current)
    }

    pub fn advance(&mut self, store: &GraphStore) -> Option<StoreId> {
        self.step(store.nodes(), store.edges())
    }

    /// Removes the edge last yielded. Traversal continues with its successor.
    pub fn remove(&mut self, store: &mut GraphStore) -> Result<Edge> {
        let id = take_current(&mut self.current)?;
        store.remove_edge(id)
    }

    pub(crate) fn step(&mut self, nodes: &NodeStore, edges: &EdgeStore) -> Option<StoreId> {
        loop {
            while !self.next.is_null() {
                let id = self.next;
                let Some(edge) = edges.try_get(id) else {
                    self.next = StoreId::NULL;
                    break;
                };
                let outgoing = self.outgoing();
                self.next = if outgoing { edge.next_out } else { edge.next_in };
                if self.accepts(edge, outgoing) {
                    self.current = id;
                    return Some(id);
                }
            }
            if !self.next_list(nodes) {
                self.current = StoreId::NULL;
                return None;
            }
        }
    }

    fn outgoing(&self) -> bool {
        self.direction.phases().get(self.phase).copied().unwrap_or(true)
    }

    fn accepts(&self, edge: &Edge, outgoing: bool) -> bool {
        match self.direction {
            Direction::Out | Direction::In => true,
            Direction::InOut => outgoing || !edge.is_self_loop(),
            Direction::Undirected => outgoing || !(edge.is_self_loop() || edge.is_mutual()),
            Direction::SelfLoop => edge.is_self_loop(),
        }
    }

    /// Moves to the next non-empty list. `false` once every list is done.
    fn next_list(&mut self, nodes: &NodeStore) -> bool {
        let Some(node) = nodes.try_get(self.node) else { return false };
        let phases = self.direction.phases();
        let (lo, hi) = match self.edge_type {
            Some(t) => (t.index(), t.index() + 1),
            None => (0, node.type_slots()),
        };
        loop {
            if self.fresh {
                self.fresh = false;
                self.phase = 0;
                self.ty = lo;
            } else {
                self.ty += 1;
            }
            if self.ty >= hi {
                self.phase += 1;
                self.ty = lo;
            }
            if self.phase >= phases.len() || lo >= hi {
                return false;
            }
            let ty = EdgeTypeId(self.ty as u16);
            let head = if phases[self.phase] { node.head_out(ty) } else { node.head_in(ty) };
            if !head.is_null() {
                self.next = head;
                return true;
            }
        }
    }
}

fn take_current(current: &mut StoreId) -> Result<StoreId> {
    let id = std::mem::replace(current, StoreId::NULL);
    if id.is_null() {
        return Err(Error::CursorNotPositioned);
    }
    Ok(id)
}

// ============================================================================
// Scan cursors
// ============================================================================

/// Visits every live node in store-id order.
#[derive(Debug, Clone)]
pub struct NodeCursor {
    pos: u32,
    current: StoreId,
}

impl NodeCursor {
    pub fn new() -> Self {
        Self { pos: 0, current: StoreId::NULL }
    }

    pub fn advance(&mut self, store: &GraphStore) -> Option<StoreId> {
        match store.nodes().next_live(self.pos) {
            Some(id) => {
                self.pos = id.0 + 1;
                self.current = id;
                Some(id)
            }
            None => {
                self.current = StoreId::NULL;
                None
            }
        }
    }

    /// Removes the node last yielded along with its incident edges.
    pub fn remove(&mut self, store: &mut GraphStore) -> Result<Node> {
        let id = take_current(&mut self.current)?;
        store.remove_node(id)
    }
}

/// Visits every live edge in store-id order, or with `undirected` each mutual
/// pair once (the half whose source is the smaller store id).
#[derive(Debug, Clone)]
pub struct EdgeCursor {
    pos: u32,
    current: StoreId,
    undirected: bool,
}

impl Default for NodeCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeCursor {
    pub fn new() -> Self {
        Self { pos: 0, current: StoreId::NULL, undirected: false }
    }

    pub fn undirected() -> Self {
        Self { undirected: true, ..Self::new() }
    }

    pub fn advance(&mut self, store: &GraphStore) -> Option<StoreId> {
        self.step(store.edges())
    }

    pub fn remove(&mut self, store: &mut GraphStore) -> Result<Edge> {
        let id = take_current(&mut self.current)?;
        store.remove_edge(id)
    }

    pub(crate) fn step(&mut self, edges: &EdgeStore) -> Option<StoreId> {
        while let Some(id) = edges.next_live(self.pos) {
            self.pos = id.0 + 1;
            if self.undirected {
                if let Some(edge) = edges.try_get(id) {
                    if edge.is_mutual() && edge.source > edge.target {
                        continue;
                    }
                }
            }
            self.current = id;
            return Some(id);
        }
        self.current = StoreId::NULL;
        None
    }
}

impl Default for EdgeCursor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Borrowing iterators
// ============================================================================

/// Incident edges of one node. See [`GraphStore::incident`].
pub struct IncidentEdges<'a> {
    cursor: AdjacencyCursor,
    nodes: &'a NodeStore,
    edges: &'a EdgeStore,
}

impl<'a> IncidentEdges<'a> {
    pub(crate) fn new(cursor: AdjacencyCursor, nodes: &'a NodeStore, edges: &'a EdgeStore) -> Self {
        Self { cursor, nodes, edges }
    }
}

impl<'a> Iterator for IncidentEdges<'a> {
    type Item = &'a Edge;

    fn next(&mut self) -> Option<&'a Edge> {
        let id = self.cursor.step(self.nodes, self.edges)?;
        self.edges.try_get(id)
    }
}

/// Distinct neighbours of one node, in first-seen order.
pub struct Neighbours<'a> {
    inner: IncidentEdges<'a>,
    seen: HashSet<StoreId>,
}

impl<'a> Neighbours<'a> {
    pub(crate) fn new(inner: IncidentEdges<'a>) -> Self {
        Self { inner, seen: HashSet::new() }
    }
}

impl Iterator for Neighbours<'_> {
    type Item = StoreId;

    fn next(&mut self) -> Option<StoreId> {
        let node = self.inner.cursor.node();
        loop {
            let edge = self.inner.next()?;
            let other = edge.opposite(node)?;
            if self.seen.insert(other) {
                return Some(other);
            }
        }
    }
}

/// Every live edge, or each mutual pair once. See [`GraphStore::undirected_edges`].
pub struct EdgeScan<'a> {
    cursor: EdgeCursor,
    edges: &'a EdgeStore,
}

impl<'a> EdgeScan<'a> {
    pub(crate) fn new(cursor: EdgeCursor, edges: &'a EdgeStore) -> Self {
        Self { cursor, edges }
    }
}

impl<'a> Iterator for EdgeScan<'a> {
    type Item = &'a Edge;

    fn next(&mut self) -> Option<&'a Edge> {
        let id = self.cursor.step(self.edges)?;
        self.edges.try_get(id)
    }
}
