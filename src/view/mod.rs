//! # Views
//!
//! A view is a subgraph defined by two bit vectors over store ids, plus
//! running counters (per-type edge counts and mutual pairs) kept in step with
//! every membership change.
//!
//! Three modes:
//!
//! | nodes tracked | edges tracked | meaning |
//! |---------------|---------------|---------|
//! | yes | yes | explicit node and edge sets; an edge needs both endpoints |
//! | no  | yes | explicit edge set; every live node is visible |
//! | yes | no  | explicit node set; edges are the induced subgraph |
//!
//! Induced edge membership is materialised in the edge bit vector so the
//! counters work the same way in every mode.
//!
//! Views live inside the [`GraphStore`](crate::GraphStore) and share its
//! lock. Reads go through [`ViewRef`], membership changes through [`ViewMut`].

mod algebra;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Edge, EdgeTypeId, Element, ElementKind, StoreId};
use crate::observer::ObserverRegistry;
use crate::storage::{AdjacencyCursor, BitVector, Direction, EdgeStore, GraphStore, GraphVersion, NodeStore};
use crate::{Error, Result};

/// Handle of a view. Never reused within a process, so other layers can key
/// per-view indices on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId {
    pub(crate) store: u32,
    pub(crate) seq: u32,
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view {}:{}", self.store, self.seq)
    }
}

/// Store state a view operation reads, plus the observers it reports to.
pub(crate) struct ViewCx<'a> {
    pub nodes: &'a NodeStore,
    pub edges: &'a EdgeStore,
    pub observers: &'a mut ObserverRegistry,
}

impl ViewCx<'_> {
    /// Reports a membership change to recording observers of `view`.
    pub(crate) fn note(&mut self, view: ViewId, kind: ElementKind, id: StoreId, added: bool) {
        if !self.observers.is_recording(Some(view)) {
            return;
        }
        let user_id = match kind {
            ElementKind::Node => self.nodes.try_get(id).map(|n| n.id()),
            ElementKind::Edge => self.edges.try_get(id).map(|e| e.id()),
        };
        if let Some(user_id) = user_id {
            self.observers.record(Some(view), kind, user_id, added);
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphView {
    id: ViewId,
    tracks_nodes: bool,
    tracks_edges: bool,
    nodes: BitVector,
    edges: BitVector,
    type_counts: Vec<u32>,
    type_mutual: Vec<u32>,
    mutual: usize,
    version: GraphVersion,
}

impl GraphView {
    pub(crate) fn new(id: ViewId, tracks_nodes: bool, tracks_edges: bool) -> Self {
        Self {
            id,
            tracks_nodes,
            tracks_edges,
            nodes: BitVector::new(),
            edges: BitVector::new(),
            type_counts: Vec::new(),
            type_mutual: Vec::new(),
            mutual: 0,
            version: GraphVersion::default(),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn tracks_nodes(&self) -> bool {
        self.tracks_nodes
    }

    pub fn tracks_edges(&self) -> bool {
        self.tracks_edges
    }

    /// Node-only view: edges follow the node set.
    pub fn is_induced(&self) -> bool {
        self.tracks_nodes && !self.tracks_edges
    }

    pub fn version(&self) -> GraphVersion {
        self.version
    }

    #[inline]
    pub fn contains_edge(&self, id: StoreId) -> bool {
        !id.is_null() && self.edges.get(id.index())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.count_ones()
    }

    pub fn edge_count_of_type(&self, edge_type: EdgeTypeId) -> usize {
        self.type_counts.get(edge_type.index()).copied().unwrap_or(0) as usize
    }

    /// Mutual pairs with both halves in the view, each counted once.
    pub fn mutual_edge_count(&self) -> usize {
        self.mutual
    }

    pub fn mutual_edge_count_of_type(&self, edge_type: EdgeTypeId) -> usize {
        self.type_mutual.get(edge_type.index()).copied().unwrap_or(0) as usize
    }

    /// Edges counting each mutual pair once.
    pub fn undirected_edge_count(&self) -> usize {
        self.edge_count() - self.mutual
    }

    fn same_shape(&self, other: &GraphView) -> Result<()> {
        if self.tracks_nodes != other.tracks_nodes || self.tracks_edges != other.tracks_edges {
            return Err(Error::InvalidViewOperation(format!(
                "{} and {} track different element kinds",
                self.id, other.id
            )));
        }
        Ok(())
    }

    fn require_nodes(&self) -> Result<()> {
        if !self.tracks_nodes {
            return Err(Error::InvalidViewOperation(format!("{} does not track nodes", self.id)));
        }
        Ok(())
    }

    fn require_edges(&self) -> Result<()> {
        if !self.tracks_edges {
            return Err(Error::InvalidViewOperation(format!(
                "{} derives its edges from its nodes",
                self.id
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Bit level bookkeeping
    // ========================================================================

    fn grow_types(&mut self, t: usize) {
        if self.type_counts.len() <= t {
            self.type_counts.resize(t + 1, 0);
            self.type_mutual.resize(t + 1, 0);
        }
    }

    /// Sets the edge bit and its counters. A pair is counted when its second
    /// half enters.
    fn insert_edge_bit(&mut self, edge: &Edge) -> bool {
        if !self.edges.set(edge.store_id().index()) {
            return false;
        }
        let t = edge.edge_type().index();
        self.grow_types(t);
        self.type_counts[t] += 1;
        if let Some(partner) = edge.partner() {
            if self.edges.get(partner.index()) {
                self.mutual += 1;
                self.type_mutual[t] += 1;
            }
        }
        true
    }

    fn remove_edge_bit(&mut self, edge: &Edge) -> bool {
        if !self.edges.clear(edge.store_id().index()) {
            return false;
        }
        let t = edge.edge_type().index();
        self.grow_types(t);
        self.type_counts[t] -= 1;
        if let Some(partner) = edge.partner() {
            if self.edges.get(partner.index()) {
                self.mutual -= 1;
                self.type_mutual[t] -= 1;
            }
        }
        true
    }

    /// Clears every edge bit incident to `node`. Returns how many were set.
    fn clear_incident(&mut self, cx: &mut ViewCx<'_>, node: StoreId) -> usize {
        let (nodes, edges) = (cx.nodes, cx.edges);
        let mut cursor = AdjacencyCursor::new(node, Direction::InOut, None);
        let mut cleared = 0;
        while let Some(id) = cursor.step(nodes, edges) {
            let Some(edge) = edges.try_get(id) else { continue };
            if self.remove_edge_bit(edge) {
                cx.note(self.id, ElementKind::Edge, id, false);
                cleared += 1;
            }
        }
        cleared
    }

    /// Adds the induced edges between `node` and visible nodes.
    fn induce_incident(&mut self, cx: &mut ViewCx<'_>, node: StoreId) -> usize {
        let (nodes, edges) = (cx.nodes, cx.edges);
        let mut cursor = AdjacencyCursor::new(node, Direction::InOut, None);
        let mut added = 0;
        while let Some(id) = cursor.step(nodes, edges) {
            let Some(edge) = edges.try_get(id) else { continue };
            let visible = edge.opposite(node).is_some_and(|o| self.nodes.get(o.index()));
            if visible && self.insert_edge_bit(edge) {
                cx.note(self.id, ElementKind::Edge, id, true);
                added += 1;
            }
        }
        added
    }

    // ========================================================================
    // Membership operations
    // ========================================================================

    pub(crate) fn fill(&mut self, cx: &mut ViewCx<'_>) {
        let (nodes, edges) = (cx.nodes, cx.edges);
        if self.tracks_nodes {
            let mut changed = false;
            for id in nodes.ids() {
                if self.nodes.set(id.index()) {
                    cx.note(self.id, ElementKind::Node, id, true);
                    changed = true;
                }
            }
            if changed {
                self.version.node.bump();
            }
        }
        let mut changed = false;
        for edge in edges.iter() {
            if self.insert_edge_bit(edge) {
                cx.note(self.id, ElementKind::Edge, edge.store_id(), true);
                changed = true;
            }
        }
        if changed {
            self.version.edge.bump();
        }
        tracing::debug!(view = %self.id, nodes = self.nodes.count_ones(), edges = self.edge_count(), "view filled");
    }

    pub(crate) fn clear(&mut self, cx: &mut ViewCx<'_>) {
        if cx.observers.is_recording(Some(self.id)) {
            for bit in self.nodes.iter_ones() {
                cx.note(self.id, ElementKind::Node, StoreId(bit as u32), false);
            }
            for bit in self.edges.iter_ones() {
                cx.note(self.id, ElementKind::Edge, StoreId(bit as u32), false);
            }
        }
        if !self.nodes.is_empty() {
            self.version.node.bump();
        }
        if !self.edges.is_empty() {
            self.version.edge.bump();
        }
        self.reset();
    }

    pub(crate) fn reset(&mut self) {
        self.nodes.clear_all();
        self.edges.clear_all();
        self.type_counts.clear();
        self.type_mutual.clear();
        self.mutual = 0;
    }

    pub(crate) fn add_node(&mut self, cx: &mut ViewCx<'_>, id: StoreId) -> Result<bool> {
        self.require_nodes()?;
        if !cx.nodes.contains(id) {
            return Err(Error::InvalidStoreId { kind: ElementKind::Node, id });
        }
        if !self.nodes.set(id.index()) {
            return Ok(false);
        }
        cx.note(self.id, ElementKind::Node, id, true);
        self.version.node.bump();
        if self.is_induced() && self.induce_incident(cx, id) > 0 {
            self.version.edge.bump();
        }
        Ok(true)
    }

    pub(crate) fn remove_node(&mut self, cx: &mut ViewCx<'_>, id: StoreId) -> Result<bool> {
        self.require_nodes()?;
        if id.is_null() || !self.nodes.get(id.index()) {
            return Ok(false);
        }
        if self.clear_incident(cx, id) > 0 {
            self.version.edge.bump();
        }
        cx.note(self.id, ElementKind::Node, id, false);
        self.nodes.clear(id.index());
        self.version.node.bump();
        Ok(true)
    }

    pub(crate) fn add_edge(&mut self, cx: &mut ViewCx<'_>, id: StoreId) -> Result<bool> {
        self.require_edges()?;
        let edges = cx.edges;
        let edge = edges.get(id)?;
        if self.tracks_nodes {
            for node in [edge.source(), edge.target()] {
                if !self.nodes.get(node.index()) {
                    return Err(Error::EndpointNotInView { view: self.id, edge: id, node });
                }
            }
        }
        if !self.insert_edge_bit(edge) {
            return Ok(false);
        }
        cx.note(self.id, ElementKind::Edge, id, true);
        self.version.edge.bump();
        Ok(true)
    }

    pub(crate) fn remove_edge(&mut self, cx: &mut ViewCx<'_>, id: StoreId) -> Result<bool> {
        self.require_edges()?;
        let edges = cx.edges;
        let Some(edge) = edges.try_get(id) else { return Ok(false) };
        if !self.remove_edge_bit(edge) {
            return Ok(false);
        }
        cx.note(self.id, ElementKind::Edge, id, false);
        self.version.edge.bump();
        Ok(true)
    }

    // ========================================================================
    // Store events
    // ========================================================================

    /// A live edge is about to leave the store.
    pub(crate) fn edge_leaving(&mut self, cx: &mut ViewCx<'_>, edge: &Edge) {
        if self.remove_edge_bit(edge) {
            cx.note(self.id, ElementKind::Edge, edge.store_id(), false);
            self.version.edge.bump();
        }
    }

    /// A node (already stripped of edges) is about to leave the store.
    pub(crate) fn node_leaving(&mut self, cx: &mut ViewCx<'_>, id: StoreId) {
        if self.tracks_nodes && self.nodes.get(id.index()) {
            cx.note(self.id, ElementKind::Node, id, false);
            self.nodes.clear(id.index());
            self.version.node.bump();
        }
    }

    /// A new edge entered the store. Only induced views pick it up.
    pub(crate) fn edge_arrived(&mut self, cx: &mut ViewCx<'_>, edge: &Edge) {
        if !self.is_induced() {
            return;
        }
        if self.nodes.get(edge.source().index())
            && self.nodes.get(edge.target().index())
            && self.insert_edge_bit(edge)
        {
            cx.note(self.id, ElementKind::Edge, edge.store_id(), true);
            self.version.edge.bump();
        }
    }

    pub(crate) fn pair_formed(&mut self, a: StoreId, b: StoreId, edge_type: EdgeTypeId) {
        if self.contains_edge(a) && self.contains_edge(b) {
            let t = edge_type.index();
            self.grow_types(t);
            self.mutual += 1;
            self.type_mutual[t] += 1;
        }
    }

    pub(crate) fn pair_broken(&mut self, a: StoreId, b: StoreId, edge_type: EdgeTypeId) {
        if self.contains_edge(a) && self.contains_edge(b) {
            let t = edge_type.index();
            self.grow_types(t);
            self.mutual -= 1;
            self.type_mutual[t] -= 1;
        }
    }

    pub(crate) fn edge_retyped(&mut self, id: StoreId, old: EdgeTypeId, new: EdgeTypeId) {
        if self.contains_edge(id) {
            self.grow_types(old.index().max(new.index()));
            self.type_counts[old.index()] -= 1;
            self.type_counts[new.index()] += 1;
            self.version.edge.bump();
        }
    }

    /// Drops bits above the store's high-water marks after block retirement.
    pub(crate) fn shrink_to(&mut self, node_high_water: u32, edge_high_water: u32) {
        self.nodes.truncate(node_high_water as usize);
        self.edges.truncate(edge_high_water as usize);
    }
}

// ============================================================================
// Handles
// ============================================================================

/// Read access to one live view.
#[derive(Clone, Copy)]
pub struct ViewRef<'a> {
    store: &'a GraphStore,
    view: &'a GraphView,
}

impl<'a> ViewRef<'a> {
    pub(crate) fn new(store: &'a GraphStore, view: &'a GraphView) -> Self {
        Self { store, view }
    }

    pub fn id(&self) -> ViewId {
        self.view.id
    }

    pub fn tracks_nodes(&self) -> bool {
        self.view.tracks_nodes
    }

    pub fn tracks_edges(&self) -> bool {
        self.view.tracks_edges
    }

    pub fn contains_node(&self, id: StoreId) -> bool {
        if self.view.tracks_nodes {
            !id.is_null() && self.view.nodes.get(id.index())
        } else {
            self.store.nodes().contains(id)
        }
    }

    pub fn contains_edge(&self, id: StoreId) -> bool {
        self.view.contains_edge(id)
    }

    pub fn node_count(&self) -> usize {
        if self.view.tracks_nodes {
            self.view.nodes.count_ones()
        } else {
            self.store.nodes().len()
        }
    }

    pub fn edge_count(&self) -> usize {
        self.view.edge_count()
    }

    pub fn edge_count_of_type(&self, edge_type: EdgeTypeId) -> usize {
        self.view.edge_count_of_type(edge_type)
    }

    pub fn mutual_edge_count(&self) -> usize {
        self.view.mutual_edge_count()
    }

    pub fn mutual_edge_count_of_type(&self, edge_type: EdgeTypeId) -> usize {
        self.view.mutual_edge_count_of_type(edge_type)
    }

    pub fn undirected_edge_count(&self) -> usize {
        self.view.undirected_edge_count()
    }

    pub fn version(&self) -> GraphVersion {
        self.view.version
    }

    /// Store ids of visible nodes, ascending.
    pub fn nodes(self) -> Box<dyn Iterator<Item = StoreId> + 'a> {
        let (store, view) = (self.store, self.view);
        if view.tracks_nodes {
            Box::new(view.nodes.iter_ones().map(|b| StoreId(b as u32)))
        } else {
            Box::new(store.nodes().ids())
        }
    }

    /// Visible edges, ascending by store id.
    pub fn edges(self) -> impl Iterator<Item = &'a Edge> + 'a {
        let (edges, view) = (self.store.edges(), self.view);
        view.edges.iter_ones().filter_map(move |b| edges.try_get(StoreId(b as u32)))
    }
}

/// Membership changes on one live view. Obtained from
/// [`GraphStore::view_mut`].
pub struct ViewMut<'a> {
    store: &'a mut GraphStore,
    id: ViewId,
}

impl<'a> ViewMut<'a> {
    pub(crate) fn new(store: &'a mut GraphStore, id: ViewId) -> Self {
        Self { store, id }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn read(&self) -> Result<ViewRef<'_>> {
        self.store.view(self.id)
    }

    /// Makes every live node and edge visible.
    pub fn fill(&mut self) -> Result<()> {
        self.store.with_view(self.id, |view, cx| {
            view.fill(cx);
            Ok(())
        })
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.with_view(self.id, |view, cx| {
            view.clear(cx);
            Ok(())
        })
    }

    /// Returns whether the node was newly added. In a node-only view the
    /// induced edges follow.
    pub fn add_node(&mut self, id: StoreId) -> Result<bool> {
        self.store.with_view(self.id, |view, cx| view.add_node(cx, id))
    }

    /// Returns whether the node was present. Its incident edges leave too.
    pub fn remove_node(&mut self, id: StoreId) -> Result<bool> {
        self.store.with_view(self.id, |view, cx| view.remove_node(cx, id))
    }

    pub fn add_edge(&mut self, id: StoreId) -> Result<bool> {
        self.store.with_view(self.id, |view, cx| view.add_edge(cx, id))
    }

    pub fn remove_edge(&mut self, id: StoreId) -> Result<bool> {
        self.store.with_view(self.id, |view, cx| view.remove_edge(cx, id))
    }

    /// Adds everything visible in `other`. Both views must track the same
    /// element kinds. Returns whether anything changed.
    pub fn union(&mut self, other: ViewId) -> Result<bool> {
        if other == self.id {
            self.store.check_view(other)?;
            return Ok(false);
        }
        self.store.with_view_pair(self.id, other, |view, other, cx| view.union(cx, other))
    }

    /// Keeps only what is also visible in `other`.
    pub fn intersection(&mut self, other: ViewId) -> Result<bool> {
        if other == self.id {
            self.store.check_view(other)?;
            return Ok(false);
        }
        self.store.with_view_pair(self.id, other, |view, other, cx| view.intersection(cx, other))
    }

    /// Complements membership against the live store.
    pub fn not(&mut self) -> Result<()> {
        self.store.with_view(self.id, |view, cx| {
            view.not(cx);
            Ok(())
        })
    }

    /// Keeps only the listed nodes (and edges between them).
    pub fn retain_nodes(&mut self, keep: impl IntoIterator<Item = StoreId>) -> Result<bool> {
        let keep = collect_bits(keep);
        self.store.with_view(self.id, |view, cx| view.retain_nodes(cx, &keep))
    }

    pub fn retain_edges(&mut self, keep: impl IntoIterator<Item = StoreId>) -> Result<bool> {
        let keep = collect_bits(keep);
        self.store.with_view(self.id, |view, cx| view.retain_edges(cx, &keep))
    }
}

fn collect_bits(ids: impl IntoIterator<Item = StoreId>) -> BitVector {
    let mut bits = BitVector::new();
    for id in ids.into_iter().filter(|id| !id.is_null()) {
        bits.set(id.index());
    }
    bits
}
