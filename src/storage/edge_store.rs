//! Edge store: arena, intrusive per-type adjacency, existence index and
//! mutual-edge bookkeeping.
//!
//! Adjacency is index based. Each node holds, per edge type, the head of an
//! outgoing and an incoming doubly linked list; the links are store ids kept
//! on the edge records themselves, so linking and unlinking are O(1) and never
//! allocate per node.
//!
//! Every method that changes a pairing goes through [`EdgeStore::settle_pair`]
//! or [`EdgeStore::break_pair`], which keep the per-node mutual degrees and
//! the per-type pair counts in step.

use hashbrown::HashMap;
use smallvec::SmallVec;

use super::allocator::IdSpaceSnapshot;
use super::arena::ElementArena;
use super::edge_types::EdgeTypeRegistry;
use super::node_store::NodeStore;
use super::version::Version;
use crate::model::node::head_slot;
use crate::model::{Edge, EdgeTypeId, ElementId, IdType, StoreId};
use crate::{Error, Result};

/// Existence index key. Undirected edges use the canonical `(min, max)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EdgeKey {
    low: u32,
    high: u32,
    edge_type: u16,
    directed: bool,
}

impl EdgeKey {
    pub(crate) fn directed(source: StoreId, target: StoreId, edge_type: EdgeTypeId) -> Self {
        Self { low: source.0, high: target.0, edge_type: edge_type.0, directed: true }
    }

    pub(crate) fn undirected(a: StoreId, b: StoreId, edge_type: EdgeTypeId) -> Self {
        Self { low: a.0.min(b.0), high: a.0.max(b.0), edge_type: edge_type.0, directed: false }
    }

    pub(crate) fn of(edge: &Edge) -> Self {
        if edge.directed {
            Self::directed(edge.source, edge.target, edge.edge_type)
        } else {
            Self::undirected(edge.source, edge.target, edge.edge_type)
        }
    }

    fn reversed(self) -> Self {
        debug_assert!(self.directed);
        Self { low: self.high, high: self.low, ..self }
    }
}

type Bucket = SmallVec<[StoreId; 1]>;

/// Pairing changes caused by one mutation, for views to mirror.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PairChanges {
    /// Pair dissolved by the mutation, with the type it had.
    pub broken: Option<(StoreId, StoreId, EdgeTypeId)>,
    /// Pairs formed by the mutation.
    pub formed: [Option<(StoreId, StoreId, EdgeTypeId)>; 2],
}

impl PairChanges {
    fn push_formed(&mut self, pair: Option<(StoreId, StoreId, EdgeTypeId)>) {
        if pair.is_none() {
            return;
        }
        if self.formed[0].is_none() {
            self.formed[0] = pair;
        } else {
            self.formed[1] = pair;
        }
    }

    pub(crate) fn formed(&self) -> impl Iterator<Item = (StoreId, StoreId, EdgeTypeId)> + '_ {
        self.formed.iter().flatten().copied()
    }
}

#[derive(Debug, Clone)]
pub struct EdgeStore {
    arena: ElementArena<Edge>,
    index: HashMap<EdgeKey, Bucket>,
    type_counts: Vec<u32>,
    type_mutual: Vec<u32>,
    undirected: usize,
    self_loops: usize,
    mutual_pairs: usize,
    parallel: bool,
}

impl EdgeStore {
    pub fn new(block_size: usize, id_type: IdType, parallel: bool) -> Self {
        Self {
            arena: ElementArena::new(block_size, id_type),
            index: HashMap::new(),
            type_counts: Vec::new(),
            type_mutual: Vec::new(),
            undirected: 0,
            self_loops: 0,
            mutual_pairs: 0,
            parallel,
        }
    }

    // ========================================================================
    // Preconditions
    // ========================================================================

    /// Everything `add` rejects, checked before any state changes.
    pub(crate) fn check_insertable(
        &self,
        edge: &Edge,
        nodes: &NodeStore,
        types: &EdgeTypeRegistry,
    ) -> Result<()> {
        self.arena.check_insertable(edge)?;
        if !nodes.contains(edge.source) {
            return Err(Error::MissingEndpoint(edge.source));
        }
        if !nodes.contains(edge.target) {
            return Err(Error::MissingEndpoint(edge.target));
        }
        if !types.contains(edge.edge_type) {
            return Err(Error::UnknownEdgeType(edge.edge_type));
        }
        if !self.parallel && self.index.contains_key(&EdgeKey::of(edge)) {
            return Err(Error::EdgeExists {
                from: edge.source,
                to: edge.target,
                edge_type: edge.edge_type,
            });
        }
        Ok(())
    }

    pub(crate) fn check_claimable(&self, id: StoreId) -> Result<()> {
        self.arena.check_claimable(id)
    }

    // ========================================================================
    // Add / remove
    // ========================================================================

    /// Adds an edge that passed `check_insertable`.
    pub(crate) fn add(
        &mut self,
        edge: Edge,
        at: Option<StoreId>,
        nodes: &mut NodeStore,
    ) -> Result<(StoreId, PairChanges)> {
        let mut edge = edge;
        edge.reset_links();
        let id = match at {
            Some(at) => self.arena.insert_at(edge, at)?,
            None => self.arena.insert(edge)?,
        };
        self.link(id, nodes);
        self.index_insert(id);
        self.count(id, 1);
        let mut changes = PairChanges::default();
        changes.push_formed(self.settle_pair(id, nodes));
        Ok((id, changes))
    }

    /// Removes a live edge. A partner left unpaired is settled again, which
    /// only finds a new partner when parallel edges are enabled.
    pub(crate) fn remove(&mut self, id: StoreId, nodes: &mut NodeStore) -> Result<(Edge, PairChanges)> {
        self.arena.get(id)?;
        let mut changes = PairChanges::default();
        changes.broken = self.break_pair(id, nodes);
        self.unlink(id, nodes);
        self.index_remove(id);
        self.count(id, -1);
        let edge = self.arena.remove(id)?;
        if let Some((_, orphan, _)) = changes.broken {
            changes.push_formed(self.settle_pair(orphan, nodes));
        }
        Ok((edge, changes))
    }

    /// Moves an edge to another type. `Ok(None)` when the type is unchanged.
    pub(crate) fn set_type(
        &mut self,
        id: StoreId,
        new_type: EdgeTypeId,
        nodes: &mut NodeStore,
        types: &EdgeTypeRegistry,
    ) -> Result<Option<(EdgeTypeId, PairChanges)>> {
        let edge = self.arena.get(id)?;
        let old_type = edge.edge_type;
        if old_type == new_type {
            return Ok(None);
        }
        if !types.contains(new_type) {
            return Err(Error::UnknownEdgeType(new_type));
        }
        let new_key = EdgeKey { edge_type: new_type.0, ..EdgeKey::of(edge) };
        if !self.parallel && self.index.contains_key(&new_key) {
            return Err(Error::EdgeExists { from: edge.source, to: edge.target, edge_type: new_type });
        }

        let mut changes = PairChanges::default();
        changes.broken = self.break_pair(id, nodes);
        self.unlink(id, nodes);
        self.index_remove(id);
        self.count(id, -1);
        self.arena.get_mut(id)?.edge_type = new_type;
        self.link(id, nodes);
        self.index_insert(id);
        self.count(id, 1);
        changes.push_formed(self.settle_pair(id, nodes));
        if let Some((_, orphan, _)) = changes.broken {
            changes.push_formed(self.settle_pair(orphan, nodes));
        }
        self.arena.bump_version();
        Ok(Some((old_type, changes)))
    }

    pub(crate) fn set_weight(&mut self, id: StoreId, weight: f64) -> Result<()> {
        self.arena.get_mut(id)?.weight = weight;
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.index.clear();
        self.type_counts.clear();
        self.type_mutual.clear();
        self.undirected = 0;
        self.self_loops = 0;
        self.mutual_pairs = 0;
    }

    // ========================================================================
    // Mutual pairs
    // ========================================================================

    /// Pairs `id` with an unpaired opposite same-type edge, if there is one.
    pub(crate) fn settle_pair(
        &mut self,
        id: StoreId,
        nodes: &mut NodeStore,
    ) -> Option<(StoreId, StoreId, EdgeTypeId)> {
        let edge = self.arena.try_get(id)?;
        if !edge.directed || edge.is_self_loop() || edge.is_mutual() {
            return None;
        }
        let (source, target, edge_type) = (edge.source, edge.target, edge.edge_type);
        let reverse = EdgeKey::directed(source, target, edge_type).reversed();
        let partner = self
            .index
            .get(&reverse)?
            .iter()
            .copied()
            .find(|p| self.arena.try_get(*p).is_some_and(|e| !e.is_mutual()))?;

        if let Some(e) = self.arena.try_get_mut(id) {
            e.partner = partner;
        }
        if let Some(p) = self.arena.try_get_mut(partner) {
            p.partner = id;
        }
        for n in [source, target] {
            if let Some(node) = nodes.try_get_mut(n) {
                node.mutual_degree += 1;
            }
        }
        self.mutual_pairs += 1;
        self.type_mutual[edge_type.index()] += 1;
        Some((id, partner, edge_type))
    }

    /// Dissolves the pair `id` belongs to. Returns `(id, former partner, type)`.
    pub(crate) fn break_pair(
        &mut self,
        id: StoreId,
        nodes: &mut NodeStore,
    ) -> Option<(StoreId, StoreId, EdgeTypeId)> {
        let edge = self.arena.try_get_mut(id)?;
        let partner = edge.partner()?;
        edge.partner = StoreId::NULL;
        let (source, target, edge_type) = (edge.source, edge.target, edge.edge_type);
        if let Some(p) = self.arena.try_get_mut(partner) {
            p.partner = StoreId::NULL;
        }
        for n in [source, target] {
            if let Some(node) = nodes.try_get_mut(n) {
                node.mutual_degree -= 1;
            }
        }
        self.mutual_pairs -= 1;
        self.type_mutual[edge_type.index()] -= 1;
        Some((id, partner, edge_type))
    }

    // ========================================================================
    // Linking
    // ========================================================================

    fn link(&mut self, id: StoreId, nodes: &mut NodeStore) {
        let Some(edge) = self.arena.try_get(id) else { return };
        let (source, target, edge_type) = (edge.source, edge.target, edge.edge_type);

        let old_out = nodes.try_get_mut(source).map(|n| {
            let slot = head_slot(&mut n.head_out, edge_type);
            let old = *slot;
            *slot = id;
            n.out_degree += 1;
            old
        });
        let old_in = nodes.try_get_mut(target).map(|n| {
            let slot = head_slot(&mut n.head_in, edge_type);
            let old = *slot;
            *slot = id;
            n.in_degree += 1;
            old
        });
        let old_out = old_out.unwrap_or(StoreId::NULL);
        let old_in = old_in.unwrap_or(StoreId::NULL);

        if let Some(e) = self.arena.try_get_mut(id) {
            e.next_out = old_out;
            e.prev_out = StoreId::NULL;
            e.next_in = old_in;
            e.prev_in = StoreId::NULL;
        }
        if let Some(next) = self.arena.try_get_mut(old_out) {
            next.prev_out = id;
        }
        if let Some(next) = self.arena.try_get_mut(old_in) {
            next.prev_in = id;
        }
    }

    fn unlink(&mut self, id: StoreId, nodes: &mut NodeStore) {
        let Some(e) = self.arena.try_get(id) else { return };
        let (source, target, edge_type) = (e.source, e.target, e.edge_type);
        let (next_out, prev_out, next_in, prev_in) = (e.next_out, e.prev_out, e.next_in, e.prev_in);

        match self.arena.try_get_mut(prev_out) {
            Some(prev) => prev.next_out = next_out,
            None => {
                if let Some(n) = nodes.try_get_mut(source) {
                    *head_slot(&mut n.head_out, edge_type) = next_out;
                }
            }
        }
        if let Some(next) = self.arena.try_get_mut(next_out) {
            next.prev_out = prev_out;
        }
        match self.arena.try_get_mut(prev_in) {
            Some(prev) => prev.next_in = next_in,
            None => {
                if let Some(n) = nodes.try_get_mut(target) {
                    *head_slot(&mut n.head_in, edge_type) = next_in;
                }
            }
        }
        if let Some(next) = self.arena.try_get_mut(next_in) {
            next.prev_in = prev_in;
        }
        if let Some(n) = nodes.try_get_mut(source) {
            n.out_degree -= 1;
        }
        if let Some(n) = nodes.try_get_mut(target) {
            n.in_degree -= 1;
        }
        if let Some(e) = self.arena.try_get_mut(id) {
            e.next_out = StoreId::NULL;
            e.prev_out = StoreId::NULL;
            e.next_in = StoreId::NULL;
            e.prev_in = StoreId::NULL;
        }
    }

    fn index_insert(&mut self, id: StoreId) {
        if let Some(edge) = self.arena.try_get(id) {
            self.index.entry(EdgeKey::of(edge)).or_default().push(id);
        }
    }

    fn index_remove(&mut self, id: StoreId) {
        let Some(edge) = self.arena.try_get(id) else { return };
        let key = EdgeKey::of(edge);
        if let Some(bucket) = self.index.get_mut(&key) {
            bucket.retain(|e| *e != id);
            if bucket.is_empty() {
                self.index.remove(&key);
            }
        }
    }

    fn count(&mut self, id: StoreId, delta: i32) {
        let Some(edge) = self.arena.try_get(id) else { return };
        let (directed, self_loop, t) = (edge.directed, edge.is_self_loop(), edge.edge_type.index());
        if self.type_counts.len() <= t {
            self.type_counts.resize(t + 1, 0);
            self.type_mutual.resize(t + 1, 0);
        }
        let apply = |v: usize| if delta > 0 { v + 1 } else { v - 1 };
        self.type_counts[t] = apply(self.type_counts[t] as usize) as u32;
        if !directed {
            self.undirected = apply(self.undirected);
        }
        if self_loop {
            self.self_loops = apply(self.self_loops);
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[inline]
    pub fn get(&self, id: StoreId) -> Result<&Edge> {
        self.arena.get(id)
    }

    #[inline]
    pub fn try_get(&self, id: StoreId) -> Option<&Edge> {
        self.arena.try_get(id)
    }

    #[inline]
    pub(crate) fn try_get_mut(&mut self, id: StoreId) -> Option<&mut Edge> {
        self.arena.try_get_mut(id)
    }

    #[inline]
    pub fn contains(&self, id: StoreId) -> bool {
        self.arena.contains(id)
    }

    pub fn by_id(&self, id: &ElementId) -> Option<&Edge> {
        self.arena.by_id(id)
    }

    pub fn store_id_of(&self, id: &ElementId) -> Option<StoreId> {
        self.arena.store_id_of(id)
    }

    pub fn contains_id(&self, id: &ElementId) -> bool {
        self.arena.contains_id(id)
    }

    /// Edge of `edge_type` between `source` and `target`. Undirected edges
    /// match either endpoint order. `prefer_directed` picks which class wins
    /// when both exist.
    pub fn find(
        &self,
        source: StoreId,
        target: StoreId,
        edge_type: EdgeTypeId,
        prefer_directed: bool,
    ) -> Option<StoreId> {
        let first = |key: EdgeKey| self.index.get(&key).and_then(|b| b.first().copied());
        let directed = || first(EdgeKey::directed(source, target, edge_type));
        let undirected = || first(EdgeKey::undirected(source, target, edge_type));
        if prefer_directed {
            directed().or_else(undirected)
        } else {
            undirected().or_else(directed)
        }
    }

    /// Every edge of one direction class between the endpoints (several only
    /// when parallel edges are enabled).
    pub fn find_all(
        &self,
        source: StoreId,
        target: StoreId,
        edge_type: EdgeTypeId,
        directed: bool,
    ) -> &[StoreId] {
        let key = if directed {
            EdgeKey::directed(source, target, edge_type)
        } else {
            EdgeKey::undirected(source, target, edge_type)
        };
        self.index.get(&key).map(|b| b.as_slice()).unwrap_or(&[])
    }

    // ========================================================================
    // Counters
    // ========================================================================

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn undirected_len(&self) -> usize {
        self.undirected
    }

    pub fn self_loop_count(&self) -> usize {
        self.self_loops
    }

    pub fn mutual_pair_count(&self) -> usize {
        self.mutual_pairs
    }

    pub fn count_of_type(&self, edge_type: EdgeTypeId) -> usize {
        self.type_counts.get(edge_type.index()).copied().unwrap_or(0) as usize
    }

    pub fn mutual_pairs_of_type(&self, edge_type: EdgeTypeId) -> usize {
        self.type_mutual.get(edge_type.index()).copied().unwrap_or(0) as usize
    }

    pub fn is_directed(&self) -> bool {
        self.undirected == 0
    }

    pub fn is_undirected(&self) -> bool {
        self.len() > 0 && self.undirected == self.len()
    }

    pub fn is_mixed(&self) -> bool {
        self.undirected > 0 && self.undirected != self.len()
    }

    pub fn parallel_edges(&self) -> bool {
        self.parallel
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

    pub fn iter(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.arena.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = StoreId> + '_ {
        self.arena.ids()
    }

    pub(crate) fn next_live(&self, from: u32) -> Option<StoreId> {
        self.arena.next_live(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    fn setup(n: i64) -> (NodeStore, EdgeStore, EdgeTypeRegistry) {
        let mut nodes = NodeStore::new(16, IdType::Integer);
        for i in 0..n {
            nodes.add(Node::new(i)).unwrap();
        }
        (nodes, EdgeStore::new(16, IdType::Integer, false), EdgeTypeRegistry::new(16))
    }

    fn add(
        edges: &mut EdgeStore,
        nodes: &mut NodeStore,
        types: &EdgeTypeRegistry,
        edge: Edge,
    ) -> Result<StoreId> {
        edges.check_insertable(&edge, nodes, types)?;
        Ok(edges.add(edge, None, nodes)?.0)
    }

    #[test]
    fn test_link_and_unlink_keep_lists_consistent() {
        let (mut nodes, mut edges, types) = setup(3);
        let t = EdgeTypeId::DEFAULT;
        let a = add(&mut edges, &mut nodes, &types, Edge::directed(0, StoreId(0), StoreId(1), t)).unwrap();
        let b = add(&mut edges, &mut nodes, &types, Edge::directed(1, StoreId(0), StoreId(2), t)).unwrap();
        let c = add(&mut edges, &mut nodes, &types, Edge::directed(2, StoreId(0), StoreId(0), t)).unwrap();

        let n0 = nodes.get(StoreId(0)).unwrap();
        assert_eq!(n0.out_degree(), 3);
        assert_eq!(n0.in_degree(), 1);
        assert_eq!(n0.head_out(t), c);

        edges.remove(b, &mut nodes).unwrap();
        assert_eq!(edges.get(c).unwrap().next_out, a);
        assert_eq!(edges.get(a).unwrap().prev_out, c);
        edges.remove(c, &mut nodes).unwrap();
        assert_eq!(nodes.get(StoreId(0)).unwrap().head_out(t), a);
        assert_eq!(nodes.get(StoreId(0)).unwrap().head_in(t), StoreId::NULL);
        assert_eq!(edges.self_loop_count(), 0);
    }

    #[test]
    fn test_duplicate_rejected_unless_parallel() {
        let (mut nodes, mut edges, types) = setup(2);
        let t = EdgeTypeId::DEFAULT;
        add(&mut edges, &mut nodes, &types, Edge::undirected(0, StoreId(0), StoreId(1), t)).unwrap();
        let err = add(&mut edges, &mut nodes, &types, Edge::undirected(1, StoreId(1), StoreId(0), t));
        assert!(matches!(err, Err(Error::EdgeExists { .. })));
        // a directed edge is a different direction class
        add(&mut edges, &mut nodes, &types, Edge::directed(2, StoreId(0), StoreId(1), t)).unwrap();

        let (mut nodes, _, types) = setup(2);
        let mut parallel = EdgeStore::new(16, IdType::Integer, true);
        add(&mut parallel, &mut nodes, &types, Edge::directed(3, StoreId(0), StoreId(1), t)).unwrap();
        add(&mut parallel, &mut nodes, &types, Edge::directed(4, StoreId(0), StoreId(1), t)).unwrap();
        assert_eq!(parallel.find_all(StoreId(0), StoreId(1), t, true).len(), 2);
        assert_eq!(nodes.get(StoreId(0)).unwrap().out_degree(), 2);
    }

    #[test]
    fn test_mutual_pair_bookkeeping() {
        let (mut nodes, mut edges, types) = setup(2);
        let t = EdgeTypeId::DEFAULT;
        let ab = add(&mut edges, &mut nodes, &types, Edge::directed(0, StoreId(0), StoreId(1), t)).unwrap();
        let ba = add(&mut edges, &mut nodes, &types, Edge::directed(1, StoreId(1), StoreId(0), t)).unwrap();
        assert_eq!(edges.get(ab).unwrap().partner(), Some(ba));
        assert_eq!(edges.mutual_pair_count(), 1);
        assert_eq!(nodes.get(StoreId(0)).unwrap().mutual_degree(), 1);

        let (_, changes) = edges.remove(ba, &mut nodes).unwrap();
        assert_eq!(changes.broken, Some((ba, ab, t)));
        assert!(!edges.get(ab).unwrap().is_mutual());
        assert_eq!(nodes.get(StoreId(1)).unwrap().mutual_degree(), 0);
        assert_eq!(edges.mutual_pair_count(), 0);
    }

    #[test]
    fn test_parallel_orphan_is_repaired() {
        let (mut nodes, _, types) = setup(2);
        let mut edges = EdgeStore::new(16, IdType::Integer, true);
        let t = EdgeTypeId::DEFAULT;
        let ab1 = add(&mut edges, &mut nodes, &types, Edge::directed(0, StoreId(0), StoreId(1), t)).unwrap();
        let ab2 = add(&mut edges, &mut nodes, &types, Edge::directed(1, StoreId(0), StoreId(1), t)).unwrap();
        let ba = add(&mut edges, &mut nodes, &types, Edge::directed(2, StoreId(1), StoreId(0), t)).unwrap();
        let partner = edges.get(ba).unwrap().partner().unwrap();
        let other = if partner == ab1 { ab2 } else { ab1 };

        let (_, changes) = edges.remove(partner, &mut nodes).unwrap();
        assert_eq!(changes.formed().collect::<Vec<_>>(), vec![(ba, other, t)]);
        assert_eq!(edges.get(other).unwrap().partner(), Some(ba));
        assert_eq!(edges.mutual_pair_count(), 1);
    }

    #[test]
    fn test_shape_queries() {
        let (mut nodes, mut edges, types) = setup(3);
        let t = EdgeTypeId::DEFAULT;
        assert!(edges.is_directed());
        assert!(!edges.is_undirected());
        add(&mut edges, &mut nodes, &types, Edge::undirected(0, StoreId(0), StoreId(1), t)).unwrap();
        assert!(edges.is_undirected());
        add(&mut edges, &mut nodes, &types, Edge::directed(1, StoreId(1), StoreId(2), t)).unwrap();
        assert!(edges.is_mixed());
        assert!(!edges.is_directed());
    }
}
