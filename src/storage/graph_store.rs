//! The store facade.
//!
//! `GraphStore` owns the node and edge stores, the edge type registry, every
//! view and observer, and the registered listeners. All structural mutation
//! goes through here so views, observers and listeners see each change in the
//! same order:
//!
//! 1. preconditions, with nothing touched on failure
//! 2. views drop what is about to disappear (while it is still live)
//! 3. the element stores change
//! 4. views pick up pair changes and induced edges
//! 5. observers record, listeners are called

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;

use super::adjacency::{AdjacencyCursor, Direction, EdgeCursor, EdgeScan, IncidentEdges, Neighbours, NodeCursor};
use super::edge_store::{EdgeStore, PairChanges};
use super::edge_types::EdgeTypeRegistry;
use super::node_store::NodeStore;
use super::version::GraphVersion;
use super::StoreListener;
use crate::config::StoreConfig;
use crate::model::{AttributeSlot, Edge, EdgeTypeId, Element, ElementId, ElementKind, Node, StoreId};
use crate::observer::{GraphDiff, ObserverId, ObserverRegistry};
use crate::view::{GraphView, ViewCx, ViewId, ViewMut, ViewRef};
use crate::{Error, Result};

static NEXT_STORE_TAG: AtomicU32 = AtomicU32::new(1);

pub struct GraphStore {
    config: StoreConfig,
    tag: u32,
    nodes: NodeStore,
    edges: EdgeStore,
    types: EdgeTypeRegistry,
    views: HashMap<ViewId, GraphView>,
    view_seq: u32,
    observers: ObserverRegistry,
    listeners: Vec<Arc<dyn StoreListener>>,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::build(StoreConfig::default())
    }
}

impl fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphStore")
            .field("tag", &self.tag)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("edge_types", &self.types.len())
            .field("views", &self.views.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl GraphStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: StoreConfig) -> Self {
        let tag = NEXT_STORE_TAG.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            tag,
            block_size = config.block_size,
            parallel_edges = config.parallel_edges,
            "graph store created"
        );
        Self {
            nodes: NodeStore::new(config.block_size, config.node_id_type),
            edges: EdgeStore::new(config.block_size, config.edge_id_type, config.parallel_edges),
            types: EdgeTypeRegistry::new(config.max_edge_types),
            views: HashMap::new(),
            view_seq: 0,
            observers: ObserverRegistry::new(tag),
            listeners: Vec::new(),
            config,
            tag,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    pub fn edges(&self) -> &EdgeStore {
        &self.edges
    }

    pub fn edge_types(&self) -> &EdgeTypeRegistry {
        &self.types
    }

    /// Current node and edge versions of the whole store.
    pub fn version(&self) -> GraphVersion {
        GraphVersion { node: self.nodes.version(), edge: self.edges.version() }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn StoreListener>) {
        self.listeners.push(listener);
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    pub fn add_node(&mut self, mut node: Node) -> Result<StoreId> {
        node.owner = self.tag;
        let id = self.nodes.add(node)?;
        self.node_added(id);
        Ok(id)
    }

    /// Adds a node at a chosen store id. Used to restore a saved id space.
    pub fn add_node_at(&mut self, mut node: Node, id: StoreId) -> Result<StoreId> {
        node.owner = self.tag;
        let id = self.nodes.add_at(node, id)?;
        self.node_added(id);
        Ok(id)
    }

    fn node_added(&mut self, id: StoreId) {
        if let Some(node) = self.nodes.try_get(id) {
            self.observers.record(None, ElementKind::Node, node.id(), true);
            tracing::trace!(store_id = %id, id = %node.id(), "node added");
        }
        for listener in &self.listeners {
            listener.element_added(ElementKind::Node, id);
        }
    }

    /// Removes a node after removing every incident edge.
    pub fn remove_node(&mut self, id: StoreId) -> Result<Node> {
        self.nodes.get(id)?;
        let before = self.high_water();

        let mut cursor = AdjacencyCursor::new(id, Direction::InOut, None);
        while let Some(edge) = cursor.step(&self.nodes, &self.edges) {
            self.remove_edge(edge)?;
        }

        let mut cx = ViewCx { nodes: &self.nodes, edges: &self.edges, observers: &mut self.observers };
        for view in self.views.values_mut() {
            view.node_leaving(&mut cx, id);
        }
        if let Some(node) = self.nodes.try_get(id) {
            self.observers.record(None, ElementKind::Node, node.id(), false);
        }
        let node = self.nodes.remove(id)?;
        tracing::trace!(store_id = %id, id = %node.id(), "node removed");
        for listener in &self.listeners {
            listener.element_removed(ElementKind::Node, id);
        }
        self.shrink_views(before);
        Ok(node)
    }

    pub fn remove_node_by_id(&mut self, id: &ElementId) -> Result<Node> {
        let sid = self.nodes.store_id_of(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        self.remove_node(sid)
    }

    pub fn node(&self, id: StoreId) -> Result<&Node> {
        self.nodes.get(id)
    }

    pub fn node_by_id(&self, id: &ElementId) -> Result<&Node> {
        self.nodes.by_id(id).ok_or_else(|| Error::NodeNotFound(id.clone()))
    }

    pub fn contains_node(&self, id: StoreId) -> bool {
        self.nodes.contains(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_attributes_mut(&mut self, id: StoreId) -> Result<&mut AttributeSlot> {
        Ok(self.nodes.get_mut(id)?.attributes_mut())
    }

    // ========================================================================
    // Edges
    // ========================================================================

    pub fn add_edge(&mut self, edge: Edge) -> Result<StoreId> {
        self.insert_edge(edge, None)
    }

    /// Adds an edge at a chosen store id. Used to restore a saved id space.
    pub fn add_edge_at(&mut self, edge: Edge, id: StoreId) -> Result<StoreId> {
        self.insert_edge(edge, Some(id))
    }

    fn insert_edge(&mut self, mut edge: Edge, at: Option<StoreId>) -> Result<StoreId> {
        self.check_endpoint_owners(&edge)?;
        self.edges.check_insertable(&edge, &self.nodes, &self.types)?;
        if let Some(at) = at {
            self.edges.check_claimable(at)?;
        }
        edge.endpoint_owners = [self.tag; 2];
        let (id, changes) = self.edges.add(edge, at, &mut self.nodes)?;

        let edge = self.edges.get(id)?;
        let mut cx = ViewCx { nodes: &self.nodes, edges: &self.edges, observers: &mut self.observers };
        for view in self.views.values_mut() {
            apply_pair_changes(view, &changes);
            view.edge_arrived(&mut cx, edge);
        }
        self.observers.record(None, ElementKind::Edge, edge.id(), true);
        tracing::trace!(
            store_id = %id,
            id = %edge.id(),
            source = %edge.source(),
            target = %edge.target(),
            edge_type = %edge.edge_type(),
            mutual = edge.is_mutual(),
            "edge added"
        );
        for listener in &self.listeners {
            listener.element_added(ElementKind::Edge, id);
        }
        Ok(id)
    }

    /// Bare store ids always resolve here; only endpoints known to come from
    /// another store are refused.
    fn check_endpoint_owners(&self, edge: &Edge) -> Result<()> {
        let [source, target] = edge.endpoint_owners;
        if source != 0 && source != self.tag {
            return Err(Error::ForeignEndpoint(edge.source()));
        }
        if target != 0 && target != self.tag {
            return Err(Error::ForeignEndpoint(edge.target()));
        }
        Ok(())
    }

    pub fn remove_edge(&mut self, id: StoreId) -> Result<Edge> {
        let edge = self.edges.get(id)?;
        let before = self.high_water();

        let mut cx = ViewCx { nodes: &self.nodes, edges: &self.edges, observers: &mut self.observers };
        for view in self.views.values_mut() {
            view.edge_leaving(&mut cx, edge);
        }
        self.observers.record(None, ElementKind::Edge, edge.id(), false);

        let (edge, changes) = self.edges.remove(id, &mut self.nodes)?;
        // the removed half already left every view, so only re-pairings matter
        for view in self.views.values_mut() {
            for (a, b, t) in changes.formed() {
                view.pair_formed(a, b, t);
            }
        }
        tracing::trace!(store_id = %id, id = %edge.id(), "edge removed");
        for listener in &self.listeners {
            listener.element_removed(ElementKind::Edge, id);
        }
        self.shrink_views(before);
        Ok(edge)
    }

    pub fn remove_edge_by_id(&mut self, id: &ElementId) -> Result<Edge> {
        let sid = self.edges.store_id_of(id).ok_or_else(|| Error::EdgeNotFound(id.clone()))?;
        self.remove_edge(sid)
    }

    pub fn edge(&self, id: StoreId) -> Result<&Edge> {
        self.edges.get(id)
    }

    pub fn edge_by_id(&self, id: &ElementId) -> Result<&Edge> {
        self.edges.by_id(id).ok_or_else(|| Error::EdgeNotFound(id.clone()))
    }

    pub fn contains_edge(&self, id: StoreId) -> bool {
        self.edges.contains(id)
    }

    /// Edge of `edge_type` between `source` and `target`. Undirected edges
    /// match either order; `prefer_directed` breaks ties between a directed
    /// and an undirected match.
    pub fn find_edge(
        &self,
        source: StoreId,
        target: StoreId,
        edge_type: EdgeTypeId,
        prefer_directed: bool,
    ) -> Option<&Edge> {
        self.edges
            .find(source, target, edge_type, prefer_directed)
            .and_then(|id| self.edges.try_get(id))
    }

    /// Moves an edge to another type, re-evaluating mutual pairs under both
    /// types. `Ok(false)` when the type is unchanged.
    pub fn set_edge_type(&mut self, id: StoreId, edge_type: EdgeTypeId) -> Result<bool> {
        let Some((old, changes)) = self.edges.set_type(id, edge_type, &mut self.nodes, &self.types)? else {
            return Ok(false);
        };
        for view in self.views.values_mut() {
            if let Some((a, b, t)) = changes.broken {
                view.pair_broken(a, b, t);
            }
            view.edge_retyped(id, old, edge_type);
            for (a, b, t) in changes.formed() {
                view.pair_formed(a, b, t);
            }
        }
        tracing::trace!(store_id = %id, %old, new = %edge_type, "edge type changed");
        for listener in &self.listeners {
            listener.edge_type_changed(id, old, edge_type);
        }
        Ok(true)
    }

    /// Plain record update; no version change.
    pub fn set_edge_weight(&mut self, id: StoreId, weight: f64) -> Result<()> {
        self.edges.set_weight(id, weight)
    }

    pub fn edge_attributes_mut(&mut self, id: StoreId) -> Result<&mut AttributeSlot> {
        self.edges
            .try_get_mut(id)
            .map(|e| e.attributes_mut())
            .ok_or(Error::InvalidStoreId { kind: ElementKind::Edge, id })
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_count_of_type(&self, edge_type: EdgeTypeId) -> usize {
        self.edges.count_of_type(edge_type)
    }

    /// Edges counting each mutual pair once.
    pub fn undirected_edge_count(&self) -> usize {
        self.edges.len() - self.edges.mutual_pair_count()
    }

    /// Edges stored without a direction.
    pub fn edges_without_direction(&self) -> usize {
        self.edges.undirected_len()
    }

    pub fn mutual_edge_count(&self) -> usize {
        self.edges.mutual_pair_count()
    }

    pub fn self_loop_count(&self) -> usize {
        self.edges.self_loop_count()
    }

    pub fn is_directed(&self) -> bool {
        self.edges.is_directed()
    }

    pub fn is_undirected(&self) -> bool {
        self.edges.is_undirected()
    }

    pub fn is_mixed(&self) -> bool {
        self.edges.is_mixed()
    }

    // ========================================================================
    // Edge types
    // ========================================================================

    pub fn register_edge_type(&mut self, label: &str) -> Result<EdgeTypeId> {
        self.types.register(label)
    }

    pub fn register_edge_type_with_code(&mut self, label: &str, code: EdgeTypeId) -> Result<bool> {
        self.types.register_with_code(label, code)
    }

    /// Releases a label whose type no edge uses any more.
    pub fn remove_edge_type(&mut self, label: &str) -> Result<EdgeTypeId> {
        let code = self
            .types
            .code(label)
            .ok_or_else(|| Error::UnknownEdgeTypeLabel(label.to_owned()))?;
        if code == EdgeTypeId::DEFAULT {
            return Err(Error::TypeConflict("the default edge type cannot be removed".into()));
        }
        let in_use = self.edges.count_of_type(code);
        if in_use > 0 {
            return Err(Error::EdgeTypeInUse(code, in_use));
        }
        self.types.remove(label).ok_or_else(|| Error::UnknownEdgeTypeLabel(label.to_owned()))
    }

    pub fn edge_type_code(&self, label: &str) -> Option<EdgeTypeId> {
        self.types.code(label)
    }

    pub fn edge_type_label(&self, code: EdgeTypeId) -> Option<&str> {
        self.types.label(code)
    }

    // ========================================================================
    // Degrees
    // ========================================================================

    /// In plus out degree. A self-loop counts twice.
    pub fn degree(&self, id: StoreId) -> Result<usize> {
        let node = self.nodes.get(id)?;
        Ok((node.in_degree() + node.out_degree()) as usize)
    }

    /// Degree with each mutual pair counted once.
    pub fn undirected_degree(&self, id: StoreId) -> Result<usize> {
        let node = self.nodes.get(id)?;
        Ok((node.in_degree() + node.out_degree() - node.mutual_degree()) as usize)
    }

    pub fn out_degree(&self, id: StoreId) -> Result<usize> {
        Ok(self.nodes.get(id)?.out_degree() as usize)
    }

    pub fn in_degree(&self, id: StoreId) -> Result<usize> {
        Ok(self.nodes.get(id)?.in_degree() as usize)
    }

    pub fn mutual_degree(&self, id: StoreId) -> Result<usize> {
        Ok(self.nodes.get(id)?.mutual_degree() as usize)
    }

    /// In plus out degree over one type's lists.
    pub fn degree_of_type(&self, id: StoreId, edge_type: EdgeTypeId) -> Result<usize> {
        let out = self.incident(id, Direction::Out, Some(edge_type))?.count();
        let inc = self.incident(id, Direction::In, Some(edge_type))?.count();
        Ok(out + inc)
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    pub fn incident(
        &self,
        id: StoreId,
        direction: Direction,
        edge_type: Option<EdgeTypeId>,
    ) -> Result<IncidentEdges<'_>> {
        let cursor = self.adjacency_cursor(id, direction, edge_type)?;
        Ok(IncidentEdges::new(cursor, &self.nodes, &self.edges))
    }

    pub fn neighbours(
        &self,
        id: StoreId,
        direction: Direction,
        edge_type: Option<EdgeTypeId>,
    ) -> Result<Neighbours<'_>> {
        Ok(Neighbours::new(self.incident(id, direction, edge_type)?))
    }

    /// Every edge, with each mutual pair yielded once.
    pub fn undirected_edges(&self) -> EdgeScan<'_> {
        EdgeScan::new(EdgeCursor::undirected(), &self.edges)
    }

    pub fn adjacency_cursor(
        &self,
        id: StoreId,
        direction: Direction,
        edge_type: Option<EdgeTypeId>,
    ) -> Result<AdjacencyCursor> {
        self.nodes.get(id)?;
        Ok(AdjacencyCursor::new(id, direction, edge_type))
    }

    pub fn node_cursor(&self) -> NodeCursor {
        NodeCursor::new()
    }

    pub fn edge_cursor(&self) -> EdgeCursor {
        EdgeCursor::new()
    }

    // ========================================================================
    // Whole store
    // ========================================================================

    /// Removes every element. Views stay alive and become empty.
    pub fn clear(&mut self) {
        let mut cx = ViewCx { nodes: &self.nodes, edges: &self.edges, observers: &mut self.observers };
        for view in self.views.values_mut() {
            view.clear(&mut cx);
        }
        if self.observers.is_recording(None) {
            for edge in self.edges.iter() {
                self.observers.record(None, ElementKind::Edge, edge.id(), false);
            }
            for node in self.nodes.iter() {
                self.observers.record(None, ElementKind::Node, node.id(), false);
            }
        }
        let removed: Vec<_> = if self.listeners.is_empty() {
            Vec::new()
        } else {
            self.edges
                .ids()
                .map(|id| (ElementKind::Edge, id))
                .chain(self.nodes.ids().map(|id| (ElementKind::Node, id)))
                .collect()
        };
        tracing::debug!(tag = self.tag, nodes = self.nodes.len(), edges = self.edges.len(), "graph store cleared");
        self.edges.clear();
        self.nodes.clear();
        for (kind, id) in removed {
            for listener in &self.listeners {
                listener.element_removed(kind, id);
            }
        }
    }

    fn high_water(&self) -> (u32, u32) {
        (self.nodes.high_water(), self.edges.high_water())
    }

    fn shrink_views(&mut self, before: (u32, u32)) {
        let (nodes, edges) = self.high_water();
        if nodes < before.0 || edges < before.1 {
            for view in self.views.values_mut() {
                view.shrink_to(nodes, edges);
            }
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Creates an empty view. At least one element kind must be tracked.
    pub fn create_view(&mut self, tracks_nodes: bool, tracks_edges: bool) -> Result<ViewId> {
        if !tracks_nodes && !tracks_edges {
            return Err(Error::InvalidViewOperation("a view must track nodes or edges".into()));
        }
        let id = ViewId { store: self.tag, seq: self.view_seq };
        self.view_seq = self
            .view_seq
            .checked_add(1)
            .ok_or_else(|| Error::CapacityExhausted("view ids".into()))?;
        self.views.insert(id, GraphView::new(id, tracks_nodes, tracks_edges));
        tracing::debug!(view = %id, tracks_nodes, tracks_edges, "view created");
        Ok(id)
    }

    /// Destroys a view and every observer attached to it.
    pub fn destroy_view(&mut self, id: ViewId) -> Result<()> {
        self.check_view(id)?;
        self.views.remove(&id);
        let observers = self.observers.destroy_for_view(id);
        tracing::debug!(view = %id, observers, "view destroyed");
        for listener in &self.listeners {
            listener.view_destroyed(id);
        }
        Ok(())
    }

    pub fn view(&self, id: ViewId) -> Result<ViewRef<'_>> {
        self.check_view(id)?;
        let view = self.views.get(&id).ok_or(Error::ViewDestroyed(id))?;
        Ok(ViewRef::new(self, view))
    }

    pub fn view_mut(&mut self, id: ViewId) -> Result<ViewMut<'_>> {
        self.check_view(id)?;
        Ok(ViewMut::new(self, id))
    }

    pub fn view_ids(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.views.keys().copied()
    }

    pub(crate) fn check_view(&self, id: ViewId) -> Result<()> {
        if id.store != self.tag {
            return Err(Error::ForeignView(id));
        }
        if !self.views.contains_key(&id) {
            return Err(Error::ViewDestroyed(id));
        }
        Ok(())
    }

    pub(crate) fn with_view<R>(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut GraphView, &mut ViewCx<'_>) -> Result<R>,
    ) -> Result<R> {
        self.check_view(id)?;
        let view = self.views.get_mut(&id).ok_or(Error::ViewDestroyed(id))?;
        let mut cx = ViewCx { nodes: &self.nodes, edges: &self.edges, observers: &mut self.observers };
        f(view, &mut cx)
    }

    /// Runs `f` on view `id` with read access to a different view `other`.
    pub(crate) fn with_view_pair<R>(
        &mut self,
        id: ViewId,
        other: ViewId,
        f: impl FnOnce(&mut GraphView, &GraphView, &mut ViewCx<'_>) -> Result<R>,
    ) -> Result<R> {
        self.check_view(id)?;
        self.check_view(other)?;
        let mut target = self.views.remove(&id).ok_or(Error::ViewDestroyed(id))?;
        let result = match self.views.get(&other) {
            Some(other) => {
                let mut cx = ViewCx { nodes: &self.nodes, edges: &self.edges, observers: &mut self.observers };
                f(&mut target, other, &mut cx)
            }
            None => Err(Error::ViewDestroyed(other)),
        };
        self.views.insert(id, target);
        result
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Observes the whole store (`None`) or one view.
    pub fn create_observer(&mut self, target: Option<ViewId>, record_diffs: bool) -> Result<ObserverId> {
        let seen = self.target_version(target)?;
        self.observers.create(target, seen, record_diffs)
    }

    /// Whether the target changed since the last call (or creation).
    pub fn has_changed(&self, id: ObserverId) -> Result<bool> {
        let target = self.observers.target(id)?;
        let current = self.target_version(target)?;
        self.observers.has_changed(id, current)
    }

    /// Net additions and removals since the last call.
    pub fn diff(&self, id: ObserverId) -> Result<GraphDiff> {
        self.observers.diff(id)
    }

    pub fn destroy_observer(&mut self, id: ObserverId) -> Result<()> {
        self.observers.destroy(id)
    }

    fn target_version(&self, target: Option<ViewId>) -> Result<GraphVersion> {
        match target {
            None => Ok(self.version()),
            Some(view) => {
                self.check_view(view)?;
                self.views.get(&view).map(|v| v.version()).ok_or(Error::ViewDestroyed(view))
            }
        }
    }
}

fn apply_pair_changes(view: &mut GraphView, changes: &PairChanges) {
    if let Some((a, b, t)) = changes.broken {
        view.pair_broken(a, b, t);
    }
    for (a, b, t) in changes.formed() {
        view.pair_formed(a, b, t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_nodes(n: i64) -> (GraphStore, Vec<StoreId>) {
        let mut store = GraphStore::default();
        let ids = (0..n).map(|i| store.add_node(Node::new(i)).unwrap()).collect();
        (store, ids)
    }

    #[test]
    fn test_remove_node_detaches_edges() {
        let (mut store, n) = store_with_nodes(3);
        let t = EdgeTypeId::DEFAULT;
        store.add_edge(Edge::directed(0, n[0], n[1], t)).unwrap();
        store.add_edge(Edge::directed(1, n[1], n[0], t)).unwrap();
        store.add_edge(Edge::undirected(2, n[1], n[2], t)).unwrap();
        store.add_edge(Edge::directed(3, n[1], n[1], t)).unwrap();
        assert_eq!(store.degree(n[1]).unwrap(), 5);

        store.remove_node(n[1]).unwrap();
        assert_eq!(store.edge_count(), 0);
        assert_eq!(store.mutual_edge_count(), 0);
        assert_eq!(store.self_loop_count(), 0);
        assert_eq!(store.degree(n[0]).unwrap(), 0);
        assert_eq!(store.degree(n[2]).unwrap(), 0);
        assert!(store.is_directed());
    }

    #[test]
    fn test_failed_add_leaves_no_trace() {
        let (mut store, n) = store_with_nodes(2);
        let before = store.version();
        let err = store.add_edge(Edge::directed(0, n[0], StoreId(9), EdgeTypeId::DEFAULT));
        assert_eq!(err, Err(Error::MissingEndpoint(StoreId(9))));
        let err = store.add_edge(Edge::directed(0, n[0], n[1], EdgeTypeId(7)));
        assert_eq!(err, Err(Error::UnknownEdgeType(EdgeTypeId(7))));
        assert_eq!(store.version(), before);
        assert_eq!(store.edges().high_water(), 0);
    }

    #[test]
    fn test_remove_edge_type_in_use() {
        let (mut store, n) = store_with_nodes(2);
        let knows = store.register_edge_type("KNOWS").unwrap();
        let e = store.add_edge(Edge::directed(0, n[0], n[1], knows)).unwrap();
        assert_eq!(store.remove_edge_type("KNOWS"), Err(Error::EdgeTypeInUse(knows, 1)));
        store.remove_edge(e).unwrap();
        assert_eq!(store.remove_edge_type("KNOWS"), Ok(knows));
        assert!(store.remove_edge_type("").is_err());
    }

    #[test]
    fn test_degree_of_type() {
        let (mut store, n) = store_with_nodes(2);
        let a = store.register_edge_type("A").unwrap();
        store.add_edge(Edge::directed(0, n[0], n[1], a)).unwrap();
        store.add_edge(Edge::directed(1, n[0], n[0], a)).unwrap();
        store.add_edge(Edge::directed(2, n[0], n[1], EdgeTypeId::DEFAULT)).unwrap();
        assert_eq!(store.degree_of_type(n[0], a).unwrap(), 3);
        assert_eq!(store.degree(n[0]).unwrap(), 4);
    }
}
