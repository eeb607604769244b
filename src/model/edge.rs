//! Edge record and edge type codes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AttributeSlot, Element, ElementId, ElementKind, Node, StoreId};

/// Small integer code of an edge type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeTypeId(pub u16);

impl EdgeTypeId {
    /// The type every store registers at construction (empty label).
    pub const DEFAULT: EdgeTypeId = EdgeTypeId(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// An edge between two stored nodes.
///
/// Endpoints are node store ids. The adjacency links and the mutual partner
/// are maintained by the edge store and meaningless outside it.
///
/// An edge built with [`Edge::between`], or one that was stored, remembers
/// which store its endpoints came from and is refused by any other store.
/// Edges built from bare store ids are resolved against whichever store
/// receives them.
#[derive(Debug, Clone)]
pub struct Edge {
    id: ElementId,
    store_id: StoreId,
    attributes: AttributeSlot,
    pub(crate) source: StoreId,
    pub(crate) target: StoreId,
    pub(crate) edge_type: EdgeTypeId,
    /// Store tags of the source and target nodes, 0 when unknown.
    pub(crate) endpoint_owners: [u32; 2],
    pub(crate) directed: bool,
    pub(crate) weight: f64,
    /// Store id of the opposite same-type edge, `NULL` when not mutual.
    pub(crate) partner: StoreId,
    pub(crate) next_out: StoreId,
    pub(crate) prev_out: StoreId,
    pub(crate) next_in: StoreId,
    pub(crate) prev_in: StoreId,
}

impl Edge {
    pub fn new(
        id: impl Into<ElementId>,
        source: StoreId,
        target: StoreId,
        edge_type: EdgeTypeId,
        directed: bool,
    ) -> Self {
        Self {
            id: id.into(),
            store_id: StoreId::NULL,
            attributes: AttributeSlot::default(),
            source,
            target,
            edge_type,
            endpoint_owners: [0; 2],
            directed,
            weight: 1.0,
            partner: StoreId::NULL,
            next_out: StoreId::NULL,
            prev_out: StoreId::NULL,
            next_in: StoreId::NULL,
            prev_in: StoreId::NULL,
        }
    }

    pub fn directed(
        id: impl Into<ElementId>,
        source: StoreId,
        target: StoreId,
        edge_type: EdgeTypeId,
    ) -> Self {
        Self::new(id, source, target, edge_type, true)
    }

    pub fn undirected(
        id: impl Into<ElementId>,
        source: StoreId,
        target: StoreId,
        edge_type: EdgeTypeId,
    ) -> Self {
        Self::new(id, source, target, edge_type, false)
    }

    /// Edge between two node records read from a store.
    pub fn between(
        id: impl Into<ElementId>,
        source: &Node,
        target: &Node,
        edge_type: EdgeTypeId,
        directed: bool,
    ) -> Self {
        let mut edge = Self::new(id, source.store_id(), target.store_id(), edge_type, directed);
        edge.endpoint_owners = [source.owner, target.owner];
        edge
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_attributes(mut self, attributes: AttributeSlot) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn source(&self) -> StoreId {
        self.source
    }

    pub fn target(&self) -> StoreId {
        self.target
    }

    pub fn edge_type(&self) -> EdgeTypeId {
        self.edge_type
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn is_mutual(&self) -> bool {
        !self.partner.is_null()
    }

    /// Store id of the mutual partner, if any.
    pub fn partner(&self) -> Option<StoreId> {
        (!self.partner.is_null()).then_some(self.partner)
    }

    /// The endpoint opposite `node`.
    pub fn opposite(&self, node: StoreId) -> Option<StoreId> {
        if node == self.source { Some(self.target) }
        else if node == self.target { Some(self.source) }
        else { None }
    }

    pub(crate) fn reset_links(&mut self) {
        self.partner = StoreId::NULL;
        self.next_out = StoreId::NULL;
        self.prev_out = StoreId::NULL;
        self.next_in = StoreId::NULL;
        self.prev_in = StoreId::NULL;
    }
}

impl Element for Edge {
    const KIND: ElementKind = ElementKind::Edge;

    fn id(&self) -> &ElementId {
        &self.id
    }

    fn store_id(&self) -> StoreId {
        self.store_id
    }

    fn set_store_id(&mut self, id: StoreId) {
        self.store_id = id;
    }

    fn attributes(&self) -> &AttributeSlot {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeSlot {
        &mut self.attributes
    }
}
