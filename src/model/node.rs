//! Node record.

use smallvec::SmallVec;

use super::{AttributeSlot, EdgeTypeId, Element, ElementId, ElementKind, StoreId};

/// Per-type list heads. Most graphs use a handful of edge types.
pub(crate) type Heads = SmallVec<[StoreId; 4]>;

/// A node in the graph.
///
/// Besides its ids and attribute slot a node carries the heads of its
/// per-type adjacency lists and its running degree counters. Those are owned
/// by the edge store and reset whenever the node is added.
#[derive(Debug, Clone)]
pub struct Node {
    id: ElementId,
    store_id: StoreId,
    attributes: AttributeSlot,
    pub(crate) head_out: Heads,
    pub(crate) head_in: Heads,
    pub(crate) out_degree: u32,
    pub(crate) in_degree: u32,
    pub(crate) mutual_degree: u32,
    /// Tag of the store holding the node, 0 while unstored.
    pub(crate) owner: u32,
}

impl Node {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            store_id: StoreId::NULL,
            attributes: AttributeSlot::default(),
            head_out: Heads::new(),
            head_in: Heads::new(),
            out_degree: 0,
            in_degree: 0,
            mutual_degree: 0,
            owner: 0,
        }
    }

    pub fn with_attributes(mut self, attributes: AttributeSlot) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn out_degree(&self) -> u32 {
        self.out_degree
    }

    pub fn in_degree(&self) -> u32 {
        self.in_degree
    }

    pub fn mutual_degree(&self) -> u32 {
        self.mutual_degree
    }

    pub(crate) fn head_out(&self, edge_type: EdgeTypeId) -> StoreId {
        self.head_out.get(edge_type.index()).copied().unwrap_or(StoreId::NULL)
    }

    pub(crate) fn head_in(&self, edge_type: EdgeTypeId) -> StoreId {
        self.head_in.get(edge_type.index()).copied().unwrap_or(StoreId::NULL)
    }

    pub(crate) fn type_slots(&self) -> usize {
        self.head_out.len().max(self.head_in.len())
    }

    pub(crate) fn reset_adjacency(&mut self) {
        self.head_out.clear();
        self.head_in.clear();
        self.out_degree = 0;
        self.in_degree = 0;
        self.mutual_degree = 0;
    }
}

impl Element for Node {
    const KIND: ElementKind = ElementKind::Node;

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

/// Grows a head array so `edge_type` is addressable, then returns the slot.
pub(crate) fn head_slot(heads: &mut Heads, edge_type: EdgeTypeId) -> &mut StoreId {
    let idx = edge_type.index();
    if heads.len() <= idx {
        heads.resize(idx + 1, StoreId::NULL);
    }
    &mut heads[idx]
}
