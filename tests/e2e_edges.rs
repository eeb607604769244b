//! End-to-end tests for edge storage: degrees, mutual pairs, edge types,
//! parallel edges and traversal with removal.

use densegraph::{
    AdjacencyCursor, Direction, Edge, EdgeCursor, EdgeTypeId, Element, ElementKind, Error, GraphStore, Node, StoreConfig,
    StoreId,
};
use pretty_assertions::assert_eq;

const T0: EdgeTypeId = EdgeTypeId::DEFAULT;

fn store_with_nodes(config: StoreConfig, n: i64) -> (GraphStore, Vec<StoreId>) {
    let mut store = GraphStore::new(config).unwrap();
    let ids = (0..n).map(|i| store.add_node(Node::new(i)).unwrap()).collect();
    (store, ids)
}

// ============================================================================
// 1. Directed edge, then its reverse
// ============================================================================

#[test]
fn test_single_directed_edge() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 2);
    store.add_edge(Edge::directed(0, n[0], n[1], T0)).unwrap();

    assert_eq!(store.degree(n[0]).unwrap(), 1);
    assert_eq!(store.degree(n[1]).unwrap(), 1);
    assert_eq!(store.out_degree(n[0]).unwrap(), 1);
    assert_eq!(store.in_degree(n[1]).unwrap(), 1);
    assert!(store.is_directed());
    assert!(!store.is_undirected());
    assert!(!store.is_mixed());
}

#[test]
fn test_reverse_edge_forms_mutual_pair() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 2);
    let ab = store.add_edge(Edge::directed(0, n[0], n[1], T0)).unwrap();
    let ba = store.add_edge(Edge::directed(1, n[1], n[0], T0)).unwrap();

    assert!(store.edge(ab).unwrap().is_mutual());
    assert!(store.edge(ba).unwrap().is_mutual());
    assert_eq!(store.edge(ab).unwrap().partner(), Some(ba));
    assert_eq!(store.undirected_degree(n[0]).unwrap(), 1);
    assert_eq!(store.degree(n[0]).unwrap(), 2);
    assert_eq!(store.mutual_edge_count(), 1);
    assert_eq!(store.undirected_edge_count(), 1);

    let removed = store.remove_edge(ba).unwrap();
    assert!(!removed.is_stored());
    assert!(!store.contains_edge(ba));
    assert_eq!(store.edge(ba).unwrap_err(), Error::InvalidStoreId { kind: ElementKind::Edge, id: ba });
    assert!(!store.edge(ab).unwrap().is_mutual());
    assert_eq!(store.mutual_edge_count(), 0);
    assert_eq!(store.mutual_degree(n[1]).unwrap(), 0);
}

#[test]
fn test_different_types_do_not_pair() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 2);
    let likes = store.register_edge_type("LIKES").unwrap();
    store.add_edge(Edge::directed(0, n[0], n[1], T0)).unwrap();
    store.add_edge(Edge::directed(1, n[1], n[0], likes)).unwrap();
    assert_eq!(store.mutual_edge_count(), 0);
    assert_eq!(store.edge_count_of_type(likes), 1);
}

#[test]
fn test_undirected_and_self_loop_shape() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 2);
    store.add_edge(Edge::undirected(0, n[0], n[1], T0)).unwrap();
    assert!(store.is_undirected());
    assert_eq!(store.edges_without_direction(), 1);

    store.add_edge(Edge::directed(1, n[0], n[0], T0)).unwrap();
    assert!(store.is_mixed());
    assert_eq!(store.self_loop_count(), 1);
    // a self-loop adds to both in and out degree
    assert_eq!(store.degree(n[0]).unwrap(), 3);
}

// ============================================================================
// 2. Existence rules
// ============================================================================

#[test]
fn test_duplicate_edge_is_rejected_without_parallel_edges() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 2);
    store.add_edge(Edge::directed(0, n[0], n[1], T0)).unwrap();
    assert_eq!(
        store.add_edge(Edge::directed(1, n[0], n[1], T0)),
        Err(Error::EdgeExists { from: n[0], to: n[1], edge_type: T0 })
    );

    // an undirected edge is keyed on the unordered pair
    store.add_edge(Edge::undirected(2, n[0], n[1], T0)).unwrap();
    assert!(store.add_edge(Edge::undirected(3, n[1], n[0], T0)).is_err());
    assert_eq!(store.edge_count(), 2);
}

#[test]
fn test_parallel_edges_and_orphan_repairing() {
    let config = StoreConfig::default().with_parallel_edges(true);
    let (mut store, n) = store_with_nodes(config, 2);
    let a1 = store.add_edge(Edge::directed(0, n[0], n[1], T0)).unwrap();
    let a2 = store.add_edge(Edge::directed(1, n[0], n[1], T0)).unwrap();
    let b1 = store.add_edge(Edge::directed(2, n[1], n[0], T0)).unwrap();
    assert_eq!(store.mutual_edge_count(), 1);
    assert_eq!(store.edges().find_all(n[0], n[1], T0, true), &[a1, a2]);

    let partner = store.edge(b1).unwrap().partner().unwrap();
    store.remove_edge(partner).unwrap();
    // the unpaired parallel edge takes over
    assert_eq!(store.mutual_edge_count(), 1);
    assert!(store.edge(b1).unwrap().is_mutual());
}

#[test]
fn test_missing_endpoint_is_rejected() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 1);
    assert_eq!(
        store.add_edge(Edge::directed(0, n[0], StoreId(5), T0)),
        Err(Error::MissingEndpoint(StoreId(5)))
    );
    assert_eq!(store.edge_count(), 0);
}

#[test]
fn test_endpoints_from_another_store_are_rejected() {
    let (mut a, x) = store_with_nodes(StoreConfig::default(), 3);
    let (mut b, y) = store_with_nodes(StoreConfig::default(), 2);

    let foreign = Edge::between(9, a.node(x[0]).unwrap(), a.node(x[1]).unwrap(), T0, true);
    assert_eq!(b.add_edge(foreign), Err(Error::ForeignEndpoint(x[0])));

    let mixed = Edge::between(9, b.node(y[0]).unwrap(), a.node(x[1]).unwrap(), T0, true);
    assert_eq!(b.add_edge(mixed), Err(Error::ForeignEndpoint(x[1])));

    // a stored edge remembers its store
    let stored = a.add_edge(Edge::between(9, a.node(x[0]).unwrap(), a.node(x[1]).unwrap(), T0, true)).unwrap();
    let copy = a.edge(stored).unwrap().clone();
    assert_eq!(b.add_edge(copy), Err(Error::ForeignEndpoint(x[0])));
    assert_eq!(b.edge_count(), 0);

    // a removed node is free to join another store
    let moved = a.remove_node(x[2]).unwrap();
    let z = b.add_node(moved).unwrap();
    let local = Edge::between(10, b.node(y[0]).unwrap(), b.node(z).unwrap(), T0, true);
    assert!(b.add_edge(local).is_ok());

    // bare store ids always resolve in the receiving store
    assert!(b.add_edge(Edge::directed(11, y[1], y[0], T0)).is_ok());
    assert_eq!(b.edge_count(), 2);
}

#[test]
fn test_find_edge_both_orders() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 3);
    let und = store.add_edge(Edge::undirected(0, n[0], n[1], T0)).unwrap();
    let dir = store.add_edge(Edge::directed(1, n[1], n[0], T0)).unwrap();

    assert_eq!(store.find_edge(n[0], n[1], T0, false).map(|e| e.store_id()), Some(und));
    assert_eq!(store.find_edge(n[1], n[0], T0, false).map(|e| e.store_id()), Some(und));
    assert_eq!(store.find_edge(n[1], n[0], T0, true).map(|e| e.store_id()), Some(dir));
    assert_eq!(store.find_edge(n[0], n[1], T0, true).map(|e| e.store_id()), Some(und));
    assert!(store.find_edge(n[0], n[2], T0, true).is_none());
}

// ============================================================================
// 3. Edge types
// ============================================================================

#[test]
fn test_set_type_moves_lists_and_pairs() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 2);
    let likes = store.register_edge_type("LIKES").unwrap();
    let ab = store.add_edge(Edge::directed(0, n[0], n[1], T0)).unwrap();
    let ba = store.add_edge(Edge::directed(1, n[1], n[0], T0)).unwrap();
    let ba_likes = store.add_edge(Edge::directed(2, n[1], n[0], likes)).unwrap();
    assert_eq!(store.mutual_edge_count(), 1);

    assert!(!store.set_edge_type(ab, T0).unwrap());
    assert!(store.set_edge_type(ab, likes).unwrap());

    // the old pair is gone and a new one formed under LIKES
    assert!(!store.edge(ba).unwrap().is_mutual());
    assert_eq!(store.edge(ab).unwrap().partner(), Some(ba_likes));
    assert_eq!(store.edges().mutual_pairs_of_type(likes), 1);
    assert_eq!(store.edges().mutual_pairs_of_type(T0), 0);

    let out: Vec<_> = store.incident(n[0], Direction::Out, Some(likes)).unwrap().map(|e| e.store_id()).collect();
    assert_eq!(out, vec![ab]);
    assert_eq!(store.incident(n[0], Direction::Out, Some(T0)).unwrap().count(), 0);
}

#[test]
fn test_set_type_conflict_leaves_edge_untouched() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 2);
    let likes = store.register_edge_type("LIKES").unwrap();
    let e0 = store.add_edge(Edge::directed(0, n[0], n[1], T0)).unwrap();
    store.add_edge(Edge::directed(1, n[0], n[1], likes)).unwrap();
    let before = store.version();

    assert!(matches!(store.set_edge_type(e0, likes), Err(Error::EdgeExists { .. })));
    assert_eq!(store.set_edge_type(e0, EdgeTypeId(40)), Err(Error::UnknownEdgeType(EdgeTypeId(40))));
    assert_eq!(store.edge(e0).unwrap().edge_type(), T0);
    assert_eq!(store.version(), before);
}

#[test]
fn test_type_codes_are_reused() {
    let mut store = GraphStore::default();
    let a = store.register_edge_type("A").unwrap();
    let b = store.register_edge_type("B").unwrap();
    assert_eq!(store.register_edge_type("A").unwrap(), a);
    assert_eq!(store.edge_type_label(b), Some("B"));

    store.remove_edge_type("A").unwrap();
    assert_eq!(store.edge_type_code("A"), None);
    assert_eq!(store.register_edge_type("C").unwrap(), a);
    assert_eq!(store.remove_edge_type("nope"), Err(Error::UnknownEdgeTypeLabel("nope".into())));
}

#[test]
fn test_register_with_code() {
    let mut store = GraphStore::default();
    assert!(store.register_edge_type_with_code("X", EdgeTypeId(5)).unwrap());
    assert!(!store.register_edge_type_with_code("X", EdgeTypeId(5)).unwrap());
    assert!(matches!(store.register_edge_type_with_code("Y", EdgeTypeId(5)), Err(Error::TypeConflict(_))));
    assert!(matches!(store.register_edge_type_with_code("X", EdgeTypeId(6)), Err(Error::TypeConflict(_))));
    assert_eq!(store.edge_type_code("X"), Some(EdgeTypeId(5)));
}

#[test]
fn test_type_registry_exhaustion_is_terminal() {
    let config = StoreConfig::default().with_max_edge_types(2);
    let mut store = GraphStore::new(config).unwrap();
    store.register_edge_type("A").unwrap();
    assert!(matches!(store.register_edge_type("B"), Err(Error::CapacityExhausted(_))));
    store.remove_edge_type("A").unwrap();
    assert!(matches!(store.register_edge_type("B"), Err(Error::CapacityExhausted(_))));
}

// ============================================================================
// 4. Traversal
// ============================================================================

#[test]
fn test_directions() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 3);
    let ab = store.add_edge(Edge::directed(0, n[0], n[1], T0)).unwrap();
    let ba = store.add_edge(Edge::directed(1, n[1], n[0], T0)).unwrap();
    let ca = store.add_edge(Edge::directed(2, n[2], n[0], T0)).unwrap();
    let aa = store.add_edge(Edge::directed(3, n[0], n[0], T0)).unwrap();

    let ids = |dir| {
        let mut v: Vec<StoreId> = store.incident(n[0], dir, None).unwrap().map(|e| e.store_id()).collect();
        v.sort();
        v
    };
    assert_eq!(ids(Direction::Out), vec![ab, aa]);
    assert_eq!(ids(Direction::In), vec![ba, ca, aa]);
    assert_eq!(ids(Direction::InOut), vec![ab, ba, ca, aa]);
    assert_eq!(ids(Direction::Undirected), vec![ab, ca, aa]);
    assert_eq!(ids(Direction::SelfLoop), vec![aa]);

    let mut neighbours: Vec<_> = store.neighbours(n[0], Direction::InOut, None).unwrap().collect();
    neighbours.sort();
    assert_eq!(neighbours, vec![n[0], n[1], n[2]]);
}

#[test]
fn test_adjacency_cursor_removes_while_walking() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 5);
    for i in 1..5 {
        store.add_edge(Edge::directed(i as i64, n[0], n[i], T0)).unwrap();
    }

    let mut cursor = store.adjacency_cursor(n[0], Direction::Out, None).unwrap();
    let mut seen = 0;
    while let Some(id) = cursor.advance(&store) {
        seen += 1;
        if store.edge(id).unwrap().target().0 % 2 == 0 {
            cursor.remove(&mut store).unwrap();
        }
    }
    assert_eq!(seen, 4);
    assert_eq!(store.out_degree(n[0]).unwrap(), 2);
    assert_eq!(cursor.current(), None);

    let mut fresh = AdjacencyCursor::new(n[0], Direction::Out, None);
    assert_eq!(fresh.remove(&mut store).unwrap_err(), Error::CursorNotPositioned);
}

#[test]
fn test_undirected_scan_yields_each_pair_once() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 3);
    store.add_edge(Edge::directed(0, n[0], n[1], T0)).unwrap();
    store.add_edge(Edge::directed(1, n[1], n[0], T0)).unwrap();
    store.add_edge(Edge::directed(2, n[1], n[2], T0)).unwrap();

    assert_eq!(store.undirected_edges().count(), store.undirected_edge_count());
    assert_eq!(store.undirected_edges().count(), 2);

    let mut cursor = EdgeCursor::new();
    while cursor.advance(&store).is_some() {
        cursor.remove(&mut store).unwrap();
    }
    assert_eq!(store.edge_count(), 0);
    assert_eq!(store.degree(n[1]).unwrap(), 0);
}

#[test]
fn test_weight_and_attributes() {
    let (mut store, n) = store_with_nodes(StoreConfig::default(), 2);
    let e = store.add_edge(Edge::directed(0, n[0], n[1], T0).with_weight(2.5)).unwrap();
    let before = store.version();
    store.set_edge_weight(e, 4.0).unwrap();
    store.edge_attributes_mut(e).unwrap().set(7u32);
    assert_eq!(store.edge(e).unwrap().weight(), 4.0);
    assert_eq!(store.edge(e).unwrap().attributes().get::<u32>(), Some(&7));
    assert_eq!(store.version(), before);
}
