//! End-to-end tests for the shared `Graph` handle and its lock discipline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use densegraph::{Edge, EdgeTypeId, Error, Graph, Node, StoreConfig, StoreId};

const T0: EdgeTypeId = EdgeTypeId::DEFAULT;

fn seeded(n: i64) -> Graph {
    let graph = Graph::new(StoreConfig::default()).unwrap();
    {
        let mut store = graph.write().unwrap();
        for i in 0..n {
            store.add_node(Node::new(i)).unwrap();
        }
    }
    graph
}

// ============================================================================
// 1. Lock rules on one thread
// ============================================================================

#[test]
fn test_upgrade_is_refused() {
    let graph = seeded(2);
    let read = graph.read().unwrap();
    assert_eq!(graph.write().unwrap_err(), Error::LockUpgrade);
    // nested reads are fine
    let again = graph.read().unwrap();
    assert_eq!(again.node_count(), read.node_count());
    drop(again);
    drop(read);
    assert!(graph.write().is_ok());
}

#[test]
fn test_writer_reads_through_its_guard() {
    let graph = seeded(2);
    let mut write = graph.write().unwrap();
    write.add_edge(Edge::directed(0, StoreId(0), StoreId(1), T0)).unwrap();

    assert_eq!(graph.read().unwrap_err(), Error::ReadWhileWriting);
    assert_eq!(graph.write().unwrap_err(), Error::LockReentry);
    {
        let read = write.read().unwrap();
        assert_eq!(read.edge_count(), 1);
    }
    write.add_edge(Edge::directed(1, StoreId(1), StoreId(0), T0)).unwrap();
    drop(write);

    let read = graph.read().unwrap();
    assert_eq!(read.mutual_edge_count(), 1);
}

#[test]
fn test_downgrade_keeps_shared_access() {
    let graph = seeded(1);
    let mut write = graph.write().unwrap();
    write.add_node(Node::new(5)).unwrap();
    let read = write.downgrade().unwrap();

    assert!(!graph.lock().is_write_held_by_current());
    assert!(graph.lock().is_read_held_by_current());
    assert_eq!(read.node_count(), 2);
    assert_eq!(graph.write().unwrap_err(), Error::LockUpgrade);
    drop(read);
    assert!(!graph.lock().is_locked());
}

// ============================================================================
// 2. Across threads
// ============================================================================

#[test]
fn test_readers_run_concurrently() {
    let graph = seeded(4);
    // every reader must hold its guard before any can pass
    let barrier = Barrier::new(4);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let read = graph.read().unwrap();
                barrier.wait();
                assert_eq!(read.node_count(), 4);
            });
        }
    });
    assert!(!graph.lock().is_locked());
}

#[test]
fn test_writers_are_serialised() {
    let graph = seeded(0);
    thread::scope(|s| {
        for t in 0..4i64 {
            let graph = &graph;
            s.spawn(move || {
                for i in 0..50 {
                    let mut store = graph.write().unwrap();
                    store.add_node(Node::new(t * 1000 + i)).unwrap();
                }
            });
        }
        s.spawn(|| {
            for _ in 0..50 {
                let read = graph.read().unwrap();
                let space = read.nodes().id_space();
                assert_eq!(read.node_count(), space.high_water as usize - space.garbage.len());
            }
        });
    });

    let read = graph.read().unwrap();
    assert_eq!(read.node_count(), 200);
    let ids: Vec<_> = read.nodes().ids().collect();
    assert_eq!(ids, (0..200).map(StoreId).collect::<Vec<_>>());
}

#[test]
fn test_writer_waits_for_reader() {
    let graph = seeded(1);
    let written = AtomicBool::new(false);

    thread::scope(|s| {
        let read = graph.read().unwrap();
        s.spawn(|| {
            let mut store = graph.write().unwrap();
            store.add_node(Node::new(9)).unwrap();
            written.store(true, Ordering::SeqCst);
        });
        thread::sleep(Duration::from_millis(30));
        assert!(!written.load(Ordering::SeqCst));
        assert_eq!(read.node_count(), 1);
        drop(read);
    });
    assert!(written.load(Ordering::SeqCst));
    assert_eq!(graph.read().unwrap().node_count(), 2);
}
