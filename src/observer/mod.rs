//! # Change Observers
//!
//! An observer remembers the node/edge versions of its target (the whole
//! store or one view) and answers "has anything changed since I last looked".
//! Observers created with diff recording also collect the user ids of
//! elements added to and removed from the target in between.
//!
//! Polling (`has_changed`, `diff`) only needs shared access to the store, so
//! per-observer state sits behind a mutex. Recording happens under the write
//! lock and goes through `Mutex::get_mut`.

use std::fmt;

use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::model::{ElementId, ElementKind};
use crate::storage::GraphVersion;
use crate::view::ViewId;
use crate::{Error, Result};

/// Handle of an observer. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId {
    store: u32,
    seq: u32,
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer {}:{}", self.store, self.seq)
    }
}

/// Net membership changes since the previous `diff` call. Sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDiff {
    pub added_nodes: Vec<ElementId>,
    pub removed_nodes: Vec<ElementId>,
    pub added_edges: Vec<ElementId>,
    pub removed_edges: Vec<ElementId>,
}

impl GraphDiff {
    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty()
    }
}

#[derive(Debug, Default)]
struct Delta {
    added: HashSet<ElementId>,
    removed: HashSet<ElementId>,
}

impl Delta {
    /// An add cancels a pending remove of the same id and vice versa.
    fn apply(&mut self, id: &ElementId, added: bool) {
        let (this, other) = if added {
            (&mut self.added, &mut self.removed)
        } else {
            (&mut self.removed, &mut self.added)
        };
        if !other.remove(id) {
            this.insert(id.clone());
        }
    }

    fn drain_sorted(set: &mut HashSet<ElementId>) -> Vec<ElementId> {
        let mut ids: Vec<_> = set.drain().collect();
        ids.sort();
        ids
    }
}

#[derive(Debug, Default)]
struct DiffRecorder {
    nodes: Delta,
    edges: Delta,
}

impl DiffRecorder {
    fn take(&mut self) -> GraphDiff {
        GraphDiff {
            added_nodes: Delta::drain_sorted(&mut self.nodes.added),
            removed_nodes: Delta::drain_sorted(&mut self.nodes.removed),
            added_edges: Delta::drain_sorted(&mut self.edges.added),
            removed_edges: Delta::drain_sorted(&mut self.edges.removed),
        }
    }
}

#[derive(Debug)]
struct ObserverState {
    target: Option<ViewId>,
    seen: GraphVersion,
    diff: Option<DiffRecorder>,
}

/// All observers of one store.
#[derive(Debug)]
pub(crate) struct ObserverRegistry {
    store: u32,
    seq: u32,
    states: Mutex<HashMap<ObserverId, ObserverState>>,
    /// Live recording observers per target.
    recording: HashMap<Option<ViewId>, usize>,
}

impl ObserverRegistry {
    pub(crate) fn new(store: u32) -> Self {
        Self { store, seq: 0, states: Mutex::new(HashMap::new()), recording: HashMap::new() }
    }

    pub(crate) fn create(
        &mut self,
        target: Option<ViewId>,
        seen: GraphVersion,
        record_diffs: bool,
    ) -> Result<ObserverId> {
        let id = ObserverId { store: self.store, seq: self.seq };
        self.seq = self
            .seq
            .checked_add(1)
            .ok_or_else(|| Error::CapacityExhausted("observer ids".into()))?;
        let diff = record_diffs.then(DiffRecorder::default);
        if record_diffs {
            *self.recording.entry(target).or_default() += 1;
        }
        self.states.get_mut().insert(id, ObserverState { target, seen, diff });
        tracing::debug!(%id, ?target, record_diffs, "observer created");
        Ok(id)
    }

    pub(crate) fn target(&self, id: ObserverId) -> Result<Option<ViewId>> {
        self.check_store(id)?;
        self.states.lock().get(&id).map(|s| s.target).ok_or(Error::ObserverDestroyed(id))
    }

    /// Compares `current` against the versions seen last and re-synchronises.
    pub(crate) fn has_changed(&self, id: ObserverId, current: GraphVersion) -> Result<bool> {
        self.check_store(id)?;
        let mut states = self.states.lock();
        let state = states.get_mut(&id).ok_or(Error::ObserverDestroyed(id))?;
        let changed = state.seen != current;
        state.seen = current;
        Ok(changed)
    }

    pub(crate) fn diff(&self, id: ObserverId) -> Result<GraphDiff> {
        self.check_store(id)?;
        let mut states = self.states.lock();
        let state = states.get_mut(&id).ok_or(Error::ObserverDestroyed(id))?;
        state.diff.as_mut().map(DiffRecorder::take).ok_or(Error::DiffsNotRecorded(id))
    }

    pub(crate) fn destroy(&mut self, id: ObserverId) -> Result<()> {
        self.check_store(id)?;
        let state = self.states.get_mut().remove(&id).ok_or(Error::ObserverDestroyed(id))?;
        if state.diff.is_some() {
            self.forget_recorder(state.target);
        }
        tracing::debug!(%id, "observer destroyed");
        Ok(())
    }

    /// Destroys every observer of `view`. Returns how many there were.
    pub(crate) fn destroy_for_view(&mut self, view: ViewId) -> usize {
        let states = self.states.get_mut();
        let before = states.len();
        states.retain(|_, s| s.target != Some(view));
        self.recording.remove(&Some(view));
        before - states.len()
    }

    /// Whether any live observer of `target` records diffs.
    #[inline]
    pub(crate) fn is_recording(&self, target: Option<ViewId>) -> bool {
        self.recording.contains_key(&target)
    }

    pub(crate) fn record(&mut self, target: Option<ViewId>, kind: ElementKind, id: &ElementId, added: bool) {
        if !self.is_recording(target) {
            return;
        }
        for state in self.states.get_mut().values_mut() {
            if state.target != target {
                continue;
            }
            if let Some(diff) = state.diff.as_mut() {
                let delta = match kind {
                    ElementKind::Node => &mut diff.nodes,
                    ElementKind::Edge => &mut diff.edges,
                };
                delta.apply(id, added);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.states.lock().len()
    }

    fn forget_recorder(&mut self, target: Option<ViewId>) {
        if let Some(count) = self.recording.get_mut(&target) {
            *count -= 1;
            if *count == 0 {
                self.recording.remove(&target);
            }
        }
    }

    fn check_store(&self, id: ObserverId) -> Result<()> {
        if id.store != self.store {
            return Err(Error::ForeignObserver(id));
        }
        Ok(())
    }
}
