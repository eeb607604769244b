//! Boolean combination of views.
//!
//! Every operation first computes the changed bits word by word and then
//! applies them one at a time through the same bookkeeping as single
//! membership changes, so counters cost time proportional to what changed.

use super::{GraphView, ViewCx};
use crate::model::{Element, ElementKind, StoreId};
use crate::storage::bitvec::{for_each_bit, BitVector};
use crate::Result;

/// Bits set in `a` but not in `b`.
fn difference(a: &BitVector, b: &BitVector) -> Vec<StoreId> {
    let mut out = Vec::new();
    for w in 0..a.word_len() {
        for_each_bit(w, a.word(w) & !b.word(w), |bit| out.push(StoreId(bit as u32)));
    }
    out
}

impl GraphView {
    pub(crate) fn union(&mut self, cx: &mut ViewCx<'_>, other: &GraphView) -> Result<bool> {
        self.same_shape(other)?;
        let mut changed = false;

        if self.tracks_nodes {
            let added = difference(&other.nodes, &self.nodes);
            for &id in &added {
                self.nodes.set(id.index());
                cx.note(self.id, ElementKind::Node, id, true);
            }
            if !added.is_empty() {
                self.version.node.bump();
                changed = true;
            }
            if self.is_induced() {
                let induced: usize = added.into_iter().map(|id| self.induce_incident(cx, id)).sum();
                if induced > 0 {
                    self.version.edge.bump();
                }
                return Ok(changed);
            }
        }

        let edges = cx.edges;
        let mut edges_changed = false;
        for id in difference(&other.edges, &self.edges) {
            let Some(edge) = edges.try_get(id) else { continue };
            if self.insert_edge_bit(edge) {
                cx.note(self.id, ElementKind::Edge, id, true);
                edges_changed = true;
            }
        }
        if edges_changed {
            self.version.edge.bump();
        }
        tracing::trace!(view = %self.id, other = %other.id, changed = changed || edges_changed, "view union");
        Ok(changed || edges_changed)
    }

    pub(crate) fn intersection(&mut self, cx: &mut ViewCx<'_>, other: &GraphView) -> Result<bool> {
        self.same_shape(other)?;
        let edges = cx.edges;

        // edges visible in both have both endpoints visible in both
        let mut edges_changed = false;
        for id in difference(&self.edges, &other.edges) {
            let Some(edge) = edges.try_get(id) else { continue };
            if self.remove_edge_bit(edge) {
                cx.note(self.id, ElementKind::Edge, id, false);
                edges_changed = true;
            }
        }
        if edges_changed {
            self.version.edge.bump();
        }

        let mut nodes_changed = false;
        if self.tracks_nodes {
            for id in difference(&self.nodes, &other.nodes) {
                cx.note(self.id, ElementKind::Node, id, false);
                self.nodes.clear(id.index());
                nodes_changed = true;
            }
            if nodes_changed {
                self.version.node.bump();
            }
        }
        tracing::trace!(view = %self.id, other = %other.id, changed = nodes_changed || edges_changed, "view intersection");
        Ok(nodes_changed || edges_changed)
    }

    /// Complements against the live store. Edges whose endpoints are not both
    /// visible afterwards are dropped; in a node-only view the edges become
    /// the subgraph induced by the new node set.
    pub(crate) fn not(&mut self, cx: &mut ViewCx<'_>) {
        let (nodes, edges) = (cx.nodes, cx.edges);

        if self.tracks_nodes {
            let mut changed = false;
            for id in nodes.ids() {
                let present = self.nodes.get(id.index());
                if present {
                    cx.note(self.id, ElementKind::Node, id, false);
                    self.nodes.clear(id.index());
                } else {
                    self.nodes.set(id.index());
                    cx.note(self.id, ElementKind::Node, id, true);
                }
                changed = true;
            }
            if changed {
                self.version.node.bump();
            }
        }

        let mut changed = false;
        for edge in edges.iter() {
            let id = edge.store_id();
            let present = self.edges.get(id.index());
            let endpoints_visible = !self.tracks_nodes
                || (self.nodes.get(edge.source.index()) && self.nodes.get(edge.target.index()));
            let wanted = endpoints_visible && (!self.tracks_edges || !present);
            if wanted == present {
                continue;
            }
            if wanted {
                self.insert_edge_bit(edge);
                cx.note(self.id, ElementKind::Edge, id, true);
            } else {
                cx.note(self.id, ElementKind::Edge, id, false);
                self.remove_edge_bit(edge);
            }
            changed = true;
        }
        if changed {
            self.version.edge.bump();
        }
        tracing::trace!(view = %self.id, nodes = self.nodes.count_ones(), edges = self.edge_count(), "view complemented");
    }

    pub(crate) fn retain_nodes(&mut self, cx: &mut ViewCx<'_>, keep: &BitVector) -> Result<bool> {
        self.require_nodes()?;
        let removed = difference(&self.nodes, keep);
        let mut edges_cleared = 0;
        for &id in &removed {
            edges_cleared += self.clear_incident(cx, id);
            cx.note(self.id, ElementKind::Node, id, false);
            self.nodes.clear(id.index());
        }
        if edges_cleared > 0 {
            self.version.edge.bump();
        }
        if removed.is_empty() {
            return Ok(false);
        }
        self.version.node.bump();
        Ok(true)
    }

    pub(crate) fn retain_edges(&mut self, cx: &mut ViewCx<'_>, keep: &BitVector) -> Result<bool> {
        self.require_edges()?;
        let edges = cx.edges;
        let mut changed = false;
        for id in difference(&self.edges, keep) {
            let Some(edge) = edges.try_get(id) else { continue };
            cx.note(self.id, ElementKind::Edge, id, false);
            changed |= self.remove_edge_bit(edge);
        }
        if changed {
            self.version.edge.bump();
        }
        Ok(changed)
    }
}
