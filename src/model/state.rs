// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Per-panel state: the four mapping tables, the pseudocode history, and the
//! edit-tracking snapshot. One instance lives per active panel; it is created
//! when a flowchart is first generated and torn down with the panel.

use std::collections::BTreeMap;

use crate::sync::align::LinePair;
use crate::sync::DocumentSnapshot;

use super::graph::FlowGraph;
use super::ids::{DocumentId, NodeId};

pub const MAX_PSEUDOCODE_HISTORY: usize = 50;
pub const PSEUDOCODE_PLACEHOLDER: &str = "Waiting for pseudocode generation...";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelState {
    document_id: Option<DocumentId>,
    line_to_nodes: BTreeMap<u32, Vec<NodeId>>,
    node_to_line: BTreeMap<NodeId, u32>,
    node_order: Vec<NodeId>,
    line_pairs: Vec<LinePair>,
    pseudocode_to_source: BTreeMap<u32, u32>,
    source_to_pseudocode: BTreeMap<u32, u32>,
    pseudocode_history: Vec<String>,
    fully_generated: bool,
    mapping_dirty: bool,
    snapshot: Option<DocumentSnapshot>,
    epoch: u64,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document_id.as_ref()
    }

    pub fn set_document_id(&mut self, document_id: Option<DocumentId>) {
        self.document_id = document_id;
    }

    /// Wholesale replace of the graph-derived tables. Clears the dirty flag;
    /// does not touch the pseudocode maps (independent lifecycle).
    pub fn rebuild_from_graph(&mut self, graph: &FlowGraph) {
        self.line_to_nodes = graph.line_to_nodes().clone();
        self.node_to_line.clear();
        for (line, node_ids) in graph.line_to_nodes() {
            for node_id in node_ids {
                self.node_to_line.insert(node_id.clone(), *line);
            }
        }
        self.node_order = graph.node_order().to_vec();
        self.mapping_dirty = false;
    }

    /// Install an alignment produced by the pseudocode aligner and flip the
    /// one-shot generation flag.
    pub fn install_alignment(&mut self, pairs: Vec<LinePair>) {
        self.pseudocode_to_source.clear();
        self.source_to_pseudocode.clear();
        for pair in &pairs {
            self.pseudocode_to_source
                .insert(pair.pseudocode_line, pair.source_line);
            self.source_to_pseudocode
                .insert(pair.source_line, pair.pseudocode_line);
        }
        self.line_pairs = pairs;
        self.fully_generated = true;
    }

    pub fn line_to_nodes(&self) -> &BTreeMap<u32, Vec<NodeId>> {
        &self.line_to_nodes
    }

    pub fn nodes_for_line(&self, line: u32) -> &[NodeId] {
        self.line_to_nodes
            .get(&line)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn line_for_node(&self, node_id: &NodeId) -> Option<u32> {
        self.node_to_line.get(node_id).copied()
    }

    pub fn node_order(&self) -> &[NodeId] {
        &self.node_order
    }

    pub fn line_pairs(&self) -> &[LinePair] {
        &self.line_pairs
    }

    pub fn source_line_for_pseudocode(&self, pseudocode_line: u32) -> Option<u32> {
        self.pseudocode_to_source.get(&pseudocode_line).copied()
    }

    pub fn pseudocode_line_for_source(&self, source_line: u32) -> Option<u32> {
        self.source_to_pseudocode.get(&source_line).copied()
    }

    pub fn pseudocode_mapping_len(&self) -> usize {
        self.pseudocode_to_source.len()
    }

    pub fn fully_generated(&self) -> bool {
        self.fully_generated
    }

    pub fn mapping_dirty(&self) -> bool {
        self.mapping_dirty
    }

    pub fn mark_mapping_dirty(&mut self) {
        self.mapping_dirty = true;
    }

    pub fn snapshot(&self) -> Option<&DocumentSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn record_snapshot(&mut self, snapshot: DocumentSnapshot) {
        self.snapshot = Some(snapshot);
    }

    /// Current document generation. Advanced by structural resets; async
    /// results captured under an older epoch must be discarded.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn push_history(&mut self, pseudocode: impl Into<String>) {
        self.pseudocode_history.push(pseudocode.into());
        if self.pseudocode_history.len() > MAX_PSEUDOCODE_HISTORY {
            let excess = self.pseudocode_history.len() - MAX_PSEUDOCODE_HISTORY;
            self.pseudocode_history.drain(..excess);
        }
    }

    /// Most-recent history entries concatenated for display, or a waiting
    /// placeholder when nothing has been generated yet.
    pub fn history_text(&self) -> String {
        if self.pseudocode_history.is_empty() {
            return PSEUDOCODE_PLACEHOLDER.to_owned();
        }
        self.pseudocode_history.join("\n")
    }

    pub fn history_len(&self) -> usize {
        self.pseudocode_history.len()
    }

    /// History-clear command: resets pseudocode state and the dirty flag but
    /// keeps the graph-derived tables and the document association.
    pub fn clear_history(&mut self) {
        self.pseudocode_history.clear();
        self.line_pairs.clear();
        self.pseudocode_to_source.clear();
        self.source_to_pseudocode.clear();
        self.fully_generated = false;
        self.mapping_dirty = false;
    }

    /// Structural edit: line-to-statement correspondence can no longer be
    /// trusted at all. Clears every table and flag, keeps the document
    /// association, and advances the epoch so in-flight results are dropped.
    pub fn reset_for_structural_edit(&mut self) {
        self.line_to_nodes.clear();
        self.node_to_line.clear();
        self.node_order.clear();
        self.clear_history();
        self.epoch = self.epoch.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{PanelState, MAX_PSEUDOCODE_HISTORY, PSEUDOCODE_PLACEHOLDER};
    use crate::model::graph::{FlowGraph, NodeShape};
    use crate::model::NodeId;
    use crate::sync::align::LinePair;

    fn node_id(value: &str) -> NodeId {
        NodeId::new(value).expect("node id")
    }

    fn sample_graph() -> FlowGraph {
        let mut graph = FlowGraph::new();
        graph.add_node(NodeId::start(), "Start", NodeShape::Terminal, None, None);
        graph.add_node(node_id("node1"), "x = 1", NodeShape::Rectangle, None, Some(1));
        graph.add_node(node_id("node2"), "y = 2", NodeShape::Rectangle, None, Some(2));
        graph
    }

    #[test]
    fn rebuild_from_graph_installs_both_directions() {
        let mut state = PanelState::new();
        state.mark_mapping_dirty();
        state.rebuild_from_graph(&sample_graph());

        assert!(!state.mapping_dirty());
        assert_eq!(state.nodes_for_line(1), &[node_id("node1")]);
        assert_eq!(state.line_for_node(&node_id("node2")), Some(2));
        assert_eq!(state.line_for_node(&NodeId::start()), None);
    }

    #[test]
    fn install_alignment_builds_inverse_maps() {
        let mut state = PanelState::new();
        state.install_alignment(vec![
            LinePair {
                source_line: 1,
                pseudocode_line: 1,
            },
            LinePair {
                source_line: 3,
                pseudocode_line: 2,
            },
        ]);

        assert!(state.fully_generated());
        assert_eq!(state.source_line_for_pseudocode(2), Some(3));
        assert_eq!(state.pseudocode_line_for_source(1), Some(1));
        assert_eq!(state.source_line_for_pseudocode(9), None);
    }

    #[test]
    fn history_is_bounded_and_concatenated() {
        let mut state = PanelState::new();
        assert_eq!(state.history_text(), PSEUDOCODE_PLACEHOLDER);

        for i in 0..MAX_PSEUDOCODE_HISTORY + 5 {
            state.push_history(format!("entry {i}"));
        }
        assert_eq!(state.history_len(), MAX_PSEUDOCODE_HISTORY);
        assert!(state.history_text().starts_with("entry 5\n"));
    }

    #[test]
    fn clear_history_keeps_graph_tables() {
        let mut state = PanelState::new();
        state.rebuild_from_graph(&sample_graph());
        state.install_alignment(vec![LinePair {
            source_line: 1,
            pseudocode_line: 1,
        }]);
        state.push_history("FUNCTION main");
        state.mark_mapping_dirty();

        state.clear_history();

        assert_eq!(state.history_len(), 0);
        assert!(!state.fully_generated());
        assert!(!state.mapping_dirty());
        assert_eq!(state.pseudocode_mapping_len(), 0);
        assert_eq!(state.nodes_for_line(1), &[node_id("node1")]);
    }

    #[test]
    fn structural_reset_clears_everything_and_bumps_epoch() {
        let mut state = PanelState::new();
        state.rebuild_from_graph(&sample_graph());
        state.install_alignment(vec![LinePair {
            source_line: 1,
            pseudocode_line: 1,
        }]);
        let epoch = state.epoch();

        state.reset_for_structural_edit();

        assert!(state.line_to_nodes().is_empty());
        assert_eq!(state.node_order().len(), 0);
        assert!(!state.fully_generated());
        assert!(!state.mapping_dirty());
        assert_eq!(state.epoch(), epoch + 1);
    }
}
