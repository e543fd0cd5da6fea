// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Append-only flowchart graph.
//!
//! A graph is produced wholesale by one CFG build and never mutated afterwards
//! except for edge-label backfill through the [`EdgeHandle`] returned by
//! [`FlowGraph::add_edge`]. Node declaration order is preserved because the
//! rendering surface lays the chart out top-to-bottom in declaration order.

use std::collections::BTreeMap;

use super::ids::NodeId;

/// Statement category, rendered as a distinct shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    /// Plain action (assignment, import, call, ...).
    Rectangle,
    /// Predicate (if/while condition, assert).
    Diamond,
    /// I/O (print/input).
    Parallelogram,
    /// Start/End and flow terminators (return, raise, break, continue).
    Terminal,
    /// Function entry, double-bordered.
    FunctionEntry,
    /// Invisible spacer, no label and no click hook.
    Spacer,
}

/// Edge label vocabulary. Everything except `Calls` is a control-flow label;
/// `Calls` marks the dashed call-annotation edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeLabel {
    Yes,
    No,
    True,
    End,
    Continue,
    Calls,
}

impl EdgeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::True => "True",
            Self::End => "End",
            Self::Continue => "continue",
            Self::Calls => "calls",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    label: String,
    shape: NodeShape,
    style: Option<String>,
    source_line: Option<u32>,
}

impl FlowNode {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn shape(&self) -> NodeShape {
        self.shape
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn source_line(&self) -> Option<u32> {
        self.source_line
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    from_node_id: NodeId,
    to_node_id: NodeId,
    label: Option<EdgeLabel>,
    dotted: bool,
}

impl FlowEdge {
    pub fn from_node_id(&self) -> &NodeId {
        &self.from_node_id
    }

    pub fn to_node_id(&self) -> &NodeId {
        &self.to_node_id
    }

    pub fn label(&self) -> Option<EdgeLabel> {
        self.label
    }

    pub fn dotted(&self) -> bool {
        self.dotted
    }
}

/// Index of an edge in insertion order, valid for the lifetime of one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeHandle(usize);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowGraph {
    nodes: BTreeMap<NodeId, FlowNode>,
    node_order: Vec<NodeId>,
    edges: Vec<FlowEdge>,
    line_to_nodes: BTreeMap<u32, Vec<NodeId>>,
    extra_styles: Vec<(NodeId, String)>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node. Within one build ids are unique by construction; a
    /// repeated id keeps the first declaration (idempotent per id).
    pub fn add_node(
        &mut self,
        node_id: NodeId,
        label: impl Into<String>,
        shape: NodeShape,
        style: Option<String>,
        source_line: Option<u32>,
    ) {
        if self.nodes.contains_key(&node_id) {
            return;
        }
        if let Some(line) = source_line {
            self.line_to_nodes
                .entry(line)
                .or_default()
                .push(node_id.clone());
        }
        self.node_order.push(node_id.clone());
        self.nodes.insert(
            node_id,
            FlowNode {
                label: label.into(),
                shape,
                style,
                source_line,
            },
        );
    }

    /// Pure append; the builder is trusted to reference only nodes it has
    /// created or will create. Returns a handle for O(1) label backfill.
    pub fn add_edge(
        &mut self,
        from_node_id: NodeId,
        to_node_id: NodeId,
        label: Option<EdgeLabel>,
    ) -> EdgeHandle {
        self.edges.push(FlowEdge {
            from_node_id,
            to_node_id,
            label,
            dotted: false,
        });
        EdgeHandle(self.edges.len() - 1)
    }

    /// Dashed call-annotation edge from a call site to a function entry.
    pub fn add_call_edge(&mut self, from_node_id: NodeId, to_node_id: NodeId) {
        self.edges.push(FlowEdge {
            from_node_id,
            to_node_id,
            label: Some(EdgeLabel::Calls),
            dotted: true,
        });
    }

    /// Backfill the label of a previously appended edge. No-op if the edge
    /// already carries a label (labels are written at most once).
    pub fn set_edge_label(&mut self, handle: EdgeHandle, label: EdgeLabel) {
        if let Some(edge) = self.edges.get_mut(handle.0) {
            if edge.label.is_none() {
                edge.label = Some(label);
            }
        }
    }

    /// Extra cosmetic style directive emitted after the node's own style.
    pub fn add_node_style(&mut self, node_id: NodeId, style: impl Into<String>) {
        self.extra_styles.push((node_id, style.into()));
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&FlowNode> {
        self.nodes.get(node_id)
    }

    pub fn node_label(&self, node_id: &NodeId) -> &str {
        self.nodes
            .get(node_id)
            .map(FlowNode::label)
            .unwrap_or_default()
    }

    /// Node ids in declaration order.
    pub fn node_order(&self) -> &[NodeId] {
        &self.node_order
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn line_to_nodes(&self) -> &BTreeMap<u32, Vec<NodeId>> {
        &self.line_to_nodes
    }

    pub fn extra_styles(&self) -> &[(NodeId, String)] {
        &self.extra_styles
    }

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeDegree {
    pub in_degree: u64,
    pub out_degree: u64,
}

/// Per-node in/out degree over the control-flow edges (call edges excluded).
/// Used by invariant checks: every node except Start has incoming flow, every
/// node except End and terminators has outgoing flow.
pub fn degrees(graph: &FlowGraph) -> BTreeMap<NodeId, NodeDegree> {
    let mut degrees: BTreeMap<NodeId, NodeDegree> = BTreeMap::new();
    for node_id in graph.node_order() {
        degrees.entry(node_id.clone()).or_default();
    }

    for edge in graph.edges() {
        if edge.dotted() {
            continue;
        }
        let from_degree = degrees.entry(edge.from_node_id().clone()).or_default();
        from_degree.out_degree = from_degree.out_degree.saturating_add(1);

        let to_degree = degrees.entry(edge.to_node_id().clone()).or_default();
        to_degree.in_degree = to_degree.in_degree.saturating_add(1);
    }

    degrees
}
