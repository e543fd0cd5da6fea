// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Core data model: identifier newtypes, the append-only flow graph, and the
//! per-panel state that carries mappings between the three surfaces.

pub mod graph;
pub mod ids;
pub mod state;

pub use graph::{
    degrees, EdgeHandle, EdgeLabel, FlowEdge, FlowGraph, FlowNode, NodeDegree, NodeShape,
};
pub use ids::{DocumentId, Id, IdError, NodeId, END_NODE, START_NODE};
pub use state::{PanelState, MAX_PSEUDOCODE_HISTORY, PSEUDOCODE_PLACEHOLDER};
