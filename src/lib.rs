// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Pseudoflow — control-flow flowchart and line-synchronized pseudocode
//! engine for Python sources.
//!
//! A source file is parsed into a statement tree, lowered into a Mermaid
//! flowchart with per-line node mappings, and optionally paired with
//! externally generated pseudocode aligned line-by-line. Interactions on
//! any of the three surfaces (editor, graph, pseudocode view) resolve to a
//! single synchronized highlight set.

pub mod build;
pub mod engine;
pub mod format;
pub mod highlight;
pub mod model;
pub mod panel;
pub mod parse;
pub mod sync;

pub use build::build_flow_graph;
pub use engine::{Engine, EngineError, PseudocodeError, PseudocodeSource};
pub use format::serialize;
pub use parse::{parse_module, ParseError};
