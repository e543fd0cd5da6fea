// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Rendering of a flow graph into the declarative text artifact consumed by
//! the graph surface.

pub mod mermaid;

pub use mermaid::serialize;
