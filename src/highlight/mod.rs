// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Highlight coordination across the three surfaces: source editor, graph
//! and pseudocode view. Every interaction resolves to a single
//! [`HighlightUpdate`]; applying one implicitly clears the previous
//! highlight set, so at most one set is active at a time.

use crate::model::{NodeId, PanelState};

/// One highlight instruction, broadcast to all surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightUpdate {
    Clear,
    Apply {
        node_ids: Vec<NodeId>,
        source_lines: Vec<u32>,
        pseudocode_lines: Vec<u32>,
        /// Source range to scroll into view, when the interaction came from
        /// the pseudocode surface.
        reveal: Option<(u32, u32)>,
    },
}

/// Refusal to produce a highlight. Recoverable and user-directed, never a
/// crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightError {
    /// Line numbers shifted since the mappings were recorded. The user must
    /// undo the whitespace change or regenerate the flowchart.
    StaleMapping,
}

impl std::fmt::Display for HighlightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaleMapping => write!(
                f,
                "line mappings are out of date; undo the whitespace change or regenerate the flowchart"
            ),
        }
    }
}

impl std::error::Error for HighlightError {}

fn ensure_fresh(state: &PanelState) -> Result<(), HighlightError> {
    if state.mapping_dirty() {
        return Err(HighlightError::StaleMapping);
    }
    Ok(())
}

fn pseudocode_lines_for(state: &PanelState, source_lines: &[u32]) -> Vec<u32> {
    source_lines
        .iter()
        .filter_map(|line| state.pseudocode_line_for_source(*line))
        .collect()
}

/// Selection of a contiguous source line range. Lines without nodes
/// contribute nothing; an entirely unmapped range clears instead.
pub fn on_source_selection(
    state: &PanelState,
    start_line: u32,
    end_line: u32,
) -> Result<HighlightUpdate, HighlightError> {
    ensure_fresh(state)?;

    let (start_line, end_line) = if start_line <= end_line {
        (start_line, end_line)
    } else {
        (end_line, start_line)
    };

    let source_lines: Vec<u32> = (start_line..=end_line).collect();
    let node_ids: Vec<NodeId> = source_lines
        .iter()
        .flat_map(|line| state.nodes_for_line(*line).iter().cloned())
        .collect();
    if node_ids.is_empty() {
        return Ok(HighlightUpdate::Clear);
    }

    let pseudocode_lines = pseudocode_lines_for(state, &source_lines);
    Ok(HighlightUpdate::Apply {
        node_ids,
        source_lines,
        pseudocode_lines,
        reveal: None,
    })
}

/// Click on a graph node. The `Start`/`End` sentinels are line-less and
/// always clear, without a line lookup and regardless of dirtiness.
pub fn on_node_click(
    state: &PanelState,
    node_id: &NodeId,
) -> Result<HighlightUpdate, HighlightError> {
    if node_id.is_sentinel() {
        return Ok(HighlightUpdate::Clear);
    }
    ensure_fresh(state)?;

    let Some(line) = state.line_for_node(node_id) else {
        return Ok(HighlightUpdate::Clear);
    };

    let source_lines = vec![line];
    let pseudocode_lines = pseudocode_lines_for(state, &source_lines);
    Ok(HighlightUpdate::Apply {
        node_ids: vec![node_id.clone()],
        source_lines,
        pseudocode_lines,
        reveal: None,
    })
}

/// Click on one or more pseudocode lines. Unmapped lines are dropped
/// silently; if nothing resolves, the highlights clear.
pub fn on_pseudocode_click(
    state: &PanelState,
    pseudocode_lines: &[u32],
) -> Result<HighlightUpdate, HighlightError> {
    ensure_fresh(state)?;

    let source_lines: Vec<u32> = pseudocode_lines
        .iter()
        .filter_map(|line| state.source_line_for_pseudocode(*line))
        .collect();
    if source_lines.is_empty() {
        return Ok(HighlightUpdate::Clear);
    }

    let node_ids: Vec<NodeId> = source_lines
        .iter()
        .flat_map(|line| state.nodes_for_line(*line).iter().cloned())
        .collect();

    let start = source_lines.iter().copied().min().unwrap_or(0);
    let end = source_lines.iter().copied().max().unwrap_or(start);
    let resolved_pseudocode: Vec<u32> = pseudocode_lines
        .iter()
        .copied()
        .filter(|line| state.source_line_for_pseudocode(*line).is_some())
        .collect();

    Ok(HighlightUpdate::Apply {
        node_ids,
        source_lines,
        pseudocode_lines: resolved_pseudocode,
        reveal: Some((start, end)),
    })
}
