// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Line-mapping synchronization: normalized content hashing, edit
//! classification against the last-seen document snapshot, and the
//! source/pseudocode aligner.

pub mod align;

use sha2::{Digest, Sha256};

use crate::model::PanelState;

/// Last-observed document content, reduced to what edit classification
/// needs: the whitespace-insensitive hash and the raw line count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    hash: String,
    line_count: usize,
}

impl DocumentSnapshot {
    pub fn capture(text: &str) -> Self {
        Self {
            hash: normalized_hash(text),
            line_count: text.split('\n').count(),
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }
}

/// Normalize source for hashing: unified line endings, trimmed lines with
/// inner whitespace runs collapsed, empty lines dropped. Insensitive to pure
/// reformatting, still sensitive to token-level edits.
pub fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn normalized_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(text).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Outcome of comparing an edited document against the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditClass {
    /// No snapshot existed yet; one was recorded, nothing else changed.
    FirstObservation,
    /// Hash and line count both unchanged.
    Unchanged,
    /// Hash unchanged, line count changed: whitespace-only edit. Mapping
    /// data is retained but marked dirty, since recorded line numbers can
    /// no longer be trusted.
    WhitespaceShift,
    /// Hash changed: line-to-statement correspondence is gone. All mapping
    /// tables, history and generation flags were reset and the epoch
    /// advanced.
    Structural,
}

/// Classify a document edit and apply the corresponding state transition.
pub fn observe_edit(state: &mut PanelState, text: &str) -> EditClass {
    let snapshot = DocumentSnapshot::capture(text);
    let Some(previous) = state.snapshot() else {
        state.record_snapshot(snapshot);
        return EditClass::FirstObservation;
    };

    if previous.hash == snapshot.hash {
        if previous.line_count == snapshot.line_count {
            return EditClass::Unchanged;
        }
        state.mark_mapping_dirty();
        state.record_snapshot(snapshot);
        return EditClass::WhitespaceShift;
    }

    state.reset_for_structural_edit();
    state.record_snapshot(snapshot);
    EditClass::Structural
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{normalize, normalized_hash, observe_edit, EditClass};
    use crate::model::{FlowGraph, NodeId, NodeShape, PanelState};
    use crate::sync::align::LinePair;

    #[rstest]
    #[case("x = 1\n\n\ny = 2\n", "x = 1\ny = 2")]
    #[case("  x   =    1  ", "x = 1")]
    #[case("a\r\nb\r\n", "a\nb")]
    #[case("", "")]
    fn normalization(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[rstest]
    #[case("x = 1\ny = 2\n", "x=1\ny=2\n", false)]
    #[case("x = 1\n", "\n\nx = 1\n", true)]
    #[case("if a:\n    pass\n", "if a:\n        pass\n", true)]
    fn hash_sensitivity(#[case] left: &str, #[case] right: &str, #[case] same: bool) {
        assert_eq!(normalized_hash(left) == normalized_hash(right), same);
    }

    fn populated_state(text: &str) -> PanelState {
        let mut graph = FlowGraph::new();
        graph.add_node(
            NodeId::new("node1").expect("node id"),
            "x = 1",
            NodeShape::Rectangle,
            None,
            Some(1),
        );
        let mut state = PanelState::new();
        state.rebuild_from_graph(&graph);
        state.install_alignment(vec![LinePair {
            source_line: 1,
            pseudocode_line: 1,
        }]);
        state.push_history("SET x TO 1");
        assert_eq!(observe_edit(&mut state, text), EditClass::FirstObservation);
        state
    }

    #[test]
    fn unchanged_text_is_a_no_op() {
        let text = "x = 1\n";
        let mut state = populated_state(text);
        assert_eq!(observe_edit(&mut state, text), EditClass::Unchanged);
        assert!(!state.mapping_dirty());
        assert!(state.fully_generated());
    }

    #[test]
    fn whitespace_shift_marks_dirty_but_keeps_data() {
        let mut state = populated_state("x = 1\n");
        let class = observe_edit(&mut state, "\n\nx = 1\n");

        assert_eq!(class, EditClass::WhitespaceShift);
        assert!(state.mapping_dirty());
        assert!(!state.line_to_nodes().is_empty());
        assert_eq!(state.pseudocode_mapping_len(), 1);
        assert_eq!(state.history_len(), 1);
    }

    #[test]
    fn structural_edit_resets_everything() {
        let mut state = populated_state("x = 1\n");
        let epoch = state.epoch();
        let class = observe_edit(&mut state, "x = 2\n");

        assert_eq!(class, EditClass::Structural);
        assert!(!state.mapping_dirty());
        assert!(state.line_to_nodes().is_empty());
        assert_eq!(state.pseudocode_mapping_len(), 0);
        assert_eq!(state.history_len(), 0);
        assert!(!state.fully_generated());
        assert_eq!(state.epoch(), epoch + 1);
    }

    #[test]
    fn whitespace_shift_then_same_text_is_unchanged() {
        let mut state = populated_state("x = 1\n");
        observe_edit(&mut state, "\n\nx = 1\n");
        assert_eq!(observe_edit(&mut state, "\n\nx = 1\n"), EditClass::Unchanged);
    }
}
