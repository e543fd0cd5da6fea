// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Command-level surface tying the pieces together: flowchart generation,
//! one-shot pseudocode conversion, history clearing and interaction
//! dispatch. Outbound surface commands go through a single ordered queue so
//! clear-then-set highlight sequences are applied in arrival order.

mod service;

pub use service::{PseudocodeError, PseudocodeSource};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::build::build_flow_graph;
use crate::format::serialize;
use crate::highlight::{
    on_node_click, on_pseudocode_click, on_source_selection, HighlightError, HighlightUpdate,
};
use crate::model::{DocumentId, NodeId, PanelState};
use crate::panel::{highlight_commands, parse_event, PanelCommand, PanelEvent};
use crate::parse::{parse_module, ParseError};
use crate::sync::align::align;
use crate::sync::{observe_edit, DocumentSnapshot, EditClass};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Parse(ParseError),
    Pseudocode(PseudocodeError),
    /// Conversion is one-shot per document epoch; it was already done.
    AlreadyGenerated,
    /// A structural edit invalidated the document while the request was in
    /// flight; the stale result was discarded.
    Superseded,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "flowchart generation failed: {err}"),
            Self::Pseudocode(err) => write!(f, "pseudocode generation failed: {err}"),
            Self::AlreadyGenerated => {
                write!(f, "pseudocode was already generated for this document")
            }
            Self::Superseded => write!(f, "the document changed; stale result discarded"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Pseudocode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<PseudocodeError> for EngineError {
    fn from(err: PseudocodeError) -> Self {
        Self::Pseudocode(err)
    }
}

/// Single-active-document engine. Owns the panel state and the outbound
/// command queue; interaction events come in as JSON messages.
pub struct Engine<S> {
    state: PanelState,
    service: S,
    outbound: mpsc::UnboundedSender<PanelCommand>,
}

impl<S: PseudocodeSource> Engine<S> {
    pub fn new(service: S) -> (Self, mpsc::UnboundedReceiver<PanelCommand>) {
        let (outbound, receiver) = mpsc::unbounded_channel();
        (
            Self {
                state: PanelState::new(),
                service,
                outbound,
            },
            receiver,
        )
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    fn send(&self, command: PanelCommand) {
        // a closed queue means the panel is gone; nothing left to update
        let _ = self.outbound.send(command);
    }

    /// Parse the source, build the graph and publish it to the rendering
    /// surface. Fails atomically: on a parse error no partial graph or
    /// mapping is published.
    pub fn generate_flowchart(
        &mut self,
        document_id: DocumentId,
        text: &str,
    ) -> Result<(), EngineError> {
        let stmts = parse_module(text)?;
        let graph = build_flow_graph(&stmts);

        self.state.set_document_id(Some(document_id));
        self.state.rebuild_from_graph(&graph);
        self.state.record_snapshot(DocumentSnapshot::capture(text));

        self.send(PanelCommand::RenderFlowchart {
            mermaid: serialize(&graph),
            node_order: graph
                .node_order()
                .iter()
                .map(|node_id| node_id.as_str().to_owned())
                .collect(),
        });
        Ok(())
    }

    /// Classify a document change and apply the matching invalidation.
    pub fn document_edited(&mut self, text: &str) -> EditClass {
        let class = observe_edit(&mut self.state, text);
        if class == EditClass::Structural {
            self.send(PanelCommand::ClearHighlights);
            self.send(PanelCommand::UpdatePseudocode {
                text: self.state.history_text(),
            });
        }
        class
    }

    /// One-shot pseudocode conversion for the current document. Rejected if
    /// already generated; a result that arrives after a structural edit is
    /// discarded instead of committed.
    pub async fn convert_to_pseudocode(&mut self, text: &str) -> Result<(), EngineError> {
        if self.state.fully_generated() {
            return Err(EngineError::AlreadyGenerated);
        }
        let epoch = self.state.epoch();
        let pseudocode = self.service.generate(text).await?;
        self.commit_pseudocode(epoch, text, pseudocode)
    }

    /// Commit a generation result captured under `epoch`. Split from
    /// [`Self::convert_to_pseudocode`] so the stale-result path stays
    /// directly testable.
    pub fn commit_pseudocode(
        &mut self,
        epoch: u64,
        text: &str,
        pseudocode: String,
    ) -> Result<(), EngineError> {
        if self.state.epoch() != epoch {
            return Err(EngineError::Superseded);
        }

        let pairs = align(text, &pseudocode);
        self.state.install_alignment(pairs);
        self.state.push_history(pseudocode);
        self.send(PanelCommand::UpdatePseudocode {
            text: self.state.history_text(),
        });
        Ok(())
    }

    /// Reset pseudocode history and mapping, keeping the graph.
    pub fn clear_history(&mut self) {
        self.state.clear_history();
        self.send(PanelCommand::UpdatePseudocode {
            text: self.state.history_text(),
        });
    }

    /// Decode and dispatch one inbound surface message. Boundary rejections
    /// and stale-mapping refusals are reported through the queue; they never
    /// escape as errors.
    pub fn handle_message(&mut self, message: &Value) {
        let event = match parse_event(message) {
            Ok(event) => event,
            Err(err) => {
                self.send(PanelCommand::Error {
                    reason: err.reason().to_owned(),
                    detail: Some(err.to_string()),
                });
                return;
            }
        };
        match event {
            PanelEvent::NodeClicked { node_id } => {
                let Ok(node_id) = NodeId::new(node_id) else {
                    self.send(PanelCommand::Error {
                        reason: "invalid_payload".to_owned(),
                        detail: Some("malformed node id".to_owned()),
                    });
                    return;
                };
                self.apply_highlight(on_node_click(&self.state, &node_id));
            }
            PanelEvent::SourceSelectionChanged {
                start_line,
                end_line,
            } => {
                self.apply_highlight(on_source_selection(&self.state, start_line, end_line));
            }
            PanelEvent::PseudocodeLineClicked { pseudocode_line } => {
                self.apply_highlight(on_pseudocode_click(&self.state, &[pseudocode_line]));
            }
            PanelEvent::PseudocodeLinesClicked { pseudocode_lines } => {
                self.apply_highlight(on_pseudocode_click(&self.state, &pseudocode_lines));
            }
            PanelEvent::ClearPseudocodeHistory => self.clear_history(),
            PanelEvent::RequestClearHighlights => self.send(PanelCommand::ClearHighlights),
        }
    }

    fn apply_highlight(&self, result: Result<HighlightUpdate, HighlightError>) {
        match result {
            Ok(update) => {
                for command in highlight_commands(&update) {
                    self.send(command);
                }
            }
            Err(err) => self.send(PanelCommand::ShowWarning {
                message: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::{Engine, EngineError, PseudocodeError, PseudocodeSource};
    use crate::model::{DocumentId, PSEUDOCODE_PLACEHOLDER};
    use crate::panel::PanelCommand;
    use crate::parse::ParseError;
    use crate::sync::EditClass;

    struct FixedSource(Result<String, PseudocodeError>);

    impl PseudocodeSource for FixedSource {
        async fn generate(&self, _source: &str) -> Result<String, PseudocodeError> {
            self.0.clone()
        }
    }

    fn document_id() -> DocumentId {
        DocumentId::new("demo.py").expect("document id")
    }

    fn drain(receiver: &mut UnboundedReceiver<PanelCommand>) -> Vec<PanelCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = receiver.try_recv() {
            commands.push(command);
        }
        commands
    }

    #[tokio::test]
    async fn generate_then_click_round_trip() {
        let (mut engine, mut receiver) =
            Engine::new(FixedSource(Ok("SET x TO 1\nPRINT x\n".to_owned())));
        let text = "x = 1\nprint(x)\n";
        engine.generate_flowchart(document_id(), text).expect("build");

        match drain(&mut receiver).as_slice() {
            [PanelCommand::RenderFlowchart { mermaid, node_order }] => {
                assert!(mermaid.starts_with("flowchart TD\n"));
                assert_eq!(node_order, &["Start", "node1", "node2", "End"]);
            }
            other => panic!("expected one render command, got {other:?}"),
        }

        engine.convert_to_pseudocode(text).await.expect("convert");
        drain(&mut receiver);

        engine.handle_message(&json!({
            "command": "panel.nodeClicked",
            "nodeId": "node2",
        }));
        let commands = drain(&mut receiver);
        assert_eq!(commands[0], PanelCommand::ClearHighlights);
        assert_eq!(
            commands[1],
            PanelCommand::ApplyHighlight {
                node_ids: vec!["node2".to_owned()],
                source_lines: vec![2],
                pseudocode_lines: vec![2],
            }
        );
    }

    #[tokio::test]
    async fn parse_failure_publishes_nothing() {
        let (mut engine, mut receiver) = Engine::new(FixedSource(Ok(String::new())));
        let err = engine
            .generate_flowchart(document_id(), "def broken(:\n")
            .expect_err("must fail");
        assert!(matches!(err, EngineError::Parse(ParseError::Syntax { .. })));
        assert!(drain(&mut receiver).is_empty());
        assert!(engine.state().line_to_nodes().is_empty());
    }

    #[tokio::test]
    async fn conversion_is_one_shot() {
        let (mut engine, _receiver) = Engine::new(FixedSource(Ok("SET x TO 1\n".to_owned())));
        let text = "x = 1\n";
        engine.generate_flowchart(document_id(), text).expect("build");
        engine.convert_to_pseudocode(text).await.expect("first");

        assert_eq!(
            engine.convert_to_pseudocode(text).await,
            Err(EngineError::AlreadyGenerated)
        );
    }

    #[tokio::test]
    async fn service_failure_leaves_state_untouched() {
        let (mut engine, mut receiver) = Engine::new(FixedSource(Err(
            PseudocodeError::AuthMissing,
        )));
        let text = "x = 1\n";
        engine.generate_flowchart(document_id(), text).expect("build");
        drain(&mut receiver);

        let err = engine.convert_to_pseudocode(text).await.expect_err("fails");
        assert_eq!(
            err,
            EngineError::Pseudocode(PseudocodeError::AuthMissing)
        );
        assert!(!engine.state().fully_generated());
        assert_eq!(engine.state().history_len(), 0);
        assert!(drain(&mut receiver).is_empty());
    }

    #[tokio::test]
    async fn stale_result_is_discarded_after_structural_edit() {
        let (mut engine, _receiver) = Engine::new(FixedSource(Ok("SET x TO 1\n".to_owned())));
        engine
            .generate_flowchart(document_id(), "x = 1\n")
            .expect("build");

        let epoch = engine.state().epoch();
        assert_eq!(engine.document_edited("x = 2\n"), EditClass::Structural);

        assert_eq!(
            engine.commit_pseudocode(epoch, "x = 1\n", "SET x TO 1\n".to_owned()),
            Err(EngineError::Superseded)
        );
        assert!(!engine.state().fully_generated());
    }

    #[tokio::test]
    async fn whitespace_edit_makes_clicks_warn() {
        let (mut engine, mut receiver) = Engine::new(FixedSource(Ok("SET x TO 1\n".to_owned())));
        engine
            .generate_flowchart(document_id(), "x = 1\n")
            .expect("build");
        drain(&mut receiver);

        assert_eq!(
            engine.document_edited("\n\nx = 1\n"),
            EditClass::WhitespaceShift
        );
        engine.handle_message(&json!({
            "command": "panel.nodeClicked",
            "nodeId": "node1",
        }));

        match drain(&mut receiver).as_slice() {
            [PanelCommand::ShowWarning { message }] => {
                assert!(message.contains("out of date"));
            }
            other => panic!("expected a warning, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn clear_history_resets_to_placeholder() {
        let (mut engine, mut receiver) = Engine::new(FixedSource(Ok("SET x TO 1\n".to_owned())));
        let text = "x = 1\n";
        engine.generate_flowchart(document_id(), text).expect("build");
        engine.convert_to_pseudocode(text).await.expect("convert");
        drain(&mut receiver);

        engine.handle_message(&json!({"command": "panel.clearPseudocodeHistory"}));

        assert_eq!(engine.state().history_len(), 0);
        assert!(!engine.state().fully_generated());
        assert!(!engine.state().mapping_dirty());
        match drain(&mut receiver).as_slice() {
            [PanelCommand::UpdatePseudocode { text }] => {
                assert_eq!(text, PSEUDOCODE_PLACEHOLDER);
            }
            other => panic!("expected a pseudocode update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn boundary_rejections_are_reported_not_dispatched() {
        let (mut engine, mut receiver) = Engine::new(FixedSource(Ok(String::new())));
        engine.handle_message(&json!({"command": "panel.noSuchThing"}));
        engine.handle_message(&json!({"command": "panel.nodeClicked", "nodeId": 7}));

        let commands = drain(&mut receiver);
        assert_eq!(commands.len(), 2);
        for (command, reason) in commands.iter().zip(["unknown_command", "invalid_payload"]) {
            match command {
                PanelCommand::Error { reason: actual, .. } => assert_eq!(actual, reason),
                other => panic!("expected an error command, got {other:?}"),
            }
        }
    }
}
