// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Panel boundary: the JSON message types exchanged with the rendering
//! surfaces and the inbound router. The router only decides who handles a
//! message, never what to do with it; structurally invalid payloads are
//! rejected with a typed reason and never dispatched.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::highlight::HighlightUpdate;
use crate::model::NodeId;

/// Inbound interaction event from a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "command")]
pub enum PanelEvent {
    #[serde(rename = "panel.nodeClicked")]
    NodeClicked {
        #[serde(rename = "nodeId")]
        node_id: String,
    },
    #[serde(rename = "panel.sourceSelectionChanged")]
    SourceSelectionChanged {
        #[serde(rename = "startLine")]
        start_line: u32,
        #[serde(rename = "endLine")]
        end_line: u32,
    },
    #[serde(rename = "panel.pseudocodeLineClicked")]
    PseudocodeLineClicked {
        #[serde(rename = "pseudocodeLine")]
        pseudocode_line: u32,
    },
    #[serde(rename = "panel.pseudocodeLinesClicked")]
    PseudocodeLinesClicked {
        #[serde(rename = "pseudocodeLines")]
        pseudocode_lines: Vec<u32>,
    },
    #[serde(rename = "panel.clearPseudocodeHistory")]
    ClearPseudocodeHistory,
    #[serde(rename = "panel.requestClearHighlights")]
    RequestClearHighlights,
}

const KNOWN_COMMANDS: &[&str] = &[
    "panel.nodeClicked",
    "panel.sourceSelectionChanged",
    "panel.pseudocodeLineClicked",
    "panel.pseudocodeLinesClicked",
    "panel.clearPseudocodeHistory",
    "panel.requestClearHighlights",
];

/// Outbound instruction to a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "command")]
pub enum PanelCommand {
    #[serde(rename = "panel.renderFlowchart")]
    RenderFlowchart {
        mermaid: String,
        #[serde(rename = "nodeOrder")]
        node_order: Vec<String>,
    },
    #[serde(rename = "panel.updatePseudocode")]
    UpdatePseudocode { text: String },
    #[serde(rename = "panel.applyHighlight")]
    ApplyHighlight {
        #[serde(rename = "nodeIds")]
        node_ids: Vec<String>,
        #[serde(rename = "sourceLines")]
        source_lines: Vec<u32>,
        #[serde(rename = "pseudocodeLines")]
        pseudocode_lines: Vec<u32>,
    },
    #[serde(rename = "panel.clearHighlights")]
    ClearHighlights,
    #[serde(rename = "panel.revealSource")]
    RevealSource {
        #[serde(rename = "startLine")]
        start_line: u32,
        #[serde(rename = "endLine")]
        end_line: u32,
    },
    #[serde(rename = "panel.showWarning")]
    ShowWarning { message: String },
    #[serde(rename = "panel.error")]
    Error {
        reason: String,
        detail: Option<String>,
    },
}

/// Rejection of an inbound message at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    InvalidPayload { command: String },
    UnknownCommand { command: String },
}

impl EventError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidPayload { .. } => "invalid_payload",
            Self::UnknownCommand { .. } => "unknown_command",
        }
    }
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPayload { command } => write!(f, "invalid payload for command: {command}"),
            Self::UnknownCommand { command } => write!(f, "unhandled command: {command}"),
        }
    }
}

impl std::error::Error for EventError {}

/// Validate and decode an inbound message. Unknown commands and malformed
/// payloads get distinct rejection reasons.
pub fn parse_event(message: &Value) -> Result<PanelEvent, EventError> {
    let Some(command) = message.get("command").and_then(Value::as_str) else {
        return Err(EventError::InvalidPayload {
            command: String::new(),
        });
    };
    if !KNOWN_COMMANDS.contains(&command) {
        return Err(EventError::UnknownCommand {
            command: command.to_owned(),
        });
    }

    let event: PanelEvent =
        serde_json::from_value(message.clone()).map_err(|_| EventError::InvalidPayload {
            command: command.to_owned(),
        })?;
    if let PanelEvent::NodeClicked { node_id } = &event {
        if node_id.is_empty() {
            return Err(EventError::InvalidPayload {
                command: command.to_owned(),
            });
        }
    }
    Ok(event)
}

/// Translate a highlight update into surface commands, always clearing the
/// previous set before applying a new one.
pub fn highlight_commands(update: &HighlightUpdate) -> Vec<PanelCommand> {
    match update {
        HighlightUpdate::Clear => vec![PanelCommand::ClearHighlights],
        HighlightUpdate::Apply {
            node_ids,
            source_lines,
            pseudocode_lines,
            reveal,
        } => {
            let mut commands = vec![
                PanelCommand::ClearHighlights,
                PanelCommand::ApplyHighlight {
                    node_ids: node_ids.iter().map(NodeId::to_string).collect(),
                    source_lines: source_lines.clone(),
                    pseudocode_lines: pseudocode_lines.clone(),
                },
            ];
            if let Some((start_line, end_line)) = reveal {
                commands.push(PanelCommand::RevealSource {
                    start_line: *start_line,
                    end_line: *end_line,
                });
            }
            commands
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{highlight_commands, parse_event, EventError, PanelCommand, PanelEvent};
    use crate::highlight::HighlightUpdate;
    use crate::model::NodeId;

    #[test]
    fn decodes_node_click() {
        let event = parse_event(&json!({
            "command": "panel.nodeClicked",
            "nodeId": "node3",
        }))
        .expect("valid");
        assert_eq!(
            event,
            PanelEvent::NodeClicked {
                node_id: "node3".to_owned()
            }
        );
    }

    #[test]
    fn decodes_line_range_click() {
        let event = parse_event(&json!({
            "command": "panel.pseudocodeLinesClicked",
            "pseudocodeLines": [2, 3, 4],
        }))
        .expect("valid");
        assert_eq!(
            event,
            PanelEvent::PseudocodeLinesClicked {
                pseudocode_lines: vec![2, 3, 4]
            }
        );
    }

    #[test]
    fn unknown_command_is_typed() {
        let err = parse_event(&json!({"command": "panel.doesNotExist"})).expect_err("rejected");
        assert_eq!(
            err,
            EventError::UnknownCommand {
                command: "panel.doesNotExist".to_owned()
            }
        );
        assert_eq!(err.reason(), "unknown_command");
    }

    #[test]
    fn malformed_payload_is_rejected_before_dispatch() {
        let missing_field = parse_event(&json!({"command": "panel.nodeClicked"}));
        let wrong_type = parse_event(&json!({
            "command": "panel.pseudocodeLineClicked",
            "pseudocodeLine": "seven",
        }));
        let empty_node = parse_event(&json!({
            "command": "panel.nodeClicked",
            "nodeId": "",
        }));
        let no_command = parse_event(&json!({"nodeId": "node1"}));

        for result in [missing_field, wrong_type, empty_node, no_command] {
            assert!(matches!(result, Err(EventError::InvalidPayload { .. })));
        }
    }

    #[test]
    fn highlight_updates_clear_before_setting() {
        let update = HighlightUpdate::Apply {
            node_ids: vec![NodeId::new("node2").expect("node id")],
            source_lines: vec![3],
            pseudocode_lines: vec![1],
            reveal: Some((3, 3)),
        };
        let commands = highlight_commands(&update);
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0], PanelCommand::ClearHighlights);
        assert!(matches!(commands[1], PanelCommand::ApplyHighlight { .. }));
        assert_eq!(
            commands[2],
            PanelCommand::RevealSource {
                start_line: 3,
                end_line: 3
            }
        );

        assert_eq!(
            highlight_commands(&HighlightUpdate::Clear),
            vec![PanelCommand::ClearHighlights]
        );
    }
}
