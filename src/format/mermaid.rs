// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Mermaid `flowchart TD` serializer. Declaration order follows graph
//! insertion order; the surface lays nodes out top-to-bottom following it,
//! so this order is part of the output contract.

use std::fmt::Write as _;

use crate::model::{EdgeLabel, FlowGraph, NodeShape};

/// Render the graph as Mermaid flowchart text: node declarations with style
/// directives and click hooks first, then extra style directives, then the
/// edge list.
pub fn serialize(graph: &FlowGraph) -> String {
    let mut out = String::from("flowchart TD\n");

    for node_id in graph.node_order() {
        let Some(node) = graph.node(node_id) else {
            continue;
        };
        let label = escape_label(node.label());
        match node.shape() {
            NodeShape::Rectangle => {
                let _ = writeln!(out, "    {node_id}[\"{label}\"]");
            }
            NodeShape::Diamond => {
                let _ = writeln!(out, "    {node_id}{{\"{label}\"}}");
            }
            NodeShape::Parallelogram => {
                let _ = writeln!(out, "    {node_id}[/\"{label}\"/]");
            }
            NodeShape::Terminal => {
                let _ = writeln!(out, "    {node_id}([\"{label}\"])");
            }
            NodeShape::FunctionEntry => {
                let _ = writeln!(out, "    {node_id}[[\"{label}\"]]");
            }
            NodeShape::Spacer => {
                let _ = writeln!(out, "    {node_id}[ ]");
                let _ = writeln!(out, "    style {node_id} fill:transparent,stroke:transparent");
                continue;
            }
        }
        if let Some(style) = node.style() {
            let _ = writeln!(out, "    style {node_id} {style}");
        }
        // sentinels carry no line mapping and take no clicks
        if !node_id.is_sentinel() {
            let _ = writeln!(out, "    click {node_id} nodeClick");
        }
    }

    for (node_id, style) in graph.extra_styles() {
        let _ = writeln!(out, "    style {node_id} {style}");
    }

    for edge in graph.edges() {
        let from = edge.from_node_id();
        let to = edge.to_node_id();
        if edge.dotted() {
            let label = edge.label().unwrap_or(EdgeLabel::Calls);
            let _ = writeln!(out, "    {from} -.->|{}| {to}", label.as_str());
        } else if let Some(label) = edge.label() {
            let _ = writeln!(out, "    {from} -->|{}| {to}", label.as_str());
        } else {
            let _ = writeln!(out, "    {from} --> {to}");
        }
    }

    out
}

/// Escape characters Mermaid treats as markup inside a quoted label.
fn escape_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '(' => escaped.push_str("&#40;"),
            ')' => escaped.push_str("&#41;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_label, serialize};
    use crate::model::{EdgeLabel, FlowGraph, NodeId, NodeShape};

    fn node_id(value: &str) -> NodeId {
        NodeId::new(value).expect("node id")
    }

    #[test]
    fn escapes_mermaid_markup() {
        assert_eq!(
            escape_label("print('x' < 1)"),
            "print&#40;&apos;x&apos; &lt; 1&#41;"
        );
    }

    #[test]
    fn serializes_nodes_then_edges_in_insertion_order() {
        let mut graph = FlowGraph::new();
        graph.add_node(
            NodeId::start(),
            "Start",
            NodeShape::Terminal,
            Some("fill:#c8e6c9".to_owned()),
            None,
        );
        graph.add_node(
            node_id("node1"),
            "if x > 0",
            NodeShape::Diamond,
            Some("fill:#e8f5e9".to_owned()),
            Some(1),
        );
        graph.add_node(
            node_id("node2"),
            "print(x)",
            NodeShape::Parallelogram,
            None,
            Some(2),
        );
        graph.add_edge(NodeId::start(), node_id("node1"), None);
        graph.add_edge(node_id("node1"), node_id("node2"), Some(EdgeLabel::Yes));
        graph.add_node_style(node_id("node2"), "stroke:#e91e63");

        let rendered = serialize(&graph);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec![
                "flowchart TD",
                "    Start([\"Start\"])",
                "    style Start fill:#c8e6c9",
                "    node1{\"if x &gt; 0\"}",
                "    style node1 fill:#e8f5e9",
                "    click node1 nodeClick",
                "    node2[/\"print&#40;x&#41;\"/]",
                "    click node2 nodeClick",
                "    style node2 stroke:#e91e63",
                "    Start --> node1",
                "    node1 -->|Yes| node2",
            ]
        );
    }

    #[test]
    fn call_edges_render_dotted() {
        let mut graph = FlowGraph::new();
        graph.add_node(node_id("node1"), "Call f()", NodeShape::Rectangle, None, Some(1));
        graph.add_node(
            node_id("func_f"),
            "Function: f()",
            NodeShape::FunctionEntry,
            None,
            Some(3),
        );
        graph.add_call_edge(node_id("node1"), node_id("func_f"));

        assert!(serialize(&graph).contains("    node1 -.->|calls| func_f\n"));
    }
}
