// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Flow graph construction. A single depth-first pass over the statement
//! tree produces the graph, the line-to-node mapping and the node execution
//! order, with explicit bookkeeping for branch merges, loop exits and
//! deferred edge labels.
//!
//! The traversal context lives on the builder and is value-copied around
//! function-definition sub-visits, which build self-contained sub-graphs
//! wired to the rest of the picture only through dashed call edges.

use std::collections::BTreeMap;

use crate::model::{EdgeHandle, EdgeLabel, FlowGraph, NodeId, NodeShape};
use crate::parse::{CallInfo, Callee, ElifClause, ExprInfo, ImportName, Stmt, StmtKind};

const STYLE_START: &str = "fill:#c8e6c9,stroke:#1b5e20,stroke-width:2px";
const STYLE_END: &str = "fill:#ffcdd2,stroke:#b71c1c,stroke-width:2px";
const STYLE_CONDITION: &str = "fill:#e8f5e9,stroke:#2e7d32,stroke-width:2px";
const STYLE_LOOP: &str = "fill:#e3f2fd,stroke:#0d47a1,stroke-width:2px";
const STYLE_BREAK: &str = "fill:#ffccbc,stroke:#d84315,stroke-width:2px";
const STYLE_CONTINUE: &str = "fill:#ffe0b2,stroke:#ef6c00,stroke-width:2px";
const STYLE_RETURN: &str = "fill:#ffebee,stroke:#b71c1c,stroke-width:2px";
const STYLE_PASS: &str = "fill:#f5f5f5,stroke:#9e9e9e,stroke-width:1px,stroke-dasharray:5,5";
const STYLE_ASSERT: &str = "fill:#ffebee,stroke:#c62828,stroke-width:2px";
const STYLE_GLOBAL: &str = "fill:#e8f5e9,stroke:#388e3c,stroke-width:1px,stroke-dasharray:3,3";
const STYLE_NONLOCAL: &str = "fill:#e3f2fd,stroke:#1976d2,stroke-width:1px,stroke-dasharray:3,3";
const STYLE_IMPORT: &str = "fill:#fff3e0,stroke:#e65100,stroke-width:2px";
const STYLE_FUNCTION: &str = "fill:#e1f5fe,stroke:#01579b,stroke-width:3px";
const STYLE_CLASS: &str = "fill:#f3e5f5,stroke:#4a148c,stroke-width:2px";
const STYLE_PRINT: &str = "fill:#f3e5f5,stroke:#6a1b9a,stroke-width:2px";
const STYLE_INPUT: &str = "fill:#e8eaf6,stroke:#283593,stroke-width:2px";
const STYLE_CALL: &str = "fill:#fce4ec,stroke:#880e4f,stroke-width:3px";
const STYLE_METHOD_CALL: &str = "fill:#fce4ec,stroke:#880e4f,stroke-width:2px";
const STYLE_ASSIGN: &str = "fill:#ffffff,stroke:#424242,stroke-width:2px";
const STYLE_TRY: &str = "fill:#fff9c4,stroke:#f57c00,stroke-width:2px";
const STYLE_CALL_ASSIGN: &str = "stroke:#e91e63,stroke-width:3px";

/// Build the flow graph for a module's statement tree.
///
/// Function and class definitions are visited first so that forward
/// references to later definitions still resolve when top-level call edges
/// are drawn; the top-level flow is then visited from a fresh `Start`.
pub fn build_flow_graph(stmts: &[Stmt]) -> FlowGraph {
    let mut builder = FlowGraphBuilder::new();
    builder.build_module(stmts);
    builder.into_graph()
}

/// Context saved around a function-definition sub-visit.
#[derive(Debug, Clone)]
struct SavedContext {
    current_node: Option<NodeId>,
    branch_ends: Vec<NodeId>,
    loop_stack: Vec<NodeId>,
    pending_no_label: Option<NodeId>,
    break_to_loop: BTreeMap<NodeId, NodeId>,
}

#[derive(Debug)]
struct FlowGraphBuilder {
    graph: FlowGraph,
    next_id: u32,
    /// Node the next statement connects from; `None` means control flow has
    /// terminated on all live paths or several unmerged tails are pending.
    current_node: Option<NodeId>,
    /// Unmerged tails from a just-closed conditional or loop, drained into
    /// the next statement's node.
    branch_ends: Vec<NodeId>,
    /// Node whose sole pending outgoing edge gets a `No` (or `End`, for a
    /// loop header) label the first time a successor attaches.
    pending_no_label: Option<NodeId>,
    loop_stack: Vec<NodeId>,
    break_to_loop: BTreeMap<NodeId, NodeId>,
    function_defs: BTreeMap<String, NodeId>,
    /// Handles of not-yet-labeled edges per source node, most recent last.
    unlabeled_from: BTreeMap<NodeId, Vec<EdgeHandle>>,
}

impl FlowGraphBuilder {
    fn new() -> Self {
        Self {
            graph: FlowGraph::new(),
            next_id: 0,
            current_node: None,
            branch_ends: Vec::new(),
            pending_no_label: None,
            loop_stack: Vec::new(),
            break_to_loop: BTreeMap::new(),
            function_defs: BTreeMap::new(),
            unlabeled_from: BTreeMap::new(),
        }
    }

    fn into_graph(self) -> FlowGraph {
        self.graph
    }

    fn build_module(&mut self, stmts: &[Stmt]) {
        self.graph.add_node(
            NodeId::start(),
            "Start",
            NodeShape::Terminal,
            Some(STYLE_START.to_owned()),
            None,
        );
        self.current_node = Some(NodeId::start());

        // definitions first, so forward references resolve below
        for stmt in stmts {
            if matches!(
                stmt.kind,
                StmtKind::FunctionDef { .. } | StmtKind::ClassDef { .. }
            ) {
                self.visit_stmt(stmt);
            }
        }

        self.current_node = Some(NodeId::start());
        for stmt in stmts {
            if !matches!(
                stmt.kind,
                StmtKind::FunctionDef { .. } | StmtKind::ClassDef { .. }
            ) {
                self.visit_stmt(stmt);
            }
        }

        let end = NodeId::end();
        self.graph.add_node(
            end.clone(),
            "End",
            NodeShape::Terminal,
            Some(STYLE_END.to_owned()),
            None,
        );
        self.connect_into(&end);
    }

    fn next_node_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId::new(format!("node{}", self.next_id)).expect("counter ids are valid")
    }

    fn add_edge(&mut self, from: &NodeId, to: &NodeId, label: Option<EdgeLabel>) {
        let handle = self.graph.add_edge(from.clone(), to.clone(), label);
        if label.is_none() {
            self.unlabeled_from.entry(from.clone()).or_default().push(handle);
        }
    }

    /// Retroactively label the most recently appended unlabeled edge leaving
    /// `from`. No-op when no such edge exists.
    fn backfill_label(&mut self, from: &NodeId, label: EdgeLabel) {
        let Some(handles) = self.unlabeled_from.get_mut(from) else {
            return;
        };
        if let Some(handle) = handles.pop() {
            self.graph.set_edge_label(handle, label);
        }
    }

    fn is_loop_header(&self, node_id: &NodeId) -> bool {
        let label = self.graph.node_label(node_id);
        label.starts_with("while ") || label.starts_with("for ")
    }

    /// Attach `from -> to`, resolving a deferred fallthrough label when
    /// `from` is the pending-label node.
    fn connect_from(&mut self, from: &NodeId, to: &NodeId) {
        if self.pending_no_label.as_ref() == Some(from) {
            let label = if self.is_loop_header(from) {
                EdgeLabel::End
            } else {
                EdgeLabel::No
            };
            self.add_edge(from, to, Some(label));
            self.pending_no_label = None;
        } else {
            self.add_edge(from, to, None);
        }
    }

    /// Drain every live predecessor into `to`: either the pending branch
    /// tails or the single current node.
    fn connect_into(&mut self, to: &NodeId) {
        if self.current_node.is_none() && !self.branch_ends.is_empty() {
            let ends = std::mem::take(&mut self.branch_ends);
            for end in ends {
                self.connect_from(&end, to);
            }
        } else if let Some(current) = self.current_node.clone() {
            self.connect_from(&current, to);
        }
    }

    fn unreachable(&self) -> bool {
        self.current_node.is_none() && self.branch_ends.is_empty()
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::FunctionDef { name, body } => self.visit_function_def(name, body, stmt.line),
            StmtKind::ClassDef { name } => {
                if self.unreachable() {
                    return;
                }
                self.straight_line(
                    format!("Class: {name}"),
                    NodeShape::Rectangle,
                    STYLE_CLASS,
                    stmt.line,
                );
            }
            StmtKind::If {
                test,
                body,
                elifs,
                orelse,
            } => self.visit_if(test, body, elifs, orelse.as_deref(), stmt.line),
            StmtKind::While { test, body } => {
                if self.unreachable() {
                    return;
                }
                let header = self.next_node_id();
                self.graph.add_node(
                    header.clone(),
                    format!("while {test}"),
                    NodeShape::Diamond,
                    Some(STYLE_LOOP.to_owned()),
                    Some(stmt.line),
                );
                self.connect_into(&header);
                self.visit_loop_body(&header, body, true);
            }
            StmtKind::For { target, iter, body } => {
                if self.unreachable() {
                    return;
                }
                let header = self.next_node_id();
                self.graph.add_node(
                    header.clone(),
                    format!("for {target} in {iter}"),
                    NodeShape::Rectangle,
                    Some(STYLE_LOOP.to_owned()),
                    Some(stmt.line),
                );
                self.connect_into(&header);
                self.visit_loop_body(&header, body, false);
            }
            StmtKind::Break => self.visit_break(stmt.line),
            StmtKind::Continue => self.visit_continue(stmt.line),
            StmtKind::Pass => {
                if self.unreachable() {
                    return;
                }
                self.straight_line("pass".to_owned(), NodeShape::Rectangle, STYLE_PASS, stmt.line);
            }
            StmtKind::Return { value } => self.visit_return(value.as_ref(), stmt.line),
            StmtKind::Raise { exc } => self.visit_raise(exc.as_deref(), stmt.line),
            StmtKind::Assert { test, msg } => {
                if self.unreachable() {
                    return;
                }
                let label = match msg {
                    Some(msg) => format!("assert {test}, {msg}"),
                    None => format!("assert {test}"),
                };
                // a predicate, but with a single successor: assertion
                // failure is not modeled as a branch
                self.straight_line(label, NodeShape::Diamond, STYLE_ASSERT, stmt.line);
            }
            StmtKind::Global { names } => {
                if self.unreachable() {
                    return;
                }
                self.straight_line(
                    format!("global {names}"),
                    NodeShape::Rectangle,
                    STYLE_GLOBAL,
                    stmt.line,
                );
            }
            StmtKind::Nonlocal { names } => {
                if self.unreachable() {
                    return;
                }
                self.straight_line(
                    format!("nonlocal {names}"),
                    NodeShape::Rectangle,
                    STYLE_NONLOCAL,
                    stmt.line,
                );
            }
            StmtKind::Import { names } => {
                if self.unreachable() {
                    return;
                }
                let joined = names
                    .iter()
                    .map(ImportName::display)
                    .collect::<Vec<_>>()
                    .join(", ");
                self.straight_line(
                    format!("import {joined}"),
                    NodeShape::Rectangle,
                    STYLE_IMPORT,
                    stmt.line,
                );
            }
            StmtKind::ImportFrom { module, names } => {
                if self.unreachable() {
                    return;
                }
                self.straight_line(
                    format!("from {module} import {names}"),
                    NodeShape::Rectangle,
                    STYLE_IMPORT,
                    stmt.line,
                );
            }
            StmtKind::Assign { target, value } => self.visit_assign(target, value, stmt.line),
            StmtKind::AugAssign { text } => {
                if self.unreachable() {
                    return;
                }
                self.straight_line(text.clone(), NodeShape::Rectangle, STYLE_ASSIGN, stmt.line);
            }
            StmtKind::Try => {
                if self.unreachable() {
                    return;
                }
                self.straight_line(
                    "try-except".to_owned(),
                    NodeShape::Rectangle,
                    STYLE_TRY,
                    stmt.line,
                );
            }
            StmtKind::ExprCall(call) => self.visit_expr_call(call, stmt.line),
            StmtKind::Unsupported => {}
        }
    }

    /// Straight-line statement: one node, merge-or-single incoming edges,
    /// becomes the new sole current node.
    fn straight_line(
        &mut self,
        label: String,
        shape: NodeShape,
        style: &str,
        line: u32,
    ) -> NodeId {
        let node_id = self.next_node_id();
        self.graph.add_node(
            node_id.clone(),
            label,
            shape,
            Some(style.to_owned()),
            Some(line),
        );
        self.connect_into(&node_id);
        self.current_node = Some(node_id.clone());
        node_id
    }

    fn visit_function_def(&mut self, name: &str, body: &[Stmt], line: u32) {
        let func_id =
            NodeId::new(format!("func_{name}")).expect("identifiers contain no whitespace");
        self.function_defs.insert(name.to_owned(), func_id.clone());
        self.graph.add_node(
            func_id.clone(),
            format!("Function: {name}()"),
            NodeShape::FunctionEntry,
            Some(STYLE_FUNCTION.to_owned()),
            Some(line),
        );

        let saved = SavedContext {
            current_node: self.current_node.take(),
            branch_ends: std::mem::take(&mut self.branch_ends),
            loop_stack: std::mem::take(&mut self.loop_stack),
            pending_no_label: self.pending_no_label.take(),
            break_to_loop: std::mem::take(&mut self.break_to_loop),
        };
        self.current_node = Some(func_id);

        for stmt in body {
            self.visit_stmt(stmt);
        }

        self.current_node = saved.current_node;
        self.branch_ends = saved.branch_ends;
        self.loop_stack = saved.loop_stack;
        self.pending_no_label = saved.pending_no_label;
        self.break_to_loop = saved.break_to_loop;
    }

    fn visit_if(
        &mut self,
        test: &str,
        body: &[Stmt],
        elifs: &[ElifClause],
        orelse: Option<&[Stmt]>,
        line: u32,
    ) {
        if self.unreachable() {
            return;
        }
        let if_id = self.next_node_id();
        self.graph.add_node(
            if_id.clone(),
            format!("if {test}"),
            NodeShape::Diamond,
            Some(STYLE_CONDITION.to_owned()),
            Some(line),
        );
        self.connect_into(&if_id);
        self.branch_ends.clear();
        self.current_node = Some(if_id.clone());

        let mut then_tail = None;
        if !body.is_empty() {
            self.visit_stmt(&body[0]);
            self.backfill_label(&if_id, EdgeLabel::Yes);
            for stmt in &body[1..] {
                self.visit_stmt(stmt);
            }
            if let Some(current) = self.current_node.clone() {
                if !ends_with_terminal(body) {
                    then_tail = Some(current);
                }
            }
        }

        let mut else_tail = None;
        if !elifs.is_empty() {
            self.current_node = Some(if_id.clone());
            let chain_tails = self.visit_elif_chain(elifs, orelse, &if_id);
            self.branch_ends.extend(chain_tails);
        } else if let Some(orelse) = orelse.filter(|stmts| !stmts.is_empty()) {
            self.current_node = Some(if_id.clone());
            self.visit_stmt(&orelse[0]);
            self.backfill_label(&if_id, EdgeLabel::No);
            for stmt in &orelse[1..] {
                self.visit_stmt(stmt);
            }
            if let Some(current) = self.current_node.clone() {
                if !ends_with_terminal(orelse) {
                    else_tail = Some(current);
                }
            }
        } else {
            // no else: the fallthrough edge leaves the diamond itself, its
            // No label deferred until the successor is known
            else_tail = Some(if_id.clone());
            self.pending_no_label = Some(if_id);
        }

        self.merge_branch_tails(then_tail, else_tail);
    }

    /// One `elif` arm plus, recursively, the rest of the chain. Returns the
    /// surviving merge-tail candidates.
    fn visit_elif_chain(
        &mut self,
        elifs: &[ElifClause],
        orelse: Option<&[Stmt]>,
        parent: &NodeId,
    ) -> Vec<NodeId> {
        let clause = &elifs[0];
        let elif_id = self.next_node_id();
        self.graph.add_node(
            elif_id.clone(),
            format!("if {}", clause.test),
            NodeShape::Diamond,
            Some(STYLE_CONDITION.to_owned()),
            Some(clause.line),
        );
        self.add_edge(parent, &elif_id, Some(EdgeLabel::No));

        let mut tails = Vec::new();
        self.current_node = Some(elif_id.clone());
        if !clause.body.is_empty() {
            self.visit_stmt(&clause.body[0]);
            self.backfill_label(&elif_id, EdgeLabel::Yes);
            for stmt in &clause.body[1..] {
                self.visit_stmt(stmt);
            }
            if let Some(current) = self.current_node.clone() {
                if !ends_with_terminal(&clause.body) {
                    tails.push(current);
                }
            }
        }

        if elifs.len() > 1 {
            self.current_node = Some(elif_id.clone());
            tails.extend(self.visit_elif_chain(&elifs[1..], orelse, &elif_id));
        } else if let Some(orelse) = orelse.filter(|stmts| !stmts.is_empty()) {
            self.current_node = Some(elif_id.clone());
            self.visit_stmt(&orelse[0]);
            self.backfill_label(&elif_id, EdgeLabel::No);
            for stmt in &orelse[1..] {
                self.visit_stmt(stmt);
            }
            if let Some(current) = self.current_node.clone() {
                if !ends_with_terminal(orelse) {
                    tails.push(current);
                }
            }
        } else {
            tails.push(elif_id.clone());
            self.pending_no_label = Some(elif_id);
        }
        tails
    }

    fn merge_branch_tails(&mut self, then_tail: Option<NodeId>, else_tail: Option<NodeId>) {
        let mut collected: Vec<NodeId> = Vec::new();
        collected.extend(then_tail);
        collected.extend(else_tail);
        collected.append(&mut self.branch_ends);

        if collected.len() > 1 {
            self.branch_ends = collected;
            self.current_node = None;
        } else {
            self.current_node = collected.pop();
        }
    }

    /// Shared loop-body handling for `for` and `while`, entered with the
    /// header already connected. `label_first_true` labels the first body
    /// edge `True` (the while convention).
    fn visit_loop_body(&mut self, header: &NodeId, body: &[Stmt], label_first_true: bool) {
        self.loop_stack.push(header.clone());
        self.branch_ends.clear();
        self.current_node = Some(header.clone());
        let mut break_nodes: Vec<NodeId> = Vec::new();

        let mut first = true;
        for stmt in body {
            // siphon off this loop's breaks before the next statement
            // drains the remaining tails as an ordinary merge
            if self.current_node.is_none() && !self.branch_ends.is_empty() {
                let ends = std::mem::take(&mut self.branch_ends);
                for end in ends {
                    if self.break_to_loop.get(&end) == Some(header) {
                        break_nodes.push(end);
                    } else {
                        self.branch_ends.push(end);
                    }
                }
            }
            self.visit_stmt(stmt);
            if first {
                if label_first_true {
                    self.backfill_label(header, EdgeLabel::True);
                }
                first = false;
            }
        }

        // normal body tail becomes the back-edge
        if let Some(current) = self.current_node.clone() {
            if current != *header {
                self.connect_from(&current, header);
            }
        }

        // leftover tails: this loop's breaks join the exit set, other
        // tails back-edge to the header, outer-loop breaks stay pending
        if !self.branch_ends.is_empty() {
            let ends = std::mem::take(&mut self.branch_ends);
            for end in ends {
                if end == *header {
                    continue;
                }
                match self.break_to_loop.get(&end) {
                    Some(owner) if owner == header => break_nodes.push(end),
                    Some(_) => self.branch_ends.push(end),
                    None => self.connect_from(&end, header),
                }
            }
        }

        self.loop_stack.pop();

        // flow leaving the loop: breaks exit unconditionally, the header
        // exits through a pending edge labeled End once resolved
        let mut exits = break_nodes;
        exits.push(header.clone());
        exits.append(&mut self.branch_ends);
        self.branch_ends = exits;
        self.current_node = None;
        self.pending_no_label = Some(header.clone());
    }

    fn visit_break(&mut self, line: u32) {
        if self.unreachable() {
            return;
        }
        let node_id = self.next_node_id();
        self.graph.add_node(
            node_id.clone(),
            "break",
            NodeShape::Terminal,
            Some(STYLE_BREAK.to_owned()),
            Some(line),
        );
        if let Some(current) = self.current_node.clone() {
            self.add_edge(&current, &node_id, None);
        }
        // which loop receives it is decided at that loop's close, not here
        if let Some(innermost) = self.loop_stack.last() {
            self.break_to_loop.insert(node_id.clone(), innermost.clone());
        }
        self.branch_ends.push(node_id);
        self.current_node = None;
    }

    fn visit_continue(&mut self, line: u32) {
        if self.unreachable() {
            return;
        }
        let node_id = self.next_node_id();
        self.graph.add_node(
            node_id.clone(),
            "continue",
            NodeShape::Terminal,
            Some(STYLE_CONTINUE.to_owned()),
            Some(line),
        );
        if let Some(current) = self.current_node.clone() {
            self.add_edge(&current, &node_id, None);
        }
        // target is always known at the continue site, draw it immediately
        if let Some(innermost) = self.loop_stack.last().cloned() {
            self.add_edge(&node_id, &innermost, Some(EdgeLabel::Continue));
        }
        self.current_node = None;
    }

    fn visit_return(&mut self, value: Option<&ExprInfo>, line: u32) {
        if self.unreachable() {
            return;
        }
        let node_id = self.next_node_id();
        let label = match value {
            Some(value) => format!("return {}", value.display()),
            None => "return".to_owned(),
        };
        self.graph.add_node(
            node_id.clone(),
            label,
            NodeShape::Terminal,
            Some(STYLE_RETURN.to_owned()),
            Some(line),
        );
        self.connect_into(&node_id);

        if let Some(callee) = value.and_then(ExprInfo::direct_callee) {
            if let Some(entry) = self.function_defs.get(callee).cloned() {
                self.graph.add_call_edge(node_id.clone(), entry);
            }
        }
        self.current_node = None;
    }

    fn visit_raise(&mut self, exc: Option<&str>, line: u32) {
        if self.unreachable() {
            return;
        }
        let node_id = self.next_node_id();
        let label = match exc {
            Some(exc) => format!("raise {exc}"),
            None => "raise".to_owned(),
        };
        self.graph.add_node(
            node_id.clone(),
            label,
            NodeShape::Terminal,
            Some(STYLE_RETURN.to_owned()),
            Some(line),
        );
        self.connect_into(&node_id);
        // nothing downstream can connect from a raise
        self.current_node = None;
    }

    fn visit_expr_call(&mut self, call: &CallInfo, line: u32) {
        if self.unreachable() {
            return;
        }
        let node_id = self.next_node_id();
        match &call.callee {
            Callee::Name(name) if name == "print" => {
                self.graph.add_node(
                    node_id.clone(),
                    format!("print({})", call.args),
                    NodeShape::Parallelogram,
                    Some(STYLE_PRINT.to_owned()),
                    Some(line),
                );
                for arg_call in &call.arg_calls {
                    if let Some(entry) = self.function_defs.get(arg_call).cloned() {
                        self.graph.add_call_edge(node_id.clone(), entry);
                    }
                }
            }
            Callee::Name(name) if name == "input" => {
                self.graph.add_node(
                    node_id.clone(),
                    format!("input({})", call.args),
                    NodeShape::Parallelogram,
                    Some(STYLE_INPUT.to_owned()),
                    Some(line),
                );
            }
            Callee::Name(name) => {
                self.graph.add_node(
                    node_id.clone(),
                    format!("Call {}({})", name, call.args),
                    NodeShape::Rectangle,
                    Some(STYLE_CALL.to_owned()),
                    Some(line),
                );
                if let Some(entry) = self.function_defs.get(name).cloned() {
                    self.graph.add_call_edge(node_id.clone(), entry);
                }
            }
            Callee::Method { object, name } => {
                self.graph.add_node(
                    node_id.clone(),
                    format!("{}.{}({})", object, name, call.args),
                    NodeShape::Rectangle,
                    Some(STYLE_METHOD_CALL.to_owned()),
                    Some(line),
                );
            }
        }
        self.connect_into(&node_id);
        self.current_node = Some(node_id);
    }

    fn visit_assign(&mut self, target: &str, value: &ExprInfo, line: u32) {
        if self.unreachable() {
            return;
        }
        let node_id = self.next_node_id();
        self.graph.add_node(
            node_id.clone(),
            format!("{} = {}", target, value.display()),
            NodeShape::Rectangle,
            Some(STYLE_ASSIGN.to_owned()),
            Some(line),
        );
        self.connect_into(&node_id);

        if let Some(callee) = value.direct_callee() {
            if let Some(entry) = self.function_defs.get(callee).cloned() {
                self.graph.add_call_edge(node_id.clone(), entry);
                self.graph
                    .add_node_style(node_id.clone(), STYLE_CALL_ASSIGN);
            }
        }
        self.current_node = Some(node_id);
    }
}

/// Whether the block's last statement unconditionally leaves it, in which
/// case its tail contributes nothing to the merge set.
fn ends_with_terminal(body: &[Stmt]) -> bool {
    matches!(
        body.last().map(|stmt| &stmt.kind),
        Some(StmtKind::Return { .. } | StmtKind::Break | StmtKind::Raise { .. })
    )
}
