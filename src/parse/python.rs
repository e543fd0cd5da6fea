// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Tree-sitter walker that lowers a Python parse tree into the [`Stmt`]
//! tagged union. Only the modeled statement grammar is recognized; every
//! other node kind lowers to `Unsupported`.

use tree_sitter::{Node, Parser};

use super::{CallInfo, Callee, ElifClause, ExprInfo, ImportName, ParseError, Stmt, StmtKind};

/// Parse `source` as a Python module and return its top-level statements.
///
/// Syntax errors abort the whole parse; no partial tree is returned.
pub fn parse_module(source: &str) -> Result<Vec<Stmt>, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|err| ParseError::Language(err.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or(ParseError::Syntax { line: 1 })?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(ParseError::Syntax {
            line: first_error_line(root),
        });
    }

    Ok(lower_block(root, source))
}

fn first_error_line(root: Node<'_>) -> u32 {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return node.start_position().row as u32 + 1;
        }
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                if child.has_error() {
                    stack.push(child);
                }
            }
        }
    }
    root.start_position().row as u32 + 1
}

fn lower_block(block: Node<'_>, source: &str) -> Vec<Stmt> {
    let mut cursor = block.walk();
    block
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .map(|child| lower_statement(child, source))
        .collect()
}

fn lower_statement(node: Node<'_>, source: &str) -> Stmt {
    let line = node.start_position().row as u32 + 1;
    let kind = match node.kind() {
        "expression_statement" => lower_expression_statement(node, source),
        "if_statement" => lower_if(node, source),
        "while_statement" => StmtKind::While {
            test: field_expr(node, "condition", source),
            body: body_block(node, source),
        },
        "for_statement" => StmtKind::For {
            target: field_expr(node, "left", source),
            iter: field_expr(node, "right", source),
            body: body_block(node, source),
        },
        "break_statement" => StmtKind::Break,
        "continue_statement" => StmtKind::Continue,
        "pass_statement" => StmtKind::Pass,
        "return_statement" => StmtKind::Return {
            value: node.named_child(0).map(|value| expr_info(value, source)),
        },
        "raise_statement" => StmtKind::Raise {
            exc: node.named_child(0).map(|exc| render_expr(exc, source)),
        },
        "assert_statement" => StmtKind::Assert {
            test: node
                .named_child(0)
                .map(|test| render_expr(test, source))
                .unwrap_or_default(),
            msg: node.named_child(1).map(|msg| render_expr(msg, source)),
        },
        "global_statement" => StmtKind::Global {
            names: joined_named_children(node, source),
        },
        "nonlocal_statement" => StmtKind::Nonlocal {
            names: joined_named_children(node, source),
        },
        "import_statement" => StmtKind::Import {
            names: import_names(node, source),
        },
        "import_from_statement" => StmtKind::ImportFrom {
            module: node
                .child_by_field_name("module_name")
                .map(|module| node_text(module, source))
                .unwrap_or_default(),
            names: from_import_names(node, source),
        },
        "function_definition" => StmtKind::FunctionDef {
            name: field_text(node, "name", source),
            body: body_block(node, source),
        },
        "class_definition" => StmtKind::ClassDef {
            name: field_text(node, "name", source),
        },
        "decorated_definition" => {
            return node
                .child_by_field_name("definition")
                .map(|definition| lower_statement(definition, source))
                .unwrap_or(Stmt {
                    line,
                    kind: StmtKind::Unsupported,
                });
        }
        "try_statement" => StmtKind::Try,
        _ => StmtKind::Unsupported,
    };
    Stmt { line, kind }
}

fn lower_expression_statement(node: Node<'_>, source: &str) -> StmtKind {
    let Some(inner) = node.named_child(0) else {
        return StmtKind::Unsupported;
    };
    match inner.kind() {
        "assignment" => {
            let Some(right) = inner.child_by_field_name("right") else {
                // `x: int` annotation without a value
                return StmtKind::Unsupported;
            };
            StmtKind::Assign {
                target: field_expr(inner, "left", source),
                value: expr_info(right, source),
            }
        }
        "augmented_assignment" => {
            let operator = inner
                .child_by_field_name("operator")
                .map(|op| node_text(op, source))
                .unwrap_or_default();
            StmtKind::AugAssign {
                text: format!(
                    "{} {} {}",
                    field_expr(inner, "left", source),
                    operator,
                    field_expr(inner, "right", source)
                ),
            }
        }
        "call" => match call_info(inner, source) {
            Some(call) => StmtKind::ExprCall(call),
            None => StmtKind::Unsupported,
        },
        _ => StmtKind::Unsupported,
    }
}

fn lower_if(node: Node<'_>, source: &str) -> StmtKind {
    let mut elifs = Vec::new();
    let mut orelse = None;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "elif_clause" => elifs.push(ElifClause {
                line: child.start_position().row as u32 + 1,
                test: field_expr(child, "condition", source),
                body: child
                    .child_by_field_name("consequence")
                    .map(|block| lower_block(block, source))
                    .unwrap_or_default(),
            }),
            "else_clause" => {
                orelse = child
                    .child_by_field_name("body")
                    .map(|block| lower_block(block, source));
            }
            _ => {}
        }
    }
    StmtKind::If {
        test: field_expr(node, "condition", source),
        body: node
            .child_by_field_name("consequence")
            .map(|block| lower_block(block, source))
            .unwrap_or_default(),
        elifs,
        orelse,
    }
}

fn expr_info(node: Node<'_>, source: &str) -> ExprInfo {
    if node.kind() == "call" {
        if let Some(call) = call_info(node, source) {
            return ExprInfo::Call(call);
        }
    }
    ExprInfo::Other(render_expr(node, source))
}

fn call_info(node: Node<'_>, source: &str) -> Option<CallInfo> {
    let function = node.child_by_field_name("function")?;
    let callee = match function.kind() {
        "identifier" => Callee::Name(node_text(function, source)),
        "attribute" => Callee::Method {
            object: function
                .child_by_field_name("object")
                .map(|object| render_expr(object, source))?,
            name: field_text(function, "attribute", source),
        },
        // calls through subscripts, lambdas or nested calls are not modeled
        _ => return None,
    };

    let mut args = Vec::new();
    let mut arg_calls = Vec::new();
    if let Some(arguments) = node.child_by_field_name("arguments") {
        let mut cursor = arguments.walk();
        for argument in arguments.named_children(&mut cursor) {
            if argument.kind() == "comment" {
                continue;
            }
            args.push(render_expr(argument, source));
            if argument.kind() == "call" {
                if let Some(function) = argument.child_by_field_name("function") {
                    if function.kind() == "identifier" {
                        arg_calls.push(node_text(function, source));
                    }
                }
            }
        }
    }

    Some(CallInfo {
        callee,
        args: args.join(", "),
        arg_calls,
    })
}

/// Render an expression for display in a node label. Operator expressions are
/// re-spaced (`a==1` becomes `a == 1`); everything else keeps its source
/// text with whitespace runs collapsed.
fn render_expr(node: Node<'_>, source: &str) -> String {
    match node.kind() {
        "binary_operator" | "boolean_operator" | "comparison_operator" => {
            let mut cursor = node.walk();
            let parts: Vec<String> = node
                .children(&mut cursor)
                .map(|child| {
                    if child.is_named() {
                        render_expr(child, source)
                    } else {
                        node_text(child, source)
                    }
                })
                .collect();
            parts.join(" ")
        }
        "not_operator" => match node.child_by_field_name("argument") {
            Some(argument) => format!("not {}", render_expr(argument, source)),
            None => squash_whitespace(node, source),
        },
        "unary_operator" => {
            let operator = node
                .child_by_field_name("operator")
                .map(|op| node_text(op, source))
                .unwrap_or_default();
            match node.child_by_field_name("argument") {
                Some(argument) => format!("{}{}", operator, render_expr(argument, source)),
                None => squash_whitespace(node, source),
            }
        }
        "parenthesized_expression" => match node.named_child(0) {
            Some(inner) => format!("({})", render_expr(inner, source)),
            None => squash_whitespace(node, source),
        },
        _ => squash_whitespace(node, source),
    }
}

fn body_block(node: Node<'_>, source: &str) -> Vec<Stmt> {
    node.child_by_field_name("body")
        .map(|block| lower_block(block, source))
        .unwrap_or_default()
}

fn field_expr(node: Node<'_>, field: &str, source: &str) -> String {
    node.child_by_field_name(field)
        .map(|child| render_expr(child, source))
        .unwrap_or_default()
}

fn field_text(node: Node<'_>, field: &str, source: &str) -> String {
    node.child_by_field_name(field)
        .map(|child| node_text(child, source))
        .unwrap_or_default()
}

fn joined_named_children(node: Node<'_>, source: &str) -> String {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .map(|child| node_text(child, source))
        .collect::<Vec<_>>()
        .join(", ")
}

fn import_names(node: Node<'_>, source: &str) -> Vec<ImportName> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter_map(|child| match child.kind() {
            "dotted_name" => Some(ImportName {
                name: node_text(child, source),
                alias: None,
            }),
            "aliased_import" => Some(ImportName {
                name: field_text(child, "name", source),
                alias: child
                    .child_by_field_name("alias")
                    .map(|alias| node_text(alias, source)),
            }),
            _ => None,
        })
        .collect()
}

fn from_import_names(node: Node<'_>, source: &str) -> String {
    let mut cursor = node.walk();
    let mut names = Vec::new();
    let mut saw_module = false;
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "dotted_name" | "relative_import" if !saw_module => saw_module = true,
            "dotted_name" => names.push(node_text(child, source)),
            "aliased_import" => names.push(field_text(child, "name", source)),
            "wildcard_import" => names.push("*".to_owned()),
            _ => {}
        }
    }
    names.join(", ")
}

fn node_text(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_owned()
}

fn squash_whitespace(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes())
        .unwrap_or("")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::parse_module;
    use crate::parse::{Callee, ExprInfo, ParseError, StmtKind};

    #[test]
    fn parses_straight_line_statements() {
        let stmts = parse_module("import os\nx = 1\nx += 2\npass\n").expect("parse");
        assert_eq!(stmts.len(), 4);
        assert_eq!(stmts[0].line, 1);
        assert!(matches!(stmts[0].kind, StmtKind::Import { .. }));
        match &stmts[1].kind {
            StmtKind::Assign { target, value } => {
                assert_eq!(target, "x");
                assert_eq!(value, &ExprInfo::Other("1".to_owned()));
            }
            other => panic!("expected assign, got {other:?}"),
        }
        match &stmts[2].kind {
            StmtKind::AugAssign { text } => assert_eq!(text, "x += 2"),
            other => panic!("expected aug-assign, got {other:?}"),
        }
        assert!(matches!(stmts[3].kind, StmtKind::Pass));
    }

    #[test]
    fn respaces_comparison_conditions() {
        let stmts = parse_module("if a==1:\n    pass\n").expect("parse");
        match &stmts[0].kind {
            StmtKind::If { test, .. } => assert_eq!(test, "a == 1"),
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn flattens_elif_chain() {
        let source = "if a:\n    pass\nelif b:\n    pass\nelif c:\n    pass\nelse:\n    pass\n";
        let stmts = parse_module(source).expect("parse");
        match &stmts[0].kind {
            StmtKind::If { elifs, orelse, .. } => {
                assert_eq!(elifs.len(), 2);
                assert_eq!(elifs[0].line, 3);
                assert_eq!(elifs[1].test, "c");
                assert_eq!(orelse.as_ref().map(Vec::len), Some(1));
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn classifies_calls() {
        let stmts =
            parse_module("print(f(x), 2)\nvalues.append(3)\ny = g()\n").expect("parse");
        match &stmts[0].kind {
            StmtKind::ExprCall(call) => {
                assert_eq!(call.callee, Callee::Name("print".to_owned()));
                assert_eq!(call.args, "f(x), 2");
                assert_eq!(call.arg_calls, vec!["f".to_owned()]);
            }
            other => panic!("expected call, got {other:?}"),
        }
        match &stmts[1].kind {
            StmtKind::ExprCall(call) => {
                assert_eq!(
                    call.callee,
                    Callee::Method {
                        object: "values".to_owned(),
                        name: "append".to_owned()
                    }
                );
            }
            other => panic!("expected method call, got {other:?}"),
        }
        match &stmts[2].kind {
            StmtKind::Assign { value, .. } => assert_eq!(value.direct_callee(), Some("g")),
            other => panic!("expected assign, got {other:?}"),
        }
    }

    #[test]
    fn import_aliases_survive() {
        let stmts = parse_module("import numpy as np, sys\nfrom os import path, sep\n")
            .expect("parse");
        match &stmts[0].kind {
            StmtKind::Import { names } => {
                assert_eq!(names[0].display(), "numpy as np");
                assert_eq!(names[1].display(), "sys");
            }
            other => panic!("expected import, got {other:?}"),
        }
        match &stmts[1].kind {
            StmtKind::ImportFrom { module, names } => {
                assert_eq!(module, "os");
                assert_eq!(names, "path, sep");
            }
            other => panic!("expected from-import, got {other:?}"),
        }
    }

    #[test]
    fn syntax_error_is_distinct() {
        let err = parse_module("def broken(:\n    pass\n").expect_err("must fail");
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn unmodeled_statements_lower_to_unsupported() {
        let stmts = parse_module("with open('f') as fh:\n    pass\n").expect("parse");
        assert!(matches!(stmts[0].kind, StmtKind::Unsupported));
    }
}
