// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Statement tree produced by the Python parser and consumed by the flow
//! graph builder. The tree is a closed tagged union over the statement
//! grammar the builder models; anything else parses into
//! [`StmtKind::Unsupported`] so the builder can skip it with an explicit
//! match arm instead of an accidental omission.

mod python;

pub use python::parse_module;

/// One statement with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub line: u32,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    FunctionDef {
        name: String,
        body: Vec<Stmt>,
    },
    ClassDef {
        name: String,
    },
    If {
        test: String,
        body: Vec<Stmt>,
        elifs: Vec<ElifClause>,
        orelse: Option<Vec<Stmt>>,
    },
    While {
        test: String,
        body: Vec<Stmt>,
    },
    For {
        target: String,
        iter: String,
        body: Vec<Stmt>,
    },
    Break,
    Continue,
    Pass,
    Return {
        value: Option<ExprInfo>,
    },
    Raise {
        exc: Option<String>,
    },
    Assert {
        test: String,
        msg: Option<String>,
    },
    Global {
        names: String,
    },
    Nonlocal {
        names: String,
    },
    Import {
        names: Vec<ImportName>,
    },
    ImportFrom {
        module: String,
        names: String,
    },
    Assign {
        target: String,
        value: ExprInfo,
    },
    AugAssign {
        text: String,
    },
    Try,
    ExprCall(CallInfo),
    /// Statement forms outside the modeled grammar. Skipped silently.
    Unsupported,
}

/// `elif` arm of a conditional, kept flat rather than as a nested statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElifClause {
    pub line: u32,
    pub test: String,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportName {
    pub fn display(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {}", self.name, alias),
            None => self.name.clone(),
        }
    }
}

/// Right-hand side of an assignment or return, classified just far enough to
/// decide call-edge annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprInfo {
    Call(CallInfo),
    Other(String),
}

impl ExprInfo {
    pub fn display(&self) -> String {
        match self {
            Self::Call(call) => call.display(),
            Self::Other(text) => text.clone(),
        }
    }

    /// Callee name when the expression is a direct-name call.
    pub fn direct_callee(&self) -> Option<&str> {
        match self {
            Self::Call(CallInfo {
                callee: Callee::Name(name),
                ..
            }) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    pub callee: Callee,
    /// Comma-joined argument texts, without the surrounding parentheses.
    pub args: String,
    /// Names of direct-name calls nested in the argument list, in order.
    pub arg_calls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    Name(String),
    Method { object: String, name: String },
}

impl CallInfo {
    pub fn display(&self) -> String {
        match &self.callee {
            Callee::Name(name) => format!("{}({})", name, self.args),
            Callee::Method { object, name } => format!("{}.{}({})", object, name, self.args),
        }
    }
}

/// Parse failure, kept distinct from every other error in the system so a
/// broken source file is reported as such and never as a generic failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The source contains a syntax error; `line` is the first offending
    /// 1-based line.
    Syntax { line: u32 },
    /// The grammar could not be loaded into the parser.
    Language(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax { line } => write!(f, "syntax error near line {line}"),
            Self::Language(message) => write!(f, "failed to load Python grammar: {message}"),
        }
    }
}

impl std::error::Error for ParseError {}
