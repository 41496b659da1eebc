// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statements, blocks, symbols and jump labels.

use std::fmt;

use crate::{ExprRef, Span, Type};

/// A resolved variable, parameter or function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Local,
    Parameter,
    Function,
    /// Compiler-generated mutable variable.
    Synthetic,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type, kind: SymbolKind) -> Self {
        Symbol {
            name: name.into(),
            ty,
            kind,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.kind == SymbolKind::Synthetic
    }
}

/// A jump target. Unique within a function body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub String);

impl Label {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A statement.
///
/// The type checker produces the structured forms; lowering turns
/// `Break`/`Continue`/`Yield` and every control-flow expression into
/// `Label`/`Goto`/`GotoIf`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VariableDeclaration {
        symbol: Symbol,
        /// `None` leaves the variable uninitialised until its first assignment.
        value: Option<ExprRef>,
    },
    Expression(ExprRef),
    Return(Option<ExprRef>),
    Break(Option<ExprRef>),
    Continue,
    Yield(ExprRef),
    Label(Label),
    Goto(Label),
    /// Jump when `condition` is true, fall through otherwise.
    GotoIf {
        condition: ExprRef,
        label: Label,
    },
}

impl Stmt {
    /// True for the forms allowed in a lowered body.
    pub fn is_lowered(&self) -> bool {
        !matches!(self, Stmt::Break(_) | Stmt::Continue | Stmt::Yield(_))
    }

    /// Label this statement jumps to, if any.
    pub fn jump_target(&self) -> Option<&Label> {
        match self {
            Stmt::Goto(label) | Stmt::GotoIf { label, .. } => Some(label),
            _ => None,
        }
    }
}

/// A sequence of statements with the type of the value it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub ty: Type,
    pub span: Span,
}

impl Block {
    pub fn new(statements: Vec<Stmt>, ty: Type, span: Span) -> Self {
        Block {
            statements,
            ty,
            span,
        }
    }

    /// A block whose only statement is one expression.
    pub fn of_expr(expr: ExprRef) -> Self {
        let ty = expr.ty.clone();
        let span = expr.span;
        Block::new(vec![Stmt::Expression(expr)], ty, span)
    }

    /// The expression of a single-expression block.
    pub fn single_expr(&self) -> Option<&ExprRef> {
        match self.statements.as_slice() {
            [Stmt::Expression(e)] => Some(e),
            _ => None,
        }
    }
}
