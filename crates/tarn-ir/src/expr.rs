// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Typed IR expressions.
//!
//! Nodes are immutable and shared through [`ExprRef`]. Passes never mutate a
//! node; they build a new parent only when one of its children changed, so
//! untouched subtrees are reused as-is.

use std::sync::Arc;

use crate::{Block, ConstValue, Span, Symbol, Type};

/// Shared handle to an expression node.
pub type ExprRef = Arc<Expr>;

/// A typed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    /// Value computed by the type checker when the expression is constant.
    pub constant: Option<ConstValue>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Scalar literal (int, uint, float, bool, string, type, unit).
    Literal(ConstValue),
    ArrayLiteral(Vec<ExprRef>),
    TupleLiteral(Vec<ExprRef>),
    MapLiteral(Vec<(ExprRef, ExprRef)>),
    StructLiteral(Vec<(String, ExprRef)>),
    Identifier(Symbol),
    Binary {
        op: BinOp,
        left: ExprRef,
        right: ExprRef,
    },
    Unary {
        op: UnaryOp,
        operand: ExprRef,
    },
    Call {
        callee: ExprRef,
        args: Vec<ExprRef>,
    },
    Field {
        object: ExprRef,
        field: String,
    },
    Index {
        object: ExprRef,
        index: ExprRef,
    },
    Assign {
        target: ExprRef,
        value: ExprRef,
    },
    /// Value conversion to `Expr::ty`.
    Conversion {
        kind: ConversionKind,
        value: ExprRef,
    },
    Range {
        start: ExprRef,
        end: ExprRef,
        inclusive: bool,
    },
    Block(Block),
    /// `if`; an `else if` is another `If` in `else_branch`, a plain `else`
    /// is a `Block` expression.
    If {
        cond: ExprRef,
        then_branch: Block,
        else_branch: Option<ExprRef>,
    },
    While {
        cond: ExprRef,
        body: Block,
    },
    For {
        binding: Symbol,
        iterable: ExprRef,
        body: Block,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }

    /// The comparison `c` such that `a c b == !(a self b)`.
    pub fn inverse_comparison(self) -> Option<BinOp> {
        match self {
            BinOp::Lt => Some(BinOp::Ge),
            BinOp::Le => Some(BinOp::Gt),
            BinOp::Gt => Some(BinOp::Le),
            BinOp::Ge => Some(BinOp::Lt),
            BinOp::Eq => Some(BinOp::Ne),
            BinOp::Ne => Some(BinOp::Eq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `~x`
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// Value-preserving numeric conversion.
    Numeric,
    /// Reinterpret the bits of a same-sized value.
    BitCast,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type, span: Span) -> ExprRef {
        Arc::new(Expr {
            kind,
            ty,
            constant: None,
            span,
        })
    }

    /// Literal node for a scalar constant; carries its own value annotation.
    pub fn literal(value: ConstValue, ty: Type, span: Span) -> ExprRef {
        Arc::new(Expr {
            kind: ExprKind::Literal(value.clone()),
            ty,
            constant: Some(value),
            span,
        })
    }

    pub fn bool(value: bool, span: Span) -> ExprRef {
        Expr::literal(ConstValue::Bool(value), Type::Bool, span)
    }

    pub fn unit(span: Span) -> ExprRef {
        Expr::literal(ConstValue::Unit, Type::Void, span)
    }

    pub fn ident(symbol: Symbol, span: Span) -> ExprRef {
        let ty = symbol.ty.clone();
        Expr::new(ExprKind::Identifier(symbol), ty, span)
    }

    pub fn binary(op: BinOp, left: ExprRef, right: ExprRef, ty: Type, span: Span) -> ExprRef {
        Expr::new(ExprKind::Binary { op, left, right }, ty, span)
    }

    pub fn unary(op: UnaryOp, operand: ExprRef, ty: Type, span: Span) -> ExprRef {
        Expr::new(ExprKind::Unary { op, operand }, ty, span)
    }

    /// `symbol = value`, evaluated for its side effect.
    pub fn assign(symbol: &Symbol, value: ExprRef, span: Span) -> ExprRef {
        let target = Expr::ident(symbol.clone(), span);
        Expr::new(ExprKind::Assign { target, value }, Type::Void, span)
    }

    pub fn call(callee: ExprRef, args: Vec<ExprRef>, ty: Type, span: Span) -> ExprRef {
        Expr::new(ExprKind::Call { callee, args }, ty, span)
    }

    pub fn bitcast(value: ExprRef, ty: Type) -> ExprRef {
        let span = value.span;
        Expr::new(
            ExprKind::Conversion {
                kind: ConversionKind::BitCast,
                value,
            },
            ty,
            span,
        )
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn is_const(&self) -> bool {
        self.constant.is_some()
    }

    pub fn const_value(&self) -> Option<&ConstValue> {
        self.constant.as_ref()
    }

    /// Same type, span and constant annotation, different children.
    pub fn with_kind(&self, kind: ExprKind) -> ExprRef {
        Arc::new(Expr {
            kind,
            ty: self.ty.clone(),
            constant: self.constant.clone(),
            span: self.span,
        })
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match &self.kind {
            ExprKind::Identifier(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// True when evaluating the expression cannot have a side effect, so it
    /// may be dropped by a rewrite.
    pub fn is_pure(&self) -> bool {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Identifier(_) => true,
            ExprKind::ArrayLiteral(items) | ExprKind::TupleLiteral(items) => {
                items.iter().all(|e| e.is_pure())
            }
            ExprKind::StructLiteral(fields) => fields.iter().all(|(_, e)| e.is_pure()),
            ExprKind::MapLiteral(entries) => entries.iter().all(|(k, v)| k.is_pure() && v.is_pure()),
            // Division traps on a zero divisor.
            ExprKind::Binary {
                op: BinOp::Div | BinOp::Mod,
                left,
                right,
            } => left.is_pure() && right.const_value().is_some_and(|v| !v.is_zero()),
            ExprKind::Binary { left, right, .. } => left.is_pure() && right.is_pure(),
            ExprKind::Unary { operand, .. } => operand.is_pure(),
            ExprKind::Field { object, .. } => object.is_pure(),
            ExprKind::Index { object, index } => object.is_pure() && index.is_pure(),
            ExprKind::Conversion { value, .. } => value.is_pure(),
            ExprKind::Range { start, end, .. } => start.is_pure() && end.is_pure(),
            ExprKind::Call { .. }
            | ExprKind::Assign { .. }
            | ExprKind::Block(_)
            | ExprKind::If { .. }
            | ExprKind::While { .. }
            | ExprKind::For { .. } => false,
        }
    }

    /// True for nodes that transfer control and must be lowered to jumps.
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Block(_) | ExprKind::If { .. } | ExprKind::While { .. } | ExprKind::For { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SymbolKind;

    #[test]
    fn literal_is_const() {
        let e = Expr::literal(ConstValue::Int(3), Type::I32, Span::DUMMY);
        assert!(e.is_const());
        assert_eq!(e.const_value(), Some(&ConstValue::Int(3)));
    }

    #[test]
    fn calls_are_impure() {
        let f = Symbol::new("f", Type::I32, SymbolKind::Function);
        let call = Expr::call(Expr::ident(f, Span::DUMMY), vec![], Type::I32, Span::DUMMY);
        let x = Expr::ident(Symbol::new("x", Type::I32, SymbolKind::Local), Span::DUMMY);
        let sum = Expr::binary(BinOp::Add, x.clone(), call, Type::I32, Span::DUMMY);
        assert!(x.is_pure());
        assert!(!sum.is_pure());
    }

    #[test]
    fn division_is_pure_only_by_a_nonzero_constant() {
        let x = Expr::ident(Symbol::new("x", Type::I32, SymbolKind::Local), Span::DUMMY);
        let y = Expr::ident(Symbol::new("y", Type::I32, SymbolKind::Local), Span::DUMMY);
        let int = |v| Expr::literal(ConstValue::Int(v), Type::I32, Span::DUMMY);
        let div = |op, right| Expr::binary(op, x.clone(), right, Type::I32, Span::DUMMY);

        assert!(!div(BinOp::Div, y.clone()).is_pure());
        assert!(!div(BinOp::Mod, y).is_pure());
        assert!(!div(BinOp::Div, int(0)).is_pure());
        assert!(div(BinOp::Div, int(4)).is_pure());
        assert!(div(BinOp::Mod, int(4)).is_pure());
    }

    #[test]
    fn inverse_comparisons_round_trip() {
        for op in [BinOp::Lt, BinOp::Le, BinOp::Gt, BinOp::Ge, BinOp::Eq, BinOp::Ne] {
            let inv = op.inverse_comparison().unwrap();
            assert_eq!(inv.inverse_comparison(), Some(op));
        }
        assert_eq!(BinOp::Add.inverse_comparison(), None);
    }
}
