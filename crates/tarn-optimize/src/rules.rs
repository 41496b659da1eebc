// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The algebraic identity table.
//!
//! Every rule looks at one node whose children are already optimised and
//! either returns a replacement or `None`. Rules that drop an operand only
//! fire when that operand is pure.

use tarn_ir::{BinOp, ConstValue, Expr, ExprKind, ExprRef, UnaryOp};

use crate::literal::{one, zero};

/// Apply the first matching identity to `expr`.
pub(crate) fn simplify(expr: &ExprRef) -> Option<(&'static str, ExprRef)> {
    match &expr.kind {
        ExprKind::Binary { op, left, right } => binary(expr, *op, left, right),
        ExprKind::Unary { op, operand } => unary(*op, operand),
        _ => None,
    }
}

fn binary(
    expr: &Expr,
    op: BinOp,
    left: &ExprRef,
    right: &ExprRef,
) -> Option<(&'static str, ExprRef)> {
    let l = left.const_value();
    let r = right.const_value();
    let is_zero = |v: Option<&ConstValue>| v.is_some_and(ConstValue::is_zero);
    let is_one = |v: Option<&ConstValue>| v.is_some_and(ConstValue::is_one);
    let is_empty = |v: Option<&ConstValue>| v.is_some_and(ConstValue::is_empty_string);
    let as_bool = |v: Option<&ConstValue>| v.and_then(ConstValue::as_bool);
    let ty = &expr.ty;
    let span = expr.span;

    match op {
        BinOp::And => match (as_bool(l), as_bool(r)) {
            (Some(true), _) => Some(("true && x", right.clone())),
            (Some(false), _) => Some(("false && x", left.clone())),
            (_, Some(true)) => Some(("x && true", left.clone())),
            (_, Some(false)) if left.is_pure() => Some(("x && false", right.clone())),
            _ => None,
        },
        BinOp::Or => match (as_bool(l), as_bool(r)) {
            (Some(true), _) => Some(("true || x", left.clone())),
            (Some(false), _) => Some(("false || x", right.clone())),
            (_, Some(false)) => Some(("x || false", left.clone())),
            (_, Some(true)) if left.is_pure() => Some(("x || true", right.clone())),
            _ => None,
        },
        BinOp::Add if ty.is_numeric() => {
            if is_zero(r) {
                Some(("x + 0", left.clone()))
            } else if is_zero(l) {
                Some(("0 + x", right.clone()))
            } else {
                None
            }
        }
        BinOp::Add if is_empty(r) => Some(("s + \"\"", left.clone())),
        BinOp::Add if is_empty(l) => Some(("\"\" + s", right.clone())),
        BinOp::Sub if ty.is_numeric() => {
            if is_zero(r) {
                Some(("x - 0", left.clone()))
            } else if is_zero(l) && ty.is_integer() {
                let neg = Expr::unary(UnaryOp::Neg, right.clone(), ty.clone(), span);
                Some(("0 - x", neg))
            } else {
                None
            }
        }
        BinOp::Mul if ty.is_numeric() => {
            if is_one(r) {
                Some(("x * 1", left.clone()))
            } else if is_one(l) {
                Some(("1 * x", right.clone()))
            } else if (is_zero(r) && left.is_pure()) || (is_zero(l) && right.is_pure()) {
                zero(ty, span).map(|z| ("x * 0", z))
            } else {
                None
            }
        }
        BinOp::Div if is_one(r) && ty.is_numeric() => Some(("x / 1", left.clone())),
        BinOp::Pow if ty.is_numeric() => {
            if is_zero(r) && left.is_pure() {
                one(ty, span).map(|o| ("x ** 0", o))
            } else if is_one(r) {
                Some(("x ** 1", left.clone()))
            } else if is_zero(l) && right.is_pure() {
                zero(ty, span).map(|z| ("0 ** x", z))
            } else if is_one(l) && right.is_pure() {
                one(ty, span).map(|o| ("1 ** x", o))
            } else {
                None
            }
        }
        BinOp::BitOr if ty.is_integer() => {
            if is_zero(r) {
                Some(("x | 0", left.clone()))
            } else if is_zero(l) {
                Some(("0 | x", right.clone()))
            } else {
                None
            }
        }
        BinOp::BitAnd if ty.is_integer() => {
            if (is_zero(r) && left.is_pure()) || (is_zero(l) && right.is_pure()) {
                zero(ty, span).map(|z| ("x & 0", z))
            } else {
                None
            }
        }
        BinOp::Shl | BinOp::Shr if ty.is_integer() => {
            if is_zero(r) {
                Some(("x << 0", left.clone()))
            } else if is_zero(l) && right.is_pure() {
                zero(ty, span).map(|z| ("0 << x", z))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn unary(op: UnaryOp, operand: &ExprRef) -> Option<(&'static str, ExprRef)> {
    match (&operand.kind, op) {
        (
            ExprKind::Unary {
                op: inner_op,
                operand: inner,
            },
            _,
        ) if *inner_op == op => Some(("double negation", inner.clone())),
        (ExprKind::Binary { op: cmp, left, right }, UnaryOp::Not) => {
            let inverse = cmp.inverse_comparison()?;
            let float_operands = left.ty.is_float() || right.ty.is_float();
            if float_operands && !matches!(cmp, BinOp::Eq | BinOp::Ne) {
                return None;
            }
            let flipped = Expr::binary(
                inverse,
                left.clone(),
                right.clone(),
                operand.ty.clone(),
                operand.span,
            );
            Some(("inverted comparison", flipped))
        }
        _ => None,
    }
}
