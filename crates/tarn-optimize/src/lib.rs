// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression optimiser for the typed IR.
//!
//! `optimise` is total and pure: constant expressions are replaced by the
//! literal of their annotated value, and everything else is simplified
//! bottom-up with a closed table of algebraic identities (see `rules`).
//! Applying it twice gives the same tree as applying it once.

mod literal;
mod rules;

use std::sync::Arc;

use tarn_ir::rewrite::map_children;
use tarn_ir::{ConstValue, Expr, ExprKind, ExprRef, Type, UnaryOp};
use tracing::trace;

/// Optimise `expr`, returning the original handle when nothing applies.
pub fn optimise(expr: &ExprRef) -> ExprRef {
    rewrite(expr).unwrap_or_else(|| expr.clone())
}

/// Optimised logical negation of a boolean condition.
pub fn negate(cond: &ExprRef) -> ExprRef {
    let constant = cond
        .const_value()
        .and_then(ConstValue::as_bool)
        .map(|b| ConstValue::Bool(!b));
    let not = Arc::new(Expr {
        kind: ExprKind::Unary {
            op: UnaryOp::Not,
            operand: cond.clone(),
        },
        ty: Type::Bool,
        constant,
        span: cond.span,
    });
    optimise(&not)
}

/// `Some` only when the tree changed.
fn rewrite(expr: &ExprRef) -> Option<ExprRef> {
    if let Some(value) = expr.const_value() {
        let lit = literal::literal_of(value, &expr.ty, expr.span);
        return (lit != *expr).then_some(lit);
    }

    let children = map_children(expr, rewrite);
    let current = children.as_ref().unwrap_or(expr);
    match rules::simplify(current) {
        Some((rule, simplified)) => {
            trace!(rule, "simplified `{}` to `{}`", current, simplified);
            Some(rewrite(&simplified).unwrap_or(simplified))
        }
        None => children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tarn_ir::{BinOp, Block, Span, Stmt, StructType, Symbol, SymbolKind};

    fn var(name: &str, ty: Type) -> ExprRef {
        Expr::ident(Symbol::new(name, ty, SymbolKind::Local), Span::DUMMY)
    }

    fn int(v: i128) -> ExprRef {
        Expr::literal(ConstValue::Int(v), Type::I32, Span::DUMMY)
    }

    fn float(v: f64) -> ExprRef {
        Expr::literal(ConstValue::Float(v), Type::F64, Span::DUMMY)
    }

    fn bin(op: BinOp, l: ExprRef, r: ExprRef) -> ExprRef {
        let ty = if op.is_comparison() || matches!(op, BinOp::And | BinOp::Or) {
            Type::Bool
        } else {
            l.ty.clone()
        };
        Expr::binary(op, l, r, ty, Span::DUMMY)
    }

    fn not(e: ExprRef) -> ExprRef {
        Expr::unary(UnaryOp::Not, e, Type::Bool, Span::DUMMY)
    }

    fn call(ty: Type) -> ExprRef {
        let f = Symbol::new("f", ty.clone(), SymbolKind::Function);
        Expr::call(Expr::ident(f, Span::DUMMY), vec![], ty, Span::DUMMY)
    }

    fn constant(kind: ExprKind, ty: Type, value: ConstValue) -> ExprRef {
        Arc::new(Expr {
            kind,
            ty,
            constant: Some(value),
            span: Span::DUMMY,
        })
    }

    fn sample_exprs() -> Vec<ExprRef> {
        let x = var("x", Type::I32);
        let y = var("y", Type::F64);
        let b = var("b", Type::Bool);
        vec![
            bin(BinOp::Add, x.clone(), int(0)),
            bin(BinOp::Sub, int(0), Expr::unary(UnaryOp::Neg, x.clone(), Type::I32, Span::DUMMY)),
            bin(BinOp::Mul, bin(BinOp::Add, x.clone(), int(0)), int(1)),
            bin(BinOp::Pow, y.clone(), float(0.0)),
            not(not(bin(BinOp::Lt, x.clone(), int(3)))),
            not(bin(BinOp::Lt, y.clone(), float(1.0))),
            bin(BinOp::And, b.clone(), Expr::bool(true, Span::DUMMY)),
            bin(BinOp::Or, call(Type::Bool), Expr::bool(true, Span::DUMMY)),
            constant(
                ExprKind::Binary {
                    op: BinOp::Add,
                    left: int(2),
                    right: int(3),
                },
                Type::I32,
                ConstValue::Int(5),
            ),
        ]
    }

    #[test]
    fn optimise_is_idempotent() {
        for e in sample_exprs() {
            let once = optimise(&e);
            let twice = optimise(&once);
            assert_eq!(once, twice, "not idempotent on {}", e);
        }
    }

    #[test]
    fn constants_become_literals_of_their_value() {
        let sum = constant(
            ExprKind::Binary {
                op: BinOp::Mul,
                left: int(6),
                right: int(7),
            },
            Type::I32,
            ConstValue::Int(42),
        );
        let out = optimise(&sum);
        assert_eq!(out.kind, ExprKind::Literal(ConstValue::Int(42)));
        assert_eq!(out.const_value(), Some(&ConstValue::Int(42)));
    }

    #[test]
    fn compound_constant_is_rebuilt_from_its_type() {
        let point = StructType::new("Point", vec![("x", Type::I32), ("y", Type::I32)]);
        let value = ConstValue::Struct(vec![
            ("x".into(), ConstValue::Int(1)),
            ("y".into(), ConstValue::Int(2)),
        ]);
        let e = constant(
            ExprKind::Call {
                callee: var("origin", Type::Void),
                args: vec![],
            },
            Type::Struct(point),
            value.clone(),
        );
        let out = optimise(&e);
        assert!(matches!(out.kind, ExprKind::StructLiteral(_)));
        assert_eq!(out.const_value(), Some(&value));
    }

    #[test]
    fn literals_are_left_alone() {
        let lit = int(9);
        assert!(rewrite(&lit).is_none());
        assert!(Arc::ptr_eq(&optimise(&lit), &lit));
    }

    #[test]
    fn additive_and_multiplicative_identities() {
        for (x, zero, one) in [
            (var("x", Type::I32), int(0), int(1)),
            (var("y", Type::F64), float(0.0), float(1.0)),
        ] {
            let expected = optimise(&x);
            assert_eq!(optimise(&bin(BinOp::Add, x.clone(), zero.clone())), expected);
            assert_eq!(optimise(&bin(BinOp::Add, zero.clone(), x.clone())), expected);
            assert_eq!(optimise(&bin(BinOp::Mul, x.clone(), one.clone())), expected);
            assert_eq!(optimise(&bin(BinOp::Div, x.clone(), one)), expected);
            assert_eq!(optimise(&bin(BinOp::Sub, x.clone(), zero.clone())), expected);

            let product = optimise(&bin(BinOp::Mul, x.clone(), zero.clone()));
            assert_eq!(product.kind, zero.kind);
            assert_eq!(product.ty, x.ty);
        }
    }

    #[test]
    fn double_not_cancels() {
        let b = var("b", Type::Bool);
        assert_eq!(optimise(&not(not(b.clone()))), optimise(&b));
    }

    #[test]
    fn double_negation_and_double_complement_cancel() {
        let x = var("x", Type::I32);
        let neg = |e| Expr::unary(UnaryOp::Neg, e, Type::I32, Span::DUMMY);
        let complement = |e| Expr::unary(UnaryOp::BitNot, e, Type::I32, Span::DUMMY);
        assert_eq!(optimise(&neg(neg(x.clone()))), x);
        assert_eq!(optimise(&complement(complement(x.clone()))), x);

        let mixed = neg(complement(x));
        assert_eq!(optimise(&mixed), mixed);
    }

    #[test]
    fn float_identities() {
        let y = var("y", Type::F64);
        assert_eq!(optimise(&bin(BinOp::Div, y.clone(), float(1.0))), y);
        assert_eq!(optimise(&bin(BinOp::Sub, y.clone(), float(0.0))), y);
        assert_eq!(
            optimise(&bin(BinOp::Pow, y.clone(), float(0.0))).const_value(),
            Some(&ConstValue::Float(1.0))
        );

        let effect = call(Type::F64);
        let e = bin(BinOp::Pow, effect, float(0.0));
        assert_eq!(optimise(&e), e);
    }

    #[test]
    fn possible_division_by_zero_is_not_discarded() {
        let x = var("x", Type::I32);
        let y = var("y", Type::I32);
        let quotient = bin(BinOp::Div, x.clone(), y.clone());
        let e = bin(BinOp::Mul, quotient, int(0));
        assert_eq!(optimise(&e), e);

        let e = bin(BinOp::BitAnd, bin(BinOp::Mod, x.clone(), y), int(0));
        assert_eq!(optimise(&e), e);

        let halved = bin(BinOp::Div, x, int(2));
        let out = optimise(&bin(BinOp::Mul, halved, int(0)));
        assert_eq!(out.const_value(), Some(&ConstValue::Int(0)));
    }

    #[test]
    fn zero_minus_x_negates_integers_only() {
        let x = var("x", Type::I32);
        let out = optimise(&bin(BinOp::Sub, int(0), x.clone()));
        assert_eq!(out.to_string(), "-x");

        let y = var("y", Type::F64);
        let e = bin(BinOp::Sub, float(0.0), y);
        assert_eq!(optimise(&e), e);
    }

    #[test]
    fn zero_minus_negation_is_resimplified() {
        let x = var("x", Type::I32);
        let neg = Expr::unary(UnaryOp::Neg, x.clone(), Type::I32, Span::DUMMY);
        assert_eq!(optimise(&bin(BinOp::Sub, int(0), neg)), x);
    }

    #[test]
    fn discarding_rules_keep_side_effects() {
        let effect = call(Type::I32);
        let e = bin(BinOp::Mul, effect.clone(), int(0));
        assert_eq!(optimise(&e), e);

        let e = bin(BinOp::BitAnd, int(0), effect);
        assert_eq!(optimise(&e), e);

        let guard = call(Type::Bool);
        let e = bin(BinOp::And, guard, Expr::bool(false, Span::DUMMY));
        assert_eq!(optimise(&e), e);
    }

    #[test]
    fn short_circuit_on_constant_left() {
        let effect = call(Type::Bool);
        let out = optimise(&bin(BinOp::And, Expr::bool(false, Span::DUMMY), effect.clone()));
        assert_eq!(out.const_value(), Some(&ConstValue::Bool(false)));

        let out = optimise(&bin(BinOp::Or, Expr::bool(false, Span::DUMMY), effect.clone()));
        assert_eq!(out, effect);
    }

    #[test]
    fn power_identities() {
        let x = var("x", Type::I64);
        let lit = |v| Expr::literal(ConstValue::Int(v), Type::I64, Span::DUMMY);
        assert_eq!(optimise(&bin(BinOp::Pow, x.clone(), lit(1))), x);
        assert_eq!(
            optimise(&bin(BinOp::Pow, x.clone(), lit(0))).const_value(),
            Some(&ConstValue::Int(1))
        );
        assert_eq!(
            optimise(&bin(BinOp::Pow, lit(1), x.clone())).const_value(),
            Some(&ConstValue::Int(1))
        );
        assert_eq!(
            optimise(&bin(BinOp::Pow, lit(0), x)).const_value(),
            Some(&ConstValue::Int(0))
        );
    }

    #[test]
    fn bitwise_and_shift_identities() {
        let x = var("x", Type::U64);
        let zero = Expr::literal(ConstValue::Uint(0), Type::U64, Span::DUMMY);
        assert_eq!(optimise(&bin(BinOp::BitOr, x.clone(), zero.clone())), x);
        assert_eq!(optimise(&bin(BinOp::Shl, x.clone(), zero.clone())), x);
        assert_eq!(optimise(&bin(BinOp::Shr, x.clone(), zero.clone())), x);
        assert_eq!(
            optimise(&bin(BinOp::Shl, zero.clone(), x.clone())).const_value(),
            Some(&ConstValue::Uint(0))
        );
        assert_eq!(
            optimise(&bin(BinOp::BitAnd, x, zero)).const_value(),
            Some(&ConstValue::Uint(0))
        );
    }

    #[test]
    fn empty_string_concatenation() {
        let s = var("s", Type::String);
        let empty = Expr::literal(ConstValue::String(String::new()), Type::String, Span::DUMMY);
        assert_eq!(optimise(&bin(BinOp::Add, s.clone(), empty.clone())), s);
        assert_eq!(optimise(&bin(BinOp::Add, empty, s.clone())), s);
    }

    #[test]
    fn not_inverts_integer_comparisons() {
        let x = var("x", Type::I32);
        let cases = [
            (BinOp::Lt, "x >= 3"),
            (BinOp::Le, "x > 3"),
            (BinOp::Gt, "x <= 3"),
            (BinOp::Ge, "x < 3"),
            (BinOp::Eq, "x != 3"),
            (BinOp::Ne, "x == 3"),
        ];
        for (op, expected) in cases {
            let out = optimise(&not(bin(op, x.clone(), int(3))));
            assert_eq!(out.to_string(), expected);
        }
    }

    #[test]
    fn not_keeps_ordered_float_comparisons() {
        let y = var("y", Type::F64);
        let e = not(bin(BinOp::Lt, y.clone(), float(1.0)));
        assert_eq!(optimise(&e), e);

        let out = optimise(&not(bin(BinOp::Eq, y, float(1.0))));
        assert_eq!(out.to_string(), "y != 1.0");
    }

    #[test]
    fn negate_folds_constant_conditions() {
        let out = negate(&Expr::bool(true, Span::DUMMY));
        assert_eq!(out.kind, ExprKind::Literal(ConstValue::Bool(false)));

        let b = var("b", Type::Bool);
        assert_eq!(negate(&not(b.clone())), b);
    }

    #[test]
    fn statements_in_nested_blocks_are_optimised() {
        let x = var("x", Type::I32);
        let block = Block::new(
            vec![Stmt::Expression(bin(BinOp::Add, x.clone(), int(0)))],
            Type::I32,
            Span::DUMMY,
        );
        let e = Expr::new(ExprKind::Block(block), Type::I32, Span::DUMMY);
        let out = optimise(&e);
        let ExprKind::Block(block) = &out.kind else {
            panic!("expected block, got {}", out);
        };
        assert_eq!(block.single_expr(), Some(&x));
    }
}
