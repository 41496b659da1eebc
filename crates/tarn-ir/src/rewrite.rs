// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Child rewriting shared by every pass.
//!
//! A rewrite callback returns `Ok(None)` when a child is unchanged and
//! `Ok(Some(new))` when it was replaced. A parent is rebuilt only when at
//! least one child was replaced, so callers can tell "nothing changed"
//! without comparing node identities.

use std::convert::Infallible;

use crate::{Block, Expr, ExprKind, ExprRef, Stmt};

/// Records whether any child was replaced while rebuilding a node.
struct Tracker<'f, F> {
    f: &'f mut F,
    changed: bool,
}

impl<'f, F, E> Tracker<'f, F>
where
    F: FnMut(&ExprRef) -> Result<Option<ExprRef>, E>,
{
    fn expr(&mut self, e: &ExprRef) -> Result<ExprRef, E> {
        match (self.f)(e)? {
            Some(new) => {
                self.changed = true;
                Ok(new)
            }
            None => Ok(e.clone()),
        }
    }

    fn exprs(&mut self, items: &[ExprRef]) -> Result<Vec<ExprRef>, E> {
        items.iter().map(|e| self.expr(e)).collect()
    }

    fn block(&mut self, block: &Block) -> Result<Block, E> {
        match try_map_block(block, &mut *self.f)? {
            Some(new) => {
                self.changed = true;
                Ok(new)
            }
            None => Ok(block.clone()),
        }
    }
}

/// Rewrite the direct children of `expr` (including statements of nested
/// blocks) with `f`.
pub fn try_map_children<F, E>(expr: &Expr, f: &mut F) -> Result<Option<ExprRef>, E>
where
    F: FnMut(&ExprRef) -> Result<Option<ExprRef>, E>,
{
    let mut t = Tracker { f, changed: false };
    let kind = match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Identifier(_) => return Ok(None),
        ExprKind::ArrayLiteral(items) => ExprKind::ArrayLiteral(t.exprs(items)?),
        ExprKind::TupleLiteral(items) => ExprKind::TupleLiteral(t.exprs(items)?),
        ExprKind::MapLiteral(entries) => ExprKind::MapLiteral(
            entries
                .iter()
                .map(|(k, v)| Ok((t.expr(k)?, t.expr(v)?)))
                .collect::<Result<_, E>>()?,
        ),
        ExprKind::StructLiteral(fields) => ExprKind::StructLiteral(
            fields
                .iter()
                .map(|(name, v)| Ok((name.clone(), t.expr(v)?)))
                .collect::<Result<_, E>>()?,
        ),
        ExprKind::Binary { op, left, right } => ExprKind::Binary {
            op: *op,
            left: t.expr(left)?,
            right: t.expr(right)?,
        },
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op: *op,
            operand: t.expr(operand)?,
        },
        ExprKind::Call { callee, args } => ExprKind::Call {
            callee: t.expr(callee)?,
            args: t.exprs(args)?,
        },
        ExprKind::Field { object, field } => ExprKind::Field {
            object: t.expr(object)?,
            field: field.clone(),
        },
        ExprKind::Index { object, index } => ExprKind::Index {
            object: t.expr(object)?,
            index: t.expr(index)?,
        },
        ExprKind::Assign { target, value } => ExprKind::Assign {
            target: t.expr(target)?,
            value: t.expr(value)?,
        },
        ExprKind::Conversion { kind, value } => ExprKind::Conversion {
            kind: *kind,
            value: t.expr(value)?,
        },
        ExprKind::Range {
            start,
            end,
            inclusive,
        } => ExprKind::Range {
            start: t.expr(start)?,
            end: t.expr(end)?,
            inclusive: *inclusive,
        },
        ExprKind::Block(block) => ExprKind::Block(t.block(block)?),
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => ExprKind::If {
            cond: t.expr(cond)?,
            then_branch: t.block(then_branch)?,
            else_branch: else_branch.as_ref().map(|e| t.expr(e)).transpose()?,
        },
        ExprKind::While { cond, body } => ExprKind::While {
            cond: t.expr(cond)?,
            body: t.block(body)?,
        },
        ExprKind::For {
            binding,
            iterable,
            body,
        } => ExprKind::For {
            binding: binding.clone(),
            iterable: t.expr(iterable)?,
            body: t.block(body)?,
        },
    };
    Ok(t.changed.then(|| expr.with_kind(kind)))
}

/// Rewrite every expression held directly by `stmt`.
pub fn try_map_stmt<F, E>(stmt: &Stmt, f: &mut F) -> Result<Option<Stmt>, E>
where
    F: FnMut(&ExprRef) -> Result<Option<ExprRef>, E>,
{
    let new = match stmt {
        Stmt::VariableDeclaration {
            symbol,
            value: Some(value),
        } => f(value)?.map(|value| Stmt::VariableDeclaration {
            symbol: symbol.clone(),
            value: Some(value),
        }),
        Stmt::Expression(e) => f(e)?.map(Stmt::Expression),
        Stmt::Return(Some(e)) => f(e)?.map(|e| Stmt::Return(Some(e))),
        Stmt::Break(Some(e)) => f(e)?.map(|e| Stmt::Break(Some(e))),
        Stmt::Yield(e) => f(e)?.map(Stmt::Yield),
        Stmt::GotoIf { condition, label } => f(condition)?.map(|condition| Stmt::GotoIf {
            condition,
            label: label.clone(),
        }),
        Stmt::VariableDeclaration { value: None, .. }
        | Stmt::Return(None)
        | Stmt::Break(None)
        | Stmt::Continue
        | Stmt::Label(_)
        | Stmt::Goto(_) => None,
    };
    Ok(new)
}

/// Rewrite every statement of `block`.
pub fn try_map_block<F, E>(block: &Block, f: &mut F) -> Result<Option<Block>, E>
where
    F: FnMut(&ExprRef) -> Result<Option<ExprRef>, E>,
{
    Ok(try_map_stmts(&block.statements, f)?.map(|statements| Block {
        statements,
        ty: block.ty.clone(),
        span: block.span,
    }))
}

/// Rewrite a statement list, returning a new list only when something changed.
pub fn try_map_stmts<F, E>(stmts: &[Stmt], f: &mut F) -> Result<Option<Vec<Stmt>>, E>
where
    F: FnMut(&ExprRef) -> Result<Option<ExprRef>, E>,
{
    let mut changed = false;
    let mut out = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        match try_map_stmt(stmt, f)? {
            Some(new) => {
                changed = true;
                out.push(new);
            }
            None => out.push(stmt.clone()),
        }
    }
    Ok(changed.then_some(out))
}

/// Infallible form of [`try_map_children`].
pub fn map_children(expr: &Expr, mut f: impl FnMut(&ExprRef) -> Option<ExprRef>) -> Option<ExprRef> {
    let result: Result<_, Infallible> = try_map_children(expr, &mut |e: &ExprRef| Ok(f(e)));
    match result {
        Ok(new) => new,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinOp, ConstValue, Span, Symbol, SymbolKind, Type};
    use std::sync::Arc;

    fn int(v: i128) -> ExprRef {
        Expr::literal(ConstValue::Int(v), Type::I64, Span::DUMMY)
    }

    fn var(name: &str) -> ExprRef {
        Expr::ident(Symbol::new(name, Type::I64, SymbolKind::Local), Span::DUMMY)
    }

    #[test]
    fn unchanged_children_return_none() {
        let e = Expr::binary(BinOp::Add, var("a"), int(1), Type::I64, Span::DUMMY);
        assert!(map_children(&e, |_| None).is_none());
    }

    #[test]
    fn changed_child_rebuilds_parent_and_shares_siblings() {
        let left = var("a");
        let e = Expr::binary(BinOp::Add, left.clone(), int(1), Type::I64, Span::DUMMY);
        let new = map_children(&e, |child| child.is_const().then(|| int(2))).unwrap();
        match &new.kind {
            ExprKind::Binary { left: l, right, .. } => {
                assert!(Arc::ptr_eq(l, &left));
                assert_eq!(right.const_value(), Some(&ConstValue::Int(2)));
            }
            other => panic!("expected Binary, got {:?}", other),
        }
    }

    #[test]
    fn statements_inside_nested_blocks_are_visited() {
        let body = Block::new(vec![Stmt::Expression(int(1))], Type::I64, Span::DUMMY);
        let e = Expr::new(ExprKind::Block(body), Type::I64, Span::DUMMY);
        let mut visited = 0;
        let new = map_children(&e, |_| {
            visited += 1;
            Some(int(5))
        });
        assert_eq!(visited, 1);
        let new = new.unwrap();
        let ExprKind::Block(block) = &new.kind else {
            panic!("expected Block");
        };
        assert_eq!(block.single_expr().and_then(|e| e.const_value()), Some(&ConstValue::Int(5)));
    }

    #[test]
    fn errors_propagate() {
        let e = Expr::binary(BinOp::Add, var("a"), int(1), Type::I64, Span::DUMMY);
        let result: Result<_, &str> = try_map_children(&e, &mut |_| Err("boom"));
        assert_eq!(result.unwrap_err(), "boom");
    }
}
