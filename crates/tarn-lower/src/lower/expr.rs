// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Expression lowering: control-flow constructs and the expressions that
//! contain them.

use tarn_ir::rewrite::map_children;
use tarn_ir::{BinOp, Block, ConstValue, Expr, ExprKind, ExprRef, Label, Stmt, Symbol, Type};
use tarn_optimize::negate;

use super::context::ScopeContext;
use super::{value_of, FunctionLowerer};
use crate::LowerError;

impl FunctionLowerer {
    /// Lower `expr`, emitting the statements of any control flow it
    /// contains, and return a control-flow-free expression for its value.
    pub(crate) fn lower_expr(&mut self, expr: &ExprRef) -> Result<ExprRef, LowerError> {
        Ok(self.lower_operand(expr)?.unwrap_or_else(|| expr.clone()))
    }

    /// Like [`Self::lower_expr`], but `None` when `expr` held no control
    /// flow and comes back unchanged.
    fn lower_operand(&mut self, expr: &ExprRef) -> Result<Option<ExprRef>, LowerError> {
        match &expr.kind {
            ExprKind::Block(block) => self.lower_block(block).map(Some),
            ExprKind::If { .. } => self.lower_if(expr).map(Some),
            ExprKind::While { cond, body } => self.lower_while(expr, cond, body).map(Some),
            ExprKind::For {
                binding,
                iterable,
                body,
            } => self.lower_for(expr, binding, iterable, body).map(Some),
            ExprKind::Binary {
                op: op @ (BinOp::And | BinOp::Or),
                left,
                right,
            } => self.lower_short_circuit(expr, *op, left, right),
            _ => self.lower_children(expr),
        }
    }

    /// Rebuild `expr` with lowered children, left to right.
    ///
    /// When a child emits statements, every earlier operand with a side
    /// effect is first stored in a temporary so it still runs before them.
    fn lower_children(&mut self, expr: &ExprRef) -> Result<Option<ExprRef>, LowerError> {
        let mut children = Vec::new();
        map_children(expr, |child| {
            children.push(child.clone());
            None
        });
        let is_assign = matches!(expr.kind, ExprKind::Assign { .. });

        let mut lowered: Vec<Option<ExprRef>> = Vec::with_capacity(children.len());
        let mut pending: Vec<usize> = Vec::new();
        for (index, child) in children.iter().enumerate() {
            let mark = self.out.len();
            let new = self.lower_operand(child)?;
            if self.out.len() > mark && !pending.is_empty() {
                let hoisted = self.out.split_off(mark);
                for earlier in pending.drain(..) {
                    let value = lowered[earlier]
                        .take()
                        .unwrap_or_else(|| children[earlier].clone());
                    lowered[earlier] = Some(self.spill(value));
                }
                self.out.extend(hoisted);
            }
            let value = new.as_ref().unwrap_or(child);
            // The target of an assignment is a place, not a value.
            if !value.is_pure() && !(is_assign && index == 0) {
                pending.push(index);
            }
            lowered.push(new);
        }

        if lowered.iter().all(Option::is_none) {
            return Ok(None);
        }
        let mut replacements = lowered.into_iter();
        Ok(map_children(expr, |_| replacements.next().flatten()))
    }

    /// Evaluate `value` now and return what stands in for it.
    fn spill(&mut self, value: ExprRef) -> ExprRef {
        let span = value.span;
        if value.ty.is_void() {
            self.emit(Stmt::Expression(value));
            return Expr::unit(span);
        }
        let temp = self.names.variable("tmp", value.ty.clone());
        self.emit(Stmt::VariableDeclaration {
            symbol: temp.clone(),
            value: Some(value),
        });
        Expr::ident(temp, span)
    }

    /// `a && b` and `a || b`. When `b` needs statements they only run if
    /// `a` does not decide the result:
    ///
    /// ```text
    ///     var $and: bool = a
    ///     if !$and goto $and.end
    ///     <statements of b>
    ///     $and = b
    /// $and.end:
    /// ```
    fn lower_short_circuit(
        &mut self,
        expr: &ExprRef,
        op: BinOp,
        left: &ExprRef,
        right: &ExprRef,
    ) -> Result<Option<ExprRef>, LowerError> {
        let new_left = self.lower_operand(left)?;
        let mark = self.out.len();
        let new_right = self.lower_operand(right)?;
        if new_left.is_none() && new_right.is_none() {
            return Ok(None);
        }
        let left = new_left.unwrap_or_else(|| left.clone());
        let right = new_right.unwrap_or_else(|| right.clone());
        if self.out.len() == mark {
            return Ok(Some(expr.with_kind(ExprKind::Binary { op, left, right })));
        }

        let guarded = self.out.split_off(mark);
        let hint = if op == BinOp::And { "and" } else { "or" };
        let result = self.names.variable(hint, Type::Bool);
        let end = self.names.label(&format!("{hint}.end"));
        self.emit(Stmt::VariableDeclaration {
            symbol: result.clone(),
            value: Some(left),
        });
        let current = Expr::ident(result.clone(), expr.span);
        let condition = if op == BinOp::And {
            negate(&current)
        } else {
            current
        };
        self.emit(Stmt::GotoIf {
            condition,
            label: end.clone(),
        });
        self.out.extend(guarded);
        self.assign(&result, right);
        self.emit(Stmt::Label(end));
        Ok(Some(Expr::ident(result, expr.span)))
    }

    // =================================================================
    // if / else if / else
    // =================================================================

    fn lower_if(&mut self, expr: &ExprRef) -> Result<ExprRef, LowerError> {
        let result = self.result_variable("if", &expr.ty);
        let final_label = self.names.label("if.final");
        let ctx = ScopeContext::If {
            final_label: final_label.clone(),
            return_variable: result.clone(),
        };
        self.with_context(ctx, |this| {
            this.lower_if_chain(expr, &final_label, result.as_ref())
        })?;
        self.emit(Stmt::Label(final_label));
        Ok(value_of(result.as_ref(), expr.span))
    }

    fn lower_if_chain(
        &mut self,
        expr: &ExprRef,
        final_label: &Label,
        result: Option<&Symbol>,
    ) -> Result<(), LowerError> {
        let mut current = expr;
        loop {
            let ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } = &current.kind
            else {
                // A plain `else` that is not a block.
                return self.lower_arm_expr(current, result);
            };

            let cond = self.lower_expr(cond)?;
            let Some(else_branch) = else_branch else {
                self.emit(Stmt::GotoIf {
                    condition: negate(&cond),
                    label: final_label.clone(),
                });
                return self.lower_arm(then_branch, result);
            };

            let end_label = self.names.label("if.end");
            self.emit(Stmt::GotoIf {
                condition: negate(&cond),
                label: end_label.clone(),
            });
            self.lower_arm(then_branch, result)?;
            self.emit(Stmt::Goto(final_label.clone()));
            self.emit(Stmt::Label(end_label));

            match &else_branch.kind {
                ExprKind::If { .. } => current = else_branch,
                ExprKind::Block(block) => return self.lower_arm(block, result),
                _ => return self.lower_arm_expr(else_branch, result),
            }
        }
    }

    /// Lower one arm of an `if` chain. The arm has no block context of its
    /// own: a `yield` inside it leaves the whole chain.
    fn lower_arm(&mut self, block: &Block, result: Option<&Symbol>) -> Result<(), LowerError> {
        match block.single_expr() {
            Some(expr) => self.lower_arm_expr(expr, result),
            None => self.lower_statements(&block.statements, result),
        }
    }

    fn lower_arm_expr(&mut self, expr: &ExprRef, result: Option<&Symbol>) -> Result<(), LowerError> {
        let value = self.lower_expr(expr)?;
        match result {
            Some(result) => self.assign(result, value),
            None => self.discard(value),
        }
        Ok(())
    }

    // =================================================================
    // Loops
    // =================================================================

    fn lower_while(
        &mut self,
        expr: &ExprRef,
        cond: &ExprRef,
        body: &Block,
    ) -> Result<ExprRef, LowerError> {
        let result = self.result_variable("while", &expr.ty);
        let start = self.names.label("loop.start");
        let end = self.names.label("loop.end");

        self.emit(Stmt::Label(start.clone()));
        let cond = self.lower_expr(cond)?;
        self.emit(Stmt::GotoIf {
            condition: negate(&cond),
            label: end.clone(),
        });
        let ctx = ScopeContext::Loop {
            break_label: end.clone(),
            continue_label: start.clone(),
            break_variable: result.clone(),
        };
        self.with_context(ctx, |this| this.lower_statements(&body.statements, None))?;
        self.emit(Stmt::Goto(start));
        self.emit(Stmt::Label(end));
        Ok(value_of(result.as_ref(), expr.span))
    }

    /// `for` over a range or a fixed-length array, desugared to a counted
    /// loop.
    fn lower_for(
        &mut self,
        expr: &ExprRef,
        binding: &Symbol,
        iterable: &ExprRef,
        body: &Block,
    ) -> Result<ExprRef, LowerError> {
        let span = iterable.span;
        match (&iterable.kind, &iterable.ty) {
            (
                ExprKind::Range {
                    start,
                    end,
                    inclusive,
                },
                _,
            ) => {
                let step = ConstValue::one_of(&binding.ty).ok_or_else(|| {
                    LowerError::UnsupportedExpression(format!(
                        "`for` over a range of `{}`",
                        binding.ty
                    ))
                })?;
                let start = self.lower_expr(start)?;
                let end = self.lower_expr(end)?;
                let result = self.result_variable("for", &expr.ty);
                self.emit(Stmt::VariableDeclaration {
                    symbol: binding.clone(),
                    value: Some(start),
                });
                let limit = self.names.variable("for.end", end.ty.clone());
                self.emit(Stmt::VariableDeclaration {
                    symbol: limit.clone(),
                    value: Some(end),
                });

                let cmp = if *inclusive { BinOp::Le } else { BinOp::Lt };
                let counter = Expr::ident(binding.clone(), span);
                let bound = Expr::ident(limit, span);
                let cond = Expr::binary(cmp, counter.clone(), bound.clone(), Type::Bool, span);
                // Stepping past the last value of `a..=MAX` would wrap.
                let last = inclusive
                    .then(|| Expr::binary(BinOp::Eq, counter, bound, Type::Bool, span));
                let step = Expr::literal(step, binding.ty.clone(), span);
                let skeleton = CountedLoop {
                    counter: binding,
                    cond,
                    last,
                    step,
                    prologue: None,
                };
                self.lower_counted_loop(skeleton, body, result.as_ref())?;
                Ok(value_of(result.as_ref(), expr.span))
            }
            (_, Type::Array { elem, len }) => {
                let array = self.lower_expr(iterable)?;
                let result = self.result_variable("for", &expr.ty);
                let copy = self.names.variable("for.array", iterable.ty.clone());
                self.emit(Stmt::VariableDeclaration {
                    symbol: copy.clone(),
                    value: Some(array),
                });
                let index = self.names.variable("for.index", Type::U64);
                let zero = Expr::literal(ConstValue::Uint(0), Type::U64, span);
                self.emit(Stmt::VariableDeclaration {
                    symbol: index.clone(),
                    value: Some(zero),
                });

                let len = Expr::literal(ConstValue::Uint(u128::from(*len)), Type::U64, span);
                let cond = Expr::binary(
                    BinOp::Lt,
                    Expr::ident(index.clone(), span),
                    len,
                    Type::Bool,
                    span,
                );
                let element = Expr::new(
                    ExprKind::Index {
                        object: Expr::ident(copy, span),
                        index: Expr::ident(index.clone(), span),
                    },
                    (**elem).clone(),
                    span,
                );
                let bind = Stmt::VariableDeclaration {
                    symbol: binding.clone(),
                    value: Some(element),
                };
                let step = Expr::literal(ConstValue::Uint(1), Type::U64, span);
                let skeleton = CountedLoop {
                    counter: &index,
                    cond,
                    last: None,
                    step,
                    prologue: Some(bind),
                };
                self.lower_counted_loop(skeleton, body, result.as_ref())?;
                Ok(value_of(result.as_ref(), expr.span))
            }
            (_, ty) => Err(LowerError::UnsupportedExpression(format!(
                "`for` over a value of type `{}`",
                ty
            ))),
        }
    }

    /// Shared loop skeleton for `for`:
    ///
    /// ```text
    /// $loop.start:
    ///     if !cond goto $loop.end
    ///     <prologue>
    ///     <body>
    /// $loop.continue:
    ///     if last goto $loop.end
    ///     counter = counter + step
    ///     goto $loop.start
    /// $loop.end:
    /// ```
    fn lower_counted_loop(
        &mut self,
        skeleton: CountedLoop<'_>,
        body: &Block,
        result: Option<&Symbol>,
    ) -> Result<(), LowerError> {
        let CountedLoop {
            counter,
            cond,
            last,
            step,
            prologue,
        } = skeleton;
        let span = cond.span;
        let start = self.names.label("loop.start");
        let next = self.names.label("loop.continue");
        let end = self.names.label("loop.end");

        self.emit(Stmt::Label(start.clone()));
        self.emit(Stmt::GotoIf {
            condition: negate(&cond),
            label: end.clone(),
        });
        if let Some(prologue) = prologue {
            self.emit(prologue);
        }
        let ctx = ScopeContext::Loop {
            break_label: end.clone(),
            continue_label: next.clone(),
            break_variable: result.cloned(),
        };
        self.with_context(ctx, |this| this.lower_statements(&body.statements, None))?;

        self.emit(Stmt::Label(next));
        if let Some(last) = last {
            self.emit(Stmt::GotoIf {
                condition: last,
                label: end.clone(),
            });
        }
        let sum = Expr::binary(
            BinOp::Add,
            Expr::ident(counter.clone(), span),
            step,
            counter.ty.clone(),
            span,
        );
        self.assign(counter, sum);
        self.emit(Stmt::Goto(start));
        self.emit(Stmt::Label(end));
        Ok(())
    }
}

/// Pieces of a counted `for` loop; `last`, when present, ends the loop
/// before the counter steps.
struct CountedLoop<'a> {
    counter: &'a Symbol,
    cond: ExprRef,
    last: Option<ExprRef>,
    step: ExprRef,
    prologue: Option<Stmt>,
}
