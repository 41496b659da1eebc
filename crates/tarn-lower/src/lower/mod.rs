// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Control-transfer lowering: structured body → flat statements.
//!
//! Every `if`, `while`, `for` and block expression becomes a run of
//! `Label`/`Goto`/`GotoIf` statements. A construct that produces a value
//! stores it in a synthetic variable declared just before the construct, and
//! the variable is what the enclosing expression sees. `break`, `continue`
//! and `yield` resolve their target on the context stack.

mod context;
mod expr;
mod names;

pub use names::NameGenerator;

use context::{ContextStack, ScopeContext};
use tarn_ir::{Block, Expr, ExprKind, ExprRef, Span, Stmt, Symbol, Type};
use tracing::trace;

use crate::LowerError;

/// Lower a function body.
///
/// The body's value is returned with an explicit `return`; a function
/// returning `void` gets a trailing `return` so its end is a proper exit.
pub fn lower_function_body(
    body: &Block,
    ret: &Type,
    names: NameGenerator,
) -> Result<Vec<Stmt>, LowerError> {
    let mut lowerer = FunctionLowerer::new(names);
    let value = lowerer.lower_block(body)?;
    if ret.is_void() || body.ty.is_void() {
        lowerer.discard(value);
        if ret.is_void() {
            lowerer.emit(Stmt::Return(None));
        }
    } else {
        lowerer.emit(Stmt::Return(Some(value)));
    }
    Ok(lowerer.finish())
}

pub(crate) struct FunctionLowerer {
    names: NameGenerator,
    contexts: ContextStack,
    out: Vec<Stmt>,
}

impl FunctionLowerer {
    pub(crate) fn new(names: NameGenerator) -> Self {
        Self {
            names,
            contexts: ContextStack::default(),
            out: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> Vec<Stmt> {
        self.out
    }

    fn emit(&mut self, stmt: Stmt) {
        trace!("emit {}", stmt);
        self.out.push(stmt);
    }

    /// Run `f` with `ctx` pushed; the frame is popped on every exit path.
    fn with_context<T>(
        &mut self,
        ctx: ScopeContext,
        f: impl FnOnce(&mut Self) -> Result<T, LowerError>,
    ) -> Result<T, LowerError> {
        self.contexts.push(ctx);
        let result = f(self);
        self.contexts.pop();
        result
    }

    /// Declare the variable that carries a construct's value, or `None` for
    /// `void` constructs.
    fn result_variable(&mut self, hint: &str, ty: &Type) -> Option<Symbol> {
        if ty.is_void() {
            return None;
        }
        let symbol = self.names.variable(hint, ty.clone());
        self.emit(Stmt::VariableDeclaration {
            symbol: symbol.clone(),
            value: None,
        });
        Some(symbol)
    }

    /// Keep `value` only if evaluating it can do something.
    fn discard(&mut self, value: ExprRef) {
        if !matches!(value.kind, ExprKind::Literal(_) | ExprKind::Identifier(_)) {
            self.emit(Stmt::Expression(value));
        }
    }

    fn assign(&mut self, target: &Symbol, value: ExprRef) {
        let span = value.span;
        self.emit(Stmt::Expression(Expr::assign(target, value, span)));
    }

    // =================================================================
    // Blocks and statements
    // =================================================================

    /// Lower a block expression and return its value.
    pub(crate) fn lower_block(&mut self, block: &Block) -> Result<ExprRef, LowerError> {
        if let Some(expr) = block.single_expr() {
            return self.lower_expr(expr);
        }

        let result = self.result_variable("block", &block.ty);
        let end_label = self.names.label("block.end");
        let ctx = ScopeContext::Block {
            end_label: end_label.clone(),
            yield_variable: result.clone(),
        };
        self.with_context(ctx, |this| {
            this.lower_statements(&block.statements, result.as_ref())
        })?;
        self.emit(Stmt::Label(end_label));
        Ok(value_of(result.as_ref(), block.span))
    }

    /// Lower `stmts`; when `target` is given, a trailing expression statement
    /// is the block's value and is stored there.
    fn lower_statements(
        &mut self,
        stmts: &[Stmt],
        target: Option<&Symbol>,
    ) -> Result<(), LowerError> {
        let Some((last, init)) = stmts.split_last() else {
            return Ok(());
        };
        for stmt in init {
            self.lower_stmt(stmt)?;
        }
        match (last, target) {
            (Stmt::Expression(e), Some(target)) => {
                let value = self.lower_expr(e)?;
                self.assign(target, value);
                Ok(())
            }
            _ => self.lower_stmt(last),
        }
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), LowerError> {
        match stmt {
            Stmt::VariableDeclaration { symbol, value } => {
                let value = value.as_ref().map(|v| self.lower_expr(v)).transpose()?;
                self.emit(Stmt::VariableDeclaration {
                    symbol: symbol.clone(),
                    value,
                });
            }
            Stmt::Expression(e) => {
                let value = self.lower_expr(e)?;
                self.discard(value);
            }
            Stmt::Return(value) => {
                let value = value.as_ref().map(|v| self.lower_expr(v)).transpose()?;
                self.emit(Stmt::Return(value));
            }
            Stmt::Break(value) => {
                let (label, variable) = {
                    let target = self.contexts.nearest_loop("break")?;
                    (target.break_label.clone(), target.break_variable.cloned())
                };
                if let Some(value) = value {
                    let value = self.lower_expr(value)?;
                    match &variable {
                        Some(variable) => self.assign(variable, value),
                        None => self.discard(value),
                    }
                }
                self.emit(Stmt::Goto(label));
            }
            Stmt::Continue => {
                let label = self.contexts.nearest_loop("continue")?.continue_label.clone();
                self.emit(Stmt::Goto(label));
            }
            Stmt::Yield(value) => {
                let (label, variable) = {
                    let target = self.contexts.nearest_yield_target()?;
                    (target.label.clone(), target.variable.cloned())
                };
                let value = self.lower_expr(value)?;
                match &variable {
                    Some(variable) => self.assign(variable, value),
                    None => self.discard(value),
                }
                self.emit(Stmt::Goto(label));
            }
            Stmt::Label(_) | Stmt::Goto(_) | Stmt::GotoIf { .. } => {
                return Err(LowerError::UnsupportedStatement(stmt.to_string()));
            }
        }
        Ok(())
    }
}

/// Value of a construct after lowering: its result variable, or unit.
fn value_of(result: Option<&Symbol>, span: Span) -> ExprRef {
    match result {
        Some(symbol) => Expr::ident(symbol.clone(), span),
        None => Expr::unit(span),
    }
}
