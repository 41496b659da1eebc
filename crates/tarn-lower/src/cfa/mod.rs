// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Control-flow analysis of lowered function bodies.
//!
//! Builds a basic-block graph from the flat statement list, flags blocks no
//! path can reach, checks that every exit of the function is a `return`,
//! and hands back the statements that survive.

mod graph;

pub use graph::{BasicBlock, Connection, ControlFlowGraph};

use tarn_diagnostics::{codes, Diagnostic, Diagnostics};
use tarn_ir::{Span, Stmt};
use tracing::debug;

use crate::LowerError;

/// Which parts of the analysis run.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub check_returns: bool,
    pub prune_unreachable: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            check_returns: true,
            prune_unreachable: true,
        }
    }
}

/// Analyse a lowered body: report a missing return at `span` and return the
/// reachable statements.
pub fn analyse(
    statements: Vec<Stmt>,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Stmt>, LowerError> {
    analyse_with(statements, span, AnalysisOptions::default(), diagnostics)
}

pub fn analyse_with(
    statements: Vec<Stmt>,
    span: Span,
    options: AnalysisOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Stmt>, LowerError> {
    let mut graph = ControlFlowGraph::build(&statements)?;
    let removed = graph.remove_unreachable();
    debug!(
        blocks = graph.blocks.len(),
        removed, "built control-flow graph"
    );

    if options.check_returns && !graph.returns_on_all_paths() {
        diagnostics.push(missing_return(span));
    }

    if options.prune_unreachable && removed > 0 {
        Ok(graph.reachable_statements())
    } else {
        Ok(statements)
    }
}

fn missing_return(span: Span) -> Diagnostic {
    Diagnostic::error("not all control-flow paths return a value")
        .with_code(codes::MISSING_RETURN)
        .with_primary(span, "this function can reach its end without returning")
        .with_note("a function with a return type must end every path in `return`")
        .with_help("add a `return` after the last statement")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tarn_ir::{render_statements, Expr, ExprRef, Label, Symbol, SymbolKind, Type};

    fn label(name: &str) -> Label {
        Label(name.to_string())
    }

    fn var(name: &str, ty: Type) -> ExprRef {
        Expr::ident(Symbol::new(name, ty, SymbolKind::Local), Span::DUMMY)
    }

    fn ret(name: &str) -> Stmt {
        Stmt::Return(Some(var(name, Type::I32)))
    }

    fn goto_if(cond: &str, target: &str) -> Stmt {
        Stmt::GotoIf {
            condition: var(cond, Type::Bool),
            label: label(target),
        }
    }

    fn run(statements: Vec<Stmt>) -> (Vec<Stmt>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let out = analyse(statements, Span::new(0, 10), &mut diagnostics).unwrap();
        (out, diagnostics)
    }

    #[test]
    fn jump_target_is_reachable() {
        let stmts = vec![
            Stmt::Label(label("L1")),
            Stmt::Goto(label("L2")),
            Stmt::Label(label("L2")),
            Stmt::Return(None),
        ];
        let mut graph = ControlFlowGraph::build(&stmts).unwrap();
        assert_eq!(graph.remove_unreachable(), 0);

        let l1 = graph.block_of(&label("L1")).unwrap();
        let l2 = graph.block_of(&label("L2")).unwrap();
        assert_eq!(l1, 0);
        assert!(!graph.blocks[l1].unreachable);
        assert_eq!(graph.blocks[l2].entries.len(), 1);
        assert_eq!(graph.reachable_statements(), stmts);
    }

    #[test]
    fn code_after_return_is_pruned() {
        let stmts = vec![
            Stmt::Return(None),
            Stmt::Label(label("dead")),
            Stmt::Expression(var("x", Type::I32)),
        ];
        let mut graph = ControlFlowGraph::build(&stmts).unwrap();
        graph.remove_unreachable();
        let dead = graph.block_of(&label("dead")).unwrap();
        assert!(graph.blocks[dead].unreachable);

        let (out, diagnostics) = run(stmts);
        assert_eq!(out, vec![Stmt::Return(None)]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn orphaned_chain_is_removed_transitively() {
        let stmts = vec![
            Stmt::Return(None),
            Stmt::Label(label("a")),
            Stmt::Goto(label("b")),
            Stmt::Label(label("b")),
            Stmt::Goto(label("c")),
            Stmt::Label(label("c")),
            Stmt::Return(None),
        ];
        let mut graph = ControlFlowGraph::build(&stmts).unwrap();
        assert_eq!(graph.remove_unreachable(), 3);
        assert!(graph.connections.is_empty());
        assert_eq!(graph.reachable_statements(), vec![Stmt::Return(None)]);
    }

    #[test]
    fn unreachable_cycle_is_kept() {
        let stmts = vec![
            Stmt::Return(None),
            Stmt::Label(label("a")),
            Stmt::Goto(label("b")),
            Stmt::Label(label("b")),
            Stmt::Goto(label("a")),
        ];
        let mut graph = ControlFlowGraph::build(&stmts).unwrap();
        assert_eq!(graph.remove_unreachable(), 0);
        assert_eq!(graph.reachable_statements().len(), stmts.len());
    }

    #[test]
    fn both_branches_returning_passes() {
        let stmts = vec![
            goto_if("c", "else"),
            ret("a"),
            Stmt::Label(label("else")),
            ret("b"),
        ];
        let (out, diagnostics) = run(stmts.clone());
        assert!(diagnostics.is_empty());
        assert_eq!(out, stmts);
    }

    #[test]
    fn falling_off_the_end_is_reported_once() {
        let stmts = vec![goto_if("c", "end"), ret("a"), Stmt::Label(label("end"))];
        let (_, diagnostics) = run(stmts);
        assert_eq!(diagnostics.len(), 1);
        let diag = diagnostics.iter().next().unwrap();
        assert_eq!(diag.message, "not all control-flow paths return a value");
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0700"));
        assert_eq!(diag.primary_span(), Some(Span::new(0, 10)));
        assert_eq!(diag.help.as_deref(), Some("add a `return` after the last statement"));
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn trailing_conditional_jump_falls_off_the_end() {
        let stmts = vec![
            Stmt::Label(label("top")),
            Stmt::Expression(var("x", Type::I32)),
            goto_if("c", "top"),
        ];
        let (_, diagnostics) = run(stmts);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn straight_line_body_without_return_is_reported() {
        let (_, diagnostics) = run(vec![Stmt::Expression(var("x", Type::I32))]);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn empty_body_is_reported() {
        let (out, diagnostics) = run(vec![]);
        assert!(out.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn infinite_loop_needs_no_return() {
        let stmts = vec![
            Stmt::Label(label("top")),
            Stmt::Expression(var("x", Type::I32)),
            Stmt::Goto(label("top")),
        ];
        let (_, diagnostics) = run(stmts);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn statically_true_branch_keeps_else_arm() {
        let result = Symbol::new("$if.0", Type::I32, SymbolKind::Synthetic);
        let assign = |v: i128| {
            let lit = Expr::literal(tarn_ir::ConstValue::Int(v), Type::I32, Span::DUMMY);
            Stmt::Expression(Expr::assign(&result, lit, Span::DUMMY))
        };
        let stmts = vec![
            Stmt::VariableDeclaration {
                symbol: result.clone(),
                value: None,
            },
            Stmt::GotoIf {
                condition: Expr::bool(false, Span::DUMMY),
                label: label("$if.end.2"),
            },
            assign(10),
            Stmt::Goto(label("$if.final.1")),
            Stmt::Label(label("$if.end.2")),
            assign(20),
            Stmt::Label(label("$if.final.1")),
            Stmt::Return(Some(Expr::ident(result.clone(), Span::DUMMY))),
        ];
        let (out, diagnostics) = run(stmts.clone());
        assert!(diagnostics.is_empty());
        assert_eq!(render_statements(&out), render_statements(&stmts));
    }

    #[test]
    fn unknown_label_is_internal_error() {
        let err = ControlFlowGraph::build(&[Stmt::Goto(label("nowhere"))]).unwrap_err();
        assert_eq!(err, LowerError::UnresolvedLabel(label("nowhere")));
    }

    #[test]
    fn duplicate_label_is_internal_error() {
        let stmts = [
            Stmt::Label(label("x")),
            Stmt::Return(None),
            Stmt::Label(label("x")),
        ];
        let err = ControlFlowGraph::build(&stmts).unwrap_err();
        assert_eq!(err.to_string(), "internal error: label `x` is defined more than once");
    }

    #[test]
    fn disabled_checks_leave_body_untouched() {
        let stmts = vec![Stmt::Return(None), Stmt::Expression(var("x", Type::I32))];
        let mut diagnostics = Diagnostics::new();
        let options = AnalysisOptions {
            check_returns: false,
            prune_unreachable: false,
        };
        let out = analyse_with(stmts.clone(), Span::DUMMY, options, &mut diagnostics).unwrap();
        assert_eq!(out, stmts);
        assert!(diagnostics.is_empty());
    }
}
