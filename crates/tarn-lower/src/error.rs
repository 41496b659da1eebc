// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Internal compiler errors raised while lowering or analysing a function.
//!
//! None of these describe a mistake in the user's program: they mean an
//! earlier pass (or this one) handed over IR that breaks an invariant.

use tarn_ir::Label;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LowerError {
    #[error("internal error: `{statement}` outside of any enclosing {expected}")]
    MissingContext {
        statement: &'static str,
        expected: &'static str,
    },
    #[error("internal error: cannot lower {0}")]
    UnsupportedExpression(String),
    #[error("internal error: statement `{0}` is not valid before lowering")]
    UnsupportedStatement(String),
    #[error("internal error: jump to undefined label `{0}`")]
    UnresolvedLabel(Label),
    #[error("internal error: label `{0}` is defined more than once")]
    DuplicateLabel(Label),
}
