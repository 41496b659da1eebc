// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Jump targets of the constructs enclosing the statement being lowered.

use tarn_ir::{Label, Symbol};

use crate::LowerError;

#[derive(Debug, Clone)]
pub(crate) enum ScopeContext {
    Loop {
        break_label: Label,
        continue_label: Label,
        break_variable: Option<Symbol>,
    },
    Block {
        end_label: Label,
        yield_variable: Option<Symbol>,
    },
    If {
        final_label: Label,
        return_variable: Option<Symbol>,
    },
}

/// Where a `yield` sends its value.
pub(crate) struct YieldTarget<'a> {
    pub label: &'a Label,
    pub variable: Option<&'a Symbol>,
}

/// Where `break` and `continue` jump.
pub(crate) struct LoopTarget<'a> {
    pub break_label: &'a Label,
    pub continue_label: &'a Label,
    pub break_variable: Option<&'a Symbol>,
}

/// Stack of enclosing contexts; mirrors the lexical nesting of the body.
#[derive(Debug, Default)]
pub(crate) struct ContextStack {
    frames: Vec<ScopeContext>,
}

impl ContextStack {
    pub fn push(&mut self, ctx: ScopeContext) {
        self.frames.push(ctx);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn nearest_loop(&self, statement: &'static str) -> Result<LoopTarget<'_>, LowerError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| match frame {
                ScopeContext::Loop {
                    break_label,
                    continue_label,
                    break_variable,
                } => Some(LoopTarget {
                    break_label,
                    continue_label,
                    break_variable: break_variable.as_ref(),
                }),
                _ => None,
            })
            .ok_or(LowerError::MissingContext {
                statement,
                expected: "loop",
            })
    }

    /// Nearest block, or `if` arm, a `yield` can leave.
    pub fn nearest_yield_target(&self) -> Result<YieldTarget<'_>, LowerError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| match frame {
                ScopeContext::Block {
                    end_label,
                    yield_variable,
                } => Some(YieldTarget {
                    label: end_label,
                    variable: yield_variable.as_ref(),
                }),
                ScopeContext::If {
                    final_label,
                    return_variable,
                } => Some(YieldTarget {
                    label: final_label,
                    variable: return_variable.as_ref(),
                }),
                ScopeContext::Loop { .. } => None,
            })
            .ok_or(LowerError::MissingContext {
                statement: "yield",
                expected: "block",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarn_ir::{SymbolKind, Type};

    fn label(name: &str) -> Label {
        Label(name.to_string())
    }

    #[test]
    fn loop_lookup_skips_inner_blocks() {
        let mut stack = ContextStack::default();
        stack.push(ScopeContext::Loop {
            break_label: label("end"),
            continue_label: label("start"),
            break_variable: None,
        });
        stack.push(ScopeContext::Block {
            end_label: label("block.end"),
            yield_variable: None,
        });

        let target = stack.nearest_loop("break").unwrap();
        assert_eq!(target.break_label, &label("end"));
        assert_eq!(target.continue_label, &label("start"));
    }

    #[test]
    fn yield_targets_nearest_block_or_if() {
        let mut stack = ContextStack::default();
        let var = Symbol::new("$if.0", Type::I32, SymbolKind::Synthetic);
        stack.push(ScopeContext::If {
            final_label: label("if.final"),
            return_variable: Some(var.clone()),
        });
        stack.push(ScopeContext::Loop {
            break_label: label("end"),
            continue_label: label("start"),
            break_variable: None,
        });

        let target = stack.nearest_yield_target().unwrap();
        assert_eq!(target.label, &label("if.final"));
        assert_eq!(target.variable, Some(&var));
    }

    #[test]
    fn empty_stack_is_an_internal_error() {
        let stack = ContextStack::default();
        let err = stack.nearest_loop("continue").err().unwrap();
        assert_eq!(
            err.to_string(),
            "internal error: `continue` outside of any enclosing loop"
        );
    }
}
