// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Typed intermediate representation consumed and produced by the tarn
//! middle-end.
//!
//! The type checker hands over a [`Package`] whose function bodies are
//! structured, expression-oriented [`Block`]s. Lowering replaces each body
//! with a flat statement list built from labels and jumps; the ABI pass then
//! rewrites aggregate parameters and call arguments.

pub mod decl;
pub mod display;
pub mod expr;
pub mod rewrite;
pub mod span;
pub mod stmt;
pub mod types;
pub mod value;

pub use decl::{ArgClass, ClassPair, FunctionAbi, FunctionDeclaration, Module, Package};
pub use display::render_statements;
pub use expr::{BinOp, ConversionKind, Expr, ExprKind, ExprRef, UnaryOp};
pub use span::{LineIndex, Span};
pub use stmt::{Block, Label, Stmt, Symbol, SymbolKind};
pub use types::{Field, FunctionType, StructType, Type, POINTER_SIZE};
pub use value::ConstValue;
