// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lowering of structured function bodies to labels and jumps, and the
//! control-flow analysis that runs on the result.

pub mod cfa;
mod error;
mod lower;

pub use cfa::{analyse, analyse_with, AnalysisOptions, BasicBlock, Connection, ControlFlowGraph};
pub use error::LowerError;
pub use lower::{lower_function_body, NameGenerator};
