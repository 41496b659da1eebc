// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Packages, modules and function declarations.

use crate::{Block, FunctionType, Span, Symbol};

/// Argument class of one eightbyte of a value, as decided by the ABI pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgClass {
    NoClass,
    Integer,
    Sse,
    SseUp,
    Memory,
}

/// Low and high eightbyte classes.
pub type ClassPair = (ArgClass, ArgClass);

/// Per-function classification recorded for code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionAbi {
    pub params: Vec<ClassPair>,
    pub ret: ClassPair,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub params: Vec<Symbol>,
    pub ty: FunctionType,
    pub body: Block,
    pub span: Span,
    /// Filled in by the ABI pass.
    pub abi: Option<FunctionAbi>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub functions: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub modules: Vec<Module>,
}

impl Package {
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDeclaration> {
        self.modules.iter().flat_map(|m| m.functions.iter())
    }
}
