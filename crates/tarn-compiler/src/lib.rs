// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Middle-end driver.
//!
//! Takes a type-checked package and produces the flat, control-flow checked
//! form code generation consumes:
//! 1. Lower each function body to labels and jumps
//! 2. Analyse the result: report missing returns, prune dead blocks
//! 3. Rewrite aggregate parameters for the calling convention

mod config;
mod error;

pub use config::MiddleEndConfig;
pub use error::CompileError;

use tarn_abi::fix_abi;
use tarn_diagnostics::Diagnostics;
use tarn_ir::{Block, FunctionDeclaration, Module, Package};
use tarn_lower::{analyse_with, lower_function_body, LowerError, NameGenerator};
use tracing::{debug, info};

/// Lower one function and run control-flow analysis over it.
///
/// A missing return is appended to `diagnostics`; only internal errors
/// abort.
pub fn lower_function(
    decl: &FunctionDeclaration,
    config: &MiddleEndConfig,
    diagnostics: &mut Diagnostics,
) -> Result<FunctionDeclaration, CompileError> {
    let statements = lower_function_body(&decl.body, &decl.ty.ret, NameGenerator::new())
        .map_err(|e| in_function(decl, e))?;
    let statements = analyse_with(statements, decl.span, config.analysis(), diagnostics)
        .map_err(|e| in_function(decl, e))?;
    debug!(
        function = %decl.name,
        statements = statements.len(),
        "lowered function"
    );

    Ok(FunctionDeclaration {
        body: Block::new(statements, decl.body.ty.clone(), decl.body.span),
        ..decl.clone()
    })
}

/// Lower every function of every module in order, then fix up the ABI of
/// the whole package.
pub fn compile_package(
    package: &Package,
    config: &MiddleEndConfig,
    diagnostics: &mut Diagnostics,
) -> Result<Package, CompileError> {
    let mut modules = Vec::with_capacity(package.modules.len());
    for module in &package.modules {
        let functions = module
            .functions
            .iter()
            .map(|f| lower_function(f, config, diagnostics))
            .collect::<Result<Vec<_>, _>>()?;
        modules.push(Module {
            name: module.name.clone(),
            functions,
        });
    }

    let lowered = Package {
        name: package.name.clone(),
        modules,
    };
    info!(
        package = %package.name,
        diagnostics = diagnostics.len(),
        "middle-end finished lowering"
    );

    if config.fix_abi {
        Ok(fix_abi(&lowered)?)
    } else {
        Ok(lowered)
    }
}

fn in_function(decl: &FunctionDeclaration, source: LowerError) -> CompileError {
    CompileError::Lower {
        function: decl.name.clone(),
        source,
    }
}
