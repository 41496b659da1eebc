// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Package-wide ABI rewrite.
//!
//! Struct parameters that fit one integer or one float register are passed
//! as a plain scalar of the same width:
//! 1. Classify each function's signature from its declared type
//! 2. Rename each rewritten parameter to `$abi.<name>` and bind the original
//!    name to a bit-cast of it at the top of the body
//! 3. Bit-cast the matching argument at every call site, classifying the
//!    callee from the function type its identifier carries

use tarn_ir::rewrite::{try_map_children, try_map_stmts};
use tarn_ir::{
    ArgClass, ClassPair, Expr, ExprKind, ExprRef, FunctionAbi, FunctionDeclaration, FunctionType,
    Package, Stmt, Symbol, SymbolKind, Type,
};
use tracing::debug;

use crate::{classify_type, AbiError};

// ── Signatures ──────────────────────────────────────────────────────────

/// Classification of one function type and the scalar each parameter is
/// passed as, when it changes.
#[derive(Debug, Clone)]
struct Signature {
    abi: FunctionAbi,
    passed_as: Vec<Option<Type>>,
}

impl Signature {
    fn of(ty: &FunctionType) -> Result<Self, AbiError> {
        let params = ty
            .params
            .iter()
            .map(classify_type)
            .collect::<Result<Vec<_>, _>>()?;
        let ret = classify_type(&ty.ret)?;
        let passed_as = ty
            .params
            .iter()
            .zip(&params)
            .map(|(param, class)| scalar_for(param, *class))
            .collect();
        Ok(Signature {
            abi: FunctionAbi { params, ret },
            passed_as,
        })
    }

    fn rewrites_anything(&self) -> bool {
        self.passed_as.iter().any(Option::is_some)
    }

    fn lowered(&self, original: &FunctionType) -> FunctionType {
        FunctionType {
            params: original
                .params
                .iter()
                .zip(&self.passed_as)
                .map(|(ty, new)| new.clone().unwrap_or_else(|| ty.clone()))
                .collect(),
            ret: original.ret.clone(),
        }
    }
}

/// Same-width scalar for a struct that travels in a single register.
fn scalar_for(ty: &Type, class: ClassPair) -> Option<Type> {
    let Type::Struct(_) = ty else {
        return None;
    };
    let bits = u32::try_from(ty.size() * 8).ok()?;
    match class {
        (ArgClass::Integer, ArgClass::NoClass) => Some(Type::Int {
            bits,
            signed: false,
        }),
        (ArgClass::Sse, ArgClass::NoClass) if bits == 32 || bits == 64 => {
            Some(Type::Float { bits })
        }
        _ => None,
    }
}

// ── Public API ──────────────────────────────────────────────────────────

/// Rewrite parameter types and call arguments across `package` and record
/// each function's classification.
pub fn fix_abi(package: &Package) -> Result<Package, AbiError> {
    let mut out = package.clone();
    for module in &mut out.modules {
        for func in &mut module.functions {
            *func = rewrite_function(func)?;
        }
    }
    Ok(out)
}

fn rewrite_function(func: &FunctionDeclaration) -> Result<FunctionDeclaration, AbiError> {
    let signature = Signature::of(&func.ty)?;
    let mut params = Vec::with_capacity(func.params.len());
    let mut prologue = Vec::new();
    for (param, passed_as) in func.params.iter().zip(&signature.passed_as) {
        match passed_as {
            Some(scalar) => {
                let incoming = Symbol::new(
                    format!("$abi.{}", param.name),
                    scalar.clone(),
                    SymbolKind::Parameter,
                );
                let incoming_ref = Expr::ident(incoming.clone(), func.span);
                let value = Expr::bitcast(incoming_ref, param.ty.clone());
                prologue.push(Stmt::VariableDeclaration {
                    symbol: param.clone(),
                    value: Some(value),
                });
                params.push(incoming);
            }
            None => params.push(param.clone()),
        }
    }

    let statements = try_map_stmts(&func.body.statements, &mut rewrite_calls)?
        .unwrap_or_else(|| func.body.statements.clone());

    if signature.rewrites_anything() {
        debug!(
            function = %func.name,
            params = prologue.len(),
            "passing aggregate parameters as scalars"
        );
    }

    let mut body = func.body.clone();
    body.statements = prologue.into_iter().chain(statements).collect();
    Ok(FunctionDeclaration {
        name: func.name.clone(),
        params,
        ty: signature.lowered(&func.ty),
        body,
        span: func.span,
        abi: Some(signature.abi),
    })
}

// ── Call sites ──────────────────────────────────────────────────────────

/// Bit-cast rewritten arguments in every call under `expr`.
fn rewrite_calls(expr: &ExprRef) -> Result<Option<ExprRef>, AbiError> {
    let children = try_map_children(expr, &mut rewrite_calls)?;
    let current = children.as_ref().unwrap_or(expr);

    let ExprKind::Call { callee, args } = &current.kind else {
        return Ok(children);
    };
    let Some(symbol) = callee.as_symbol() else {
        return Ok(children);
    };
    let Type::Function(callee_ty) = &symbol.ty else {
        return Ok(children);
    };

    let signature = Signature::of(callee_ty)?;
    if !signature.rewrites_anything() {
        return Ok(children);
    }

    let args = args
        .iter()
        .zip(signature.passed_as.iter().chain(std::iter::repeat(&None)))
        .map(|(arg, passed_as)| match passed_as {
            Some(scalar) => Expr::bitcast(arg.clone(), scalar.clone()),
            None => arg.clone(),
        })
        .collect();
    let mut callee_symbol = symbol.clone();
    callee_symbol.ty = Type::Function(signature.lowered(callee_ty));
    let callee = Expr::ident(callee_symbol, callee.span);
    Ok(Some(current.with_kind(ExprKind::Call { callee, args })))
}
