// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rebuilding literal nodes from constant values.

use std::sync::Arc;

use tarn_ir::{ConstValue, Expr, ExprKind, ExprRef, Span, Type};

/// Literal expression for `value`, shaped by the static type `ty`.
///
/// Compound constants become compound literals whose elements are literals
/// themselves. A value whose shape does not match its type falls back to a
/// scalar literal node carrying the whole value.
pub(crate) fn literal_of(value: &ConstValue, ty: &Type, span: Span) -> ExprRef {
    let kind = match (value, ty) {
        (ConstValue::Array(items), Type::Array { elem, .. }) => {
            ExprKind::ArrayLiteral(items.iter().map(|v| literal_of(v, elem, span)).collect())
        }
        (ConstValue::Tuple(items), Type::Tuple(types)) if items.len() == types.len() => {
            ExprKind::TupleLiteral(
                items
                    .iter()
                    .zip(types)
                    .map(|(v, t)| literal_of(v, t, span))
                    .collect(),
            )
        }
        (ConstValue::Map(entries), Type::Map { key, value: val_ty }) => ExprKind::MapLiteral(
            entries
                .iter()
                .map(|(k, v)| (literal_of(k, key, span), literal_of(v, val_ty, span)))
                .collect(),
        ),
        (ConstValue::Struct(fields), Type::Struct(st)) => {
            let rebuilt: Option<Vec<_>> = fields
                .iter()
                .map(|(name, v)| {
                    st.field(name)
                        .map(|f| (name.clone(), literal_of(v, &f.ty, span)))
                })
                .collect();
            match rebuilt {
                Some(fields) => ExprKind::StructLiteral(fields),
                None => ExprKind::Literal(value.clone()),
            }
        }
        _ => ExprKind::Literal(value.clone()),
    };
    Arc::new(Expr {
        kind,
        ty: ty.clone(),
        constant: Some(value.clone()),
        span,
    })
}

/// The zero literal of a numeric type.
pub(crate) fn zero(ty: &Type, span: Span) -> Option<ExprRef> {
    ConstValue::zero_of(ty).map(|v| Expr::literal(v, ty.clone(), span))
}

/// The one literal of a numeric type.
pub(crate) fn one(ty: &Type, span: Span) -> Option<ExprRef> {
    ConstValue::one_of(ty).map(|v| Expr::literal(v, ty.clone(), span))
}
