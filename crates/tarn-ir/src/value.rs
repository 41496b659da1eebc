// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Compile-time constant values attached to IR expressions by the type checker.

use crate::Type;

/// A constant value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i128),
    Uint(u128),
    Float(f64),
    Bool(bool),
    String(String),
    Array(Vec<ConstValue>),
    Tuple(Vec<ConstValue>),
    /// Entries in source order.
    Map(Vec<(ConstValue, ConstValue)>),
    /// Field values by name.
    Struct(Vec<(String, ConstValue)>),
    Type(Type),
    Unit,
}

impl ConstValue {
    /// The zero of a numeric type, `None` for anything else.
    pub fn zero_of(ty: &Type) -> Option<ConstValue> {
        match ty {
            Type::Int { signed: true, .. } => Some(ConstValue::Int(0)),
            Type::Int { signed: false, .. } => Some(ConstValue::Uint(0)),
            Type::Float { .. } => Some(ConstValue::Float(0.0)),
            _ => None,
        }
    }

    /// The one of a numeric type, `None` for anything else.
    pub fn one_of(ty: &Type) -> Option<ConstValue> {
        match ty {
            Type::Int { signed: true, .. } => Some(ConstValue::Int(1)),
            Type::Int { signed: false, .. } => Some(ConstValue::Uint(1)),
            Type::Float { .. } => Some(ConstValue::Float(1.0)),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            ConstValue::Int(v) => *v == 0,
            ConstValue::Uint(v) => *v == 0,
            ConstValue::Float(v) => *v == 0.0,
            _ => false,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            ConstValue::Int(v) => *v == 1,
            ConstValue::Uint(v) => *v == 1,
            ConstValue::Float(v) => *v == 1.0,
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_empty_string(&self) -> bool {
        matches!(self, ConstValue::String(s) if s.is_empty())
    }
}
