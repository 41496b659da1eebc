// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Eightbyte classification.
//!
//! A value of up to 16 bytes is described by two classes, one per eightbyte.
//! Scalars write the slot their byte offset falls in; structs merge the
//! classes of their fields slot by slot. Anything bigger goes in memory.

use tarn_ir::{ArgClass, ClassPair, StructType, Type};

use crate::AbiError;

const EIGHTBYTE: u64 = 8;
const TWO_EIGHTBYTES: u64 = 2 * EIGHTBYTE;

/// Classify `ty` stored at `byte_offset` within the enclosing value.
pub fn classify(ty: &Type, byte_offset: u64) -> Result<ClassPair, AbiError> {
    use ArgClass::*;

    let pair = match ty {
        Type::Void => (NoClass, NoClass),
        Type::Bool | Type::String | Type::Pointer(_) => slot(byte_offset, Integer),
        Type::Int { bits, .. } => match *bits {
            0..=64 => slot(byte_offset, Integer),
            65..=128 => (Integer, Integer),
            _ => return Err(AbiError::UnsupportedWidth(ty.clone())),
        },
        Type::Float { bits } => match *bits {
            0..=64 => slot(byte_offset, Sse),
            128 => (Sse, SseUp),
            _ => return Err(AbiError::UnsupportedWidth(ty.clone())),
        },
        Type::Struct(st) => classify_struct(st, byte_offset)?,
        Type::Array { .. }
        | Type::Tuple(_)
        | Type::Map { .. }
        | Type::Function(_)
        | Type::Meta => slot(byte_offset, Memory),
    };
    Ok(pair)
}

/// Classify a whole value.
pub fn classify_type(ty: &Type) -> Result<ClassPair, AbiError> {
    classify(ty, 0)
}

/// Combine the classes two fields contribute to the same eightbyte.
pub fn merge(a: ArgClass, b: ArgClass) -> ArgClass {
    use ArgClass::*;

    match (a, b) {
        (a, b) if a == b => a,
        (NoClass, other) | (other, NoClass) => other,
        (Memory, _) | (_, Memory) => Memory,
        (Integer, _) | (_, Integer) => Integer,
        _ => Sse,
    }
}

fn slot(byte_offset: u64, class: ArgClass) -> ClassPair {
    if byte_offset < EIGHTBYTE {
        (class, ArgClass::NoClass)
    } else {
        (ArgClass::NoClass, class)
    }
}

fn classify_struct(st: &StructType, base: u64) -> Result<ClassPair, AbiError> {
    let size = st.size();
    if size > TWO_EIGHTBYTES {
        return Ok((ArgClass::Memory, ArgClass::Memory));
    }

    let (mut lo, mut hi) = (ArgClass::NoClass, ArgClass::NoClass);
    for (field, offset) in st.fields.iter().zip(st.field_offsets()) {
        let (field_lo, field_hi) = classify(&field.ty, base + offset)?;
        lo = merge(lo, field_lo);
        hi = merge(hi, field_hi);
        if lo == ArgClass::Memory || hi == ArgClass::Memory {
            return Ok((ArgClass::Memory, ArgClass::Memory));
        }
    }
    Ok(post_merge(lo, hi, size))
}

fn post_merge(mut lo: ArgClass, mut hi: ArgClass, size: u64) -> ClassPair {
    use ArgClass::*;

    if hi == Memory {
        lo = Memory;
    }
    if size > TWO_EIGHTBYTES && (lo, hi) != (Sse, SseUp) {
        lo = Memory;
    }
    if hi == SseUp && lo != Sse {
        hi = Sse;
    }
    (lo, hi)
}
