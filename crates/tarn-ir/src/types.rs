// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Types of the typed IR. All types are concrete: generics are gone by the
//! time a package reaches the middle-end.

/// A fully resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Bool,
    /// Integer of an arbitrary bit width.
    Int { bits: u32, signed: bool },
    /// IEEE float; 32, 64 or 128 bits.
    Float { bits: u32 },
    /// Runtime string handle.
    String,
    Pointer(Box<Type>),
    Array { elem: Box<Type>, len: u64 },
    Tuple(Vec<Type>),
    Map { key: Box<Type>, value: Box<Type> },
    Struct(StructType),
    Function(FunctionType),
    /// Type of type-valued constants.
    Meta,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub ret: Box<Type>,
}

/// Size of pointers and runtime handles on the supported targets.
pub const POINTER_SIZE: u64 = 8;

impl Type {
    pub const I8: Type = Type::Int { bits: 8, signed: true };
    pub const I16: Type = Type::Int { bits: 16, signed: true };
    pub const I32: Type = Type::Int { bits: 32, signed: true };
    pub const I64: Type = Type::Int { bits: 64, signed: true };
    pub const U8: Type = Type::Int { bits: 8, signed: false };
    pub const U64: Type = Type::Int { bits: 64, signed: false };
    pub const F32: Type = Type::Float { bits: 32 };
    pub const F64: Type = Type::Float { bits: 64 };

    /// Byte size of a value of this type.
    pub fn size(&self) -> u64 {
        match self {
            Type::Void | Type::Meta => 0,
            Type::Bool => 1,
            Type::Int { bits, .. } | Type::Float { bits } => scalar_bytes(*bits),
            Type::String | Type::Pointer(_) | Type::Map { .. } | Type::Function(_) => POINTER_SIZE,
            Type::Array { elem, len } => elem.size() * len,
            Type::Tuple(elems) => aggregate_layout(elems.iter()).0,
            Type::Struct(s) => s.size(),
        }
    }

    /// Alignment in bytes.
    pub fn align(&self) -> u64 {
        match self {
            Type::Void | Type::Meta | Type::Bool => 1,
            Type::Int { bits, .. } | Type::Float { bits } => scalar_bytes(*bits),
            Type::String | Type::Pointer(_) | Type::Map { .. } | Type::Function(_) => POINTER_SIZE,
            Type::Array { elem, .. } => elem.align(),
            Type::Tuple(elems) => elems.iter().map(Type::align).max().unwrap_or(1),
            Type::Struct(s) => s.align(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int { .. })
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float { .. })
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }
}

impl StructType {
    pub fn new(name: impl Into<String>, fields: Vec<(&str, Type)>) -> Self {
        StructType {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(name, ty)| Field { name: name.to_string(), ty })
                .collect(),
        }
    }

    pub fn size(&self) -> u64 {
        aggregate_layout(self.fields.iter().map(|f| &f.ty)).0
    }

    pub fn align(&self) -> u64 {
        self.fields.iter().map(|f| f.ty.align()).max().unwrap_or(1)
    }

    /// Byte offset of every field, in declaration order.
    pub fn field_offsets(&self) -> Vec<u64> {
        aggregate_layout(self.fields.iter().map(|f| &f.ty)).1
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Bytes taken by an `n`-bit scalar: whole bytes, rounded up to a power of two.
fn scalar_bytes(bits: u32) -> u64 {
    u64::from(bits.div_ceil(8)).next_power_of_two()
}

/// C layout: returns (total size, per-field offsets).
fn aggregate_layout<'a>(fields: impl Iterator<Item = &'a Type>) -> (u64, Vec<u64>) {
    let mut offset = 0u64;
    let mut max_align = 1u64;
    let mut offsets = Vec::new();
    for ty in fields {
        let align = ty.align().max(1);
        max_align = max_align.max(align);
        offset = offset.next_multiple_of(align);
        offsets.push(offset);
        offset += ty.size();
    }
    (offset.next_multiple_of(max_align), offsets)
}
