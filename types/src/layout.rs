//! Size and alignment of the wire layout a descriptor describes.
//!
//! These are facts about the *source* value's memory, not about any
//! Rust type: primitives use the C data model (`short` = 2 bytes,
//! `long` = 8, ...), records place fields at their declared offsets,
//! and a variant is a 4-byte tag followed by payload space aligned to
//! the widest payload.

use crate::ty::Type;

/// Width of the tag field at the front of every variant value.
pub const TAG_SIZE: usize = 4;

/// Errors from querying the layout of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The primitive name is not one this engine knows a layout for.
    UnknownPrim(String),
    /// A fixed array's length node is not a concrete size.
    NonSizeLength,
    /// Size nodes describe no storage, so they have no layout.
    NoRuntimeLayout,
}

impl core::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LayoutError::UnknownPrim(name) => {
                write!(f, "unknown primitive type name '{}'", name)
            }
            LayoutError::NonSizeLength => {
                write!(f, "fixed array length is not a concrete size")
            }
            LayoutError::NoRuntimeLayout => {
                write!(f, "size nodes have no runtime layout")
            }
        }
    }
}

impl core::error::Error for LayoutError {}

/// Round `offset` up to the next multiple of `align`.
pub fn align_up(offset: usize, align: usize) -> usize {
    debug_assert!(align > 0);
    offset.div_ceil(align) * align
}

fn prim_layout(name: &str) -> Result<usize, LayoutError> {
    // Primitives are naturally aligned, so size doubles as alignment.
    match name {
        "bool" | "char" | "byte" => Ok(1),
        "short" => Ok(2),
        "int" | "float" => Ok(4),
        "long" | "double" => Ok(8),
        _ => Err(LayoutError::UnknownPrim(name.into())),
    }
}

/// Number of bytes a value of the described type occupies.
pub fn size_of(ty: &Type) -> Result<usize, LayoutError> {
    match ty {
        Type::Prim(name) => prim_layout(name),
        Type::Size(_) => Err(LayoutError::NoRuntimeLayout),
        Type::FixedArr { len, elem } => {
            let Type::Size(n) = len else {
                return Err(LayoutError::NonSizeLength);
            };
            Ok(n * size_of(elem)?)
        }
        Type::Struct(fields) => {
            let mut end = 0;
            for field in fields.iter() {
                end = end.max(field.offset + size_of(field.ty)?);
            }
            Ok(align_up(end, align_of(ty)?))
        }
        Type::Variant(ctors) => {
            let mut payload_align = 1;
            let mut payload_size = 0;
            for ctor in ctors.iter() {
                payload_align = payload_align.max(align_of(ctor.payload)?);
                payload_size = payload_size.max(size_of(ctor.payload)?);
            }
            let payload_off = align_up(TAG_SIZE, payload_align);
            Ok(align_up(payload_off + payload_size, align_of(ty)?))
        }
    }
}

/// Alignment of a value of the described type.
pub fn align_of(ty: &Type) -> Result<usize, LayoutError> {
    match ty {
        Type::Prim(name) => prim_layout(name),
        Type::Size(_) => Err(LayoutError::NoRuntimeLayout),
        Type::FixedArr { elem, .. } => align_of(elem),
        Type::Struct(fields) => {
            let mut align = 1;
            for field in fields.iter() {
                align = align.max(align_of(field.ty)?);
            }
            Ok(align)
        }
        Type::Variant(ctors) => {
            // The tag contributes 4-byte alignment even for byte payloads.
            let mut align = TAG_SIZE;
            for ctor in ctors.iter() {
                align = align.max(align_of(ctor.payload)?);
            }
            Ok(align)
        }
    }
}
