//! The reflection surface destination types expose to the engine.
//!
//! The builder is polymorphic over "any destination type providing
//! this surface": a record destination lists its fields as
//! [`FieldScheme`]s, a tagged-union destination lists its
//! constructors as [`CtorScheme`]s and knows how to write its own tag
//! and locate its payload slot. Each scheme carries a monomorphized
//! function pointer that builds the converter for that field's or
//! payload's Rust type, which is how the recursive builder walks a
//! destination type without compile-time induction.
//!
//! [`reflect_struct!`](crate::reflect_struct) and
//! [`reflect_variant!`](crate::reflect_variant) implement the surface
//! for `#[repr(C)]` user types.

use crate::convert::RawConv;
use crate::errors::ConvertError;
use recast_types::Type;

/// Builds a [`RawConv`] for one fixed destination type out of a source
/// descriptor. Obtained by instantiating [`erased_build`].
pub type ErasedBuild = for<'s, 'a> fn(&'s Type<'a>) -> Result<RawConv, ConvertError>;

/// The [`ErasedBuild`] instance for destination type `T`.
pub fn erased_build<T: crate::convert::FromDyn>(src: &Type<'_>) -> Result<RawConv, ConvertError> {
    T::build_raw(src)
}

/// One destination record field: name, byte offset within the
/// destination type, and the builder for the field's own type.
pub struct FieldScheme {
    pub name: &'static str,
    pub offset: usize,
    pub build: ErasedBuild,
}

/// One destination union constructor: name, the tag value the
/// destination stores for it, and the builder for its payload type.
pub struct CtorScheme {
    pub name: &'static str,
    pub tag: u32,
    pub build: ErasedBuild,
}

/// A record destination type.
///
/// # Safety
///
/// Every [`FieldScheme::offset`] must be the offset of a field of
/// `Self` whose type is the one the scheme's `build` was instantiated
/// with; converters write through these offsets unchecked.
pub unsafe trait StructDest: Sized + 'static {
    /// Fields in destination declaration order.
    const FIELDS: &'static [FieldScheme];
}

/// A tagged-union destination type.
///
/// # Safety
///
/// [`VariantDest::payload_ptr`] must point at storage large enough for
/// the widest payload type named in [`VariantDest::CTORS`], and
/// [`VariantDest::write_tag`] must store the discriminant the
/// destination's own readers dispatch on.
pub unsafe trait VariantDest: Sized + 'static {
    /// Constructors in destination declaration order.
    const CTORS: &'static [CtorScheme];

    /// Write the destination's tag/discriminant.
    ///
    /// # Safety
    ///
    /// `dst` must point at valid storage for `Self`.
    unsafe fn write_tag(dst: *mut Self, tag: u32);

    /// Pointer to the destination's payload slot.
    ///
    /// # Safety
    ///
    /// `dst` must point at valid storage for `Self`.
    unsafe fn payload_ptr(dst: *mut Self) -> *mut u8;
}

/// Implement the record reflection surface (and with it the converter
/// entry point) for a `#[repr(C)]` struct.
///
/// Lists the struct's fields with their types; offsets are taken from
/// the type itself.
///
/// ```
/// use recast_core::reflect_struct;
///
/// #[repr(C)]
/// #[derive(Default)]
/// struct Point {
///     x: f64,
///     y: i64,
/// }
/// reflect_struct!(Point { x: f64, y: i64 });
/// ```
#[macro_export]
macro_rules! reflect_struct {
    ($name:ty { $($field:ident : $fty:ty),+ $(,)? }) => {
        unsafe impl $crate::reflect::StructDest for $name {
            const FIELDS: &'static [$crate::reflect::FieldScheme] = &[
                $(
                    $crate::reflect::FieldScheme {
                        name: stringify!($field),
                        offset: ::core::mem::offset_of!($name, $field),
                        build: $crate::reflect::erased_build::<$fty>,
                    },
                )+
            ];
        }

        impl $crate::convert::FromDyn for $name {
            fn build_raw(
                src: &$crate::Type<'_>,
            ) -> ::core::result::Result<$crate::convert::RawConv, $crate::ConvertError> {
                $crate::convert::record::build_struct::<Self>(src)
            }
        }
    };
}

/// Implement the tagged-union reflection surface (and with it the
/// converter entry point) for a `#[repr(C)]` struct of the shape
/// `{ tag: u32, payload: union { ... } }`.
///
/// Each listed constructor pairs a name with the tag value the
/// destination stores for it and the Rust type of the corresponding
/// payload union member.
///
/// ```
/// use recast_core::reflect_variant;
///
/// #[repr(C)]
/// union NumberPayload {
///     exact: i64,
///     approx: f64,
/// }
/// #[repr(C)]
/// struct Number {
///     tag: u32,
///     payload: NumberPayload,
/// }
/// reflect_variant!(Number, tag: tag, payload: payload {
///     Exact = 0 => i64,
///     Approx = 1 => f64,
/// });
/// ```
#[macro_export]
macro_rules! reflect_variant {
    ($name:ty, tag: $tag_field:ident, payload: $payload_field:ident {
        $($ctor:ident = $tag:expr => $pty:ty),+ $(,)?
    }) => {
        unsafe impl $crate::reflect::VariantDest for $name {
            const CTORS: &'static [$crate::reflect::CtorScheme] = &[
                $(
                    $crate::reflect::CtorScheme {
                        name: stringify!($ctor),
                        tag: $tag,
                        build: $crate::reflect::erased_build::<$pty>,
                    },
                )+
            ];

            unsafe fn write_tag(dst: *mut Self, tag: u32) {
                unsafe {
                    ::core::ptr::addr_of_mut!((*dst).$tag_field).write_unaligned(tag);
                }
            }

            unsafe fn payload_ptr(dst: *mut Self) -> *mut u8 {
                unsafe {
                    (dst as *mut u8).add(::core::mem::offset_of!($name, $payload_field))
                }
            }
        }

        impl $crate::convert::FromDyn for $name {
            fn build_raw(
                src: &$crate::Type<'_>,
            ) -> ::core::result::Result<$crate::convert::RawConv, $crate::ConvertError> {
                $crate::convert::variant::build_variant::<Self>(src)
            }
        }
    };
}
