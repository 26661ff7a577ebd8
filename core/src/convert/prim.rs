//! Primitive conversion: identity copies and value-preserving
//! widening.
//!
//! Each destination primitive accepts its own wire name (identity: the
//! source bytes are reinterpreted directly, sizes known equal) plus a
//! fixed whitelist of strictly narrower primitives, converted with a
//! numeric cast. Widening never truncates; narrowing is never implicit
//! and fails the build with `NoConversionPath`.
//!
//! The whitelist forms a chain: char < byte < short < int < long <
//! float < double, with signed/unsigned destinations of one width
//! accepting the same narrower set. `bool` and `char` accept only
//! themselves.

use static_assertions::const_assert_eq;

use crate::convert::{FromDyn, RawConv};
use crate::errors::ConvertError;
use recast_types::Type;

// The widening table below encodes C-model wire sizes; pin the Rust
// destination types to them.
const_assert_eq!(core::mem::size_of::<i8>(), 1);
const_assert_eq!(core::mem::size_of::<i16>(), 2);
const_assert_eq!(core::mem::size_of::<f32>(), 4);
const_assert_eq!(core::mem::size_of::<f64>(), 8);

macro_rules! prim_from_dyn {
    ($ty:ty, $name:literal $(, ($src_name:literal, $src_ty:ty))* $(,)?) => {
        impl FromDyn for $ty {
            fn build_raw(src: &Type<'_>) -> Result<RawConv, ConvertError> {
                let Type::Prim(name) = src else {
                    return Err(ConvertError::KindMismatch {
                        expected: "primitive",
                        found: src.to_string(),
                    });
                };
                match *name {
                    // Identity: reinterpret the source bytes directly.
                    $name => Ok(RawConv::new(
                        ::core::mem::size_of::<$ty>(),
                        |src, dst| {
                            unsafe {
                                ::core::ptr::copy_nonoverlapping(
                                    src,
                                    dst,
                                    ::core::mem::size_of::<$ty>(),
                                );
                            }
                            Ok(())
                        },
                    )),
                    $(
                        $src_name => Ok(RawConv::new(
                            ::core::mem::size_of::<$src_ty>(),
                            |src, dst| {
                                unsafe {
                                    let v = (src as *const $src_ty).read_unaligned();
                                    (dst as *mut $ty).write_unaligned(v as $ty);
                                }
                                Ok(())
                            },
                        )),
                    )*
                    _ => Err(ConvertError::NoConversionPath {
                        from: src.to_string(),
                        to: stringify!($ty),
                    }),
                }
            }
        }
    };
}

prim_from_dyn!(bool, "bool");
prim_from_dyn!(i8, "char");
prim_from_dyn!(u8, "byte", ("char", i8));
prim_from_dyn!(i16, "short", ("char", i8), ("byte", u8));
prim_from_dyn!(u16, "short", ("char", i8), ("byte", u8));
prim_from_dyn!(i32, "int", ("char", i8), ("byte", u8), ("short", i16));
prim_from_dyn!(u32, "int", ("char", i8), ("byte", u8), ("short", i16));
prim_from_dyn!(i64, "long", ("char", i8), ("byte", u8), ("short", i16), ("int", i32));
prim_from_dyn!(u64, "long", ("char", i8), ("byte", u8), ("short", i16), ("int", i32));
prim_from_dyn!(f32, "float", ("char", i8), ("byte", u8), ("short", i16), ("int", i32));
prim_from_dyn!(
    f64,
    "double",
    ("char", i8),
    ("byte", u8),
    ("short", i16),
    ("int", i32),
    ("long", i64),
    ("float", f32),
);
