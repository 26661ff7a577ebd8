//! Fixed-length array conversion: if the elements convert, `[T; N]`
//! converts, element by element.

use crate::convert::{FromDyn, RawConv};
use crate::errors::ConvertError;
use recast_types::{self as types, Type};

impl<T: FromDyn, const N: usize> FromDyn for [T; N] {
    fn build_raw(src: &Type<'_>) -> Result<RawConv, ConvertError> {
        let Type::FixedArr { len, elem } = src else {
            return Err(ConvertError::KindMismatch {
                expected: "fixed-size array",
                found: src.to_string(),
            });
        };
        let Type::Size(n) = len else {
            return Err(ConvertError::InvalidLength {
                found: src.to_string(),
            });
        };
        if *n != N {
            return Err(ConvertError::LengthMismatch {
                expected: N,
                found: *n,
            });
        }

        let conv_elem = T::build_raw(elem)?;
        let src_stride = types::size_of(elem)?;
        let dst_stride = core::mem::size_of::<T>();
        // An element converter never reads past its element's layout.
        debug_assert!(conv_elem.src_extent() <= src_stride);

        Ok(RawConv::new(N * src_stride, move |src, dst| {
            for i in 0..N {
                unsafe {
                    conv_elem.call(src.add(i * src_stride), dst.add(i * dst_stride))?;
                }
            }
            Ok(())
        }))
    }
}
