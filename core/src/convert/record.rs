//! Record conversion: every destination field is located in the source
//! record by name and converted at its recorded offsets.
//!
//! The destination may be a narrower view of the source: extra source
//! fields are ignored. A destination field with no same-named source
//! field aborts the whole build; no partial converter is ever
//! returned.

use smallvec::SmallVec;
use tracing::trace;

use crate::convert::RawConv;
use crate::errors::ConvertError;
use crate::reflect::StructDest;
use recast_types::Type;

// One entry per destination field, in destination declaration order.
struct FieldConv {
    src_offset: usize,
    dst_offset: usize,
    conv: RawConv,
}

/// Build a record converter for a [`StructDest`] destination type.
pub fn build_struct<T: StructDest>(src: &Type<'_>) -> Result<RawConv, ConvertError> {
    let Type::Struct(src_fields) = src else {
        return Err(ConvertError::KindMismatch {
            expected: "record",
            found: src.to_string(),
        });
    };

    let mut entries: SmallVec<[FieldConv; 8]> = SmallVec::new();
    let mut extent = 0;
    for scheme in T::FIELDS {
        let Some(src_field) = src_fields.iter().find(|f| f.name == scheme.name) else {
            return Err(ConvertError::MissingField(scheme.name.into()));
        };
        let conv = (scheme.build)(src_field.ty)?;
        extent = extent.max(src_field.offset + conv.src_extent());
        entries.push(FieldConv {
            src_offset: src_field.offset,
            dst_offset: scheme.offset,
            conv,
        });
    }
    trace!(
        destination = core::any::type_name::<T>(),
        fields = entries.len(),
        extent,
        "built record converter"
    );

    Ok(RawConv::new(extent, move |src, dst| {
        // Entries are independent; the order is fixed for determinism.
        for entry in entries.iter() {
            unsafe {
                entry
                    .conv
                    .call(src.add(entry.src_offset), dst.add(entry.dst_offset))?;
            }
        }
        Ok(())
    }))
}

#[cfg(test)]
mod tests {
    use crate::convert::build;
    use crate::errors::ConvertError;
    use crate::reflect_struct;
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;
    use recast_types::{Type, TypeManager};

    #[repr(C)]
    #[derive(Debug, Default, PartialEq)]
    struct Ac {
        a: i32,
        c: i32,
    }
    reflect_struct!(Ac { a: i32, c: i32 });

    fn abc_source<'a>(types: &'a TypeManager<'a>) -> &'a Type<'a> {
        types.strukt(&[
            ("a", 0, types.prim("int")),
            ("b", 4, types.prim("int")),
            ("c", 8, types.prim("int")),
        ])
    }

    fn abc_bytes(a: i32, b: i32, c: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        for v in [a, b, c] {
            buf.extend_from_slice(&v.to_ne_bytes());
        }
        buf
    }

    #[test]
    fn destination_may_be_a_subset() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);

        let conv = build::<Ac>(abc_source(types)).unwrap();
        let mut out = Ac::default();
        conv.apply(&abc_bytes(10, 99, 30), &mut out).unwrap();
        assert_eq!(out, Ac { a: 10, c: 30 });
    }

    #[test]
    fn missing_field_aborts_the_build() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);

        #[repr(C)]
        #[derive(Debug, Default)]
        struct Ad {
            a: i32,
            d: i32,
        }
        reflect_struct!(Ad { a: i32, d: i32 });

        assert_eq!(
            build::<Ad>(abc_source(types)).unwrap_err(),
            ConvertError::MissingField("d".into())
        );
    }

    #[test]
    fn fields_match_by_name_not_position() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);
        // Source declares c before a.
        let src_ty = types.strukt(&[("c", 0, types.prim("int")), ("a", 4, types.prim("int"))]);

        let conv = build::<Ac>(src_ty).unwrap();
        let mut src = Vec::new();
        src.extend_from_slice(&30i32.to_ne_bytes());
        src.extend_from_slice(&10i32.to_ne_bytes());
        let mut out = Ac::default();
        conv.apply(&src, &mut out).unwrap();
        assert_eq!(out, Ac { a: 10, c: 30 });
    }

    #[test]
    fn fields_widen_independently() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);

        #[repr(C)]
        #[derive(Debug, Default, PartialEq)]
        struct Wide {
            x: i64,
            y: f64,
        }
        reflect_struct!(Wide { x: i64, y: f64 });

        let src_ty = types.strukt(&[
            ("x", 0, types.prim("short")),
            ("y", 4, types.prim("float")),
        ]);
        let mut src = vec![0u8; 8];
        src[0..2].copy_from_slice(&(-12i16).to_ne_bytes());
        src[4..8].copy_from_slice(&0.5f32.to_ne_bytes());

        let conv = build::<Wide>(src_ty).unwrap();
        assert_eq!(conv.src_extent(), 8);
        let mut out = Wide::default();
        conv.apply(&src, &mut out).unwrap();
        assert_eq!(out, Wide { x: -12, y: 0.5 });
    }

    #[test]
    fn field_failure_aborts_the_build() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);
        // 'a' exists but is a record, not a primitive.
        let inner = types.strukt(&[("q", 0, types.prim("int"))]);
        let src_ty = types.strukt(&[("a", 0, inner), ("c", 4, types.prim("int"))]);

        assert!(matches!(
            build::<Ac>(src_ty),
            Err(ConvertError::KindMismatch { .. })
        ));
    }

    #[test]
    fn non_record_source_is_kind_mismatch() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);
        assert!(matches!(
            build::<Ac>(types.prim("int")),
            Err(ConvertError::KindMismatch { .. })
        ));
    }
}
