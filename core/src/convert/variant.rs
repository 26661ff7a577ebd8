//! Tagged-union conversion: constructors are matched by name and
//! dispatched at apply time on the source value's leading 4-byte tag.
//!
//! A destination constructor with no same-named source constructor is
//! simply skipped: the destination union may declare constructors the
//! observed source type never uses. In the source layout the payload
//! always starts at the same offset after the tag, determined by the
//! widest matched payload's alignment, so that offset is folded
//! incrementally as constructors are discovered; the final value does
//! not depend on discovery order.

use hashbrown::HashMap;
use static_assertions::const_assert_eq;
use tracing::trace;

use crate::convert::RawConv;
use crate::errors::{ApplyError, ConvertError};
use crate::reflect::VariantDest;
use recast_types::{self as types, Type, TAG_SIZE};

const_assert_eq!(core::mem::size_of::<u32>(), TAG_SIZE);

// Keyed by the *source* runtime tag; carries the destination tag to
// write for the matched destination constructor.
struct CtorConv {
    dst_tag: u32,
    conv: RawConv,
}

/// Build a tagged-union converter for a [`VariantDest`] destination
/// type.
pub fn build_variant<T: VariantDest>(src: &Type<'_>) -> Result<RawConv, ConvertError> {
    let Type::Variant(src_ctors) = src else {
        return Err(ConvertError::KindMismatch {
            expected: "variant",
            found: src.to_string(),
        });
    };

    let mut table: HashMap<u32, CtorConv> = HashMap::new();
    let mut max_align = 1;
    let mut payload_off = TAG_SIZE;
    let mut payload_extent = 0;
    for scheme in T::CTORS {
        let Some(src_ctor) = src_ctors.iter().find(|c| c.name == scheme.name) else {
            continue;
        };
        max_align = max_align.max(types::align_of(src_ctor.payload)?);
        payload_off = types::align_up(TAG_SIZE, max_align);

        let conv = (scheme.build)(src_ctor.payload)?;
        payload_extent = payload_extent.max(conv.src_extent());
        table.insert(
            src_ctor.tag,
            CtorConv {
                dst_tag: scheme.tag,
                conv,
            },
        );
    }
    trace!(
        destination = core::any::type_name::<T>(),
        matched = table.len(),
        payload_off,
        "built variant converter"
    );

    Ok(RawConv::new(payload_off + payload_extent, move |src, dst| {
        let tag = unsafe { (src as *const u32).read_unaligned() };
        let Some(entry) = table.get(&tag) else {
            return Err(ApplyError::UnknownTag(tag));
        };
        unsafe {
            let dst = dst as *mut T;
            T::write_tag(dst, entry.dst_tag);
            entry.conv.call(src.add(payload_off), T::payload_ptr(dst))
        }
    }))
}

#[cfg(test)]
mod tests {
    use crate::convert::build;
    use crate::errors::{ApplyError, ConvertError};
    use crate::reflect_variant;
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;
    use recast_types::{Type, TypeManager};

    #[repr(C)]
    union EitherPayload {
        left: i32,
        right: f64,
        extra: u8,
    }

    #[repr(C)]
    struct Either {
        tag: u32,
        payload: EitherPayload,
    }

    impl Default for Either {
        fn default() -> Self {
            Either {
                tag: u32::MAX,
                payload: EitherPayload { right: 0.0 },
            }
        }
    }

    reflect_variant!(Either, tag: tag, payload: payload {
        Left = 0 => i32,
        Right = 1 => f64,
        Extra = 2 => u8,
    });

    fn either_source<'a>(types: &'a TypeManager<'a>) -> &'a Type<'a> {
        types.variant(&[
            ("Left", 0, types.prim("int")),
            ("Right", 1, types.prim("double")),
        ])
    }

    // tag + padding to the payload offset + payload bytes, padded out
    // to the full source value size
    fn variant_bytes(total: usize, tag: u32, payload_off: usize, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; total];
        buf[..4].copy_from_slice(&tag.to_ne_bytes());
        buf[payload_off..payload_off + payload.len()].copy_from_slice(payload);
        buf
    }

    #[test]
    fn dispatches_on_the_source_tag() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);
        let conv = build::<Either>(either_source(types)).unwrap();
        // Matched payload alignments are 4 and 8, so the payload
        // starts at 8 and the converter spans 16 source bytes.
        assert_eq!(conv.src_extent(), 16);

        let mut out = Either::default();
        conv.apply(&variant_bytes(16, 0, 8, &7i32.to_ne_bytes()), &mut out)
            .unwrap();
        assert_eq!(out.tag, 0);
        assert_eq!(unsafe { out.payload.left }, 7);

        conv.apply(&variant_bytes(16, 1, 8, &2.5f64.to_ne_bytes()), &mut out)
            .unwrap();
        assert_eq!(out.tag, 1);
        assert_eq!(unsafe { out.payload.right }, 2.5);
    }

    #[test]
    fn unmatched_destination_ctor_is_skipped() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);
        // 'Extra' is declared on the destination but absent from the
        // source type; the build must still succeed.
        let conv = build::<Either>(either_source(types)).unwrap();

        let mut out = Either::default();
        conv.apply(&variant_bytes(16, 0, 8, &7i32.to_ne_bytes()), &mut out)
            .unwrap();
        assert_eq!(out.tag, 0);
    }

    #[test]
    fn unknown_runtime_tag_is_reported() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);
        let conv = build::<Either>(either_source(types)).unwrap();

        let mut out = Either::default();
        assert_eq!(
            conv.apply(&variant_bytes(16, 42, 8, &[0u8; 8]), &mut out),
            Err(ApplyError::UnknownTag(42))
        );
        // The destination is left as the dispatch found it.
        assert_eq!(out.tag, u32::MAX);
    }

    #[test]
    fn destination_tags_are_remapped() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);

        #[repr(C)]
        union OnlyRightPayload {
            right: f64,
        }
        #[repr(C)]
        struct OnlyRight {
            tag: u32,
            payload: OnlyRightPayload,
        }
        reflect_variant!(OnlyRight, tag: tag, payload: payload {
            Right = 77 => f64,
        });

        let conv = build::<OnlyRight>(either_source(types)).unwrap();
        let mut out = OnlyRight {
            tag: 0,
            payload: OnlyRightPayload { right: 0.0 },
        };
        conv.apply(&variant_bytes(16, 1, 8, &1.5f64.to_ne_bytes()), &mut out)
            .unwrap();
        // Source tag 1 selects the entry; the destination's own tag
        // value is what gets written.
        assert_eq!(out.tag, 77);
        assert_eq!(unsafe { out.payload.right }, 1.5);
    }

    #[test]
    fn payload_offset_uses_the_widest_matched_alignment() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);

        #[repr(C)]
        union MixPayload {
            a: u8,
            b: i32,
            c: f64,
        }
        #[repr(C)]
        struct Mix {
            tag: u32,
            payload: MixPayload,
        }
        reflect_variant!(Mix, tag: tag, payload: payload {
            A = 0 => u8,
            B = 1 => i32,
            C = 2 => f64,
        });

        // Same constructors in two declaration orders; the computed
        // payload offset must be align_up(4, 8) = 8 for both.
        let orders: [&[(&str, u32, &Type<'_>)]; 2] = [
            &[
                ("A", 0, types.prim("byte")),
                ("B", 1, types.prim("int")),
                ("C", 2, types.prim("double")),
            ],
            &[
                ("C", 2, types.prim("double")),
                ("B", 1, types.prim("int")),
                ("A", 0, types.prim("byte")),
            ],
        ];
        for ctors in orders {
            let conv = build::<Mix>(types.variant(ctors)).unwrap();
            assert_eq!(conv.src_extent(), 16);

            let mut out = Mix {
                tag: 0,
                payload: MixPayload { c: 0.0 },
            };
            conv.apply(&variant_bytes(16, 0, 8, &[0xab]), &mut out).unwrap();
            assert_eq!(out.tag, 0);
            assert_eq!(unsafe { out.payload.a }, 0xab);
        }
    }

    #[test]
    fn matched_ctor_payload_failure_aborts_the_build() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);
        // 'Left' matches but its payload would narrow (long -> i32).
        let src_ty = types.variant(&[("Left", 0, types.prim("long"))]);

        assert!(matches!(
            build::<Either>(src_ty),
            Err(ConvertError::NoConversionPath { .. })
        ));
    }

    #[test]
    fn non_variant_source_is_kind_mismatch() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);
        assert!(matches!(
            build::<Either>(types.prim("int")),
            Err(ConvertError::KindMismatch { .. })
        ));
    }
}
