//! Structural conversion of runtime-described values into native Rust
//! types.
//!
//! Given a [`Type`] descriptor for a value whose layout is only known
//! at runtime, and a destination type fixed at compile time, [`build`]
//! produces a reusable [`Conv`] closure that copies, widens, and
//! restructures the source bytes into the destination. Building walks
//! the descriptor once (name lookups, offset computation, allocation);
//! applying is pure byte copying plus a single tag dispatch for
//! variants, and is meant to run per value at high frequency.
//!
//! Conversion is partial: only the destination type is statically
//! known, and not every source shape converts into it. All structural
//! mismatches are reported at build time; the only apply-time failures
//! are an unrecognized variant tag and a too-short source buffer.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use recast_core::{build, reflect_struct, TypeManager};
//!
//! #[repr(C)]
//! #[derive(Default)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//! reflect_struct!(Point { x: i64, y: i64 });
//!
//! let arena = Bump::new();
//! let types = TypeManager::new(&arena);
//! // Source record has int (4-byte) coordinates and an extra field.
//! let src_ty = types.strukt(&[
//!     ("x", 0, types.prim("int")),
//!     ("y", 4, types.prim("int")),
//!     ("z", 8, types.prim("int")),
//! ]);
//!
//! let conv = build::<Point>(src_ty).unwrap();
//! let mut src = Vec::new();
//! for v in [7i32, -9, 100] {
//!     src.extend_from_slice(&v.to_ne_bytes());
//! }
//!
//! let mut point = Point::default();
//! conv.apply(&src, &mut point).unwrap();
//! assert_eq!(point.x, 7);
//! assert_eq!(point.y, -9);
//! ```

pub mod convert;
pub mod errors;
pub mod reflect;

pub use convert::{build, Conv, FromDyn, RawConv};
pub use errors::{ApplyError, ConvertError};
pub use reflect::{CtorScheme, FieldScheme, StructDest, VariantDest};

// Descriptor model, re-exported so macro expansions and callers can
// name it through this crate.
pub use recast_types::{Type, TypeManager};

#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level.
    /// Call this at the start of tests where you want to see logging output.
    pub fn init_test_logging() {
        use tracing_subscriber::{fmt, EnvFilter};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
