//! The conversion engine: a one-time build phase producing closures
//! that are applied per value.
//!
//! Internally everything is a [`RawConv`]: a type-erased closure from
//! source bytes to destination bytes, paired with the number of source
//! bytes it may read (its *extent*). Extents are computed bottom-up
//! while building, so the public [`Conv::apply`] needs exactly one
//! bounds check per call and the recursive hot path needs none.

use core::marker::PhantomData;

use tracing::debug;

use crate::errors::{ApplyError, ConvertError};
use recast_types::Type;

pub mod array;
pub mod prim;
pub mod record;
pub mod variant;

type ApplyFn = dyn Fn(*const u8, *mut u8) -> Result<(), ApplyError> + Send + Sync;

/// A type-erased conversion closure.
///
/// Holds no mutable state; everything it needs (offsets, nested
/// converters, dispatch tables) is captured immutably at build time.
pub struct RawConv {
    apply: Box<ApplyFn>,
    src_extent: usize,
}

impl RawConv {
    pub(crate) fn new(
        src_extent: usize,
        apply: impl Fn(*const u8, *mut u8) -> Result<(), ApplyError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            apply: Box::new(apply),
            src_extent,
        }
    }

    /// Number of source bytes this converter may read, starting at the
    /// pointer it is applied to.
    pub fn src_extent(&self) -> usize {
        self.src_extent
    }

    /// Run the conversion.
    ///
    /// # Safety
    ///
    /// `src` must be readable for `self.src_extent()` bytes. `dst`
    /// must point at storage valid for the destination type this
    /// converter was built for.
    pub(crate) unsafe fn call(&self, src: *const u8, dst: *mut u8) -> Result<(), ApplyError> {
        (self.apply)(src, dst)
    }
}

impl core::fmt::Debug for RawConv {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawConv")
            .field("src_extent", &self.src_extent)
            .finish_non_exhaustive()
    }
}

/// Destination types that a converter can be built for.
///
/// Implementations exist for the primitives, for `[T; N]` where `T`
/// converts, and for any type declared through
/// [`reflect_struct!`](crate::reflect_struct) or
/// [`reflect_variant!`](crate::reflect_variant).
pub trait FromDyn: Sized {
    /// Build the type-erased converter out of the given source
    /// descriptor.
    fn build_raw(src: &Type<'_>) -> Result<RawConv, ConvertError>;
}

/// A conversion closure into a fixed destination type.
///
/// Built once per (destination type, source descriptor) pair — callers
/// should cache it keyed on that pair — and applied many times,
/// possibly concurrently: `Conv` is `Send + Sync` and carries no
/// mutable state.
#[derive(Debug)]
pub struct Conv<T> {
    raw: RawConv,
    _marker: PhantomData<fn(&mut T)>,
}

impl<T> Conv<T> {
    /// Convert one source value into `dst`.
    ///
    /// `src` must hold at least [`Conv::src_extent`] bytes; the
    /// converted value is written over `*dst`.
    pub fn apply(&self, src: &[u8], dst: &mut T) -> Result<(), ApplyError> {
        if src.len() < self.raw.src_extent {
            return Err(ApplyError::SourceTooShort {
                need: self.raw.src_extent,
                got: src.len(),
            });
        }
        // All interior offsets were validated against this extent at
        // build time, so the single check above covers every read.
        unsafe { self.raw.call(src.as_ptr(), dst as *mut T as *mut u8) }
    }

    /// Number of source bytes a single apply reads.
    pub fn src_extent(&self) -> usize {
        self.raw.src_extent
    }
}

/// Build a conversion closure from the source descriptor into `T`.
///
/// This is the build phase: it walks the descriptor tree, resolves
/// field and constructor names, and computes every offset the closure
/// will use. Run it off the hot path and reuse the result.
pub fn build<T: FromDyn>(src: &Type<'_>) -> Result<Conv<T>, ConvertError> {
    let raw = T::build_raw(src)?;
    debug!(
        source = %src,
        destination = core::any::type_name::<T>(),
        src_extent = raw.src_extent,
        "built converter"
    );
    Ok(Conv {
        raw,
        _marker: PhantomData,
    })
}
