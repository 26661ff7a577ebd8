use recast_types::LayoutError;
use thiserror::Error;

/// Build-phase failures: no valid converter exists for this
/// (destination type, source descriptor) pairing.
///
/// All of these are deterministic functions of the pairing; retrying
/// without changing the inputs cannot succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The source descriptor's node kind disagrees with the
    /// destination shape being built.
    #[error("can't convert {found} to a {expected}: kind mismatch")]
    KindMismatch {
        expected: &'static str,
        found: String,
    },

    /// The source primitive is neither identical to the destination
    /// primitive nor a permitted narrower type of it.
    #[error("can't convert from {from} to {to}")]
    NoConversionPath { from: String, to: &'static str },

    /// A fixed array's declared length is not a concrete size value.
    #[error("invalid type description due to non-size array length: {found}")]
    InvalidLength { found: String },

    /// The source array's length differs from the destination's.
    #[error("array length mismatch: source has {found} elements, destination wants {expected}")]
    LengthMismatch { expected: usize, found: usize },

    /// A destination record field has no same-named source field.
    #[error("the field '{0}' is not defined in the source record")]
    MissingField(String),

    /// The source descriptor has no coherent wire layout.
    #[error("invalid layout in type description: {0}")]
    Layout(#[from] LayoutError),
}

/// Apply-phase failures.
///
/// A built converter fails only when the source value presents a
/// variant tag that matched no destination constructor at build time,
/// or when the caller hands it fewer bytes than the source type spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// The leading 4-byte tag of a source variant value matched no
    /// destination constructor.
    #[error("source variant tag {0} has no matching destination constructor")]
    UnknownTag(u32),

    /// The source buffer is shorter than the converter's source type.
    #[error("source buffer too short: need {need} bytes, got {got}")]
    SourceTooShort { need: usize, got: usize },
}
