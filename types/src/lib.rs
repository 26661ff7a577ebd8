//! Runtime type descriptors for the recast conversion engine.
//!
//! A descriptor is an immutable, arena-allocated tree describing the
//! shape of a dynamically typed value: primitive name, fixed-array
//! length and element, record fields with byte offsets, or variant
//! constructors with runtime tags. Descriptors are produced through a
//! [`TypeManager`], which interns them so that equal descriptors share
//! one allocation and compare by pointer.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use recast_types::TypeManager;
//!
//! let arena = Bump::new();
//! let types = TypeManager::new(&arena);
//!
//! let int_ty = types.prim("int");
//! let arr_ty = types.array_of(int_ty, 4);
//! assert_eq!(recast_types::size_of(arr_ty).unwrap(), 16);
//! ```

pub mod layout;
pub mod manager;
pub mod ty;

pub use layout::{align_of, align_up, size_of, LayoutError, TAG_SIZE};
pub use manager::TypeManager;
pub use ty::{Ctor, Field, Type};
