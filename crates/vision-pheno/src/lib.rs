//! Umbrella crate for the `vision-pheno` workspace.
//!
//! Re-exports the mask and geometry primitives, contour tracing and the
//! shape descriptors so downstream code needs a single dependency.

pub use vm_contour::*;
pub use vm_core::*;
pub use vm_shape::*;
