//! Shape descriptors computed from a closed contour.
//!
//! Three families of descriptors:
//! - Region properties ([`PropertyKind`]): area, perimeter, moments and
//!   area ratios, selected by name.
//! - Outline sampling ([`outline`]): widths along and across the dominant
//!   axis at evenly spaced positions.
//! - Radial profiles ([`radial_profile`]): every contour crossing of 360
//!   rays from a center, with per-degree statistics for comparing shapes.
//!
//! Angles are in degrees, measured from +x toward +y. In image coordinates
//! (y down) a positive angle turns clockwise on screen.
//!
//! Flat contours yield [`vm_core::Error::DegenerateShape`] for anything that
//! needs a centroid or a nonzero area ratio.

mod compare;
mod outline;
mod props;
mod radial;

pub use compare::{ProfileDistance, RadialStats, compare_profiles, mse, normalize_min_max};
pub use outline::{Outline, OutlineSample, outline};
pub use props::{
    PropertyKind, PropertySelection, PropertyValue, RegionProperties, RegionPropertyCalculator,
    mask_area_in_box, properties, region_properties,
};
pub use radial::{
    CenterRule, DEGREES, RadialConfig, RadialProfile, orientation_normalized_profile,
    radial_profile, radial_profile_with,
};
