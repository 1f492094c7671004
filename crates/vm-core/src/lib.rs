//! Foundational primitives for silhouette shape analysis.
//!
//! ## Coordinates
//! Points are `f64` pairs. Contours traced from masks use pixel-center
//! coordinates: pixel `(x, y)` maps to the point `(x as f64, y as f64)`, with
//! `y` growing downward. No function here assumes a particular ring
//! orientation.
//!
//! ## Masks
//! Binary masks are `Image<u8>` / `ImageView<u8>` where any nonzero value is
//! foreground. Views use element stride and may be subviews of padded
//! buffers.
//!
//! ## Polygon Moments
//! [`Moments`] accumulates raw moments up to second order in one explicit pass
//! over the edges (Green's theorem), relative to the first vertex to keep the
//! products small. Rings whose area is within [`flat_area_tolerance`] of zero
//! are flat: every moment is zero and there is no centroid.

mod error;
mod geom;
mod image;
mod polygon;

pub use error::Error;
pub use geom::{BoundingBox, Point2d, Vec2d, point_dist};
pub use image::{Image, ImageView};
pub use polygon::{
    Covariance, Moments, convex_hull, edges, flat_area_tolerance, perimeter, signed_area,
};
