//! Boundary tracing of binary masks and selection of the subject contour.
//!
//! Tracing hands the mask to `imageproc`'s Suzuki-Abe border following:
//! - Outer boundaries follow 8-connected foreground regions and start at
//!   their raster-first pixel.
//! - Hole boundaries enclose 4-connected background components that do not
//!   touch the image border.
//! - Points are pixel centers; a one-pixel-wide spur is walked out and back,
//!   so its pixels appear twice.
//!
//! Retrieval options:
//! - [`RetrievalMode::External`]: outermost boundaries only.
//! - [`RetrievalMode::All`]: holes and nested regions with parent links.
//!
//! [`ApproxMode::Simple`] compresses straight runs to their end points.

mod contour;
mod select;
mod trace;

pub use contour::{ApproxMode, Contour, ContourNode, ContourSet, RetrievalMode};
pub use select::{largest, largest_in_mask};
pub use trace::{TraceConfig, trace_contours};
