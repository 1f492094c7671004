use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use log::debug;
use vm_core::{ImageView, Point2d};

use crate::contour::{ApproxMode, Contour, ContourNode, ContourSet, RetrievalMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceConfig {
    pub retrieval: RetrievalMode,
    pub approx: ApproxMode,
}

/// Traces the boundaries of every foreground region in `mask`.
///
/// Foreground is 8-connected and background 4-connected. Holes are
/// background components that do not touch the image border. In
/// [`RetrievalMode::All`] each hole links to the outer contour of the region
/// around it, and a region lying inside a hole links to that hole.
/// Contours are emitted in raster order of their first pixel, so a parent
/// always precedes its children.
pub fn trace_contours(mask: &ImageView<'_, u8>, cfg: &TraceConfig) -> ContourSet {
    let (width, height) = (mask.width(), mask.height());
    if width == 0 || height == 0 {
        return ContourSet::default();
    }

    let traced = find_contours::<u32>(&to_gray(mask));

    let mut contours = Vec::with_capacity(traced.len());
    let mut nodes = Vec::with_capacity(traced.len());
    for c in traced {
        nodes.push(ContourNode {
            parent: c.parent,
            is_hole: c.border_type == BorderType::Hole,
        });

        let points = c
            .points
            .iter()
            .map(|p| Point2d::new(f64::from(p.x), f64::from(p.y)))
            .collect();
        let contour = Contour::new(points);
        contours.push(match cfg.approx {
            ApproxMode::Full => contour,
            ApproxMode::Simple => contour.simplified(),
        });
    }

    let holes = nodes.iter().filter(|n| n.is_hole).count();
    debug!(
        "trace_contours: {}x{} mask -> {} regions, {} holes",
        width,
        height,
        nodes.len() - holes,
        holes
    );

    match cfg.retrieval {
        RetrievalMode::All => ContourSet {
            contours,
            hierarchy: Some(nodes),
        },
        RetrievalMode::External => ContourSet::new(
            contours
                .into_iter()
                .zip(nodes)
                .filter(|(_, n)| n.parent.is_none() && !n.is_hole)
                .map(|(c, _)| c)
                .collect(),
        ),
    }
}

/// Copies `mask` into a {0, 255} gray image; any nonzero pixel is foreground.
fn to_gray(mask: &ImageView<'_, u8>) -> GrayImage {
    GrayImage::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
        let fg = mask.is_foreground(x as isize, y as isize);
        Luma([if fg { 255 } else { 0 }])
    })
}
