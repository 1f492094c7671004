use log::debug;
use vm_core::{Error, ImageView};

use crate::contour::{ApproxMode, Contour, ContourSet, RetrievalMode};
use crate::trace::{TraceConfig, trace_contours};

/// Picks the eligible contour with the largest enclosed area.
///
/// Ties keep the first contour encountered. `approx` is applied to the
/// result; compressing an already compressed contour changes nothing.
pub fn largest(
    set: &ContourSet,
    retrieval: RetrievalMode,
    approx: ApproxMode,
) -> Result<Contour, Error> {
    let mut best: Option<(&Contour, f64)> = None;
    for c in set.iter_eligible(retrieval) {
        let area = c.area();
        if best.is_none_or(|(_, a)| area > a) {
            best = Some((c, area));
        }
    }

    let (contour, area) = best.ok_or(Error::EmptyInput)?;
    debug!(
        "largest: picked contour with {} points, area {:.1} (of {} candidates)",
        contour.len(),
        area,
        set.len()
    );

    Ok(match approx {
        ApproxMode::Full => contour.clone(),
        ApproxMode::Simple => contour.simplified(),
    })
}

/// Traces `mask` and returns its largest contour.
pub fn largest_in_mask(
    mask: &ImageView<'_, u8>,
    retrieval: RetrievalMode,
    approx: ApproxMode,
) -> Result<Contour, Error> {
    let set = trace_contours(mask, &TraceConfig { retrieval, approx });
    largest(&set, retrieval, ApproxMode::Full)
}
