use serde::Serialize;
use vm_contour::Contour;
use vm_core::{Covariance, Error, Moments, Point2d, Vec2d};

/// Spans measured at one sampling position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OutlineSample {
    /// Extent along the dominant axis, on a line parallel to it.
    pub along: f64,
    /// Extent across the dominant axis, on a line perpendicular to it.
    pub across: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Outline {
    /// Dominant axis, degrees in `[0, 180)` from +x toward +y.
    pub axis_deg: f64,
    pub samples: Vec<OutlineSample>,
}

impl Outline {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Samples `k` width/height pairs of `contour` along its dominant axis.
///
/// Sample `i` sits at the center of the `i`-th of `k` equal buckets over the
/// extent of each axis, ordered from the low end to the high end. A line that
/// crosses the boundary fewer than twice yields a zero span.
pub fn outline(contour: &Contour, k: usize) -> Result<Outline, Error> {
    if k < 1 {
        return Err(Error::InvalidSampleCount(k));
    }

    let points = contour.points.as_slice();
    if points.is_empty() {
        return Ok(Outline {
            axis_deg: 0.0,
            samples: vec![OutlineSample::default(); k],
        });
    }

    let moments = Moments::of_polygon(points);
    let (center, cov) = match (moments.centroid(), moments.covariance()) {
        (Some(c), Some(cov)) => (c, cov),
        _ => vertex_stats(points),
    };
    let axis_deg = cov.major_axis_deg();
    let u = Vec2d::from_angle_deg(axis_deg);
    let v = u.perp();

    // (along, across) coordinates about the center.
    let projected: Vec<(f64, f64)> = points
        .iter()
        .map(|&p| {
            let d = p - center;
            (d.dot(u), d.dot(v))
        })
        .collect();
    let swapped: Vec<(f64, f64)> = projected.iter().map(|&(s, t)| (t, s)).collect();

    let (s_min, s_max) = range(projected.iter().map(|p| p.0));
    let (t_min, t_max) = range(projected.iter().map(|p| p.1));
    let s_step = (s_max - s_min) / k as f64;
    let t_step = (t_max - t_min) / k as f64;

    let mut samples = Vec::with_capacity(k);
    for i in 0..k {
        let offset = i as f64 + 0.5;
        samples.push(OutlineSample {
            along: span_at(&swapped, t_min + offset * t_step),
            across: span_at(&projected, s_min + offset * s_step),
        });
    }

    Ok(Outline { axis_deg, samples })
}

/// Spread of the second coordinate where the ring crosses `level` in the
/// first. Edges include their start and exclude their end.
fn span_at(ring: &[(f64, f64)], level: f64) -> f64 {
    let n = ring.len();
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    let mut hits = 0_usize;

    for i in 0..n {
        let (a0, a1) = ring[i];
        let (b0, b1) = ring[(i + 1) % n];
        let crosses = (a0 <= level && level < b0) || (b0 <= level && level < a0);
        if !crosses {
            continue;
        }
        let t = (level - a0) / (b0 - a0);
        let x = a1 + t * (b1 - a1);
        lo = lo.min(x);
        hi = hi.max(x);
        hits += 1;
    }

    if hits < 2 { 0.0 } else { hi - lo }
}

fn range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Mean and covariance of the vertices, for rings that enclose no area.
fn vertex_stats(points: &[Point2d]) -> (Point2d, Covariance) {
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let my = points.iter().map(|p| p.y).sum::<f64>() / n;

    let mut cov = Covariance {
        xx: 0.0,
        xy: 0.0,
        yy: 0.0,
    };
    for p in points {
        let (dx, dy) = (p.x - mx, p.y - my);
        cov.xx += dx * dx;
        cov.xy += dx * dy;
        cov.yy += dy * dy;
    }
    cov.xx /= n;
    cov.xy /= n;
    cov.yy /= n;

    (Point2d::new(mx, my), cov)
}

#[cfg(test)]
mod tests {
    use vm_contour::Contour;
    use vm_core::Error;

    use super::outline;

    fn rotated_rect(w: f64, h: f64, deg: f64) -> Contour {
        let (s, c) = deg.to_radians().sin_cos();
        let xy: Vec<(f64, f64)> = [
            (-w / 2.0, -h / 2.0),
            (w / 2.0, -h / 2.0),
            (w / 2.0, h / 2.0),
            (-w / 2.0, h / 2.0),
        ]
        .iter()
        .map(|&(x, y)| (40.0 + x * c - y * s, 70.0 + x * s + y * c))
        .collect();
        Contour::from_xy(&xy)
    }

    #[test]
    fn rectangle_spans_are_constant() {
        for deg in [0.0, 30.0, 90.0] {
            let o = outline(&rotated_rect(300.0, 100.0, deg), 20).expect("k >= 1");
            assert_eq!(o.len(), 20);
            for s in &o.samples {
                assert!((s.along - 300.0).abs() < 1e-6, "along {}", s.along);
                assert!((s.across - 100.0).abs() < 1e-6, "across {}", s.across);
            }
        }
    }

    #[test]
    fn triangle_width_grows_along_the_axis() {
        // Isosceles triangle, long axis along x, apex at the right.
        let tri = Contour::from_xy(&[(0.0, -10.0), (100.0, 0.0), (0.0, 10.0)]);
        let o = outline(&tri, 10).expect("k >= 1");

        assert_eq!(o.len(), 10);
        assert!(o.axis_deg < 1e-6 || o.axis_deg > 180.0 - 1e-6);
        let across: Vec<f64> = o.samples.iter().map(|s| s.across).collect();
        let increasing = across.windows(2).all(|w| w[0] < w[1]);
        let decreasing = across.windows(2).all(|w| w[0] > w[1]);
        assert!(increasing || decreasing);
        assert!(o.samples.iter().all(|s| s.along >= 0.0 && s.across >= 0.0));
    }

    #[test]
    fn concave_gap_counts_outer_crossings() {
        // U shape opening upward in a y-down frame.
        let u = Contour::from_xy(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 30.0),
            (20.0, 30.0),
            (20.0, 0.0),
            (30.0, 0.0),
            (30.0, 40.0),
            (0.0, 40.0),
        ]);
        let o = outline(&u, 5).expect("k >= 1");
        assert_eq!(o.len(), 5);
        assert!(o.samples.iter().all(|s| s.along >= 0.0 && s.across >= 0.0));
    }

    #[test]
    fn flat_and_empty_contours_do_not_fail() {
        let line = Contour::from_xy(&[(0.0, 0.0), (10.0, 10.0)]);
        let o = outline(&line, 4).expect("k >= 1");
        assert_eq!(o.len(), 4);
        assert!((o.axis_deg - 45.0).abs() < 1e-9);
        assert!(o.samples.iter().all(|s| s.across.abs() < 1e-9));

        let o = outline(&Contour::default(), 3).expect("k >= 1");
        assert_eq!(o.len(), 3);
    }

    #[test]
    fn zero_samples_is_rejected() {
        let tri = Contour::from_xy(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        assert_eq!(outline(&tri, 0), Err(Error::InvalidSampleCount(0)));
    }
}
