use serde::{Deserialize, Serialize};
use vm_contour::Contour;
use vm_core::{Error, Moments, Point2d, Vec2d, edges, point_dist};

/// Number of rays in a profile, one per integer degree.
pub const DEGREES: usize = 360;

/// Where rays start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CenterRule {
    /// Area centroid of the contour.
    #[default]
    Centroid,
    /// Center of the axis-aligned bounding box.
    BoundingBoxCenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RadialConfig {
    pub center: CenterRule,
}

/// Contour-ray intersections for each integer degree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialProfile {
    pub center: Point2d,
    pub rotation_deg: f64,
    /// `DEGREES` buckets, each sorted by distance from `center`.
    intersections: Vec<Vec<Point2d>>,
}

impl RadialProfile {
    /// Intersections of the ray for `deg` (taken modulo 360).
    pub fn intersections(&self, deg: usize) -> &[Point2d] {
        &self.intersections[deg % DEGREES]
    }

    pub fn distances(&self, deg: usize) -> impl Iterator<Item = f64> + '_ {
        let center = self.center;
        self.intersections(deg)
            .iter()
            .map(move |&p| point_dist(center, p))
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Point2d]> {
        self.intersections.iter().map(Vec::as_slice)
    }
}

/// Radial profile about the contour centroid.
pub fn radial_profile(contour: &Contour, rotation_offset_deg: f64) -> Result<RadialProfile, Error> {
    radial_profile_with(contour, rotation_offset_deg, &RadialConfig::default())
}

/// Casts one half-line per degree `d` at angle `(d + rotation_offset_deg) mod
/// 360`, measured from +x toward +y, and records every edge it crosses.
///
/// Edges include their start vertex and exclude their end vertex, so a ray
/// through a shared vertex is counted once.
pub fn radial_profile_with(
    contour: &Contour,
    rotation_offset_deg: f64,
    cfg: &RadialConfig,
) -> Result<RadialProfile, Error> {
    let points = contour.points.as_slice();
    let center = match cfg.center {
        CenterRule::Centroid => Moments::of_polygon(points).centroid(),
        CenterRule::BoundingBoxCenter => contour.bounding_box().map(|b| b.center()),
    }
    .ok_or(Error::DegenerateShape)?;

    let offset = rotation_offset_deg.rem_euclid(360.0);
    let mut intersections = Vec::with_capacity(DEGREES);
    let mut hits: Vec<(f64, Point2d)> = Vec::with_capacity(points.len().min(16));
    for d in 0..DEGREES {
        let angle = (d as f64 + offset).rem_euclid(360.0);
        let dir = Vec2d::from_angle_deg(angle);

        hits.clear();
        for (a, b) in edges(points) {
            if let Some(t) = ray_edge(center, dir, a, b) {
                hits.push((t, center + dir * t));
            }
        }
        hits.sort_by(|x, y| x.0.total_cmp(&y.0));
        intersections.push(hits.iter().map(|h| h.1).collect());
    }

    Ok(RadialProfile {
        center,
        rotation_deg: rotation_offset_deg,
        intersections,
    })
}

/// Profile rotated by the contour's own major-axis orientation, so that
/// in-plane rotations of the same outline give matching profiles.
pub fn orientation_normalized_profile(
    contour: &Contour,
    cfg: &RadialConfig,
) -> Result<RadialProfile, Error> {
    let cov = Moments::of_polygon(&contour.points)
        .covariance()
        .ok_or(Error::DegenerateShape)?;
    radial_profile_with(contour, cov.major_axis_deg(), cfg)
}

/// Ray parameter of the crossing with edge `a -> b`, if any; the edge
/// parameter is restricted to `[0, 1)`.
fn ray_edge(origin: Point2d, dir: Vec2d, a: Point2d, b: Point2d) -> Option<f64> {
    let e = b - a;
    let denom = dir.cross(e);
    if denom == 0.0 {
        return None;
    }

    let w = a - origin;
    let t = w.cross(e) / denom;
    let u = w.cross(dir) / denom;
    (t >= 0.0 && (0.0..1.0).contains(&u)).then_some(t)
}

#[cfg(test)]
mod tests {
    use vm_contour::Contour;
    use vm_core::{Error, Point2d, point_dist};

    use super::{
        CenterRule, DEGREES, RadialConfig, orientation_normalized_profile, radial_profile,
        radial_profile_with,
    };

    fn square(side: f64) -> Contour {
        Contour::from_xy(&[(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)])
    }

    #[test]
    fn square_rays_hit_once() {
        let p = radial_profile(&square(10.0), 0.0).expect("valid square");
        assert_eq!(p.center, Point2d::new(5.0, 5.0));
        assert_eq!(p.iter().count(), DEGREES);

        for d in 0..DEGREES {
            assert_eq!(p.intersections(d).len(), 1, "degree {d}");
        }

        let east: Vec<f64> = p.distances(0).collect();
        assert!((east[0] - 5.0).abs() < 1e-12);
        // Through the corner (10, 10): counted once.
        let diag: Vec<f64> = p.distances(45).collect();
        assert_eq!(diag.len(), 1);
        assert!((diag[0] - 50.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn offset_rotates_the_rays() {
        let c = Contour::from_xy(&[(0.0, -1.0), (20.0, -1.0), (20.0, 1.0), (0.0, 1.0)]);
        let p = radial_profile(&c, 90.0).expect("valid rectangle");

        // Degree 270 + 90 points along +x.
        let far: Vec<f64> = p.distances(270).collect();
        assert!((far[0] - 10.0).abs() < 1e-9);
        let short: Vec<f64> = p.distances(0).collect();
        assert!((short[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn full_turn_offset_is_identical() {
        let c = Contour::from_xy(&[(0.0, 0.0), (7.0, 1.0), (9.0, 6.0), (3.0, 8.0), (4.0, 3.0)]);
        let base = radial_profile(&c, 0.0).expect("valid");
        let turned = radial_profile(&c, 360.0).expect("valid");
        let back = radial_profile(&c, 17.0).expect("valid");
        let back_again = radial_profile(&c, 17.0 + 360.0).expect("valid");

        for d in 0..DEGREES {
            assert_eq!(base.intersections(d), turned.intersections(d));
            assert_eq!(back.intersections(d), back_again.intersections(d));
        }
    }

    #[test]
    fn fractional_offsets_agree_over_a_full_turn() {
        let c = Contour::from_xy(&[(0.0, 0.0), (7.0, 1.0), (9.0, 6.0), (3.0, 8.0), (4.0, 3.0)]);
        for (a, b) in [(12.3, 372.3), (-0.7, 359.3), (0.25, 720.25)] {
            let pa = radial_profile(&c, a).expect("valid");
            let pb = radial_profile(&c, b).expect("valid");
            for d in 0..DEGREES {
                let (ha, hb) = (pa.intersections(d), pb.intersections(d));
                assert_eq!(ha.len(), hb.len(), "offset {a} vs {b}, degree {d}");
                for (p, q) in ha.iter().zip(hb) {
                    assert!((p.x - q.x).abs() < 1e-9 && (p.y - q.y).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn concave_rays_cross_several_times() {
        // Comb pointing right: the +x ray from the spine crosses three teeth.
        let comb = Contour::from_xy(&[
            (-10.0, -10.0),
            (50.0, -10.0),
            (50.0, -6.0),
            (-6.0, -6.0),
            (-6.0, -2.0),
            (50.0, -2.0),
            (50.0, 2.0),
            (-6.0, 2.0),
            (-6.0, 6.0),
            (50.0, 6.0),
            (50.0, 10.0),
            (-10.0, 10.0),
        ]);
        let cfg = RadialConfig {
            center: CenterRule::BoundingBoxCenter,
        };
        let p = radial_profile_with(&comb, 0.0, &cfg).expect("valid comb");

        assert_eq!(p.center, Point2d::new(20.0, 0.0));
        let d: Vec<f64> = p.distances(0).collect();
        assert_eq!(d.len(), 1);
        assert!((d[0] - 30.0).abs() < 1e-9);

        let up: Vec<f64> = p.distances(90).collect();
        assert_eq!(up.len(), 3);
        assert!(up.windows(2).all(|w| w[0] <= w[1]));
        for (got, want) in up.iter().zip([2.0, 6.0, 10.0]) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn ray_outside_the_ring_finds_nothing() {
        // Crescent-like ring whose bounding-box center lies outside the region.
        let ring = Contour::from_xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 1.0), (1.0, 1.0), (1.0, 10.0), (0.0, 10.0)]);
        let cfg = RadialConfig {
            center: CenterRule::BoundingBoxCenter,
        };
        let p = radial_profile_with(&ring, 0.0, &cfg).expect("bbox always defined");
        let c = p.center;

        let total: usize = p.iter().map(<[Point2d]>::len).sum();
        assert!(total > 0);
        for d in 0..DEGREES {
            for &q in p.intersections(d) {
                assert!(point_dist(c, q) < 15.0);
            }
        }
    }

    #[test]
    fn flat_contour_has_no_centroid() {
        let line = Contour::from_xy(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(radial_profile(&line, 0.0), Err(Error::DegenerateShape));

        let fractional = Contour::from_xy(&[(0.1, 0.3), (0.2, 0.5), (0.35, 0.8), (0.7, 1.5)]);
        assert_eq!(radial_profile(&fractional, 0.0), Err(Error::DegenerateShape));
        assert_eq!(
            orientation_normalized_profile(&fractional, &RadialConfig::default()),
            Err(Error::DegenerateShape)
        );

        let cfg = RadialConfig {
            center: CenterRule::BoundingBoxCenter,
        };
        assert!(radial_profile_with(&line, 0.0, &cfg).is_ok());
        assert!(radial_profile_with(&Contour::default(), 0.0, &cfg).is_err());
    }

    #[test]
    fn normalized_profile_uses_major_axis() {
        let (s, c) = 30.0_f64.to_radians().sin_cos();
        let xy: Vec<(f64, f64)> = [(-20.0, -2.0), (20.0, -2.0), (20.0, 2.0), (-20.0, 2.0)]
            .iter()
            .map(|&(x, y)| (x * c - y * s, x * s + y * c))
            .collect();
        let p = orientation_normalized_profile(&Contour::from_xy(&xy), &RadialConfig::default())
            .expect("valid bar");

        assert!((p.rotation_deg - 30.0).abs() < 1e-9);
        let along: Vec<f64> = p.distances(0).collect();
        assert!((along[0] - 20.0).abs() < 1e-6);
    }
}
