//! Closed-polygon measures. Every function treats `points` as a closed ring:
//! the edge from the last point back to the first is implied.

use crate::geom::{BoundingBox, Point2d, point_dist};

/// Area tolerance relative to the squared extent of a ring.
const FLAT_REL_TOL: f64 = 1e-10;

/// Shoelace area; positive for counter-clockwise rings in a y-up frame.
pub fn signed_area(points: &[Point2d]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let o = points[0];
    let mut acc = 0.0;
    for (a, b) in edges(points) {
        acc += (a - o).cross(b - o);
    }
    0.5 * acc
}

pub fn perimeter(points: &[Point2d]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    edges(points).map(|(a, b)| point_dist(a, b)).sum()
}

/// Absolute area at or below which `points` counts as a flat ring. It scales
/// with the squared bounding-box extent, so collinear rings with fractional
/// coordinates stay flat despite shoelace rounding.
pub fn flat_area_tolerance(points: &[Point2d]) -> f64 {
    let Some(bb) = BoundingBox::of_points(points) else {
        return 0.0;
    };
    let extent = bb.width.max(bb.height);
    FLAT_REL_TOL * extent * extent
}

/// Iterates `(p[i], p[i + 1])` including the closing edge.
pub fn edges(points: &[Point2d]) -> impl Iterator<Item = (Point2d, Point2d)> + '_ {
    let n = points.len();
    (0..n).map(move |i| (points[i], points[(i + 1) % n]))
}

/// Raw polygon moments up to second order, accumulated in a frame whose
/// origin is the first vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    origin: Point2d,
}

/// Second-order central moments normalized by area (the region covariance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Covariance {
    pub xx: f64,
    pub xy: f64,
    pub yy: f64,
}

impl Moments {
    pub fn of_polygon(points: &[Point2d]) -> Self {
        let Some(&origin) = points.first() else {
            return Self::default();
        };

        let mut m = Self {
            origin,
            ..Self::default()
        };
        if points.len() < 3 {
            return m;
        }

        for (a, b) in edges(points) {
            let (x0, y0) = (a.x - origin.x, a.y - origin.y);
            let (x1, y1) = (b.x - origin.x, b.y - origin.y);
            let c = x0 * y1 - x1 * y0;

            m.m00 += c;
            m.m10 += (x0 + x1) * c;
            m.m01 += (y0 + y1) * c;
            m.m20 += (x0 * x0 + x0 * x1 + x1 * x1) * c;
            m.m02 += (y0 * y0 + y0 * y1 + y1 * y1) * c;
            m.m11 += (x0 * y1 + 2.0 * x0 * y0 + 2.0 * x1 * y1 + x1 * y0) * c;
        }

        m.m00 /= 2.0;
        m.m10 /= 6.0;
        m.m01 /= 6.0;
        m.m20 /= 12.0;
        m.m02 /= 12.0;
        m.m11 /= 24.0;

        if m.m00.abs() <= flat_area_tolerance(points) {
            return Self {
                origin,
                ..Self::default()
            };
        }

        // Orientation-independent: a clockwise ring flips every sign.
        if m.m00 < 0.0 {
            m.m00 = -m.m00;
            m.m10 = -m.m10;
            m.m01 = -m.m01;
            m.m20 = -m.m20;
            m.m02 = -m.m02;
            m.m11 = -m.m11;
        }
        m
    }

    pub fn area(&self) -> f64 {
        self.m00
    }

    /// `None` for a flat ring; `of_polygon` stores those with an exact zero area.
    pub fn centroid(&self) -> Option<Point2d> {
        if self.m00 == 0.0 {
            return None;
        }
        Some(Point2d {
            x: self.origin.x + self.m10 / self.m00,
            y: self.origin.y + self.m01 / self.m00,
        })
    }

    pub fn covariance(&self) -> Option<Covariance> {
        if self.m00 == 0.0 {
            return None;
        }
        let cx = self.m10 / self.m00;
        let cy = self.m01 / self.m00;
        Some(Covariance {
            xx: self.m20 / self.m00 - cx * cx,
            xy: self.m11 / self.m00 - cx * cy,
            yy: self.m02 / self.m00 - cy * cy,
        })
    }
}

impl Covariance {
    /// Eigenvalues `(major, minor)`, minor clamped at zero.
    pub fn eigenvalues(&self) -> (f64, f64) {
        let mean = 0.5 * (self.xx + self.yy);
        let half_diff = 0.5 * (self.xx - self.yy);
        let r = half_diff.hypot(self.xy);
        (mean + r, (mean - r).max(0.0))
    }

    /// Major-axis angle in degrees, normalized to `[0, 180)`.
    pub fn major_axis_deg(&self) -> f64 {
        let deg = (0.5 * (2.0 * self.xy).atan2(self.xx - self.yy)).to_degrees();
        let deg = deg.rem_euclid(180.0);
        // rem_euclid can round up to exactly 180 for tiny negative inputs.
        if deg >= 180.0 { 0.0 } else { deg }
    }
}

/// Convex hull (Andrew's monotone chain), counter-clockwise in a y-up frame,
/// collinear points dropped.
pub fn convex_hull(points: &[Point2d]) -> Vec<Point2d> {
    let mut pts: Vec<Point2d> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let turn = |o: Point2d, a: Point2d, b: Point2d| (a - o).cross(b - o);

    let mut hull: Vec<Point2d> = Vec::with_capacity(2 * pts.len());
    for &p in &pts {
        while hull.len() >= 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    hull.pop();
    hull
}
