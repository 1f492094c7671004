use core::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2d {
    pub x: f64,
    pub y: f64,
}

impl Vec2d {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector at `deg` degrees from +x toward +y.
    pub fn from_angle_deg(deg: f64) -> Self {
        let (s, c) = deg.to_radians().sin_cos();
        Self { x: c, y: s }
    }

    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// z-component of the 3D cross product.
    pub fn cross(self, rhs: Self) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }

    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Counter-clockwise perpendicular in a y-up frame.
    pub fn perp(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }
}

/// Euclidean distance between two points.
pub fn point_dist(p1: Point2d, p2: Point2d) -> f64 {
    (p1 - p2).norm()
}

impl Add<Vec2d> for Point2d {
    type Output = Point2d;

    fn add(self, rhs: Vec2d) -> Self::Output {
        Point2d {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub<Point2d> for Point2d {
    type Output = Vec2d;

    fn sub(self, rhs: Point2d) -> Self::Output {
        Vec2d {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f64> for Vec2d {
    type Output = Vec2d;

    fn mul(self, rhs: f64) -> Self::Output {
        Vec2d {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Axis-aligned bounding rectangle in point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn of_points(points: &[Point2d]) -> Option<Self> {
        let first = points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }

        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> Point2d {
        Point2d {
            x: self.x + 0.5 * self.width,
            y: self.y + 0.5 * self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, Point2d, Vec2d, point_dist};

    fn round4(v: f64) -> f64 {
        (v * 1e4).round() / 1e4
    }

    #[test]
    fn point_dist_reference_values() {
        let cases = [
            ((0.0, 0.0), (8.0, 9.0), 12.0416),
            ((1.0, 3.0), (8.0, 9.0), 9.2195),
            ((-3.0, 34.0), (8.0, -99.0), 133.4541),
            ((3.5, 34.1), (8.0, 99.6), 65.6544),
        ];

        for ((x1, y1), (x2, y2), expected) in cases {
            let d = point_dist(Point2d::new(x1, y1), Point2d::new(x2, y2));
            assert_eq!(round4(d), expected);
        }
    }

    #[test]
    fn point_dist_propagates_nan() {
        let d = point_dist(Point2d::new(f64::NAN, 0.0), Point2d::new(1.0, 1.0));
        assert!(d.is_nan());
    }

    #[test]
    fn vec_ops() {
        let a = Vec2d::new(3.0, 4.0);
        let b = Vec2d::new(1.0, -2.0);

        assert!((a.dot(b) + 5.0).abs() < 1e-12);
        assert!((a.cross(b) + 10.0).abs() < 1e-12);
        assert!((a.norm() - 5.0).abs() < 1e-12);
        assert_eq!(a.perp(), Vec2d::new(-4.0, 3.0));

        let u = Vec2d::from_angle_deg(90.0);
        assert!(u.x.abs() < 1e-12 && (u.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bounding_box_of_points() {
        let pts = [
            Point2d::new(2.0, 5.0),
            Point2d::new(-1.0, 3.0),
            Point2d::new(4.0, 7.0),
        ];
        let bb = BoundingBox::of_points(&pts).expect("non-empty");

        assert_eq!(
            bb,
            BoundingBox {
                x: -1.0,
                y: 3.0,
                width: 5.0,
                height: 4.0
            }
        );
        assert_eq!(bb.center(), Point2d::new(1.5, 5.0));
        assert!(BoundingBox::of_points(&[]).is_none());
    }
}
