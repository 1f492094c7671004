use serde::{Deserialize, Serialize};
use vm_core::{BoundingBox, Error, Point2d, signed_area};

/// Which boundaries a tracer reports, and which a selector considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Outermost boundaries only.
    #[default]
    External,
    /// Every boundary, holes included, with parent links.
    All,
}

/// Point density of traced contours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApproxMode {
    /// Every boundary pixel.
    #[default]
    Full,
    /// Collinear runs compressed to their end points.
    Simple,
}

/// Ordered closed ring of points. The closing edge is implied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point2d>,
}

impl Contour {
    pub fn new(points: Vec<Point2d>) -> Self {
        Self { points }
    }

    pub fn from_xy(xy: &[(f64, f64)]) -> Self {
        Self {
            points: xy.iter().map(|&(x, y)| Point2d::new(x, y)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Absolute shoelace area.
    pub fn area(&self) -> f64 {
        signed_area(&self.points).abs()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::of_points(&self.points)
    }

    /// Drops repeated points and the interior points of straight runs.
    ///
    /// A point survives when the ring turns there or reverses direction, so
    /// the result is stable under repeated application.
    pub fn simplified(&self) -> Contour {
        let mut pts: Vec<Point2d> = Vec::with_capacity(self.points.len());
        for &p in &self.points {
            if pts.last() != Some(&p) {
                pts.push(p);
            }
        }
        while pts.len() > 1 && pts.first() == pts.last() {
            pts.pop();
        }

        let n = pts.len();
        if n < 3 {
            return Contour::new(pts);
        }

        let mut kept = Vec::with_capacity(n);
        for i in 0..n {
            let prev = pts[(i + n - 1) % n];
            let next = pts[(i + 1) % n];
            let a = pts[i] - prev;
            let b = next - pts[i];
            if a.cross(b) != 0.0 || a.dot(b) <= 0.0 {
                kept.push(pts[i]);
            }
        }

        Contour::new(kept)
    }
}

/// Topology of one contour inside a [`ContourSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContourNode {
    /// Index of the enclosing contour in the same set.
    pub parent: Option<usize>,
    pub is_hole: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContourSet {
    pub contours: Vec<Contour>,
    /// Parallel to `contours` when present.
    pub hierarchy: Option<Vec<ContourNode>>,
}

impl ContourSet {
    pub fn new(contours: Vec<Contour>) -> Self {
        Self {
            contours,
            hierarchy: None,
        }
    }

    pub fn with_hierarchy(contours: Vec<Contour>, hierarchy: Vec<ContourNode>) -> Result<Self, Error> {
        if contours.len() != hierarchy.len() {
            return Err(Error::SizeMismatch {
                expected: contours.len(),
                actual: hierarchy.len(),
            });
        }
        Ok(Self {
            contours,
            hierarchy: Some(hierarchy),
        })
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Outermost contours have no parent and are not holes. Without a
    /// hierarchy every contour counts as outermost.
    pub fn is_external(&self, idx: usize) -> bool {
        match &self.hierarchy {
            None => true,
            Some(nodes) => nodes
                .get(idx)
                .is_some_and(|n| n.parent.is_none() && !n.is_hole),
        }
    }

    pub fn iter_eligible(&self, mode: RetrievalMode) -> impl Iterator<Item = &Contour> {
        self.contours
            .iter()
            .enumerate()
            .filter(move |(i, _)| mode == RetrievalMode::All || self.is_external(*i))
            .map(|(_, c)| c)
    }
}
