use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};
use vm_contour::Contour;
use vm_core::{
    BoundingBox, Error, ImageView, Moments, Point2d, convex_hull, flat_area_tolerance, perimeter,
    signed_area,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyKind {
    Area,
    Perimeter,
    Centroid,
    Orientation,
    EquivDiameter,
    Extent,
    Solidity,
    MajorAxisLength,
    MinorAxisLength,
    BoundingBox,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 10] = [
        PropertyKind::Area,
        PropertyKind::Perimeter,
        PropertyKind::Centroid,
        PropertyKind::Orientation,
        PropertyKind::EquivDiameter,
        PropertyKind::Extent,
        PropertyKind::Solidity,
        PropertyKind::MajorAxisLength,
        PropertyKind::MinorAxisLength,
        PropertyKind::BoundingBox,
    ];

    /// Properties that stay defined for a flat, non-empty contour.
    pub const ALWAYS_DEFINED: [PropertyKind; 4] = [
        PropertyKind::Area,
        PropertyKind::Perimeter,
        PropertyKind::EquivDiameter,
        PropertyKind::BoundingBox,
    ];

    pub fn name(self) -> &'static str {
        PROPERTY_TABLE[self as usize].1
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PropertyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PROPERTY_TABLE
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(kind, _, _)| *kind)
            .ok_or_else(|| Error::UnknownProperty(s.to_owned()))
    }
}

/// Which properties to compute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertySelection {
    #[default]
    All,
    Only(Vec<PropertyKind>),
}

impl PropertySelection {
    /// Parses raw names; the single token `all` selects everything.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, Error> {
        if let [only] = names
            && only.as_ref() == "all"
        {
            return Ok(Self::All);
        }

        let mut kinds = Vec::with_capacity(names.len());
        for name in names {
            let kind: PropertyKind = name.as_ref().trim().parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(Self::Only(kinds))
    }

    /// `self` restricted to [`PropertyKind::ALWAYS_DEFINED`], in order.
    pub fn always_defined(&self) -> Self {
        Self::Only(
            self.kinds()
                .iter()
                .copied()
                .filter(|k| PropertyKind::ALWAYS_DEFINED.contains(k))
                .collect(),
        )
    }

    pub fn kinds(&self) -> &[PropertyKind] {
        match self {
            Self::All => &PropertyKind::ALL,
            Self::Only(kinds) => kinds,
        }
    }
}

impl FromStr for PropertySelection {
    type Err = Error;

    /// Comma-separated names, or `all`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s.split(',').map(str::trim).filter(|n| !n.is_empty()).collect();
        Self::from_names(&names)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Scalar(f64),
    /// `(x, y)`
    Pair([f64; 2]),
    /// `(x, y, width, height)`
    Quad([f64; 4]),
}

impl PropertyValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::Scalar(v) => core::slice::from_ref(v),
            Self::Pair(v) => v,
            Self::Quad(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RegionProperties {
    values: BTreeMap<PropertyKind, PropertyValue>,
}

impl RegionProperties {
    pub fn get(&self, kind: PropertyKind) -> Option<&PropertyValue> {
        self.values.get(&kind)
    }

    pub fn scalar(&self, kind: PropertyKind) -> Option<f64> {
        self.get(kind).and_then(PropertyValue::as_scalar)
    }

    pub fn centroid(&self) -> Option<Point2d> {
        match self.get(PropertyKind::Centroid)? {
            PropertyValue::Pair([x, y]) => Some(Point2d::new(*x, *y)),
            _ => None,
        }
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self.get(PropertyKind::BoundingBox)? {
            PropertyValue::Quad([x, y, width, height]) => Some(BoundingBox {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            }),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyKind, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}

/// Per-contour quantities shared by several properties.
struct Measures<'a> {
    points: &'a [Point2d],
    moments: Moments,
    /// Polygon area, or the mask pixel count when the polygon is flat.
    area: f64,
    bbox: Option<BoundingBox>,
    flat_tol: f64,
}

type PropertyFn = fn(&Measures<'_>) -> Result<PropertyValue, Error>;

/// Indexed by `PropertyKind as usize`.
static PROPERTY_TABLE: [(PropertyKind, &str, PropertyFn); 10] = [
    (PropertyKind::Area, "Area", area),
    (PropertyKind::Perimeter, "Perimeter", perimeter_of),
    (PropertyKind::Centroid, "Centroid", centroid),
    (PropertyKind::Orientation, "Orientation", orientation),
    (PropertyKind::EquivDiameter, "EquivDiameter", equiv_diameter),
    (PropertyKind::Extent, "Extent", extent),
    (PropertyKind::Solidity, "Solidity", solidity),
    (PropertyKind::MajorAxisLength, "MajorAxisLength", major_axis_length),
    (PropertyKind::MinorAxisLength, "MinorAxisLength", minor_axis_length),
    (PropertyKind::BoundingBox, "BoundingBox", bounding_box),
];

fn area(m: &Measures<'_>) -> Result<PropertyValue, Error> {
    Ok(PropertyValue::Scalar(m.area))
}

fn perimeter_of(m: &Measures<'_>) -> Result<PropertyValue, Error> {
    Ok(PropertyValue::Scalar(perimeter(m.points)))
}

fn centroid(m: &Measures<'_>) -> Result<PropertyValue, Error> {
    let c = m.moments.centroid().ok_or(Error::DegenerateShape)?;
    Ok(PropertyValue::Pair([c.x, c.y]))
}

fn orientation(m: &Measures<'_>) -> Result<PropertyValue, Error> {
    let cov = m.moments.covariance().ok_or(Error::DegenerateShape)?;
    Ok(PropertyValue::Scalar(cov.major_axis_deg()))
}

fn equiv_diameter(m: &Measures<'_>) -> Result<PropertyValue, Error> {
    Ok(PropertyValue::Scalar((4.0 * m.area / core::f64::consts::PI).sqrt()))
}

fn extent(m: &Measures<'_>) -> Result<PropertyValue, Error> {
    let bbox = m.bbox.ok_or(Error::DegenerateShape)?;
    ratio(m.area, bbox.area(), m.flat_tol)
}

fn solidity(m: &Measures<'_>) -> Result<PropertyValue, Error> {
    let hull = convex_hull(m.points);
    ratio(m.area, signed_area(&hull).abs(), m.flat_tol)
}

fn major_axis_length(m: &Measures<'_>) -> Result<PropertyValue, Error> {
    let cov = m.moments.covariance().ok_or(Error::DegenerateShape)?;
    Ok(PropertyValue::Scalar(4.0 * cov.eigenvalues().0.sqrt()))
}

fn minor_axis_length(m: &Measures<'_>) -> Result<PropertyValue, Error> {
    let cov = m.moments.covariance().ok_or(Error::DegenerateShape)?;
    Ok(PropertyValue::Scalar(4.0 * cov.eigenvalues().1.sqrt()))
}

fn bounding_box(m: &Measures<'_>) -> Result<PropertyValue, Error> {
    let b = m.bbox.ok_or(Error::DegenerateShape)?;
    Ok(PropertyValue::Quad([b.x, b.y, b.width, b.height]))
}

/// Area ratios are capped at 1: a doubly traced ring or a mask count can
/// exceed the polygon it is compared against. Both areas must exceed the
/// contour's flatness tolerance.
fn ratio(num: f64, den: f64, tol: f64) -> Result<PropertyValue, Error> {
    if num <= tol || den <= tol {
        return Err(Error::DegenerateShape);
    }
    Ok(PropertyValue::Scalar((num / den).min(1.0)))
}

/// Computes region properties of contours, optionally cross-checking flat
/// polygons against the mask they were traced from.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionPropertyCalculator<'m> {
    mask: Option<ImageView<'m, u8>>,
}

impl<'m> RegionPropertyCalculator<'m> {
    pub fn new() -> Self {
        Self { mask: None }
    }

    /// Zero-area polygons take their area from the foreground pixels of
    /// `mask` inside the contour's bounding box.
    ///
    /// Only Area and EquivDiameter change. The centroid, orientation, axis
    /// lengths and ratios still come from the flat polygon, so [`compute`]
    /// fails with [`Error::DegenerateShape`] at the first of them in the
    /// selection. Use [`compute_defined`] to get the defined subset instead.
    ///
    /// [`compute`]: Self::compute
    /// [`compute_defined`]: Self::compute_defined
    pub fn with_mask(mask: ImageView<'m, u8>) -> Self {
        Self { mask: Some(mask) }
    }

    pub fn compute(
        &self,
        contour: &Contour,
        selection: &PropertySelection,
    ) -> Result<RegionProperties, Error> {
        let points = contour.points.as_slice();
        let moments = Moments::of_polygon(points);
        let bbox = contour.bounding_box();

        let mut area = moments.area();
        if area == 0.0
            && let (Some(mask), Some(bbox)) = (&self.mask, &bbox)
        {
            area = mask_area_in_box(mask, bbox) as f64;
            warn!(
                "flat contour with {} points: using mask area {}",
                points.len(),
                area
            );
        }

        let m = Measures {
            points,
            moments,
            area,
            bbox,
            flat_tol: flat_area_tolerance(points),
        };

        let mut values = BTreeMap::new();
        for &kind in selection.kinds() {
            let (_, _, f) = PROPERTY_TABLE[kind as usize];
            values.insert(kind, f(&m)?);
        }
        Ok(RegionProperties { values })
    }

    /// Like [`compute`](Self::compute), but a degenerate contour yields the
    /// [`PropertyKind::ALWAYS_DEFINED`] part of `selection` instead of an error.
    pub fn compute_defined(
        &self,
        contour: &Contour,
        selection: &PropertySelection,
    ) -> Result<RegionProperties, Error> {
        match self.compute(contour, selection) {
            Err(Error::DegenerateShape) if !contour.is_empty() => {
                warn!(
                    "degenerate contour with {} points: keeping only always-defined properties",
                    contour.len()
                );
                self.compute(contour, &selection.always_defined())
            }
            other => other,
        }
    }

    /// One result per contour, in input order.
    pub fn compute_all(
        &self,
        contours: &[Contour],
        selection: &PropertySelection,
    ) -> Vec<Result<RegionProperties, Error>> {
        contours.iter().map(|c| self.compute(c, selection)).collect()
    }
}

pub fn region_properties(
    contour: &Contour,
    selection: &PropertySelection,
) -> Result<RegionProperties, Error> {
    RegionPropertyCalculator::new().compute(contour, selection)
}

pub fn properties(
    contours: &[Contour],
    selection: &PropertySelection,
) -> Vec<Result<RegionProperties, Error>> {
    RegionPropertyCalculator::new().compute_all(contours, selection)
}

/// Foreground pixels of `mask` whose centers fall inside `bbox`.
pub fn mask_area_in_box(mask: &ImageView<'_, u8>, bbox: &BoundingBox) -> usize {
    let clamp = |v: f64, len: usize| v.max(0.0).min(len as f64) as usize;
    let x0 = clamp(bbox.x.ceil(), mask.width());
    let y0 = clamp(bbox.y.ceil(), mask.height());
    let x1 = clamp((bbox.x + bbox.width).floor() + 1.0, mask.width());
    let y1 = clamp((bbox.y + bbox.height).floor() + 1.0, mask.height());
    if x1 <= x0 || y1 <= y0 {
        return 0;
    }

    mask.subview(x0, y0, x1 - x0, y1 - y0)
        .map(|v| v.count_foreground())
        .unwrap_or(0)
}
