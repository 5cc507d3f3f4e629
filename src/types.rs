use nalgebra::{Vector2, Vector3};

use crate::error::{SdfError, SdfResult};

/// 2D point or vector.
pub type V2 = Vector2<f64>;
/// 3D point or vector.
pub type V3 = Vector3<f64>;

/// Closed interval [lo, hi].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    pub fn new(lo: f64, hi: f64) -> Self { Self { lo, hi } }
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }
    pub fn contains(&self, x: f64) -> bool { x >= self.lo && x <= self.hi }
}

// ---------------------------------------------------------------------------
// 3D box
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box. `min <= max` component-wise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Box3 {
    pub min: V3,
    pub max: V3,
}

impl Box3 {
    /// Box spanning two corners given in any order.
    pub fn new(a: V3, b: V3) -> Self {
        Self { min: a.inf(&b), max: a.sup(&b) }
    }
    pub fn from_center_size(center: V3, size: V3) -> Self {
        let half = size.abs() * 0.5;
        Self { min: center - half, max: center + half }
    }
    pub fn center(&self) -> V3 { (self.min + self.max) * 0.5 }
    pub fn size(&self) -> V3 { self.max - self.min }

    /// Smallest box containing both.
    pub fn extend(&self, other: &Box3) -> Box3 {
        Box3 { min: self.min.inf(&other.min), max: self.max.sup(&other.max) }
    }
    /// Smallest box containing `self` and the point.
    pub fn include(&self, p: V3) -> Box3 {
        Box3 { min: self.min.inf(&p), max: self.max.sup(&p) }
    }
    pub fn translate(&self, v: V3) -> Box3 {
        Box3 { min: self.min + v, max: self.max + v }
    }
    /// Grow every face outward by `d` (shrinks for negative `d`, clamped at the center).
    pub fn enlarge(&self, d: f64) -> Box3 {
        let c = self.center();
        let min = (self.min - V3::repeat(d)).inf(&c);
        let max = (self.max + V3::repeat(d)).sup(&c);
        Box3 { min, max }
    }
    pub fn scale_about_center(&self, k: f64) -> Box3 {
        Box3::from_center_size(self.center(), self.size() * k)
    }
    pub fn contains(&self, p: V3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }
    pub fn contains_box(&self, other: &Box3) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }
    /// Overlap of two boxes, or `None` if they are disjoint.
    pub fn intersect(&self, other: &Box3) -> Option<Box3> {
        let min = self.min.sup(&other.min);
        let max = self.max.inf(&other.max);
        if min.x > max.x || min.y > max.y || min.z > max.z {
            None
        } else {
            Some(Box3 { min, max })
        }
    }

    /// The 8 corners, x varying fastest.
    pub fn vertices(&self) -> [V3; 8] {
        let (a, b) = (self.min, self.max);
        [
            V3::new(a.x, a.y, a.z),
            V3::new(b.x, a.y, a.z),
            V3::new(a.x, b.y, a.z),
            V3::new(b.x, b.y, a.z),
            V3::new(a.x, a.y, b.z),
            V3::new(b.x, a.y, b.z),
            V3::new(a.x, b.y, b.z),
            V3::new(b.x, b.y, b.z),
        ]
    }

    /// Interval of squared distances from `p` to the box.
    ///
    /// `lo` is the squared distance to the nearest point of the box (0 when
    /// `p` is inside), `hi` the squared distance to the farthest corner.
    pub fn min_max_dist2(&self, p: V3) -> Interval {
        let near = p.sup(&self.min).inf(&self.max);
        let lo = (near - p).norm_squared();
        let far = V3::new(
            if (p.x - self.min.x).abs() > (p.x - self.max.x).abs() { self.min.x } else { self.max.x },
            if (p.y - self.min.y).abs() > (p.y - self.max.y).abs() { self.min.y } else { self.max.y },
            if (p.z - self.min.z).abs() > (p.z - self.max.z).abs() { self.min.z } else { self.max.z },
        );
        Interval::new(lo, (far - p).norm_squared())
    }

    /// True when some axis has no positive extent or a coordinate is not finite.
    pub fn is_degenerate(&self) -> bool {
        let s = self.size();
        !(s.x > 0.0 && s.y > 0.0 && s.z > 0.0) ||
            !self.min.iter().chain(self.max.iter()).all(|c| c.is_finite())
    }

    pub(crate) fn check_extent(&self) -> SdfResult<()> {
        if self.is_degenerate() {
            return Err(SdfError::DegenerateBoundingBox {
                min_x: self.min.x,
                min_y: self.min.y,
                min_z: self.min.z,
                max_x: self.max.x,
                max_y: self.max.y,
                max_z: self.max.z,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 2D box
// ---------------------------------------------------------------------------

/// Axis-aligned 2D bounding box. `min <= max` component-wise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Box2 {
    pub min: V2,
    pub max: V2,
}

impl Box2 {
    pub fn new(a: V2, b: V2) -> Self {
        Self { min: a.inf(&b), max: a.sup(&b) }
    }
    pub fn from_center_size(center: V2, size: V2) -> Self {
        let half = size.abs() * 0.5;
        Self { min: center - half, max: center + half }
    }
    pub fn center(&self) -> V2 { (self.min + self.max) * 0.5 }
    pub fn size(&self) -> V2 { self.max - self.min }
    pub fn extend(&self, other: &Box2) -> Box2 {
        Box2 { min: self.min.inf(&other.min), max: self.max.sup(&other.max) }
    }
    pub fn include(&self, p: V2) -> Box2 {
        Box2 { min: self.min.inf(&p), max: self.max.sup(&p) }
    }
    pub fn translate(&self, v: V2) -> Box2 {
        Box2 { min: self.min + v, max: self.max + v }
    }
    pub fn enlarge(&self, d: f64) -> Box2 {
        let c = self.center();
        let min = (self.min - V2::repeat(d)).inf(&c);
        let max = (self.max + V2::repeat(d)).sup(&c);
        Box2 { min, max }
    }
    pub fn scale_about_center(&self, k: f64) -> Box2 {
        Box2::from_center_size(self.center(), self.size() * k)
    }
    pub fn contains(&self, p: V2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
    pub fn contains_box(&self, other: &Box2) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }
    pub fn intersect(&self, other: &Box2) -> Option<Box2> {
        let min = self.min.sup(&other.min);
        let max = self.max.inf(&other.max);
        if min.x > max.x || min.y > max.y { None } else { Some(Box2 { min, max }) }
    }
    /// The 4 corners, counter-clockwise from `min`.
    pub fn vertices(&self) -> [V2; 4] {
        [
            self.min,
            V2::new(self.max.x, self.min.y),
            self.max,
            V2::new(self.min.x, self.max.y),
        ]
    }
    /// Interval of squared distances from `p` to the box.
    pub fn min_max_dist2(&self, p: V2) -> Interval {
        let near = p.sup(&self.min).inf(&self.max);
        let lo = (near - p).norm_squared();
        let far = V2::new(
            if (p.x - self.min.x).abs() > (p.x - self.max.x).abs() { self.min.x } else { self.max.x },
            if (p.y - self.min.y).abs() > (p.y - self.max.y).abs() { self.min.y } else { self.max.y },
        );
        Interval::new(lo, (far - p).norm_squared())
    }
    pub fn is_degenerate(&self) -> bool {
        let s = self.size();
        !(s.x > 0.0 && s.y > 0.0) ||
            !self.min.iter().chain(self.max.iter()).all(|c| c.is_finite())
    }

    pub(crate) fn check_extent(&self) -> SdfResult<()> {
        if self.is_degenerate() {
            return Err(SdfError::DegenerateBoundingBox {
                min_x: self.min.x,
                min_y: self.min.y,
                min_z: 0.0,
                max_x: self.max.x,
                max_y: self.max.y,
                max_z: 0.0,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Extraction settings
// ---------------------------------------------------------------------------

/// Largest accepted `quality`; keeps lattice coordinates within `u32`.
pub const MAX_QUALITY: usize = 1 << 20;

fn validate_common(quality: usize, workers: Option<usize>, lipschitz: f64, padding: f64) -> SdfResult<()> {
    if !(2..=MAX_QUALITY).contains(&quality) {
        return Err(SdfError::InvalidSettings(format!("quality {quality} must be between 2 and {MAX_QUALITY}")));
    }
    if workers == Some(0) {
        return Err(SdfError::InvalidSettings("workers must be at least 1".into()));
    }
    if !(lipschitz.is_finite() && lipschitz > 0.0) {
        return Err(SdfError::InvalidSettings(format!("lipschitz bound {lipschitz} must be positive")));
    }
    if !(padding.is_finite() && padding >= 0.0) {
        return Err(SdfError::InvalidSettings(format!("padding {padding} must be non-negative")));
    }
    Ok(())
}

/// Settings for 3D surface extraction.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSettings {
    /// Cells along the longest axis of the bounding box.
    pub quality: usize,
    /// Worker threads; `None` uses the available hardware parallelism.
    pub workers: Option<usize>,
    /// Upper bound on the field's gradient magnitude, used to skip cells
    /// that cannot contain the surface. Raise it for scaled or blended fields.
    pub lipschitz: f64,
    /// Bounding box growth, as a fraction of its longest side.
    pub padding: f64,
    /// Return the triangles produced so far when cancelled.
    pub partial_on_cancel: bool,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            quality: 100,
            workers: None,
            lipschitz: 1.0,
            padding: 0.01,
            partial_on_cancel: false,
        }
    }
}

impl MeshSettings {
    pub fn with_quality(mut self, quality: usize) -> Self {
        self.quality = quality;
        self
    }
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
    pub fn with_lipschitz(mut self, lipschitz: f64) -> Self {
        self.lipschitz = lipschitz;
        self
    }
    pub fn with_partial_on_cancel(mut self, partial: bool) -> Self {
        self.partial_on_cancel = partial;
        self
    }
    pub fn validate(&self) -> SdfResult<()> {
        validate_common(self.quality, self.workers, self.lipschitz, self.padding)
    }
}

/// How 2D outlines place their vertices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContourMethod {
    /// Linear interpolation along cell edges.
    #[default]
    MarchingSquares,
    /// One vertex per cell from a least-squares fit to edge normals;
    /// keeps sharp corners.
    DualContouring,
}

/// Settings for 2D outline extraction.
#[derive(Clone, Debug, PartialEq)]
pub struct ContourSettings {
    pub quality: usize,
    pub workers: Option<usize>,
    pub lipschitz: f64,
    pub padding: f64,
    pub partial_on_cancel: bool,
    pub method: ContourMethod,
}

impl Default for ContourSettings {
    fn default() -> Self {
        Self {
            quality: 200,
            workers: None,
            lipschitz: 1.0,
            padding: 0.01,
            partial_on_cancel: false,
            method: ContourMethod::MarchingSquares,
        }
    }
}

impl ContourSettings {
    pub fn with_quality(mut self, quality: usize) -> Self {
        self.quality = quality;
        self
    }
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
    pub fn with_method(mut self, method: ContourMethod) -> Self {
        self.method = method;
        self
    }
    pub fn with_partial_on_cancel(mut self, partial: bool) -> Self {
        self.partial_on_cancel = partial;
        self
    }
    pub fn validate(&self) -> SdfResult<()> {
        validate_common(self.quality, self.workers, self.lipschitz, self.padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_corners() {
        let b = Box3::new(V3::new(1.0, -1.0, 2.0), V3::new(-1.0, 1.0, 0.0));
        assert_eq!(b.min, V3::new(-1.0, -1.0, 0.0));
        assert_eq!(b.max, V3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn min_max_dist_inside_is_zero() {
        let b = Box3::new(V3::repeat(-1.0), V3::repeat(1.0));
        let iv = b.min_max_dist2(V3::zeros());
        assert_eq!(iv.lo, 0.0);
        assert!((iv.hi - 3.0).abs() < 1e-12);
    }

    #[test]
    fn min_max_dist_outside() {
        let b = Box2::new(V2::new(0.0, 0.0), V2::new(1.0, 1.0));
        let iv = b.min_max_dist2(V2::new(3.0, 0.5));
        assert!((iv.lo - 4.0).abs() < 1e-12);
        assert!((iv.hi - (9.0 + 0.25)).abs() < 1e-12);
    }

    #[test]
    fn degenerate_detected() {
        let flat = Box3::new(V3::zeros(), V3::new(1.0, 1.0, 0.0));
        assert!(flat.is_degenerate());
        assert!(flat.check_extent().is_err());
        let nan = Box2::new(V2::zeros(), V2::new(f64::NAN, 1.0));
        assert!(nan.is_degenerate());
    }

    #[test]
    fn settings_validation() {
        assert!(MeshSettings::default().validate().is_ok());
        assert!(MeshSettings::default().with_quality(1).validate().is_err());
        assert!(MeshSettings::default().with_workers(0).validate().is_err());
        assert!(MeshSettings::default().with_lipschitz(f64::NAN).validate().is_err());
        assert!(ContourSettings::default().with_quality(2).validate().is_ok());
    }

    #[test]
    fn disjoint_boxes_do_not_intersect() {
        let a = Box2::new(V2::zeros(), V2::repeat(1.0));
        let b = a.translate(V2::new(5.0, 0.0));
        assert!(a.intersect(&b).is_none());
        assert!(a.extend(&b).contains_box(&b));
    }
}
