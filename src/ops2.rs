//! 2D field operations and patterns, plus planar slices of 3D fields.

use std::f64::consts::TAU;
use std::sync::Arc;

use crate::blend::hard_max;
use crate::csg::{pruned_min, union2};
use crate::error::{check_non_negative, check_positive, SdfError, SdfResult};
use crate::matrix::Affine2;
use crate::ops3::saw_tooth;
use crate::sdf::{Sdf2, Sdf2Ref, Sdf3Ref};
use crate::types::{Box2, V2, V3};

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

pub struct Transform2 {
    child: Sdf2Ref,
    transform: Affine2,
    bbox: Box2,
}

impl Transform2 {
    pub fn new(child: Sdf2Ref, transform: Affine2) -> Self {
        let bbox = transform.apply_box(&child.bounding_box());
        Self { child, transform, bbox }
    }
}

impl Sdf2 for Transform2 {
    fn evaluate(&self, p: V2) -> f64 {
        self.child.evaluate(self.transform.apply_inverse(p))
    }
    fn bounding_box(&self) -> Box2 {
        self.bbox
    }
}

pub struct ScaleUniform2 {
    child: Sdf2Ref,
    k: f64,
    inv_k: f64,
}

impl ScaleUniform2 {
    pub fn new(child: Sdf2Ref, k: f64) -> SdfResult<Self> {
        check_positive("uniform scale", k)?;
        Ok(Self { child, k, inv_k: 1.0 / k })
    }
}

impl Sdf2 for ScaleUniform2 {
    fn evaluate(&self, p: V2) -> f64 {
        self.child.evaluate(p * self.inv_k) * self.k
    }
    fn bounding_box(&self) -> Box2 {
        let b = self.child.bounding_box();
        Box2::new(b.min * self.k, b.max * self.k)
    }
}

/// Translate a field so its bounding box is centered on the origin.
pub fn center2(child: Sdf2Ref) -> Sdf2Ref {
    let c = child.bounding_box().center();
    Arc::new(Transform2::new(child, Affine2::translation(-c)))
}

/// Center a field on the origin, then scale it uniformly by `k`.
pub fn center_and_scale2(child: Sdf2Ref, k: f64) -> SdfResult<Sdf2Ref> {
    Ok(Arc::new(ScaleUniform2::new(center2(child), k)?))
}

// ---------------------------------------------------------------------------
// Offset, elongate, cut
// ---------------------------------------------------------------------------

pub struct Offset2 {
    child: Sdf2Ref,
    distance: f64,
}

impl Offset2 {
    pub fn new(child: Sdf2Ref, distance: f64) -> SdfResult<Self> {
        if !distance.is_finite() {
            return Err(SdfError::invalid("offset", "not finite"));
        }
        Ok(Self { child, distance })
    }
}

impl Sdf2 for Offset2 {
    fn evaluate(&self, p: V2) -> f64 {
        self.child.evaluate(p) - self.distance
    }
    fn bounding_box(&self) -> Box2 {
        self.child.bounding_box().enlarge(self.distance)
    }
}

pub struct Elongate2 {
    child: Sdf2Ref,
    half: V2,
}

impl Elongate2 {
    pub fn new(child: Sdf2Ref, size: V2) -> SdfResult<Self> {
        check_non_negative("elongation x", size.x)?;
        check_non_negative("elongation y", size.y)?;
        Ok(Self { child, half: size * 0.5 })
    }
}

impl Sdf2 for Elongate2 {
    fn evaluate(&self, p: V2) -> f64 {
        let clamped = p.sup(&-self.half).inf(&self.half);
        self.child.evaluate(p - clamped)
    }
    fn bounding_box(&self) -> Box2 {
        let b = self.child.bounding_box();
        Box2::new(b.min - self.half, b.max + self.half)
    }
}

/// Keep the side of the line through `point` that `normal` points to.
pub struct Cut2 {
    child: Sdf2Ref,
    point: V2,
    normal: V2,
}

impl Cut2 {
    pub fn new(child: Sdf2Ref, point: V2, normal: V2) -> SdfResult<Self> {
        let len = normal.norm();
        if !(len > 0.0) || !len.is_finite() {
            return Err(SdfError::invalid("cut normal", "zero length"));
        }
        Ok(Self { child, point, normal: normal / len })
    }
}

impl Sdf2 for Cut2 {
    fn evaluate(&self, p: V2) -> f64 {
        let line = -(p - self.point).dot(&self.normal);
        hard_max(self.child.evaluate(p), line)
    }
    fn bounding_box(&self) -> Box2 {
        self.child.bounding_box()
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Grid of copies, `counts` along x and y, spaced by `step`.
pub struct Array2 {
    child: Sdf2Ref,
    offsets: Vec<V2>,
    child_box: Box2,
    bbox: Box2,
}

impl Array2 {
    pub fn new(child: Sdf2Ref, counts: [usize; 2], step: V2) -> SdfResult<Self> {
        if counts.iter().any(|&n| n == 0) {
            return Err(SdfError::invalid("array counts", format!("{counts:?} has a zero entry")));
        }
        let offsets: Vec<V2> = (0..counts[1])
            .flat_map(|j| (0..counts[0]).map(move |i| V2::new(i as f64 * step.x, j as f64 * step.y)))
            .collect();
        let child_box = child.bounding_box();
        let bbox = offsets
            .iter()
            .fold(child_box, |acc, o| acc.extend(&child_box.translate(*o)));
        Ok(Self { child, offsets, child_box, bbox })
    }
}

impl Sdf2 for Array2 {
    fn evaluate(&self, p: V2) -> f64 {
        pruned_min(
            self.offsets.len(),
            |i| self.child_box.translate(self.offsets[i]).min_max_dist2(p),
            |i| self.child.evaluate(p - self.offsets[i]),
        )
    }
    fn bounding_box(&self) -> Box2 {
        self.bbox
    }
}

/// `n` copies rotated evenly about the origin, by angle folding.
pub struct RotateCopy2 {
    child: Sdf2Ref,
    sector: f64,
    bbox: Box2,
}

impl RotateCopy2 {
    pub fn new(child: Sdf2Ref, n: usize) -> SdfResult<Self> {
        if n == 0 {
            return Err(SdfError::invalid("rotate copy count", "must be at least 1"));
        }
        let r = child.bounding_box().vertices().iter().map(|v| v.norm()).fold(0.0, f64::max);
        Ok(Self {
            child,
            sector: TAU / n as f64,
            bbox: Box2::new(V2::repeat(-r), V2::repeat(r)),
        })
    }
}

impl Sdf2 for RotateCopy2 {
    fn evaluate(&self, p: V2) -> f64 {
        let r = p.norm();
        let theta = saw_tooth(p.y.atan2(p.x), self.sector);
        self.child.evaluate(V2::new(r * theta.cos(), r * theta.sin()))
    }
    fn bounding_box(&self) -> Box2 {
        self.bbox
    }
}

/// Union of `n` copies, each moved by `step` relative to the previous one.
pub fn rotate_union2(child: Sdf2Ref, n: usize, step: Affine2) -> SdfResult<Sdf2Ref> {
    if n == 0 {
        return Err(SdfError::invalid("rotate union count", "must be at least 1"));
    }
    let mut t = Affine2::identity();
    let mut copies: Vec<Sdf2Ref> = Vec::with_capacity(n);
    for _ in 0..n {
        copies.push(Arc::new(Transform2::new(child.clone(), t)));
        t = t.then(&step);
    }
    union2(copies)
}

/// Copies placed along the segment `p0 -> p1`, one slot per pattern
/// character; an `x` places a copy, anything else leaves a gap.
pub fn line_of2(child: Sdf2Ref, p0: V2, p1: V2, pattern: &str) -> SdfResult<Sdf2Ref> {
    let slots = pattern.chars().count();
    if slots == 0 {
        return Err(SdfError::invalid("line pattern", "empty"));
    }
    let dx = (p1 - p0) / slots as f64;
    let copies: Vec<Sdf2Ref> = pattern
        .chars()
        .enumerate()
        .filter(|(_, c)| *c == 'x')
        .map(|(i, _)| {
            let at = p0 + dx * i as f64;
            Arc::new(Transform2::new(child.clone(), Affine2::translation(at))) as Sdf2Ref
        })
        .collect();
    if copies.is_empty() {
        return Err(SdfError::MissingOperand("line pattern places no copies"));
    }
    union2(copies)
}

/// One copy of `child` at every position.
pub fn multi2(child: Sdf2Ref, positions: &[V2]) -> SdfResult<Sdf2Ref> {
    if positions.is_empty() {
        return Err(SdfError::MissingOperand("multi needs at least one position"));
    }
    union2(
        positions
            .iter()
            .map(|p| Arc::new(Transform2::new(child.clone(), Affine2::translation(*p))) as Sdf2Ref),
    )
}

// ---------------------------------------------------------------------------
// Slice
// ---------------------------------------------------------------------------

/// The cross-section of a 3D field on a plane.
///
/// The plane's 2D x axis is the world x axis when the normal has no x
/// component, otherwise the y axis, otherwise z, otherwise a horizontal
/// vector; the 2D y axis completes a right-handed frame with the normal.
pub struct Slice2 {
    sdf: Sdf3Ref,
    origin: V3,
    u: V3,
    v: V3,
    bbox: Box2,
}

impl Slice2 {
    pub fn new(sdf: Sdf3Ref, point: V3, normal: V3) -> SdfResult<Self> {
        let len = normal.norm();
        if !(len > 0.0) || !len.is_finite() {
            return Err(SdfError::invalid("slice normal", "zero length"));
        }
        let n = normal / len;
        let u = if n.x == 0.0 {
            V3::x()
        } else if n.y == 0.0 {
            V3::y()
        } else if n.z == 0.0 {
            V3::z()
        } else {
            V3::new(n.y, -n.x, 0.0).normalize()
        };
        let v = n.cross(&u).normalize();
        let verts = sdf.bounding_box().vertices();
        let project = |w: &V3| {
            let d = w - point;
            V2::new(d.dot(&u), d.dot(&v))
        };
        let first = project(&verts[0]);
        let bbox = verts[1..].iter().fold(Box2::new(first, first), |b, w| b.include(project(w)));
        Ok(Self { sdf, origin: point, u, v, bbox })
    }
}

impl Sdf2 for Slice2 {
    fn evaluate(&self, p: V2) -> f64 {
        self.sdf.evaluate(self.origin + self.u * p.x + self.v * p.y)
    }
    fn bounding_box(&self) -> Box2 {
        self.bbox
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Points of an `nx` by `ny` grid over the bounding box that lie inside
/// or on the shape.
pub fn interior_points(sdf: &dyn Sdf2, nx: usize, ny: usize) -> SdfResult<Vec<V2>> {
    if nx < 2 || ny < 2 {
        return Err(SdfError::invalid("sample grid", format!("{nx}x{ny} is smaller than 2x2")));
    }
    let b = sdf.bounding_box();
    let step = V2::new(b.size().x / (nx - 1) as f64, b.size().y / (ny - 1) as f64);
    let mut out = Vec::new();
    for i in 0..nx {
        for j in 0..ny {
            let p = b.min + V2::new(i as f64 * step.x, j as f64 * step.y);
            if sdf.evaluate(p) <= 0.0 {
                out.push(p);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive2::Circle;
    use crate::primitive3::Sphere;
    use approx::assert_abs_diff_eq;

    #[test]
    fn slice_through_sphere_is_circle() {
        let s: Sdf3Ref = Arc::new(Sphere::new(2.0).unwrap());
        let slice = Slice2::new(s, V3::new(0.0, 0.0, 1.0), V3::z()).unwrap();
        // Section radius sqrt(4 - 1).
        assert_abs_diff_eq!(slice.evaluate(V2::new(3f64.sqrt(), 0.0)), 0.0, epsilon = 1e-12);
        let b = slice.bounding_box();
        assert_abs_diff_eq!(b.max.x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn line_of_skips_gaps() {
        let c: Sdf2Ref = Arc::new(Circle::new(0.25).unwrap());
        let row = line_of2(c, V2::zeros(), V2::new(4.0, 0.0), "x-x-").unwrap();
        assert!(row.evaluate(V2::new(0.0, 0.0)) < 0.0);
        assert!(row.evaluate(V2::new(1.0, 0.0)) > 0.0);
        assert!(row.evaluate(V2::new(2.0, 0.0)) < 0.0);
        assert!(line_of2(Arc::new(Circle::new(1.0).unwrap()), V2::zeros(), V2::x(), "--").is_err());
    }

    #[test]
    fn rotate_union_places_copies() {
        let c: Sdf2Ref = Arc::new(Transform2::new(
            Arc::new(Circle::new(0.2).unwrap()),
            Affine2::translation(V2::new(1.0, 0.0)),
        ));
        let ring = rotate_union2(c, 4, Affine2::rotation(TAU / 4.0)).unwrap();
        assert!(ring.evaluate(V2::new(0.0, 1.0)) < 0.0);
        assert!(ring.evaluate(V2::new(-1.0, 0.0)) < 0.0);
        assert!(ring.evaluate(V2::new(0.7, 0.7)) > 0.0);
    }

    #[test]
    fn interior_points_of_circle() {
        let c = Circle::new(1.0).unwrap();
        let pts = interior_points(&c, 11, 11).unwrap();
        assert!(pts.iter().all(|p| p.norm() <= 1.0 + 1e-12));
        assert!(pts.len() > 50 && pts.len() < 121);
    }
}
