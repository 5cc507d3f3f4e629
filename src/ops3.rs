//! 3D field operations: transforms, offsets, patterns, extrusion and
//! revolution.

use std::f64::consts::{PI, TAU};

use nalgebra::Vector2;

use crate::blend::hard_max;
use crate::csg::pruned_min;
use crate::error::{check_non_negative, check_positive, SdfError, SdfResult};
use crate::matrix::Affine3;
use crate::sdf::{Sdf2Ref, Sdf3, Sdf3Ref};
use crate::types::{Box3, V2, V3};

/// Map an angle into `[-period/2, period/2)`.
pub(crate) fn saw_tooth(x: f64, period: f64) -> f64 {
    (x + 0.5 * period).rem_euclid(period) - 0.5 * period
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// A child field moved by an affine transform.
///
/// Distances are preserved only when the transform is rigid.
pub struct Transform3 {
    child: Sdf3Ref,
    transform: Affine3,
    bbox: Box3,
}

impl Transform3 {
    pub fn new(child: Sdf3Ref, transform: Affine3) -> Self {
        let bbox = transform.apply_box(&child.bounding_box());
        Self { child, transform, bbox }
    }

    pub fn transform(&self) -> &Affine3 {
        &self.transform
    }
}

impl Sdf3 for Transform3 {
    fn evaluate(&self, p: V3) -> f64 {
        self.child.evaluate(self.transform.apply_inverse(p))
    }
    fn bounding_box(&self) -> Box3 {
        self.bbox
    }
}

/// Uniform scale that keeps the result a distance field.
pub struct ScaleUniform3 {
    child: Sdf3Ref,
    k: f64,
    inv_k: f64,
}

impl ScaleUniform3 {
    pub fn new(child: Sdf3Ref, k: f64) -> SdfResult<Self> {
        check_positive("uniform scale", k)?;
        Ok(Self { child, k, inv_k: 1.0 / k })
    }
}

impl Sdf3 for ScaleUniform3 {
    fn evaluate(&self, p: V3) -> f64 {
        self.child.evaluate(p * self.inv_k) * self.k
    }
    fn bounding_box(&self) -> Box3 {
        let b = self.child.bounding_box();
        Box3::new(b.min * self.k, b.max * self.k)
    }
}

// ---------------------------------------------------------------------------
// Offset, elongate, cut
// ---------------------------------------------------------------------------

/// Grow (positive) or shrink (negative) the surface along its normal.
pub struct Offset3 {
    child: Sdf3Ref,
    distance: f64,
}

impl Offset3 {
    pub fn new(child: Sdf3Ref, distance: f64) -> SdfResult<Self> {
        if !distance.is_finite() {
            return Err(SdfError::invalid("offset", "not finite"));
        }
        Ok(Self { child, distance })
    }
}

impl Sdf3 for Offset3 {
    fn evaluate(&self, p: V3) -> f64 {
        self.child.evaluate(p) - self.distance
    }
    fn bounding_box(&self) -> Box3 {
        self.child.bounding_box().enlarge(self.distance)
    }
}

/// Stretch a field by inserting `size` along each axis at the origin.
pub struct Elongate3 {
    child: Sdf3Ref,
    half: V3,
}

impl Elongate3 {
    pub fn new(child: Sdf3Ref, size: V3) -> SdfResult<Self> {
        for c in size.iter() {
            check_non_negative("elongation", *c)?;
        }
        Ok(Self { child, half: size * 0.5 })
    }
}

impl Sdf3 for Elongate3 {
    fn evaluate(&self, p: V3) -> f64 {
        let clamped = p.sup(&-self.half).inf(&self.half);
        self.child.evaluate(p - clamped)
    }
    fn bounding_box(&self) -> Box3 {
        let b = self.child.bounding_box();
        Box3::new(b.min - self.half, b.max + self.half)
    }
}

/// Keep the part of a field on the side of a plane its normal points to.
pub struct Cut3 {
    child: Sdf3Ref,
    point: V3,
    normal: V3,
}

impl Cut3 {
    pub fn new(child: Sdf3Ref, point: V3, normal: V3) -> SdfResult<Self> {
        let len = normal.norm();
        if !(len > 0.0) || !len.is_finite() {
            return Err(SdfError::invalid("cut normal", "zero length"));
        }
        Ok(Self { child, point, normal: normal / len })
    }
}

impl Sdf3 for Cut3 {
    fn evaluate(&self, p: V3) -> f64 {
        let plane = -(p - self.point).dot(&self.normal);
        hard_max(self.child.evaluate(p), plane)
    }
    fn bounding_box(&self) -> Box3 {
        self.child.bounding_box()
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Grid of copies: `counts` along each axis spaced by `step`.
pub struct Array3 {
    child: Sdf3Ref,
    offsets: Vec<V3>,
    child_box: Box3,
    bbox: Box3,
}

impl Array3 {
    pub fn new(child: Sdf3Ref, counts: [usize; 3], step: V3) -> SdfResult<Self> {
        if counts.iter().any(|&n| n == 0) {
            return Err(SdfError::invalid("array counts", format!("{counts:?} has a zero entry")));
        }
        let mut offsets = Vec::with_capacity(counts[0] * counts[1] * counts[2]);
        for k in 0..counts[2] {
            for j in 0..counts[1] {
                for i in 0..counts[0] {
                    offsets.push(V3::new(i as f64 * step.x, j as f64 * step.y, k as f64 * step.z));
                }
            }
        }
        let child_box = child.bounding_box();
        let bbox = offsets
            .iter()
            .fold(child_box, |acc, o| acc.extend(&child_box.translate(*o)));
        Ok(Self { child, offsets, child_box, bbox })
    }
}

impl Sdf3 for Array3 {
    fn evaluate(&self, p: V3) -> f64 {
        pruned_min(
            self.offsets.len(),
            |i| self.child_box.translate(self.offsets[i]).min_max_dist2(p),
            |i| self.child.evaluate(p - self.offsets[i]),
        )
    }
    fn bounding_box(&self) -> Box3 {
        self.bbox
    }
}

/// `n` copies of a field rotated evenly about the z axis.
///
/// Evaluated by folding the polar angle into the first sector, so the child
/// should lie within `±π/n` of the +x axis.
pub struct RotateCopy3 {
    child: Sdf3Ref,
    sector: f64,
    bbox: Box3,
}

impl RotateCopy3 {
    pub fn new(child: Sdf3Ref, n: usize) -> SdfResult<Self> {
        if n == 0 {
            return Err(SdfError::invalid("rotate copy count", "must be at least 1"));
        }
        let b = child.bounding_box();
        let r = b.vertices().iter().map(|v| v.xy().norm()).fold(0.0, f64::max);
        let bbox = Box3::new(V3::new(-r, -r, b.min.z), V3::new(r, r, b.max.z));
        Ok(Self { child, sector: TAU / n as f64, bbox })
    }
}

impl Sdf3 for RotateCopy3 {
    fn evaluate(&self, p: V3) -> f64 {
        let r = p.xy().norm();
        let theta = saw_tooth(p.y.atan2(p.x), self.sector);
        self.child.evaluate(V3::new(r * theta.cos(), r * theta.sin(), p.z))
    }
    fn bounding_box(&self) -> Box3 {
        self.bbox
    }
}

// ---------------------------------------------------------------------------
// 2D -> 3D
// ---------------------------------------------------------------------------

/// Linear extrusion of a profile along z, centered on `z = 0`, with an
/// optional twist of the profile from bottom to top.
pub struct Extrude3 {
    profile: Sdf2Ref,
    half_height: f64,
    twist: f64,
    bbox: Box3,
}

impl Extrude3 {
    pub fn new(profile: Sdf2Ref, height: f64) -> SdfResult<Self> {
        Self::twisted(profile, height, 0.0)
    }

    /// `twist` is the total rotation in radians across the height.
    pub fn twisted(profile: Sdf2Ref, height: f64, twist: f64) -> SdfResult<Self> {
        check_non_negative("extrude height", height)?;
        if !twist.is_finite() {
            return Err(SdfError::invalid("extrude twist", "not finite"));
        }
        let b = profile.bounding_box();
        let hh = height * 0.5;
        let bbox = if twist == 0.0 {
            Box3::new(V3::new(b.min.x, b.min.y, -hh), V3::new(b.max.x, b.max.y, hh))
        } else {
            let r = b.vertices().iter().map(|v| v.norm()).fold(0.0, f64::max);
            Box3::new(V3::new(-r, -r, -hh), V3::new(r, r, hh))
        };
        Ok(Self { profile, half_height: hh, twist, bbox })
    }
}

impl Sdf3 for Extrude3 {
    fn evaluate(&self, p: V3) -> f64 {
        let q = if self.twist == 0.0 || self.half_height == 0.0 {
            p.xy()
        } else {
            let a = -self.twist * (p.z / (2.0 * self.half_height));
            let (s, c) = a.sin_cos();
            V2::new(c * p.x - s * p.y, s * p.x + c * p.y)
        };
        let d = self.profile.evaluate(q);
        if d.is_nan() {
            return d;
        }
        let w = Vector2::new(d, p.z.abs() - self.half_height);
        w.x.max(w.y).min(0.0) + Vector2::new(w.x.max(0.0), w.y.max(0.0)).norm()
    }
    fn bounding_box(&self) -> Box3 {
        self.bbox
    }
}

/// Solid of revolution about z. The profile's x is the radius and its y
/// the height. `theta` below 2π revolves only a wedge starting at +x.
pub struct Revolve3 {
    profile: Sdf2Ref,
    theta: f64,
    wedge_normal: V2,
    bbox: Box3,
}

impl Revolve3 {
    pub fn new(profile: Sdf2Ref) -> SdfResult<Self> {
        Self::partial(profile, TAU)
    }

    pub fn partial(profile: Sdf2Ref, theta: f64) -> SdfResult<Self> {
        check_positive("revolve angle", theta)?;
        let theta = theta.min(TAU);
        let b = profile.bounding_box();
        let r = b.min.x.abs().max(b.max.x.abs());
        let bbox = Box3::new(V3::new(-r, -r, b.min.y), V3::new(r, r, b.max.y));
        Ok(Self {
            profile,
            theta,
            wedge_normal: V2::new(theta.sin(), -theta.cos()),
            bbox,
        })
    }
}

impl Sdf3 for Revolve3 {
    fn evaluate(&self, p: V3) -> f64 {
        let d = self.profile.evaluate(V2::new(p.xy().norm(), p.z));
        if self.theta >= TAU {
            return d;
        }
        // Polar angle in [0, theta]: above the x axis and behind the end plane.
        let end = -self.wedge_normal.dot(&p.xy());
        let wedge = if self.theta <= PI { (-p.y).max(end) } else { (-p.y).min(end) };
        hard_max(d, wedge)
    }
    fn bounding_box(&self) -> Box3 {
        self.bbox
    }
}
