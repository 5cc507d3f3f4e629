//! Closed-form 3D primitives.
//!
//! Every primitive is centered on the origin. Position it with a transform.
//! Constructors validate their parameters and return `SdfResult`.

use nalgebra::Vector2;

use crate::error::{check_non_negative, check_positive, SdfError, SdfResult};
use crate::sdf::Sdf3;
use crate::types::{Box3, V3};

// ---------------------------------------------------------------------------
// Distance kernels
// ---------------------------------------------------------------------------

/// Signed distance to a box with the given half extents, optionally rounded.
pub fn sdf_box(p: V3, half: V3, round: f64) -> f64 {
    let d = p.abs() - (half - V3::repeat(round));
    let outside = V3::new(d.x.max(0.0), d.y.max(0.0), d.z.max(0.0)).norm();
    let inside = d.x.max(d.y).max(d.z).min(0.0);
    outside + inside - round
}

/// Signed distance to a cylinder of half height `hh` along z.
pub fn sdf_cylinder(p: V3, radius: f64, hh: f64) -> f64 {
    let d = Vector2::new(p.xy().norm() - radius, p.z.abs() - hh);
    if d.x > 0.0 && d.y > 0.0 {
        d.norm()
    } else {
        d.x.max(d.y)
    }
}

/// Exact signed distance to a truncated cone along z, radius `ra` at
/// `z = -hh` and `rb` at `z = +hh`.
pub fn sdf_capped_cone(p: V3, hh: f64, ra: f64, rb: f64) -> f64 {
    let rba = rb - ra;
    let baba = 4.0 * hh * hh;
    let x = p.xy().norm();
    let paba = (p.z + hh) / (2.0 * hh);
    let cax = (x - if paba < 0.5 { ra } else { rb }).max(0.0);
    let cay = (paba - 0.5).abs() - 0.5;
    let k = rba * rba + baba;
    let f = ((rba * (x - ra) + paba * baba) / k).clamp(0.0, 1.0);
    let cbx = x - ra - f * rba;
    let cby = paba - f;
    let s = if cbx < 0.0 && cay < 0.0 { -1.0 } else { 1.0 };
    s * (cax * cax + cay * cay * baba)
        .min(cbx * cbx + cby * cby * baba)
        .sqrt()
}

/// Signed distance to a torus about the z axis.
pub fn sdf_torus(p: V3, major: f64, minor: f64) -> f64 {
    let q = Vector2::new(p.xy().norm() - major, p.z);
    q.norm() - minor
}

/// Signed distance to a z-aligned capsule whose spine runs from `-hs` to `+hs`.
pub fn sdf_capsule(p: V3, hs: f64, radius: f64) -> f64 {
    let z = p.z.clamp(-hs, hs);
    (p - V3::new(0.0, 0.0, z)).norm() - radius
}

// ---------------------------------------------------------------------------
// Box
// ---------------------------------------------------------------------------

/// Axis-aligned box of the given full size with rounded edges.
#[derive(Clone, Debug)]
pub struct BoxSdf3 {
    half: V3,
    round: f64,
}

impl BoxSdf3 {
    pub fn new(size: V3, round: f64) -> SdfResult<Self> {
        for c in size.iter() {
            check_non_negative("box size", *c)?;
        }
        check_non_negative("box round", round)?;
        let half = size * 0.5;
        if round > half.min() {
            return Err(SdfError::invalid("box round", format!("{round} exceeds half the smallest side")));
        }
        Ok(Self { half, round })
    }
}

impl Sdf3 for BoxSdf3 {
    fn evaluate(&self, p: V3) -> f64 {
        sdf_box(p, self.half, self.round)
    }
    fn bounding_box(&self) -> Box3 {
        Box3::new(-self.half, self.half)
    }
}

// ---------------------------------------------------------------------------
// Sphere
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Sphere {
    radius: f64,
}

impl Sphere {
    pub fn new(radius: f64) -> SdfResult<Self> {
        check_non_negative("sphere radius", radius)?;
        Ok(Self { radius })
    }
}

impl Sdf3 for Sphere {
    fn evaluate(&self, p: V3) -> f64 {
        p.norm() - self.radius
    }
    fn bounding_box(&self) -> Box3 {
        Box3::new(V3::repeat(-self.radius), V3::repeat(self.radius))
    }
}

// ---------------------------------------------------------------------------
// Cylinder
// ---------------------------------------------------------------------------

/// Cylinder along z, centered on the origin, with optionally rounded rims.
#[derive(Clone, Debug)]
pub struct Cylinder {
    height: f64,
    radius: f64,
    round: f64,
}

impl Cylinder {
    pub fn new(height: f64, radius: f64, round: f64) -> SdfResult<Self> {
        check_non_negative("cylinder height", height)?;
        check_non_negative("cylinder radius", radius)?;
        check_non_negative("cylinder round", round)?;
        if round > radius || round > height * 0.5 {
            return Err(SdfError::invalid("cylinder round", format!("{round} does not fit the cylinder")));
        }
        Ok(Self { height, radius, round })
    }
}

impl Sdf3 for Cylinder {
    fn evaluate(&self, p: V3) -> f64 {
        sdf_cylinder(p, self.radius - self.round, self.height * 0.5 - self.round) - self.round
    }
    fn bounding_box(&self) -> Box3 {
        let d = V3::new(self.radius, self.radius, self.height * 0.5);
        Box3::new(-d, d)
    }
}

// ---------------------------------------------------------------------------
// Capsule
// ---------------------------------------------------------------------------

/// Cylinder with hemispherical ends; `height` is the overall length.
#[derive(Clone, Debug)]
pub struct Capsule {
    half_spine: f64,
    radius: f64,
}

impl Capsule {
    pub fn new(height: f64, radius: f64) -> SdfResult<Self> {
        check_non_negative("capsule radius", radius)?;
        check_non_negative("capsule height", height)?;
        if height < 2.0 * radius {
            return Err(SdfError::invalid("capsule height", format!("{height} is less than the diameter")));
        }
        Ok(Self { half_spine: height * 0.5 - radius, radius })
    }
}

impl Sdf3 for Capsule {
    fn evaluate(&self, p: V3) -> f64 {
        sdf_capsule(p, self.half_spine, self.radius)
    }
    fn bounding_box(&self) -> Box3 {
        let d = V3::new(self.radius, self.radius, self.half_spine + self.radius);
        Box3::new(-d, d)
    }
}

// ---------------------------------------------------------------------------
// Cone
// ---------------------------------------------------------------------------

/// Truncated cone along z: radius `r0` at the bottom, `r1` at the top.
///
/// Rounding erodes the cone by `round` and offsets it back, so the rounded
/// shape stays inside the sharp one.
#[derive(Clone, Debug)]
pub struct Cone {
    hh: f64,
    ra: f64,
    rb: f64,
    round: f64,
    height: f64,
    r_max: f64,
}

impl Cone {
    pub fn new(height: f64, r0: f64, r1: f64, round: f64) -> SdfResult<Self> {
        check_positive("cone height", height)?;
        check_non_negative("cone r0", r0)?;
        check_non_negative("cone r1", r1)?;
        check_non_negative("cone round", round)?;
        if r0 == 0.0 && r1 == 0.0 {
            return Err(SdfError::invalid("cone radius", "both radii are zero"));
        }
        // Horizontal inset of a slanted side moved inward by `round`.
        let dr = r1 - r0;
        let slant = (height * height + dr * dr).sqrt();
        let inset = round * slant / height;
        let ra = r0 + dr * round / height - inset;
        let rb = r1 - dr * round / height - inset;
        if round > 0.0 && (ra < 0.0 || rb < 0.0 || 2.0 * round > height) {
            return Err(SdfError::invalid("cone round", format!("{round} does not fit the cone")));
        }
        Ok(Self {
            hh: height * 0.5 - round,
            ra: ra.max(0.0),
            rb: rb.max(0.0),
            round,
            height,
            r_max: r0.max(r1),
        })
    }
}

impl Sdf3 for Cone {
    fn evaluate(&self, p: V3) -> f64 {
        if self.hh <= 0.0 {
            return sdf_cylinder(p, self.ra.max(self.rb), 0.0) - self.round;
        }
        sdf_capped_cone(p, self.hh, self.ra, self.rb) - self.round
    }
    fn bounding_box(&self) -> Box3 {
        let d = V3::new(self.r_max, self.r_max, self.height * 0.5);
        Box3::new(-d, d)
    }
}

// ---------------------------------------------------------------------------
// Torus
// ---------------------------------------------------------------------------

/// Torus about the z axis.
#[derive(Clone, Debug)]
pub struct Torus {
    major: f64,
    minor: f64,
}

impl Torus {
    pub fn new(major: f64, minor: f64) -> SdfResult<Self> {
        check_non_negative("torus major radius", major)?;
        check_non_negative("torus minor radius", minor)?;
        Ok(Self { major, minor })
    }
}

impl Sdf3 for Torus {
    fn evaluate(&self, p: V3) -> f64 {
        sdf_torus(p, self.major, self.minor)
    }
    fn bounding_box(&self) -> Box3 {
        let r = self.major + self.minor;
        let d = V3::new(r, r, self.minor);
        Box3::new(-d, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rounded_box_corner_is_pulled_in() {
        let b = BoxSdf3::new(V3::repeat(2.0), 0.25).unwrap();
        assert_abs_diff_eq!(b.evaluate(V3::new(1.0, 0.0, 0.0)), 0.0, epsilon = 1e-12);
        assert!(b.evaluate(V3::repeat(1.0)) > 0.0);
    }

    #[test]
    fn cone_rounding_inside_sharp() {
        let sharp = Cone::new(4.0, 2.0, 1.0, 0.0).unwrap();
        let round = Cone::new(4.0, 2.0, 1.0, 0.3).unwrap();
        for p in [V3::new(1.5, 0.0, 0.0), V3::new(2.0, 0.0, -2.0), V3::new(0.0, 1.0, 2.0)] {
            assert!(round.evaluate(p) >= sharp.evaluate(p) - 1e-9, "rounded cone pokes out at {p:?}");
        }
        // Flat face center is unchanged by rounding.
        assert_abs_diff_eq!(round.evaluate(V3::new(0.0, 0.0, -2.0)), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn oversized_round_rejected() {
        assert!(Cylinder::new(1.0, 2.0, 0.6).is_err());
        assert!(BoxSdf3::new(V3::new(1.0, 4.0, 4.0), 0.6).is_err());
        assert!(Capsule::new(1.0, 1.0).is_err());
    }
}
