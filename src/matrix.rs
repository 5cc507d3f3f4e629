//! Affine transforms with a cached inverse.
//!
//! Distance fields are transformed by evaluating the child at the inverse
//! transformed point, so every transform keeps its inverse alongside the
//! forward matrix. Singular matrices are rejected at construction.

use nalgebra::{Matrix3, Matrix4, Rotation2, Rotation3, Unit};

use crate::error::{SdfError, SdfResult};
use crate::types::{Box2, Box3, V2, V3};

const RIGID_TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// 3D
// ---------------------------------------------------------------------------

/// 3D affine transform (homogeneous 4x4).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine3 {
    matrix: Matrix4<f64>,
    inverse: Matrix4<f64>,
}

impl Default for Affine3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine3 {
    pub fn identity() -> Self {
        Self { matrix: Matrix4::identity(), inverse: Matrix4::identity() }
    }

    /// Wrap an arbitrary homogeneous matrix; fails if it cannot be inverted.
    pub fn from_matrix(matrix: Matrix4<f64>) -> SdfResult<Self> {
        let inverse = matrix
            .try_inverse()
            .ok_or_else(|| SdfError::invalid("transform", "matrix is singular"))?;
        Ok(Self { matrix, inverse })
    }

    pub fn translation(v: V3) -> Self {
        Self {
            matrix: Matrix4::new_translation(&v),
            inverse: Matrix4::new_translation(&-v),
        }
    }

    /// Non-uniform scale. Every factor must be non-zero.
    pub fn scaling(k: V3) -> SdfResult<Self> {
        if k.iter().any(|c| *c == 0.0 || !c.is_finite()) {
            return Err(SdfError::invalid("scale", format!("factors {k:?} must be finite and non-zero")));
        }
        Ok(Self {
            matrix: Matrix4::new_nonuniform_scaling(&k),
            inverse: Matrix4::new_nonuniform_scaling(&k.map(|c| 1.0 / c)),
        })
    }

    /// Rotation by `angle` radians about `axis` (right-hand rule).
    pub fn rotation(axis: V3, angle: f64) -> SdfResult<Self> {
        let axis = Unit::try_new(axis, 1e-12)
            .ok_or_else(|| SdfError::invalid("rotation axis", "zero length"))?;
        let r = Rotation3::from_axis_angle(&axis, angle).to_homogeneous();
        Ok(Self { matrix: r, inverse: r.transpose() })
    }

    pub fn rotate_x(angle: f64) -> Self {
        let r = Rotation3::from_axis_angle(&V3::x_axis(), angle).to_homogeneous();
        Self { matrix: r, inverse: r.transpose() }
    }
    pub fn rotate_y(angle: f64) -> Self {
        let r = Rotation3::from_axis_angle(&V3::y_axis(), angle).to_homogeneous();
        Self { matrix: r, inverse: r.transpose() }
    }
    pub fn rotate_z(angle: f64) -> Self {
        let r = Rotation3::from_axis_angle(&V3::z_axis(), angle).to_homogeneous();
        Self { matrix: r, inverse: r.transpose() }
    }

    /// Reflection through the xy plane (z -> -z).
    pub fn mirror_xy() -> Self {
        Self::reflection(V3::new(1.0, 1.0, -1.0))
    }
    /// Reflection through the xz plane (y -> -y).
    pub fn mirror_xz() -> Self {
        Self::reflection(V3::new(1.0, -1.0, 1.0))
    }
    /// Reflection through the yz plane (x -> -x).
    pub fn mirror_yz() -> Self {
        Self::reflection(V3::new(-1.0, 1.0, 1.0))
    }

    fn reflection(k: V3) -> Self {
        let m = Matrix4::new_nonuniform_scaling(&k);
        Self { matrix: m, inverse: m }
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Affine3) -> Affine3 {
        Affine3 {
            matrix: next.matrix * self.matrix,
            inverse: self.inverse * next.inverse,
        }
    }

    pub fn inverse(&self) -> Affine3 {
        Affine3 { matrix: self.inverse, inverse: self.matrix }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    pub fn apply(&self, p: V3) -> V3 {
        transform_point3(&self.matrix, p)
    }

    pub fn apply_inverse(&self, p: V3) -> V3 {
        transform_point3(&self.inverse, p)
    }

    /// Box enclosing the 8 transformed corners.
    pub fn apply_box(&self, b: &Box3) -> Box3 {
        let v = b.vertices();
        let first = self.apply(v[0]);
        v[1..].iter().fold(Box3::new(first, first), |acc, p| acc.include(self.apply(*p)))
    }

    /// True when the linear part is orthonormal, so distances are preserved.
    pub fn is_rigid(&self) -> bool {
        let l: Matrix3<f64> = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        (l.transpose() * l - Matrix3::identity()).abs().max() < RIGID_TOL
    }
}

fn transform_point3(m: &Matrix4<f64>, p: V3) -> V3 {
    let h = m * p.push(1.0);
    V3::new(h.x, h.y, h.z)
}

// ---------------------------------------------------------------------------
// 2D
// ---------------------------------------------------------------------------

/// 2D affine transform (homogeneous 3x3).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine2 {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine2 {
    pub fn identity() -> Self {
        Self { matrix: Matrix3::identity(), inverse: Matrix3::identity() }
    }

    pub fn from_matrix(matrix: Matrix3<f64>) -> SdfResult<Self> {
        let inverse = matrix
            .try_inverse()
            .ok_or_else(|| SdfError::invalid("transform", "matrix is singular"))?;
        Ok(Self { matrix, inverse })
    }

    pub fn translation(v: V2) -> Self {
        Self {
            matrix: Matrix3::new_translation(&v),
            inverse: Matrix3::new_translation(&-v),
        }
    }

    pub fn scaling(k: V2) -> SdfResult<Self> {
        if k.iter().any(|c| *c == 0.0 || !c.is_finite()) {
            return Err(SdfError::invalid("scale", format!("factors {k:?} must be finite and non-zero")));
        }
        Ok(Self {
            matrix: Matrix3::new_nonuniform_scaling(&k),
            inverse: Matrix3::new_nonuniform_scaling(&k.map(|c| 1.0 / c)),
        })
    }

    /// Counter-clockwise rotation by `angle` radians about the origin.
    pub fn rotation(angle: f64) -> Self {
        let r = Rotation2::new(angle).to_homogeneous();
        Self { matrix: r, inverse: r.transpose() }
    }

    /// Reflection across the x axis (y -> -y).
    pub fn mirror_x() -> Self {
        let m = Matrix3::new_nonuniform_scaling(&V2::new(1.0, -1.0));
        Self { matrix: m, inverse: m }
    }
    /// Reflection across the y axis (x -> -x).
    pub fn mirror_y() -> Self {
        let m = Matrix3::new_nonuniform_scaling(&V2::new(-1.0, 1.0));
        Self { matrix: m, inverse: m }
    }

    pub fn then(&self, next: &Affine2) -> Affine2 {
        Affine2 {
            matrix: next.matrix * self.matrix,
            inverse: self.inverse * next.inverse,
        }
    }

    pub fn inverse(&self) -> Affine2 {
        Affine2 { matrix: self.inverse, inverse: self.matrix }
    }

    pub fn apply(&self, p: V2) -> V2 {
        let h = self.matrix * p.push(1.0);
        V2::new(h.x, h.y)
    }

    pub fn apply_inverse(&self, p: V2) -> V2 {
        let h = self.inverse * p.push(1.0);
        V2::new(h.x, h.y)
    }

    pub fn apply_box(&self, b: &Box2) -> Box2 {
        let v = b.vertices();
        let first = self.apply(v[0]);
        v[1..].iter().fold(Box2::new(first, first), |acc, p| acc.include(self.apply(*p)))
    }

    pub fn is_rigid(&self) -> bool {
        let l = self.matrix.fixed_view::<2, 2>(0, 0).into_owned();
        (l.transpose() * l - nalgebra::Matrix2::identity()).abs().max() < RIGID_TOL
    }
}
