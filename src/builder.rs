//! Fluent builder API.
//!
//! [`Shape`] (3D) and [`Sketch`] (2D) wrap shared field handles, so they are
//! cheap to clone and every operation returns a new value. Constructors
//! that validate parameters return `SdfResult`.
//!
//! # Example
//!
//! ```rust,no_run
//! use sdfkit::builder::{Shape, Sketch};
//! use sdfkit::types::MeshSettings;
//!
//! # fn main() -> sdfkit::SdfResult<()> {
//! let plate = Sketch::rect(40.0, 20.0, 2.0)?
//!     .difference(Sketch::circle(4.0)?)
//!     .extrude(3.0)?;
//! let boss = Shape::cylinder(8.0, 6.0)?.translate(0.0, 0.0, 4.0);
//! plate.union(boss).export_stl("plate.stl", &MeshSettings::default())?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::blend::Blend;
use crate::csg::{Difference2, Difference3, Intersection2, Intersection3, Union2, Union3};
use crate::error::SdfResult;
use crate::export;
use crate::matrix::{Affine2, Affine3};
use crate::mesh::{Mesh, Outline};
use crate::ops2::{Offset2, ScaleUniform2, Transform2};
use crate::ops3::{Extrude3, Offset3, Revolve3, ScaleUniform3, Transform3};
use crate::polygon::Polygon;
use crate::primitive2::{Box2Sdf, Circle, Line2, PolySdf2};
use crate::primitive3::{BoxSdf3, Capsule, Cone, Cylinder, Sphere, Torus};
use crate::render::{self, CancelToken};
use crate::sdf::{Sdf2, Sdf2Ref, Sdf3, Sdf3Ref};
use crate::types::{Box2, Box3, ContourSettings, MeshSettings, V2, V3};

/// A composable, immutable 3D shape.
#[derive(Clone)]
pub struct Shape {
    sdf: Sdf3Ref,
}

// ---------------------------------------------------------------------------
// 3D primitives, centered at the origin
// ---------------------------------------------------------------------------

impl Shape {
    /// Wrap any 3D field.
    pub fn from_sdf(sdf: impl Sdf3 + 'static) -> Self {
        Self { sdf: Arc::new(sdf) }
    }

    pub fn sphere(radius: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(Sphere::new(radius)?))
    }

    /// Box with full side lengths `x`, `y`, `z`.
    pub fn box3(x: f64, y: f64, z: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(BoxSdf3::new(V3::new(x, y, z), 0.0)?))
    }

    pub fn rounded_box(x: f64, y: f64, z: f64, round: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(BoxSdf3::new(V3::new(x, y, z), round)?))
    }

    /// Cylinder along z.
    pub fn cylinder(height: f64, radius: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(Cylinder::new(height, radius, 0.0)?))
    }

    /// Capsule along z; `height` includes the end caps.
    pub fn capsule(height: f64, radius: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(Capsule::new(height, radius)?))
    }

    /// Truncated cone along z, radius `r0` at the bottom and `r1` at the top.
    pub fn cone(height: f64, r0: f64, r1: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(Cone::new(height, r0, r1, 0.0)?))
    }

    /// Torus in the xy plane.
    pub fn torus(major: f64, minor: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(Torus::new(major, minor)?))
    }
}

// ---------------------------------------------------------------------------
// 3D transforms and CSG
// ---------------------------------------------------------------------------

impl Shape {
    pub fn transform(self, t: Affine3) -> Self {
        Self::from_sdf(Transform3::new(self.sdf, t))
    }

    pub fn translate(self, x: f64, y: f64, z: f64) -> Self {
        self.transform(Affine3::translation(V3::new(x, y, z)))
    }

    pub fn rotate_x(self, angle: f64) -> Self {
        self.transform(Affine3::rotate_x(angle))
    }

    pub fn rotate_y(self, angle: f64) -> Self {
        self.transform(Affine3::rotate_y(angle))
    }

    pub fn rotate_z(self, angle: f64) -> Self {
        self.transform(Affine3::rotate_z(angle))
    }

    /// Uniform scale; distances scale with it.
    pub fn scale(self, k: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(ScaleUniform3::new(self.sdf, k)?))
    }

    /// Grow (positive) or shrink (negative) the surface by `d`.
    pub fn offset(self, d: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(Offset3::new(self.sdf, d)?))
    }

    pub fn union(self, other: Shape) -> Self {
        Self::from_sdf(Union3::pair(self.sdf, other.sdf))
    }

    pub fn union_blend(self, other: Shape, blend: Blend) -> Self {
        Self::from_sdf(Union3::pair(self.sdf, other.sdf).with_blend(blend))
    }

    pub fn difference(self, other: Shape) -> Self {
        Self::from_sdf(Difference3::new(self.sdf, other.sdf))
    }

    pub fn difference_blend(self, other: Shape, blend: Blend) -> Self {
        Self::from_sdf(Difference3::new(self.sdf, other.sdf).with_blend(blend))
    }

    pub fn intersection(self, other: Shape) -> Self {
        Self::from_sdf(Intersection3::new(self.sdf, other.sdf))
    }

    pub fn intersection_blend(self, other: Shape, blend: Blend) -> Self {
        Self::from_sdf(Intersection3::new(self.sdf, other.sdf).with_blend(blend))
    }
}

// ---------------------------------------------------------------------------
// 3D evaluation and output
// ---------------------------------------------------------------------------

impl Shape {
    /// The underlying field handle.
    pub fn sdf(&self) -> Sdf3Ref {
        Arc::clone(&self.sdf)
    }

    /// Mesh the shape. The extraction cannot be cancelled from here.
    pub fn mesh(&self, settings: &MeshSettings) -> SdfResult<Mesh> {
        let outcome = render::mesh(self.sdf.as_ref(), settings, &CancelToken::new())?;
        Ok(outcome.into_output().unwrap_or_default())
    }

    /// Mesh the shape and write binary STL.
    pub fn export_stl(&self, path: impl AsRef<Path>, settings: &MeshSettings) -> SdfResult<Mesh> {
        let mesh = self.mesh(settings)?;
        export::save_stl(path, &mesh)?;
        Ok(mesh)
    }
}

impl Sdf3 for Shape {
    fn evaluate(&self, p: V3) -> f64 {
        self.sdf.evaluate(p)
    }
    fn bounding_box(&self) -> Box3 {
        self.sdf.bounding_box()
    }
}

// ---------------------------------------------------------------------------
// 2D sketches
// ---------------------------------------------------------------------------

/// A composable, immutable 2D shape.
#[derive(Clone)]
pub struct Sketch {
    sdf: Sdf2Ref,
}

impl Sketch {
    pub fn from_sdf(sdf: impl Sdf2 + 'static) -> Self {
        Self { sdf: Arc::new(sdf) }
    }

    pub fn circle(radius: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(Circle::new(radius)?))
    }

    /// Rectangle of full size `w` by `h` with rounded corners.
    pub fn rect(w: f64, h: f64, round: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(Box2Sdf::new(V2::new(w, h), round)?))
    }

    /// Rounded segment of the given length along x.
    pub fn line(length: f64, round: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(Line2::new(length, round)?))
    }

    pub fn polygon(vertices: Vec<V2>) -> SdfResult<Self> {
        Ok(Self::from_sdf(PolySdf2::new(vertices)?))
    }

    /// Smooth a polygon builder's pending corners and wrap the result.
    pub fn from_polygon(mut polygon: Polygon) -> SdfResult<Self> {
        polygon.smooth()?;
        Ok(Self::from_sdf(polygon.to_sdf2()?))
    }

    pub fn transform(self, t: Affine2) -> Self {
        Self::from_sdf(Transform2::new(self.sdf, t))
    }

    pub fn translate(self, x: f64, y: f64) -> Self {
        self.transform(Affine2::translation(V2::new(x, y)))
    }

    pub fn rotate(self, angle: f64) -> Self {
        self.transform(Affine2::rotation(angle))
    }

    pub fn scale(self, k: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(ScaleUniform2::new(self.sdf, k)?))
    }

    pub fn offset(self, d: f64) -> SdfResult<Self> {
        Ok(Self::from_sdf(Offset2::new(self.sdf, d)?))
    }

    pub fn union(self, other: Sketch) -> Self {
        Self::from_sdf(Union2::pair(self.sdf, other.sdf))
    }

    pub fn union_blend(self, other: Sketch, blend: Blend) -> Self {
        Self::from_sdf(Union2::pair(self.sdf, other.sdf).with_blend(blend))
    }

    pub fn difference(self, other: Sketch) -> Self {
        Self::from_sdf(Difference2::new(self.sdf, other.sdf))
    }

    pub fn difference_blend(self, other: Sketch, blend: Blend) -> Self {
        Self::from_sdf(Difference2::new(self.sdf, other.sdf).with_blend(blend))
    }

    pub fn intersection(self, other: Sketch) -> Self {
        Self::from_sdf(Intersection2::new(self.sdf, other.sdf))
    }

    pub fn intersection_blend(self, other: Sketch, blend: Blend) -> Self {
        Self::from_sdf(Intersection2::new(self.sdf, other.sdf).with_blend(blend))
    }

    /// Extrude along z, centered on z = 0.
    pub fn extrude(self, height: f64) -> SdfResult<Shape> {
        Ok(Shape::from_sdf(Extrude3::new(self.sdf, height)?))
    }

    /// Revolve about the z axis; the sketch's x is the radius.
    pub fn revolve(self) -> SdfResult<Shape> {
        Ok(Shape::from_sdf(Revolve3::new(self.sdf)?))
    }

    pub fn sdf(&self) -> Sdf2Ref {
        Arc::clone(&self.sdf)
    }

    pub fn outline(&self, settings: &ContourSettings) -> SdfResult<Outline> {
        let outcome = render::outline(self.sdf.as_ref(), settings, &CancelToken::new())?;
        Ok(outcome.into_output().unwrap_or_default())
    }

    pub fn export_dxf(&self, path: impl AsRef<Path>, settings: &ContourSettings) -> SdfResult<Outline> {
        let outline = self.outline(settings)?;
        export::save_dxf(path, &outline)?;
        Ok(outline)
    }

    pub fn export_svg(&self, path: impl AsRef<Path>, settings: &ContourSettings) -> SdfResult<Outline> {
        let outline = self.outline(settings)?;
        export::save_svg(path, &outline)?;
        Ok(outline)
    }
}

impl Sdf2 for Sketch {
    fn evaluate(&self, p: V2) -> f64 {
        self.sdf.evaluate(p)
    }
    fn bounding_box(&self) -> Box2 {
        self.sdf.bounding_box()
    }
}
