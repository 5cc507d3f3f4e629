//! sdfkit: procedural solid modeling with signed distance fields.
//!
//! Shapes are trees of distance fields: closed-form primitives combined by
//! transforms and blended booleans behind the [`Sdf3`] and [`Sdf2`] traits.
//! The octree mesher turns a 3D field into a triangle mesh, the quadtree
//! contourer turns a 2D field into line segments, and the exporters write
//! STL, DXF and SVG.
//!
//! ```rust,no_run
//! use sdfkit::{render, CancelToken, MeshSettings, Sphere};
//!
//! # fn main() -> sdfkit::SdfResult<()> {
//! let ball = Sphere::new(10.0)?;
//! let outcome = render::mesh(&ball, &MeshSettings::default(), &CancelToken::new())?;
//! if let Some(mesh) = outcome.complete() {
//!     sdfkit::export::save_stl("ball.stl", &mesh)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod blend;
pub mod builder;
pub mod csg;
mod dual_contouring;
pub mod error;
pub mod export;
pub mod matrix;
pub mod mc_table;
pub mod mesh;
mod octree;
pub mod ops2;
pub mod ops3;
pub mod polygon;
pub mod primitive2;
pub mod primitive3;
pub mod qef;
mod quadtree;
pub mod render;
pub mod sdf;
pub mod types;

pub use blend::Blend;
pub use builder::{Shape, Sketch};
pub use csg::{
    difference2, difference3, intersection2, intersection3, union2, union3, Difference2,
    Difference3, Intersection2, Intersection3, Union2, Union3,
};
pub use error::{SdfError, SdfResult};
pub use matrix::{Affine2, Affine3};
pub use mesh::{IndexedMesh, Mesh, Outline, Segment2, Triangle3};
pub use polygon::{nagon, Polygon};
pub use primitive2::{Box2Sdf, Circle, Line2, PolySdf2, Spiral2};
pub use primitive3::{BoxSdf3, Capsule, Cone, Cylinder, Sphere, Torus};
pub use render::{mesh, outline, render_dxf, render_stl, render_svg, CancelToken, Outcome};
pub use sdf::{normal2, normal3, FnSdf2, FnSdf3, Sdf2, Sdf2Ref, Sdf3, Sdf3Ref};
pub use types::{Box2, Box3, ContourMethod, ContourSettings, MeshSettings, V2, V3};
