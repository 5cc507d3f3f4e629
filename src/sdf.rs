use std::sync::Arc;

use crate::types::{Box2, Box3, V2, V3};

/// A 3D signed distance field: negative inside, zero on the surface,
/// positive outside.
///
/// `bounding_box` must enclose the whole zero level set. Fields are shared
/// read-only across extraction workers, hence `Send + Sync`.
pub trait Sdf3: Send + Sync {
    fn evaluate(&self, p: V3) -> f64;
    fn bounding_box(&self) -> Box3;
}

/// A 2D signed distance field, used for outlines and as the profile of
/// extrusions and revolutions.
pub trait Sdf2: Send + Sync {
    fn evaluate(&self, p: V2) -> f64;
    fn bounding_box(&self) -> Box2;
}

/// Shared handle to a 3D field. Subtrees may be reused by several parents.
pub type Sdf3Ref = Arc<dyn Sdf3>;
/// Shared handle to a 2D field.
pub type Sdf2Ref = Arc<dyn Sdf2>;

impl<T: Sdf3 + ?Sized> Sdf3 for Arc<T> {
    fn evaluate(&self, p: V3) -> f64 { (**self).evaluate(p) }
    fn bounding_box(&self) -> Box3 { (**self).bounding_box() }
}

impl<T: Sdf2 + ?Sized> Sdf2 for Arc<T> {
    fn evaluate(&self, p: V2) -> f64 { (**self).evaluate(p) }
    fn bounding_box(&self) -> Box2 { (**self).bounding_box() }
}

// ---------------------------------------------------------------------------
// Closure-backed fields
// ---------------------------------------------------------------------------

/// A 3D field from a closure with an explicit bounding box.
pub struct FnSdf3<F> {
    f: F,
    bbox: Box3,
}

impl<F: Fn(V3) -> f64 + Send + Sync> FnSdf3<F> {
    pub fn new(bbox: Box3, f: F) -> Self {
        Self { f, bbox }
    }
}

impl<F: Fn(V3) -> f64 + Send + Sync> Sdf3 for FnSdf3<F> {
    fn evaluate(&self, p: V3) -> f64 { (self.f)(p) }
    fn bounding_box(&self) -> Box3 { self.bbox }
}

/// A 2D field from a closure with an explicit bounding box.
pub struct FnSdf2<F> {
    f: F,
    bbox: Box2,
}

impl<F: Fn(V2) -> f64 + Send + Sync> FnSdf2<F> {
    pub fn new(bbox: Box2, f: F) -> Self {
        Self { f, bbox }
    }
}

impl<F: Fn(V2) -> f64 + Send + Sync> Sdf2 for FnSdf2<F> {
    fn evaluate(&self, p: V2) -> f64 { (self.f)(p) }
    fn bounding_box(&self) -> Box2 { self.bbox }
}

// ---------------------------------------------------------------------------
// Gradients
// ---------------------------------------------------------------------------

/// Unit surface normal at `p` by central differences with step `h`.
///
/// Falls back to +z where the gradient vanishes.
pub fn normal3(sdf: &dyn Sdf3, p: V3, h: f64) -> V3 {
    let dx = V3::new(h, 0.0, 0.0);
    let dy = V3::new(0.0, h, 0.0);
    let dz = V3::new(0.0, 0.0, h);
    let g = V3::new(
        sdf.evaluate(p + dx) - sdf.evaluate(p - dx),
        sdf.evaluate(p + dy) - sdf.evaluate(p - dy),
        sdf.evaluate(p + dz) - sdf.evaluate(p - dz),
    );
    let len = g.norm();
    if len > 1e-15 { g / len } else { V3::z() }
}

/// Unit outline normal at `p` by central differences with step `h`.
pub fn normal2(sdf: &dyn Sdf2, p: V2, h: f64) -> V2 {
    let dx = V2::new(h, 0.0);
    let dy = V2::new(0.0, h);
    let g = V2::new(
        sdf.evaluate(p + dx) - sdf.evaluate(p - dx),
        sdf.evaluate(p + dy) - sdf.evaluate(p - dy),
    );
    let len = g.norm();
    if len > 1e-15 { g / len } else { V2::x() }
}
