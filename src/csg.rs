//! Boolean combinators: union, difference and intersection.
//!
//! Each node owns a [`Blend`] that can be replaced with `set_blend` before
//! the node is shared. Unions with the hard blend skip children whose
//! bounding boxes prove they cannot hold the minimum at the sample point.

use std::sync::Arc;

use crate::blend::{hard_min, Blend};
use crate::error::{SdfError, SdfResult};
use crate::sdf::{Sdf2, Sdf2Ref, Sdf3, Sdf3Ref};
use crate::types::{Box2, Box3, Interval, V2, V3};

/// Minimum over children, evaluating only those whose box distance interval
/// reaches the interval of the child with the nearest box.
///
/// Assumes children report distances no smaller than the distance to their
/// bounding box when the point lies outside it.
pub(crate) fn pruned_min<I, E>(n: usize, interval: I, eval: E) -> f64
where
    I: Fn(usize) -> Interval,
    E: Fn(usize) -> f64,
{
    let mut leader = 0;
    let mut leader_iv = interval(0);
    for i in 1..n {
        let iv = interval(i);
        if iv.lo < leader_iv.lo {
            leader = i;
            leader_iv = iv;
        }
    }
    let mut d = eval(leader);
    for i in 0..n {
        if i != leader && interval(i).overlaps(&leader_iv) {
            d = hard_min(d, eval(i));
        }
    }
    d
}

// ---------------------------------------------------------------------------
// 3D union
// ---------------------------------------------------------------------------

/// Union of one or more 3D fields.
pub struct Union3 {
    children: Vec<Sdf3Ref>,
    boxes: Vec<Box3>,
    blend: Blend,
    bbox: Box3,
}

impl Union3 {
    /// Fails with `MissingOperand` when `children` is empty.
    pub fn new(children: Vec<Sdf3Ref>) -> SdfResult<Self> {
        if children.is_empty() {
            return Err(SdfError::MissingOperand("union needs at least one child"));
        }
        let boxes: Vec<Box3> = children.iter().map(|c| c.bounding_box()).collect();
        let mut u = Self { children, boxes, blend: Blend::Hard, bbox: Box3::new(V3::zeros(), V3::zeros()) };
        u.bbox = u.combined_box();
        Ok(u)
    }

    /// Union of exactly two fields.
    pub fn pair(a: Sdf3Ref, b: Sdf3Ref) -> Self {
        let boxes = vec![a.bounding_box(), b.bounding_box()];
        Self { children: vec![a, b], bbox: boxes[0].extend(&boxes[1]), boxes, blend: Blend::Hard }
    }

    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.set_blend(blend);
        self
    }

    /// Replace the blend strategy. The bounding box grows with the blend's
    /// deviation.
    pub fn set_blend(&mut self, blend: Blend) {
        self.blend = blend;
        self.bbox = self.combined_box();
    }

    pub fn blend(&self) -> &Blend {
        &self.blend
    }

    pub fn children(&self) -> &[Sdf3Ref] {
        &self.children
    }

    /// Blend over every child, with no pruning.
    pub fn evaluate_exhaustive(&self, p: V3) -> f64 {
        let mut d = self.children[0].evaluate(p);
        for c in &self.children[1..] {
            d = self.blend.min(d, c.evaluate(p));
        }
        d
    }

    fn combined_box(&self) -> Box3 {
        let b = self.boxes[1..].iter().fold(self.boxes[0], |acc, b| acc.extend(b));
        b.enlarge(self.blend.max_deviation())
    }
}

impl Sdf3 for Union3 {
    fn evaluate(&self, p: V3) -> f64 {
        if self.children.len() > 2 && self.blend.is_hard() {
            pruned_min(
                self.children.len(),
                |i| self.boxes[i].min_max_dist2(p),
                |i| self.children[i].evaluate(p),
            )
        } else {
            self.evaluate_exhaustive(p)
        }
    }
    fn bounding_box(&self) -> Box3 {
        self.bbox
    }
}

/// Union of `children`. A single child is returned as is.
pub fn union3<I: IntoIterator<Item = Sdf3Ref>>(children: I) -> SdfResult<Sdf3Ref> {
    let mut children: Vec<Sdf3Ref> = children.into_iter().collect();
    if children.len() == 1 {
        if let Some(only) = children.pop() {
            return Ok(only);
        }
    }
    Ok(Arc::new(Union3::new(children)?))
}

// ---------------------------------------------------------------------------
// 3D difference and intersection
// ---------------------------------------------------------------------------

/// `a` with `b` removed: `max(a, -b)`.
pub struct Difference3 {
    a: Sdf3Ref,
    b: Sdf3Ref,
    blend: Blend,
}

impl Difference3 {
    pub fn new(a: Sdf3Ref, b: Sdf3Ref) -> Self {
        Self { a, b, blend: Blend::Hard }
    }
    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.blend = blend;
        self
    }
    pub fn set_blend(&mut self, blend: Blend) {
        self.blend = blend;
    }
    pub fn blend(&self) -> &Blend {
        &self.blend
    }
}

impl Sdf3 for Difference3 {
    fn evaluate(&self, p: V3) -> f64 {
        self.blend.max(self.a.evaluate(p), -self.b.evaluate(p))
    }
    fn bounding_box(&self) -> Box3 {
        self.a.bounding_box().enlarge(self.blend.max_deviation())
    }
}

/// Difference `a - b`. A missing `b` returns `a`; a missing `a` is an error.
pub fn difference3(a: Option<Sdf3Ref>, b: Option<Sdf3Ref>) -> SdfResult<Sdf3Ref> {
    let a = a.ok_or(SdfError::MissingOperand("difference needs a base shape"))?;
    match b {
        None => Ok(a),
        Some(b) => Ok(Arc::new(Difference3::new(a, b))),
    }
}

/// Common volume of `a` and `b`: `max(a, b)`.
pub struct Intersection3 {
    a: Sdf3Ref,
    b: Sdf3Ref,
    blend: Blend,
}

impl Intersection3 {
    pub fn new(a: Sdf3Ref, b: Sdf3Ref) -> Self {
        Self { a, b, blend: Blend::Hard }
    }
    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.blend = blend;
        self
    }
    pub fn set_blend(&mut self, blend: Blend) {
        self.blend = blend;
    }
    pub fn blend(&self) -> &Blend {
        &self.blend
    }
}

impl Sdf3 for Intersection3 {
    fn evaluate(&self, p: V3) -> f64 {
        self.blend.max(self.a.evaluate(p), self.b.evaluate(p))
    }
    fn bounding_box(&self) -> Box3 {
        let (ba, bb) = (self.a.bounding_box(), self.b.bounding_box());
        let dev = self.blend.max_deviation();
        match ba.intersect(&bb) {
            Some(b) => b.enlarge(dev),
            // Nothing in common: an empty box at the seam.
            None => {
                let c = (ba.center() + bb.center()) * 0.5;
                Box3::new(c, c)
            }
        }
    }
}

/// Intersection of `a` and `b`; both operands are required.
pub fn intersection3(a: Option<Sdf3Ref>, b: Option<Sdf3Ref>) -> SdfResult<Sdf3Ref> {
    let a = a.ok_or(SdfError::MissingOperand("intersection needs two shapes"))?;
    let b = b.ok_or(SdfError::MissingOperand("intersection needs two shapes"))?;
    Ok(Arc::new(Intersection3::new(a, b)))
}

// ---------------------------------------------------------------------------
// 2D union
// ---------------------------------------------------------------------------

/// Union of one or more 2D fields.
pub struct Union2 {
    children: Vec<Sdf2Ref>,
    boxes: Vec<Box2>,
    blend: Blend,
    bbox: Box2,
}

impl Union2 {
    pub fn new(children: Vec<Sdf2Ref>) -> SdfResult<Self> {
        if children.is_empty() {
            return Err(SdfError::MissingOperand("union needs at least one child"));
        }
        let boxes: Vec<Box2> = children.iter().map(|c| c.bounding_box()).collect();
        let mut u = Self { children, boxes, blend: Blend::Hard, bbox: Box2::new(V2::zeros(), V2::zeros()) };
        u.bbox = u.combined_box();
        Ok(u)
    }

    /// Union of exactly two fields.
    pub fn pair(a: Sdf2Ref, b: Sdf2Ref) -> Self {
        let boxes = vec![a.bounding_box(), b.bounding_box()];
        Self { children: vec![a, b], bbox: boxes[0].extend(&boxes[1]), boxes, blend: Blend::Hard }
    }

    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.set_blend(blend);
        self
    }

    pub fn set_blend(&mut self, blend: Blend) {
        self.blend = blend;
        self.bbox = self.combined_box();
    }

    pub fn blend(&self) -> &Blend {
        &self.blend
    }

    pub fn children(&self) -> &[Sdf2Ref] {
        &self.children
    }

    pub fn evaluate_exhaustive(&self, p: V2) -> f64 {
        let mut d = self.children[0].evaluate(p);
        for c in &self.children[1..] {
            d = self.blend.min(d, c.evaluate(p));
        }
        d
    }

    fn combined_box(&self) -> Box2 {
        let b = self.boxes[1..].iter().fold(self.boxes[0], |acc, b| acc.extend(b));
        b.enlarge(self.blend.max_deviation())
    }
}

impl Sdf2 for Union2 {
    fn evaluate(&self, p: V2) -> f64 {
        if self.children.len() > 2 && self.blend.is_hard() {
            pruned_min(
                self.children.len(),
                |i| self.boxes[i].min_max_dist2(p),
                |i| self.children[i].evaluate(p),
            )
        } else {
            self.evaluate_exhaustive(p)
        }
    }
    fn bounding_box(&self) -> Box2 {
        self.bbox
    }
}

pub fn union2<I: IntoIterator<Item = Sdf2Ref>>(children: I) -> SdfResult<Sdf2Ref> {
    let mut children: Vec<Sdf2Ref> = children.into_iter().collect();
    if children.len() == 1 {
        if let Some(only) = children.pop() {
            return Ok(only);
        }
    }
    Ok(Arc::new(Union2::new(children)?))
}

// ---------------------------------------------------------------------------
// 2D difference and intersection
// ---------------------------------------------------------------------------

pub struct Difference2 {
    a: Sdf2Ref,
    b: Sdf2Ref,
    blend: Blend,
}

impl Difference2 {
    pub fn new(a: Sdf2Ref, b: Sdf2Ref) -> Self {
        Self { a, b, blend: Blend::Hard }
    }
    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.blend = blend;
        self
    }
    pub fn set_blend(&mut self, blend: Blend) {
        self.blend = blend;
    }
    pub fn blend(&self) -> &Blend {
        &self.blend
    }
}

impl Sdf2 for Difference2 {
    fn evaluate(&self, p: V2) -> f64 {
        self.blend.max(self.a.evaluate(p), -self.b.evaluate(p))
    }
    fn bounding_box(&self) -> Box2 {
        self.a.bounding_box().enlarge(self.blend.max_deviation())
    }
}

pub fn difference2(a: Option<Sdf2Ref>, b: Option<Sdf2Ref>) -> SdfResult<Sdf2Ref> {
    let a = a.ok_or(SdfError::MissingOperand("difference needs a base shape"))?;
    match b {
        None => Ok(a),
        Some(b) => Ok(Arc::new(Difference2::new(a, b))),
    }
}

pub struct Intersection2 {
    a: Sdf2Ref,
    b: Sdf2Ref,
    blend: Blend,
}

impl Intersection2 {
    pub fn new(a: Sdf2Ref, b: Sdf2Ref) -> Self {
        Self { a, b, blend: Blend::Hard }
    }
    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.blend = blend;
        self
    }
    pub fn set_blend(&mut self, blend: Blend) {
        self.blend = blend;
    }
    pub fn blend(&self) -> &Blend {
        &self.blend
    }
}

impl Sdf2 for Intersection2 {
    fn evaluate(&self, p: V2) -> f64 {
        self.blend.max(self.a.evaluate(p), self.b.evaluate(p))
    }
    fn bounding_box(&self) -> Box2 {
        let (ba, bb) = (self.a.bounding_box(), self.b.bounding_box());
        match ba.intersect(&bb) {
            Some(b) => b.enlarge(self.blend.max_deviation()),
            None => {
                let c = (ba.center() + bb.center()) * 0.5;
                Box2::new(c, c)
            }
        }
    }
}

pub fn intersection2(a: Option<Sdf2Ref>, b: Option<Sdf2Ref>) -> SdfResult<Sdf2Ref> {
    let a = a.ok_or(SdfError::MissingOperand("intersection needs two shapes"))?;
    let b = b.ok_or(SdfError::MissingOperand("intersection needs two shapes"))?;
    Ok(Arc::new(Intersection2::new(a, b)))
}
