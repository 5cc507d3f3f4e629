//! Polygon builder with per-vertex fillets and arcs.
//!
//! Vertices are tagged as they are added: a plain corner, a corner whose
//! incoming segment is hidden from outline output, a corner to round with a
//! tangent fillet, or a corner whose incoming segment becomes a circular arc.
//! [`Polygon::smooth`] resolves the pending fillets and arcs until nothing
//! more can change.

use std::f64::consts::{PI, TAU};

use tracing::{debug, warn};

use crate::error::{SdfError, SdfResult};
use crate::mesh::{Outline, Segment2};
use crate::primitive2::PolySdf2;
use crate::types::V2;

/// Angles closer than this to a straight line are left as they are.
const COLLINEAR_EPS: f64 = 1e-9;

/// What happens at (or just before) a vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VertexKind {
    Normal,
    /// The segment arriving at this vertex is left out of outlines.
    Hidden,
    /// Round the corner with a tangent circle.
    Smooth { radius: f64, facets: usize },
    /// Replace the segment arriving at this vertex with an arc. A positive
    /// radius bulges to the left of the direction of travel.
    Arc { radius: f64, facets: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolyVertex {
    pub position: V2,
    pub kind: VertexKind,
}

impl PolyVertex {
    fn new(position: V2) -> Self {
        Self { position, kind: VertexKind::Normal }
    }

    pub fn hide(&mut self) -> &mut Self {
        self.kind = VertexKind::Hidden;
        self
    }

    pub fn smooth(&mut self, radius: f64, facets: usize) -> &mut Self {
        self.kind = VertexKind::Smooth { radius, facets };
        self
    }

    pub fn arc(&mut self, radius: f64, facets: usize) -> &mut Self {
        self.kind = VertexKind::Arc { radius, facets };
        self
    }

    fn is_pending(&self) -> bool {
        matches!(self.kind, VertexKind::Smooth { .. } | VertexKind::Arc { .. })
    }
}

/// An ordered, optionally closed, list of tagged vertices.
#[derive(Clone, Debug, Default)]
pub struct Polygon {
    closed: bool,
    vertices: Vec<PolyVertex>,
}

impl Polygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points<I: IntoIterator<Item = V2>>(points: I) -> Self {
        Self {
            closed: false,
            vertices: points.into_iter().map(PolyVertex::new).collect(),
        }
    }

    pub fn close(&mut self) -> &mut Self {
        self.closed = true;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append an absolute vertex.
    pub fn add(&mut self, x: f64, y: f64) -> &mut PolyVertex {
        self.push(V2::new(x, y))
    }

    /// Append a vertex offset from the previous one.
    pub fn add_rel(&mut self, dx: f64, dy: f64) -> &mut PolyVertex {
        let base = self.vertices.last().map_or(V2::zeros(), |v| v.position);
        self.push(base + V2::new(dx, dy))
    }

    /// Append a vertex given in polar coordinates about the origin.
    pub fn add_polar(&mut self, r: f64, theta: f64) -> &mut PolyVertex {
        self.push(V2::new(r * theta.cos(), r * theta.sin()))
    }

    fn push(&mut self, p: V2) -> &mut PolyVertex {
        self.vertices.push(PolyVertex::new(p));
        let last = self.vertices.len() - 1;
        &mut self.vertices[last]
    }

    pub fn vertex_list(&self) -> &[PolyVertex] {
        &self.vertices
    }

    pub fn vertices(&self) -> Vec<V2> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// Number of fillets and arcs still waiting to be applied.
    pub fn pending(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_pending()).count()
    }

    fn prev_index(&self, i: usize) -> Option<usize> {
        match i {
            0 if self.closed && self.vertices.len() > 1 => Some(self.vertices.len() - 1),
            0 => None,
            _ => Some(i - 1),
        }
    }

    fn next_index(&self, i: usize) -> Option<usize> {
        if i + 1 < self.vertices.len() {
            Some(i + 1)
        } else if self.closed && self.vertices.len() > 1 {
            Some(0)
        } else {
            None
        }
    }

    /// Apply pending fillets and arcs until a pass changes nothing.
    ///
    /// Requests that do not fit the neighboring edges stay pending and are
    /// not an error. Returns the number of vertices replaced.
    pub fn smooth(&mut self) -> SdfResult<usize> {
        for v in &self.vertices {
            match v.kind {
                VertexKind::Smooth { radius, facets } | VertexKind::Arc { radius, facets } => {
                    if facets == 0 {
                        return Err(SdfError::invalid("polygon facets", "must be at least 1"));
                    }
                    if !radius.is_finite() {
                        return Err(SdfError::invalid("polygon radius", "not finite"));
                    }
                    if matches!(v.kind, VertexKind::Smooth { .. }) && radius < 0.0 {
                        return Err(SdfError::invalid("polygon radius", format!("{radius} is negative")));
                    }
                }
                _ => {}
            }
        }

        // Every productive pass resolves at least one pending vertex.
        let limit = self.pending() + 1;
        let mut replaced = 0;
        let mut passes = 0;
        loop {
            let n = self.smooth_pass();
            if n == 0 {
                break;
            }
            replaced += n;
            passes += 1;
            if passes > limit {
                return Err(SdfError::SmoothingDiverged { passes });
            }
        }
        let left = self.pending();
        if left > 0 {
            warn!(pending = left, "polygon fillets do not fit their edges");
        }
        debug!(replaced, passes, vertices = self.vertices.len(), "smoothed polygon");
        Ok(replaced)
    }

    fn smooth_pass(&mut self) -> usize {
        let mut replaced = 0;
        let mut i = 0;
        while i < self.vertices.len() {
            let inserted = match self.vertices[i].kind {
                VertexKind::Smooth { radius, facets } => self.fillet(i, radius, facets),
                VertexKind::Arc { radius, facets } => self.arc_segment(i, radius, facets),
                _ => None,
            };
            match inserted {
                Some(n) => {
                    replaced += 1;
                    i += n;
                }
                None => i += 1,
            }
        }
        replaced
    }

    /// Replace vertex `i` with `facets + 1` points on the tangent circle.
    /// Returns the number of points now occupying its slot.
    fn fillet(&mut self, i: usize, radius: f64, facets: usize) -> Option<usize> {
        let (ip, inx) = (self.prev_index(i)?, self.next_index(i)?);
        let v = self.vertices[i].position;
        let to_prev = self.vertices[ip].position - v;
        let to_next = self.vertices[inx].position - v;
        let (lp, ln) = (to_prev.norm(), to_next.norm());
        if lp == 0.0 || ln == 0.0 {
            return None;
        }
        let v0 = to_prev / lp;
        let v1 = to_next / ln;
        let theta = v0.dot(&v1).clamp(-1.0, 1.0).acos();
        if radius == 0.0 || theta > PI - COLLINEAR_EPS {
            // Nothing to round.
            self.vertices[i].kind = VertexKind::Normal;
            return Some(1);
        }
        let half = 0.5 * theta;
        let d1 = radius / half.tan();
        if !(d1 <= lp && d1 <= ln) {
            return None;
        }
        let tangent = v + v0 * d1;
        let center = v + (v0 + v1).normalize() * (radius / half.sin());
        let turn = v1.x * v0.y - v1.y * v0.x;
        let dtheta = turn.signum() * (PI - theta) / facets as f64;
        let r0 = tangent - center;
        let points: Vec<PolyVertex> = (0..=facets)
            .map(|k| PolyVertex::new(center + rotate(r0, dtheta * k as f64)))
            .collect();
        let n = points.len();
        self.vertices.splice(i..=i, points);
        Some(n)
    }

    /// Replace the segment arriving at vertex `i` with an arc of `facets`
    /// pieces. Returns the number of points now occupying its slot.
    fn arc_segment(&mut self, i: usize, radius: f64, facets: usize) -> Option<usize> {
        let ip = self.prev_index(i)?;
        let a = self.vertices[ip].position;
        let b = self.vertices[i].position;
        let chord = b - a;
        let half = 0.5 * chord.norm();
        let r = radius.abs();
        if half == 0.0 || r < half {
            return None;
        }
        let dir = chord / (2.0 * half);
        // Center on the opposite side of the bulge.
        let right = V2::new(dir.y, -dir.x);
        let offset = (r * r - half * half).max(0.0).sqrt();
        let center = (a + b) * 0.5 + right * (offset * radius.signum());
        let ra = a - center;
        let rb = b - center;
        // Minor arc; a left bulge runs clockwise about a center on the right.
        let angle = (ra.dot(&rb) / (r * r)).clamp(-1.0, 1.0).acos();
        let step = -radius.signum() * angle / facets as f64;
        let mut points: Vec<PolyVertex> = (1..facets)
            .map(|k| PolyVertex::new(center + rotate(ra, step * k as f64)))
            .collect();
        points.push(PolyVertex::new(b));
        let n = points.len();
        self.vertices.splice(i..=i, points);
        Some(n)
    }

    /// Outline segments, skipping hidden ones. Closed polygons include the
    /// segment back to the first vertex.
    pub fn segments(&self) -> Vec<Segment2> {
        let v = &self.vertices;
        let mut out = Vec::with_capacity(v.len());
        for w in v.windows(2) {
            if w[1].kind != VertexKind::Hidden {
                out.push(Segment2::new(w[0].position, w[1].position));
            }
        }
        if self.closed && v.len() > 2 {
            let (last, first) = (v[v.len() - 1], v[0]);
            if first.kind != VertexKind::Hidden && last.position != first.position {
                out.push(Segment2::new(last.position, first.position));
            }
        }
        out
    }

    pub fn to_outline(&self) -> Outline {
        Outline::new(self.segments())
    }

    /// The polygon as a 2D distance field (implicitly closed).
    pub fn to_sdf2(&self) -> SdfResult<PolySdf2> {
        PolySdf2::new(self.vertices())
    }
}

fn rotate(v: V2, angle: f64) -> V2 {
    let (s, c) = angle.sin_cos();
    V2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// Vertices of a regular `n`-gon of circumradius `radius`, the first on +x.
pub fn nagon(n: usize, radius: f64) -> SdfResult<Vec<V2>> {
    if n < 3 {
        return Err(SdfError::invalid("polygon sides", format!("{n} is fewer than 3")));
    }
    crate::error::check_non_negative("polygon radius", radius)?;
    Ok((0..n)
        .map(|i| rotate(V2::new(radius, 0.0), TAU * i as f64 / n as f64))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fillet_is_tangent_to_both_edges() {
        let mut p = Polygon::new();
        p.add(0.0, 0.0);
        p.add(10.0, 0.0).smooth(2.0, 4);
        p.add(10.0, 10.0);
        assert_eq!(p.smooth().unwrap(), 1);
        let v = p.vertices();
        assert_eq!(v.len(), 2 + 5);
        assert_abs_diff_eq!(v[1].x, 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v[1].y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v[5].x, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v[5].y, 2.0, epsilon = 1e-12);
        for q in &v[1..6] {
            assert_abs_diff_eq!((q - V2::new(8.0, 2.0)).norm(), 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn oversized_fillet_stays_pending() {
        let mut p = Polygon::new();
        p.add(0.0, 0.0);
        p.add(1.0, 0.0).smooth(5.0, 4);
        p.add(1.0, 1.0);
        assert_eq!(p.smooth().unwrap(), 0);
        assert_eq!(p.pending(), 1);
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn open_ends_cannot_be_smoothed() {
        let mut p = Polygon::new();
        p.add(0.0, 0.0).smooth(0.1, 3);
        p.add(1.0, 0.0);
        p.add(1.0, 1.0);
        assert_eq!(p.smooth().unwrap(), 0);
        p.close();
        assert_eq!(p.smooth().unwrap(), 1);
    }

    #[test]
    fn arc_points_on_circle() {
        let mut p = Polygon::new();
        p.add(-1.0, 0.0);
        p.add(1.0, 0.0).arc(1.0, 8);
        p.smooth().unwrap();
        let v = p.vertices();
        assert_eq!(v.len(), 9);
        for q in &v {
            assert_abs_diff_eq!(q.norm(), 1.0, epsilon = 1e-12);
        }
        // Positive radius bulges to the left of travel (+y).
        assert!(v[4].y > 0.9);
    }

    #[test]
    fn hidden_segments_skipped() {
        let mut p = Polygon::new();
        p.add(0.0, 0.0);
        p.add(1.0, 0.0).hide();
        p.add(1.0, 1.0);
        p.close();
        assert_eq!(p.segments().len(), 2);
    }

    #[test]
    fn zero_facets_rejected() {
        let mut p = Polygon::new();
        p.add(0.0, 0.0);
        p.add(1.0, 0.0).smooth(0.1, 0);
        p.add(1.0, 1.0);
        assert!(p.smooth().is_err());
        assert!(nagon(2, 1.0).is_err());
    }
}
