//! Closed-form 2D primitives.

use std::f64::consts::{PI, TAU};

use crate::error::{check_non_negative, SdfError, SdfResult};
use crate::sdf::Sdf2;
use crate::types::{Box2, V2};

// ---------------------------------------------------------------------------
// Circle
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Circle {
    radius: f64,
}

impl Circle {
    pub fn new(radius: f64) -> SdfResult<Self> {
        check_non_negative("circle radius", radius)?;
        Ok(Self { radius })
    }
}

impl Sdf2 for Circle {
    fn evaluate(&self, p: V2) -> f64 {
        p.norm() - self.radius
    }
    fn bounding_box(&self) -> Box2 {
        Box2::new(V2::repeat(-self.radius), V2::repeat(self.radius))
    }
}

// ---------------------------------------------------------------------------
// Rectangle
// ---------------------------------------------------------------------------

/// Rectangle of the given full size with rounded corners.
#[derive(Clone, Debug)]
pub struct Box2Sdf {
    half: V2,
    round: f64,
}

impl Box2Sdf {
    pub fn new(size: V2, round: f64) -> SdfResult<Self> {
        check_non_negative("rectangle width", size.x)?;
        check_non_negative("rectangle height", size.y)?;
        check_non_negative("rectangle round", round)?;
        let half = size * 0.5;
        if round > half.min() {
            return Err(SdfError::invalid("rectangle round", format!("{round} exceeds half the shortest side")));
        }
        Ok(Self { half, round })
    }
}

impl Sdf2 for Box2Sdf {
    fn evaluate(&self, p: V2) -> f64 {
        let d = p.abs() - (self.half - V2::repeat(self.round));
        let outside = V2::new(d.x.max(0.0), d.y.max(0.0)).norm();
        outside + d.x.max(d.y).min(0.0) - self.round
    }
    fn bounding_box(&self) -> Box2 {
        Box2::new(-self.half, self.half)
    }
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// Segment of the given length along x, thickened by `round`.
#[derive(Clone, Debug)]
pub struct Line2 {
    half_length: f64,
    round: f64,
}

impl Line2 {
    pub fn new(length: f64, round: f64) -> SdfResult<Self> {
        check_non_negative("line length", length)?;
        check_non_negative("line round", round)?;
        Ok(Self { half_length: length * 0.5, round })
    }
}

impl Sdf2 for Line2 {
    fn evaluate(&self, p: V2) -> f64 {
        let x = p.x.clamp(-self.half_length, self.half_length);
        (p - V2::new(x, 0.0)).norm() - self.round
    }
    fn bounding_box(&self) -> Box2 {
        let d = V2::new(self.half_length + self.round, self.round);
        Box2::new(-d, d)
    }
}

// ---------------------------------------------------------------------------
// Spiral
// ---------------------------------------------------------------------------

/// Archimedean spiral `r = θ` between the angles `start` and `end`
/// (radians, which are also the radii), thickened by `round`.
#[derive(Clone, Debug)]
pub struct Spiral2 {
    start: f64,
    end: f64,
    round: f64,
}

const GOLDEN_STEPS: usize = 48;

fn spiral_point(t: f64) -> V2 {
    V2::new(t * t.cos(), t * t.sin())
}

impl Spiral2 {
    pub fn new(start: f64, end: f64, round: f64) -> SdfResult<Self> {
        check_non_negative("spiral start", start)?;
        check_non_negative("spiral round", round)?;
        if !end.is_finite() || end <= start {
            return Err(SdfError::invalid("spiral end", format!("{end} must exceed start {start}")));
        }
        Ok(Self { start, end, round })
    }

    /// Minimum distance from `p` to the curve restricted to `[lo, hi]`,
    /// assuming the squared distance is unimodal there.
    fn local_min(&self, p: V2, lo: f64, hi: f64) -> f64 {
        let f = |t: f64| (spiral_point(t) - p).norm_squared();
        let g = 0.5 * (5f64.sqrt() - 1.0);
        let (mut a, mut b) = (lo, hi);
        let mut c = b - g * (b - a);
        let mut d = a + g * (b - a);
        let (mut fc, mut fd) = (f(c), f(d));
        for _ in 0..GOLDEN_STEPS {
            if fc < fd {
                b = d;
                d = c;
                fd = fc;
                c = b - g * (b - a);
                fc = f(c);
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + g * (b - a);
                fd = f(d);
            }
        }
        f(0.5 * (a + b)).min(f(lo)).min(f(hi)).sqrt()
    }
}

impl Sdf2 for Spiral2 {
    fn evaluate(&self, p: V2) -> f64 {
        let r = p.norm();
        let phi = p.y.atan2(p.x).rem_euclid(TAU);
        // Curve parameters at the same polar angle as p, nearest p's radius.
        let k0 = ((r - phi) / TAU).floor();
        let mut best = (spiral_point(self.start) - p)
            .norm()
            .min((spiral_point(self.end) - p).norm());
        for k in [k0 - 1.0, k0, k0 + 1.0, k0 + 2.0] {
            let t = phi + k * TAU;
            let lo = (t - 0.5 * PI).max(self.start);
            let hi = (t + 0.5 * PI).min(self.end);
            if lo < hi {
                best = best.min(self.local_min(p, lo, hi));
            }
        }
        best - self.round
    }
    fn bounding_box(&self) -> Box2 {
        let r = self.end + self.round;
        Box2::new(V2::repeat(-r), V2::repeat(r))
    }
}

// ---------------------------------------------------------------------------
// Polygon
// ---------------------------------------------------------------------------

/// Signed distance to a closed polygon given by its vertices.
///
/// Inside/outside uses the even-odd crossing rule, so self-intersecting
/// outlines are accepted.
#[derive(Clone, Debug)]
pub struct PolySdf2 {
    vertices: Vec<V2>,
    bbox: Box2,
}

impl PolySdf2 {
    pub fn new(vertices: Vec<V2>) -> SdfResult<Self> {
        if vertices.len() < 3 {
            return Err(SdfError::invalid("polygon", format!("needs at least 3 vertices, got {}", vertices.len())));
        }
        if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
            return Err(SdfError::invalid("polygon", "vertex is not finite"));
        }
        let bbox = vertices[1..]
            .iter()
            .fold(Box2::new(vertices[0], vertices[0]), |b, v| b.include(*v));
        Ok(Self { vertices, bbox })
    }

    pub fn vertices(&self) -> &[V2] {
        &self.vertices
    }
}

impl Sdf2 for PolySdf2 {
    fn evaluate(&self, p: V2) -> f64 {
        let v = &self.vertices;
        let n = v.len();
        let mut d2 = (p - v[0]).norm_squared();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let e = v[j] - v[i];
            let w = p - v[i];
            let len2 = e.norm_squared();
            let t = if len2 > 0.0 { (w.dot(&e) / len2).clamp(0.0, 1.0) } else { 0.0 };
            d2 = d2.min((w - e * t).norm_squared());
            let crosses_up = v[i].y <= p.y && p.y < v[j].y;
            let crosses_down = v[j].y <= p.y && p.y < v[i].y;
            if crosses_up || crosses_down {
                let x = v[i].x + (p.y - v[i].y) * (v[j].x - v[i].x) / (v[j].y - v[i].y);
                if p.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        let d = d2.sqrt();
        if inside { -d } else { d }
    }
    fn bounding_box(&self) -> Box2 {
        self.bbox
    }
}
