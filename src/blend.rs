//! Blend functions for boolean seams.
//!
//! A blend replaces the hard `min(a, b)` of a union with a kernel that rounds,
//! chamfers or smooths the seam. Intersection and difference use the derived
//! `max(a, b) = -min(-a, -b)`, so every kernel serves all three operations.
//! A zero `k` always reduces to the hard min/max.

use std::fmt;
use std::sync::Arc;

use crate::error::{check_non_negative, SdfResult};

/// A user supplied min kernel: `(a, b) -> m`.
pub type MinFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// Strategy for combining two distances at a boolean seam.
#[derive(Clone)]
pub enum Blend {
    /// Plain min/max.
    Hard,
    /// Circular fillet of radius `k`.
    Round(f64),
    /// 45-degree chamfer of setback `k`.
    Chamfer(f64),
    /// Exponential smooth min; larger `k` is sharper.
    Exp(f64),
    /// Power smooth min `((a^k b^k) / (a^k + b^k))^(1/k)`.
    ///
    /// Only defined for positive distances. Falls back to the hard min
    /// otherwise, so it is not a general purpose blend.
    Pow(f64),
    /// Polynomial smooth min with blend width `k`.
    Poly(f64),
    /// Caller supplied kernel and a bound on how far below `min(a, b)` it
    /// can go, used to grow bounding boxes.
    Custom { min: MinFn, deviation: f64 },
}

impl fmt::Debug for Blend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blend::Hard => write!(f, "Hard"),
            Blend::Round(k) => write!(f, "Round({k})"),
            Blend::Chamfer(k) => write!(f, "Chamfer({k})"),
            Blend::Exp(k) => write!(f, "Exp({k})"),
            Blend::Pow(k) => write!(f, "Pow({k})"),
            Blend::Poly(k) => write!(f, "Poly({k})"),
            Blend::Custom { deviation, .. } => write!(f, "Custom {{ deviation: {deviation} }}"),
        }
    }
}

impl Default for Blend {
    fn default() -> Self {
        Blend::Hard
    }
}

// ---------------------------------------------------------------------------
// Shorthand constructors
// ---------------------------------------------------------------------------

/// Circular fillet blend with radius `k`.
pub fn round(k: f64) -> SdfResult<Blend> {
    check_non_negative("round blend k", k)?;
    Ok(Blend::Round(k))
}

/// Chamfer blend with setback `k`.
pub fn chamfer(k: f64) -> SdfResult<Blend> {
    check_non_negative("chamfer blend k", k)?;
    Ok(Blend::Chamfer(k))
}

/// Exponential smooth blend with sharpness `k`.
pub fn exp(k: f64) -> SdfResult<Blend> {
    check_non_negative("exp blend k", k)?;
    Ok(Blend::Exp(k))
}

/// Power smooth blend with exponent `k`.
pub fn pow(k: f64) -> SdfResult<Blend> {
    check_non_negative("pow blend k", k)?;
    Ok(Blend::Pow(k))
}

/// Polynomial smooth blend with width `k`.
pub fn poly(k: f64) -> SdfResult<Blend> {
    check_non_negative("poly blend k", k)?;
    Ok(Blend::Poly(k))
}

/// Wrap a custom min kernel.
pub fn custom<F>(deviation: f64, f: F) -> SdfResult<Blend>
where
    F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
{
    check_non_negative("custom blend deviation", deviation)?;
    Ok(Blend::Custom { min: Arc::new(f), deviation })
}

// ---------------------------------------------------------------------------
// Methods on Blend
// ---------------------------------------------------------------------------

impl Blend {
    /// True when this blend is exactly the hard min/max.
    pub fn is_hard(&self) -> bool {
        match self {
            Blend::Hard => true,
            Blend::Round(k) | Blend::Chamfer(k) | Blend::Exp(k) | Blend::Pow(k) | Blend::Poly(k) => *k == 0.0,
            Blend::Custom { .. } => false,
        }
    }

    /// Blended minimum, used by unions.
    ///
    /// A NaN on either side is returned as NaN by every kernel.
    pub fn min(&self, a: f64, b: f64) -> f64 {
        if a.is_nan() || b.is_nan() {
            return f64::NAN;
        }
        match self {
            Blend::Hard => hard_min(a, b),
            _ if self.is_hard() => hard_min(a, b),
            Blend::Round(k) => round_min(a, b, *k),
            Blend::Chamfer(k) => chamfer_min(a, b, *k),
            Blend::Exp(k) => exp_min(a, b, *k),
            Blend::Pow(k) => pow_min(a, b, *k),
            Blend::Poly(k) => poly_min(a, b, *k),
            Blend::Custom { min, .. } => min(a, b),
        }
    }

    /// Blended maximum, used by intersections and differences.
    pub fn max(&self, a: f64, b: f64) -> f64 {
        -self.min(-a, -b)
    }

    /// Upper bound on `min(a, b) - self.min(a, b)` near the zero level set.
    ///
    /// Boolean nodes grow their bounding boxes by this amount.
    /// Never negative, even for a `k` that skipped the shorthand checks.
    pub fn max_deviation(&self) -> f64 {
        let d = match self {
            _ if self.is_hard() => 0.0,
            Blend::Hard => 0.0,
            Blend::Round(k) | Blend::Chamfer(k) => *k,
            Blend::Exp(k) => std::f64::consts::LN_2 / k,
            // Never turns a positive pair negative.
            Blend::Pow(_) => 0.0,
            Blend::Poly(k) => k / 4.0,
            Blend::Custom { deviation, .. } => *deviation,
        };
        if d > 0.0 { d } else { 0.0 }
    }
}

// ---------------------------------------------------------------------------
// Kernels
// ---------------------------------------------------------------------------

/// `min` that keeps NaN instead of discarding it.
#[inline]
pub fn hard_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

/// `max` that keeps NaN instead of discarding it.
#[inline]
pub fn hard_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

fn round_min(a: f64, b: f64, k: f64) -> f64 {
    let u = (k - a).max(0.0);
    let v = (k - b).max(0.0);
    k.max(a.min(b)) - (u * u + v * v).sqrt()
}

fn chamfer_min(a: f64, b: f64, k: f64) -> f64 {
    a.min(b).min((a + b - k) * std::f64::consts::FRAC_1_SQRT_2)
}

/// `-ln(e^(-ka) + e^(-kb)) / k`, shifted by the hard min to avoid overflow.
fn exp_min(a: f64, b: f64, k: f64) -> f64 {
    let m = a.min(b);
    m - ((-k * (a - m)).exp() + (-k * (b - m)).exp()).ln() / k
}

fn pow_min(a: f64, b: f64, k: f64) -> f64 {
    if !(a > 0.0 && b > 0.0) {
        return hard_min(a, b);
    }
    let ak = a.powf(k);
    let bk = b.powf(k);
    let m = ((ak * bk) / (ak + bk)).powf(1.0 / k);
    if m.is_finite() { m } else { a.min(b) }
}

fn poly_min(a: f64, b: f64, k: f64) -> f64 {
    let h = (0.5 + 0.5 * (b - a) / k).clamp(0.0, 1.0);
    b + (a - b) * h - k * h * (1.0 - h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_k_is_hard() {
        for b in [Blend::Round(0.0), Blend::Chamfer(0.0), Blend::Exp(0.0), Blend::Poly(0.0), Blend::Pow(0.0)] {
            assert!(b.is_hard());
            assert_eq!(b.min(1.5, -0.5), -0.5);
            assert_eq!(b.max(1.5, -0.5), 1.5);
            assert_eq!(b.max_deviation(), 0.0);
        }
    }

    #[test]
    fn smooth_kernels_match_hard_far_from_seam() {
        for b in [Blend::Round(0.5), Blend::Chamfer(0.5), Blend::Poly(0.5)] {
            assert_eq!(b.min(3.0, 10.0), 3.0, "{b:?}");
            assert_eq!(b.min(-4.0, 6.0), -4.0, "{b:?}");
        }
    }

    #[test]
    fn smooth_kernels_stay_within_deviation() {
        for b in [Blend::Round(0.5), Blend::Chamfer(0.5), Blend::Poly(0.5), Blend::Exp(8.0)] {
            let dev = b.max_deviation();
            for &(x, y) in &[(0.0, 0.0), (0.2, 0.3), (0.5, 0.1), (-0.1, 0.4)] {
                let m = b.min(x, y);
                assert!(m <= x.min(y) + 1e-12, "{b:?} above hard min");
                assert!(x.min(y) - m <= dev + 1e-12, "{b:?} deviates by {}", x.min(y) - m);
            }
        }
    }

    #[test]
    fn hard_min_keeps_nan() {
        assert!(Blend::Hard.min(f64::NAN, 1.0).is_nan());
        assert!(Blend::Hard.max(1.0, f64::NAN).is_nan());
    }

    #[test]
    fn smooth_kernels_keep_nan() {
        let kernels = [
            Blend::Round(0.5),
            Blend::Chamfer(0.5),
            Blend::Exp(8.0),
            Blend::Pow(2.0),
            Blend::Poly(0.5),
            custom(0.1, |a: f64, b: f64| a.min(b)).unwrap(),
        ];
        for b in kernels {
            assert!(b.min(f64::NAN, 1.0).is_nan(), "{b:?}");
            assert!(b.min(-1.0, f64::NAN).is_nan(), "{b:?}");
            assert!(b.max(0.2, f64::NAN).is_nan(), "{b:?}");
        }
    }

    #[test]
    fn unchecked_negative_k_does_not_shrink_boxes() {
        for b in [Blend::Round(-1.0), Blend::Chamfer(-1.0), Blend::Exp(-2.0), Blend::Poly(-1.0)] {
            assert_eq!(b.max_deviation(), 0.0, "{b:?}");
        }
        let neg = Blend::Custom { min: Arc::new(|a: f64, b: f64| a.min(b)), deviation: -3.0 };
        assert_eq!(neg.max_deviation(), 0.0);
    }

    #[test]
    fn pow_falls_back_for_negative_inputs() {
        let b = Blend::Pow(2.0);
        assert_eq!(b.min(-1.0, 2.0), -1.0);
        assert!(b.min(1.0, 1.0) < 1.0);
    }

    #[test]
    fn shorthand_constructors_validate() {
        assert!(round(-1.0).is_err());
        assert!(matches!(chamfer(0.25), Ok(Blend::Chamfer(k)) if k == 0.25));
        assert!(custom(0.1, |a: f64, b: f64| a.min(b) - 0.05).is_ok());
    }
}
