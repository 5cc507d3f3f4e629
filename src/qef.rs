use nalgebra::Matrix2;

use crate::types::{Box2, V2};

/// Mass-point regularization weight.
const REGULARIZATION: f64 = 1e-3;

/// Solve the quadratic error function for a 2D dual contouring cell:
/// find the point v that minimizes
/// Σ (nᵢ · (v - pᵢ))²
/// where pᵢ are edge crossing positions and nᵢ are outline normals.
///
/// The 2×2 normal equations are solved by SVD, pulled slightly toward the
/// mass point so parallel normals stay well posed. The result is clamped to
/// the cell.
pub fn solve_qef(positions: &[V2], normals: &[V2], bounds: &Box2) -> V2 {
    let n = positions.len().min(normals.len());
    if n == 0 {
        return bounds.center();
    }

    let mass_point: V2 = positions[..n].iter().sum::<V2>() / n as f64;

    let mut ata = Matrix2::<f64>::zeros();
    let mut atb = V2::zeros();
    for (p, nrm) in positions.iter().zip(normals) {
        ata += nrm * nrm.transpose();
        atb += nrm * nrm.dot(p);
    }
    ata += Matrix2::identity() * REGULARIZATION;
    atb += mass_point * REGULARIZATION;

    let v = ata.svd(true, true).solve(&atb, 1e-10).unwrap_or(mass_point);
    V2::new(
        v.x.clamp(bounds.min.x, bounds.max.x),
        v.y.clamp(bounds.min.y, bounds.max.y),
    )
}
