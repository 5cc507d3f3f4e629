//! Dual contouring for 2D outlines.
//!
//! Every leaf cell crossed by the outline gets one vertex, placed by
//! minimizing the QEF built from its edge crossings (refined by bisection)
//! and the field normals there. Each lattice edge with a sign change then
//! yields one segment joining the vertices of the two cells sharing it. Sharp corners of the
//! field survive instead of being cut by the straight interpolation of
//! marching squares.
//!
//! A cell emits the segments for its top and right edges only, so every
//! interior edge is handled exactly once.

use std::collections::HashMap;

use crate::error::SdfResult;
use crate::mesh::Segment2;
use crate::qef::solve_qef;
use crate::quadtree::{finite, Sampler2, EDGES};
use crate::sdf::{normal2, Sdf2};
use crate::types::V2;

/// Normal sampling step, as a fraction of the lattice step.
const NORMAL_STEP: f64 = 1e-4;

/// Bisection steps refining each edge crossing.
const BISECTION_STEPS: usize = 16;

/// Zero of `sdf` between an inside and an outside point.
fn bisect(sdf: &dyn Sdf2, mut inside: V2, mut outside: V2) -> SdfResult<V2> {
    for _ in 0..BISECTION_STEPS {
        let mid = (inside + outside) * 0.5;
        if finite(mid, sdf.evaluate(mid))? < 0.0 {
            inside = mid;
        } else {
            outside = mid;
        }
    }
    Ok((inside + outside) * 0.5)
}

/// Per-subtree cache of cell vertices.
#[derive(Default)]
pub(crate) struct DualContour {
    vertices: HashMap<[u32; 2], V2>,
}

impl DualContour {
    /// The QEF vertex of a lattice cell.
    fn vertex(&mut self, sampler: &mut Sampler2<'_>, at: [u32; 2]) -> SdfResult<V2> {
        if let Some(v) = self.vertices.get(&at) {
            return Ok(*v);
        }
        let (points, values) = sampler.corners(at)?;
        let h = NORMAL_STEP * sampler.lattice.step;
        let mut positions = Vec::with_capacity(4);
        let mut normals = Vec::with_capacity(4);
        for [i, j] in EDGES {
            if (values[i] < 0.0) != (values[j] < 0.0) {
                let (pi, pj) = (sampler.lattice.point(points[i]), sampler.lattice.point(points[j]));
                let p = if values[i] < 0.0 {
                    bisect(sampler.sdf, pi, pj)?
                } else {
                    bisect(sampler.sdf, pj, pi)?
                };
                positions.push(p);
                normals.push(normal2(sampler.sdf, p, h));
            }
        }
        let v = solve_qef(&positions, &normals, &sampler.lattice.cell_box(at));
        self.vertices.insert(at, v);
        Ok(v)
    }

    /// Emit the segments crossing the top and right edges of a leaf cell.
    pub(crate) fn contour_cell(
        &mut self,
        sampler: &mut Sampler2<'_>,
        at: [u32; 2],
        out: &mut Vec<Segment2>,
    ) -> SdfResult<()> {
        let (_, values) = sampler.corners(at)?;
        let inside = values.map(|v| v < 0.0);

        // Top edge runs from corner 3 to corner 2.
        let above = [at[0], at[1] + 1];
        if inside[3] != inside[2] && sampler.lattice.has_cell(above) {
            let a = self.vertex(sampler, at)?;
            let b = self.vertex(sampler, above)?;
            push(out, if inside[3] { (a, b) } else { (b, a) });
        }

        // Right edge runs from corner 1 to corner 2.
        let right = [at[0] + 1, at[1]];
        if inside[1] != inside[2] && sampler.lattice.has_cell(right) {
            let a = self.vertex(sampler, at)?;
            let b = self.vertex(sampler, right)?;
            push(out, if inside[1] { (b, a) } else { (a, b) });
        }
        Ok(())
    }
}

fn push(out: &mut Vec<Segment2>, (a, b): (V2, V2)) {
    if a != b {
        out.push(Segment2::new(a, b));
    }
}
