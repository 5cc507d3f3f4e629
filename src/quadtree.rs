//! Quadtree outline extraction.
//!
//! The 2D counterpart of the octree mesher: a uniform lattice over the
//! padded bounding box, a power-of-two quadtree walked depth first with
//! Lipschitz pruning, a fixed split level for the worker pool, and per-leaf
//! segment placement by marching squares or dual contouring.
//!
//! Segments keep the inside of the shape on their left, so closed outlines
//! run counter-clockwise around solid regions.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::dual_contouring::DualContour;
use crate::error::{SdfError, SdfResult};
use crate::mesh::{Outline, Segment2};
use crate::octree::levels_for;
use crate::render::{CancelToken, Outcome};
use crate::sdf::Sdf2;
use crate::types::{Box2, ContourMethod, ContourSettings, V2};

/// Quadtree levels expanded before work is handed to the pool.
const SPLIT_LEVELS: u32 = 4;

/// Cell corner offsets, counter-clockwise from the minimum corner.
pub(crate) const CORNERS: [[u32; 2]; 4] = [[0, 0], [1, 0], [1, 1], [0, 1]];

/// Corner pairs of the bottom, right, top and left edges.
pub(crate) const EDGES: [[usize; 2]; 4] = [[0, 1], [1, 2], [2, 3], [3, 0]];

/// Edge pairs per case; bit `i` is set when corner `i` is inside. Cases 5
/// and 10 list the separated reading, see [`SADDLE_JOINED`].
#[rustfmt::skip]
const SEGMENTS: [&[(usize, usize)]; 16] = [
    &[],
    &[(0, 3)],
    &[(1, 0)],
    &[(1, 3)],
    &[(2, 1)],
    &[(0, 3), (2, 1)],
    &[(2, 0)],
    &[(2, 3)],
    &[(3, 2)],
    &[(0, 2)],
    &[(1, 0), (3, 2)],
    &[(1, 2)],
    &[(3, 1)],
    &[(0, 1)],
    &[(3, 0)],
    &[],
];

/// Saddle cases 5 and 10 when the cell center is inside.
const SADDLE_JOINED: [&[(usize, usize)]; 2] = [&[(0, 1), (2, 3)], &[(3, 0), (1, 2)]];

// ---------------------------------------------------------------------------
// Lattice
// ---------------------------------------------------------------------------

/// Uniform sample lattice covering a padded 2D bounding box.
#[derive(Clone, Debug)]
pub(crate) struct Lattice2 {
    pub origin: V2,
    pub step: f64,
    pub counts: [u32; 2],
    pub levels: u32,
}

impl Lattice2 {
    pub fn new(bbox: &Box2, quality: usize, padding: f64) -> Self {
        let padded = bbox.enlarge(padding * bbox.size().max());
        let size = padded.size();
        let step = size.max() / quality as f64;
        let cells = |s: f64| ((s / step - 1e-9).ceil().max(1.0)) as u32;
        let counts = [cells(size.x), cells(size.y)];
        Self {
            origin: padded.min,
            step,
            counts,
            levels: levels_for(counts[0].max(counts[1])),
        }
    }

    pub fn point(&self, at: [u32; 2]) -> V2 {
        V2::new(
            self.origin.x + at[0] as f64 * self.step,
            self.origin.y + at[1] as f64 * self.step,
        )
    }

    /// True when the lattice cell at `at` exists.
    pub fn has_cell(&self, at: [u32; 2]) -> bool {
        at[0] < self.counts[0] && at[1] < self.counts[1]
    }

    pub fn cell_box(&self, at: [u32; 2]) -> Box2 {
        Box2::new(self.point(at), self.point([at[0] + 1, at[1] + 1]))
    }
}

/// A quadtree cell: minimum lattice corner and level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct QuadCell {
    pub at: [u32; 2],
    pub level: u32,
}

impl QuadCell {
    fn span(&self) -> u32 {
        1 << self.level
    }

    /// The 4 sub-cells, x varying fastest.
    fn children(&self) -> [QuadCell; 4] {
        let half = self.span() / 2;
        std::array::from_fn(|k| QuadCell {
            at: [
                self.at[0] + (k as u32 & 1) * half,
                self.at[1] + ((k as u32 >> 1) & 1) * half,
            ],
            level: self.level - 1,
        })
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Field samples at lattice points, cached per subtree.
pub(crate) struct Sampler2<'a> {
    pub sdf: &'a dyn Sdf2,
    pub lattice: &'a Lattice2,
    cache: HashMap<[u32; 2], f64>,
}

/// Reject NaN and infinite samples.
pub(crate) fn finite(p: V2, v: f64) -> SdfResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SdfError::NonFiniteField { x: p.x, y: p.y, z: 0.0, value: v })
    }
}

impl<'a> Sampler2<'a> {
    pub fn new(sdf: &'a dyn Sdf2, lattice: &'a Lattice2) -> Self {
        Self { sdf, lattice, cache: HashMap::new() }
    }

    pub fn value(&mut self, at: [u32; 2]) -> SdfResult<f64> {
        if let Some(v) = self.cache.get(&at) {
            return Ok(*v);
        }
        let p = self.lattice.point(at);
        let v = finite(p, self.sdf.evaluate(p))?;
        self.cache.insert(at, v);
        Ok(v)
    }

    /// Lattice coordinates and values of a leaf cell's corners.
    pub fn corners(&mut self, at: [u32; 2]) -> SdfResult<([[u32; 2]; 4], [f64; 4])> {
        let mut points = [[0u32; 2]; 4];
        let mut values = [0.0; 4];
        for (k, offset) in CORNERS.iter().enumerate() {
            points[k] = [at[0] + offset[0], at[1] + offset[1]];
            values[k] = self.value(points[k])?;
        }
        Ok((points, values))
    }

    /// Zero crossing on the edge between two lattice points, interpolated
    /// from the lower point so both adjacent cells agree bit for bit.
    pub fn crossing(&self, a: ([u32; 2], f64), b: ([u32; 2], f64)) -> V2 {
        let (a, b) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        let t = (a.1 / (a.1 - b.1)).clamp(0.0, 1.0);
        let pa = self.lattice.point(a.0);
        let pb = self.lattice.point(b.0);
        pa + (pb - pa) * t
    }

    fn may_hold_surface(&mut self, cell: &QuadCell, lipschitz: f64) -> SdfResult<bool> {
        if !self.lattice.has_cell(cell.at) {
            return Ok(false);
        }
        if cell.level == 0 {
            return Ok(true);
        }
        let half = cell.span() / 2;
        let center = self.value([cell.at[0] + half, cell.at[1] + half])?;
        let half_diagonal = 0.5 * 2f64.sqrt() * cell.span() as f64 * self.lattice.step;
        Ok(center.abs() <= lipschitz * half_diagonal)
    }

    /// Marching squares for one lattice cell.
    fn march(&mut self, at: [u32; 2], out: &mut Vec<Segment2>) -> SdfResult<()> {
        let (points, values) = self.corners(at)?;
        let case = values
            .iter()
            .enumerate()
            .fold(0usize, |acc, (k, v)| if *v < 0.0 { acc | 1 << k } else { acc });
        let pairs = match case {
            5 | 10 => {
                let c = self.lattice.point(at) + V2::repeat(0.5 * self.lattice.step);
                if finite(c, self.sdf.evaluate(c))? < 0.0 {
                    SADDLE_JOINED[usize::from(case == 10)]
                } else {
                    SEGMENTS[case]
                }
            }
            _ => SEGMENTS[case],
        };
        let edge_point = |e: usize| {
            let [i, j] = EDGES[e];
            self.crossing((points[i], values[i]), (points[j], values[j]))
        };
        for &(from, to) in pairs {
            let s = Segment2::new(edge_point(from), edge_point(to));
            if s.a != s.b {
                out.push(s);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Shard {
    segments: Vec<Segment2>,
    leaves: usize,
    cancelled: bool,
}

fn contour_subtree(
    sdf: &dyn Sdf2,
    lattice: &Lattice2,
    root: QuadCell,
    settings: &ContourSettings,
    cancel: &CancelToken,
) -> SdfResult<Shard> {
    let mut sampler = Sampler2::new(sdf, lattice);
    let mut dual = DualContour::default();
    let mut shard = Shard::default();
    let mut stack = vec![root];
    while let Some(cell) = stack.pop() {
        if cancel.is_cancelled() {
            shard.cancelled = true;
            break;
        }
        if !sampler.may_hold_surface(&cell, settings.lipschitz)? {
            continue;
        }
        if cell.level > 0 {
            stack.extend(cell.children().into_iter().rev());
            continue;
        }
        shard.leaves += 1;
        match settings.method {
            ContourMethod::MarchingSquares => sampler.march(cell.at, &mut shard.segments)?,
            ContourMethod::DualContouring => {
                dual.contour_cell(&mut sampler, cell.at, &mut shard.segments)?
            }
        }
    }
    Ok(shard)
}

fn split(sdf: &dyn Sdf2, lattice: &Lattice2, lipschitz: f64) -> SdfResult<Vec<QuadCell>> {
    let mut sampler = Sampler2::new(sdf, lattice);
    let mut frontier = vec![QuadCell { at: [0; 2], level: lattice.levels }];
    for _ in 0..SPLIT_LEVELS.min(lattice.levels) {
        let mut next = Vec::with_capacity(frontier.len() * 4);
        for cell in &frontier {
            if sampler.may_hold_surface(cell, lipschitz)? {
                next.extend(cell.children());
            }
        }
        frontier = next;
    }
    Ok(frontier)
}

/// Extract the zero level set of `sdf` as line segments.
pub(crate) fn extract(
    sdf: &dyn Sdf2,
    settings: &ContourSettings,
    cancel: &CancelToken,
    pool: &rayon::ThreadPool,
) -> SdfResult<Outcome<Outline>> {
    let bbox = sdf.bounding_box();
    bbox.check_extent()?;
    let lattice = Lattice2::new(&bbox, settings.quality, settings.padding);
    let roots = split(sdf, &lattice, settings.lipschitz)?;
    debug!(
        cells_x = lattice.counts[0],
        cells_y = lattice.counts[1],
        step = lattice.step,
        subtrees = roots.len(),
        method = ?settings.method,
        "quadtree lattice"
    );

    let shards: Vec<Shard> = pool.install(|| {
        roots
            .par_iter()
            .map(|root| contour_subtree(sdf, &lattice, *root, settings, cancel))
            .collect::<SdfResult<Vec<_>>>()
    })?;

    let leaves: usize = shards.iter().map(|s| s.leaves).sum();
    let cancelled = cancel.is_cancelled() || shards.iter().any(|s| s.cancelled);
    let segments: Vec<Segment2> = shards.into_iter().flat_map(|s| s.segments).collect();
    debug!(leaves, segments = segments.len(), cancelled, "quadtree walk finished");

    let outline = Outline::new(segments);
    Ok(if cancelled {
        Outcome::Cancelled(settings.partial_on_cancel.then_some(outline))
    } else {
        Outcome::Complete(outline)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every single-sign table row keeps inside corners on the left.
    #[test]
    fn table_keeps_inside_on_left() {
        let corner = |k: usize| V2::new(CORNERS[k][0] as f64, CORNERS[k][1] as f64);
        let mid = |e: usize| (corner(EDGES[e][0]) + corner(EDGES[e][1])) * 0.5;
        for case in (1..15).filter(|c| *c != 5 && *c != 10) {
            for &(from, to) in SEGMENTS[case] {
                let (a, b) = (mid(from), mid(to));
                let d = b - a;
                for k in 0..4 {
                    let w = corner(k) - a;
                    let side = d.x * w.y - d.y * w.x;
                    if side.abs() < 1e-12 {
                        continue;
                    }
                    let inside = case & (1 << k) != 0;
                    assert_eq!(side > 0.0, inside, "case {case} corner {k}");
                }
            }
        }
    }

    #[test]
    fn lattice_cells() {
        let l = Lattice2::new(&Box2::new(V2::zeros(), V2::new(4.0, 1.0)), 8, 0.0);
        assert_eq!(l.counts, [8, 2]);
        assert_eq!(l.levels, 3);
        assert!(l.has_cell([7, 1]));
        assert!(!l.has_cell([7, 2]));
    }
}
