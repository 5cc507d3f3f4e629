//! Octree marching cubes over a uniform lattice.
//!
//! The padded bounding box is covered by a lattice of cubic cells, `quality`
//! cells along the longest axis. A power-of-two octree over that lattice is
//! walked depth first; a cell whose center value exceeds the Lipschitz bound
//! times its half diagonal cannot contain the surface and is skipped with
//! its whole subtree. Leaves are single lattice cells, meshed with the
//! classic 256-case table.
//!
//! The tree is first expanded sequentially to a fixed split level. The
//! resulting subtrees are meshed by the worker pool, each with its own
//! sample cache, and their triangles are concatenated in tree order so the
//! output does not depend on the number of workers.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{SdfError, SdfResult};
use crate::mc_table::{CORNERS, EDGES, TRIANGLES};
use crate::mesh::{Mesh, Triangle3};
use crate::render::{CancelToken, Outcome};
use crate::sdf::Sdf3;
use crate::types::{Box3, MeshSettings, V3};

/// Octree levels expanded before work is handed to the pool.
const SPLIT_LEVELS: u32 = 3;

// ---------------------------------------------------------------------------
// Lattice
// ---------------------------------------------------------------------------

/// Uniform sample lattice covering a padded bounding box.
#[derive(Clone, Debug)]
pub(crate) struct Lattice3 {
    pub origin: V3,
    pub step: f64,
    /// Cells per axis.
    pub counts: [u32; 3],
    /// Octree depth; the root spans `2^levels` cells per axis.
    pub levels: u32,
}

impl Lattice3 {
    pub fn new(bbox: &Box3, quality: usize, padding: f64) -> Self {
        let padded = bbox.enlarge(padding * bbox.size().max());
        let size = padded.size();
        let step = size.max() / quality as f64;
        let cells = |s: f64| ((s / step - 1e-9).ceil().max(1.0)) as u32;
        let counts = [cells(size.x), cells(size.y), cells(size.z)];
        Self {
            origin: padded.min,
            step,
            counts,
            levels: levels_for(counts.into_iter().max().unwrap_or(1)),
        }
    }

    pub fn point(&self, at: [u32; 3]) -> V3 {
        V3::new(
            self.origin.x + at[0] as f64 * self.step,
            self.origin.y + at[1] as f64 * self.step,
            self.origin.z + at[2] as f64 * self.step,
        )
    }
}

/// Smallest `l` with `2^l >= n`.
pub(crate) fn levels_for(n: u32) -> u32 {
    let mut levels = 0;
    while (1u64 << levels) < n as u64 {
        levels += 1;
    }
    levels
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// An octree cell: its minimum lattice corner and its level (a level `l`
/// cell spans `2^l` lattice cells per axis).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct OctreeCell {
    pub at: [u32; 3],
    pub level: u32,
}

impl OctreeCell {
    fn span(&self) -> u32 {
        1 << self.level
    }

    /// True when the cell starts past the lattice on some axis.
    fn is_outside(&self, lattice: &Lattice3) -> bool {
        (0..3).any(|i| self.at[i] >= lattice.counts[i])
    }

    /// The 8 sub-cells, x varying fastest.
    fn children(&self) -> [OctreeCell; 8] {
        let half = self.span() / 2;
        std::array::from_fn(|k| OctreeCell {
            at: [
                self.at[0] + (k as u32 & 1) * half,
                self.at[1] + ((k as u32 >> 1) & 1) * half,
                self.at[2] + ((k as u32 >> 2) & 1) * half,
            ],
            level: self.level - 1,
        })
    }
}

/// Does the cell see a sign change among its 8 corner values?
pub(crate) fn has_sign_change(corners: &[f64; 8]) -> bool {
    let first = corners[0] < 0.0;
    corners.iter().any(|&c| (c < 0.0) != first)
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Field samples at lattice points, cached per subtree.
struct Sampler<'a> {
    sdf: &'a dyn Sdf3,
    lattice: &'a Lattice3,
    cache: HashMap<[u32; 3], f64>,
}

impl<'a> Sampler<'a> {
    fn new(sdf: &'a dyn Sdf3, lattice: &'a Lattice3) -> Self {
        Self { sdf, lattice, cache: HashMap::new() }
    }

    fn value(&mut self, at: [u32; 3]) -> SdfResult<f64> {
        if let Some(v) = self.cache.get(&at) {
            return Ok(*v);
        }
        let p = self.lattice.point(at);
        let v = self.sdf.evaluate(p);
        if !v.is_finite() {
            return Err(SdfError::NonFiniteField { x: p.x, y: p.y, z: p.z, value: v });
        }
        self.cache.insert(at, v);
        Ok(v)
    }

    /// False when the cell provably holds no part of the surface.
    fn may_hold_surface(&mut self, cell: &OctreeCell, lipschitz: f64) -> SdfResult<bool> {
        if cell.is_outside(self.lattice) {
            return Ok(false);
        }
        if cell.level == 0 {
            return Ok(true);
        }
        let half = cell.span() / 2;
        let center = self.value([cell.at[0] + half, cell.at[1] + half, cell.at[2] + half])?;
        let half_diagonal = 0.5 * 3f64.sqrt() * cell.span() as f64 * self.lattice.step;
        Ok(center.abs() <= lipschitz * half_diagonal)
    }

    /// Marching cubes for one lattice cell, appending to `out`.
    fn polygonize(&mut self, cell: &OctreeCell, out: &mut Vec<Triangle3>) -> SdfResult<()> {
        let mut corners = [[0u32; 3]; 8];
        let mut values = [0.0; 8];
        for (k, offset) in CORNERS.iter().enumerate() {
            corners[k] = [
                cell.at[0] + offset[0] as u32,
                cell.at[1] + offset[1] as u32,
                cell.at[2] + offset[2] as u32,
            ];
            values[k] = self.value(corners[k])?;
        }
        if !has_sign_change(&values) {
            return Ok(());
        }

        let case = values
            .iter()
            .enumerate()
            .fold(0usize, |acc, (k, v)| if *v < 0.0 { acc | 1 << k } else { acc });

        let mut points: [Option<V3>; 12] = [None; 12];
        let mut edge_point = |e: usize| -> V3 {
            *points[e].get_or_insert_with(|| {
                let [a, b] = EDGES[e];
                // Interpolate from the lower lattice corner so neighbors
                // sharing the edge compute the same bits.
                let (a, b) = if corners[a] <= corners[b] { (a, b) } else { (b, a) };
                let t = (values[a] / (values[a] - values[b])).clamp(0.0, 1.0);
                let pa = self.lattice.point(corners[a]);
                let pb = self.lattice.point(corners[b]);
                pa + (pb - pa) * t
            })
        };

        let row = &TRIANGLES[case];
        let step = self.lattice.step;
        for tri in row.chunks_exact(3).take_while(|t| t[0] >= 0) {
            let t = Triangle3::new(
                edge_point(tri[2] as usize),
                edge_point(tri[1] as usize),
                edge_point(tri[0] as usize),
            );
            if !t.is_degenerate(step) {
                out.push(t);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Triangles of one subtree.
#[derive(Default)]
struct Shard {
    triangles: Vec<Triangle3>,
    leaves: usize,
    pruned: usize,
    cancelled: bool,
}

fn mesh_subtree(
    sdf: &dyn Sdf3,
    lattice: &Lattice3,
    root: OctreeCell,
    lipschitz: f64,
    cancel: &CancelToken,
) -> SdfResult<Shard> {
    let mut sampler = Sampler::new(sdf, lattice);
    let mut shard = Shard::default();
    let mut stack = vec![root];
    while let Some(cell) = stack.pop() {
        if cancel.is_cancelled() {
            shard.cancelled = true;
            break;
        }
        if !sampler.may_hold_surface(&cell, lipschitz)? {
            shard.pruned += 1;
            continue;
        }
        if cell.level == 0 {
            shard.leaves += 1;
            sampler.polygonize(&cell, &mut shard.triangles)?;
        } else {
            stack.extend(cell.children().into_iter().rev());
        }
    }
    Ok(shard)
}

/// Sequential breadth-first expansion down to the split level.
fn split(
    sdf: &dyn Sdf3,
    lattice: &Lattice3,
    lipschitz: f64,
) -> SdfResult<Vec<OctreeCell>> {
    let mut sampler = Sampler::new(sdf, lattice);
    let mut frontier = vec![OctreeCell { at: [0; 3], level: lattice.levels }];
    for _ in 0..SPLIT_LEVELS.min(lattice.levels) {
        let mut next = Vec::with_capacity(frontier.len() * 8);
        for cell in &frontier {
            if sampler.may_hold_surface(cell, lipschitz)? {
                next.extend(cell.children());
            }
        }
        frontier = next;
    }
    Ok(frontier)
}

/// Extract the zero level set of `sdf` as a triangle soup.
///
/// Runs on `pool`; returns `Outcome::Cancelled` as soon as every worker has
/// observed the token.
pub(crate) fn extract(
    sdf: &dyn Sdf3,
    settings: &MeshSettings,
    cancel: &CancelToken,
    pool: &rayon::ThreadPool,
) -> SdfResult<Outcome<Mesh>> {
    let bbox = sdf.bounding_box();
    bbox.check_extent()?;
    let lattice = Lattice3::new(&bbox, settings.quality, settings.padding);
    let roots = split(sdf, &lattice, settings.lipschitz)?;
    debug!(
        cells_x = lattice.counts[0],
        cells_y = lattice.counts[1],
        cells_z = lattice.counts[2],
        step = lattice.step,
        subtrees = roots.len(),
        "octree lattice"
    );

    let shards: Vec<Shard> = pool.install(|| {
        roots
            .par_iter()
            .map(|root| mesh_subtree(sdf, &lattice, *root, settings.lipschitz, cancel))
            .collect::<SdfResult<Vec<_>>>()
    })?;

    let leaves: usize = shards.iter().map(|s| s.leaves).sum();
    let pruned: usize = shards.iter().map(|s| s.pruned).sum();
    let cancelled = cancel.is_cancelled() || shards.iter().any(|s| s.cancelled);
    let triangles: Vec<Triangle3> = shards.into_iter().flat_map(|s| s.triangles).collect();
    debug!(leaves, pruned, triangles = triangles.len(), cancelled, "octree walk finished");

    let mesh = Mesh::new(triangles);
    Ok(if cancelled {
        Outcome::Cancelled(settings.partial_on_cancel.then_some(mesh))
    } else {
        Outcome::Complete(mesh)
    })
}
