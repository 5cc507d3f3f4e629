//! Extraction outputs: triangle soups, welded indexed meshes and 2D
//! outlines.

use std::collections::HashMap;

use crate::types::{Box2, Box3, V2, V3};

/// Triangles whose doubled area falls below this are dropped.
pub const DEGENERATE_AREA: f64 = 1e-14;

// ---------------------------------------------------------------------------
// Triangles
// ---------------------------------------------------------------------------

/// A triangle with counter-clockwise winding seen from outside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle3 {
    pub v: [V3; 3],
}

impl Triangle3 {
    pub fn new(a: V3, b: V3, c: V3) -> Self {
        Self { v: [a, b, c] }
    }

    /// Unnormalized normal; its length is twice the area.
    pub fn cross(&self) -> V3 {
        (self.v[1] - self.v[0]).cross(&(self.v[2] - self.v[0]))
    }

    /// Unit facet normal, +z for degenerate triangles.
    pub fn normal(&self) -> V3 {
        let n = self.cross();
        let len = n.norm();
        if len > 1e-15 { n / len } else { V3::z() }
    }

    pub fn area(&self) -> f64 {
        0.5 * self.cross().norm()
    }

    /// True when the triangle is too thin to carry a meaningful normal.
    pub fn is_degenerate(&self, scale: f64) -> bool {
        self.cross().norm() <= DEGENERATE_AREA * scale * scale
    }
}

// ---------------------------------------------------------------------------
// Triangle soup
// ---------------------------------------------------------------------------

/// An unindexed triangle soup, as produced by the octree mesher.
///
/// All leaves sit at the finest lattice level, so neighboring cells share
/// bit-identical edge vertices and [`Mesh::weld`] with a tiny tolerance
/// recovers a closed surface.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle3>,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle3>) -> Self {
        Self { triangles }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounding box of all vertices, `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<Box3> {
        let first = self.triangles.first()?.v[0];
        Some(
            self.triangles
                .iter()
                .flat_map(|t| t.v.iter())
                .fold(Box3::new(first, first), |b, p| b.include(*p)),
        )
    }

    /// Signed enclosed volume (divergence theorem). Positive for closed,
    /// outward-wound meshes.
    pub fn volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| t.v[0].dot(&t.v[1].cross(&t.v[2])))
            .sum::<f64>()
            / 6.0
    }

    pub fn area(&self) -> f64 {
        self.triangles.iter().map(Triangle3::area).sum()
    }

    /// Merge vertices closer than `tolerance` into an indexed mesh.
    /// Triangles that collapse after merging are dropped.
    pub fn weld(&self, tolerance: f64) -> IndexedMesh {
        let tol = if tolerance > 0.0 { tolerance } else { 1e-9 };
        let inv = 1.0 / tol;
        let tol2 = tol * tol;
        let mut buckets: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
        let mut vertices: Vec<V3> = Vec::new();
        let mut faces: Vec<[u32; 3]> = Vec::with_capacity(self.triangles.len());

        let mut index_of = |p: V3, vertices: &mut Vec<V3>| -> u32 {
            let key = (
                (p.x * inv).round() as i64,
                (p.y * inv).round() as i64,
                (p.z * inv).round() as i64,
            );
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        if let Some(ids) = buckets.get(&(key.0 + dx, key.1 + dy, key.2 + dz)) {
                            for &id in ids {
                                if (vertices[id as usize] - p).norm_squared() <= tol2 {
                                    return id;
                                }
                            }
                        }
                    }
                }
            }
            let id = vertices.len() as u32;
            vertices.push(p);
            buckets.entry(key).or_default().push(id);
            id
        };

        for t in &self.triangles {
            let f = [
                index_of(t.v[0], &mut vertices),
                index_of(t.v[1], &mut vertices),
                index_of(t.v[2], &mut vertices),
            ];
            if f[0] != f[1] && f[1] != f[2] && f[0] != f[2] {
                faces.push(f);
            }
        }
        IndexedMesh { vertices, faces }
    }
}

// ---------------------------------------------------------------------------
// Indexed mesh
// ---------------------------------------------------------------------------

/// Shared-vertex triangle mesh.
#[derive(Clone, Debug, Default)]
pub struct IndexedMesh {
    pub vertices: Vec<V3>,
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    fn edge_counts(&self) -> HashMap<(u32, u32), usize> {
        let mut counts = HashMap::new();
        for f in &self.faces {
            for k in 0..3 {
                let (a, b) = (f[k], f[(k + 1) % 3]);
                *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Edges used by exactly one face.
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_counts().values().filter(|&&n| n == 1).count()
    }

    /// Edges used by more than two faces.
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_counts().values().filter(|&&n| n > 2).count()
    }

    /// Face index sets of the edge-connected shells.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut parent: Vec<usize> = (0..self.vertices.len()).collect();
        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }
        for f in &self.faces {
            let r0 = find(&mut parent, f[0] as usize);
            for &v in &f[1..] {
                let r = find(&mut parent, v as usize);
                if r != r0 {
                    parent[r] = r0;
                }
            }
        }
        let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, f) in self.faces.iter().enumerate() {
            let r = find(&mut parent, f[0] as usize);
            groups.entry(r).or_default().push(i);
        }
        let mut out: Vec<Vec<usize>> = groups.into_values().collect();
        out.sort_by_key(|g| g[0]);
        out
    }

    pub fn connected_components(&self) -> usize {
        self.components().len()
    }
}

// ---------------------------------------------------------------------------
// Outlines
// ---------------------------------------------------------------------------

/// A directed line segment. Closed outlines keep the inside on the left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment2 {
    pub a: V2,
    pub b: V2,
}

impl Segment2 {
    pub fn new(a: V2, b: V2) -> Self {
        Self { a, b }
    }
    pub fn length(&self) -> f64 {
        (self.b - self.a).norm()
    }
}

/// An unordered set of segments.
#[derive(Clone, Debug, Default)]
pub struct Outline {
    pub segments: Vec<Segment2>,
}

impl Outline {
    pub fn new(segments: Vec<Segment2>) -> Self {
        Self { segments }
    }
    pub fn len(&self) -> usize {
        self.segments.len()
    }
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
    pub fn bounding_box(&self) -> Option<Box2> {
        let first = self.segments.first()?.a;
        Some(
            self.segments
                .iter()
                .flat_map(|s| [s.a, s.b])
                .fold(Box2::new(first, first), |b, p| b.include(p)),
        )
    }
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(Segment2::length).sum()
    }
    /// Signed area enclosed by closed loops (shoelace); positive when the
    /// inside is on the left of every segment.
    pub fn signed_area(&self) -> f64 {
        0.5 * self
            .segments
            .iter()
            .map(|s| s.a.x * s.b.y - s.b.x * s.a.y)
            .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tetra() -> Mesh {
        let a = V3::new(0.0, 0.0, 0.0);
        let b = V3::new(1.0, 0.0, 0.0);
        let c = V3::new(0.0, 1.0, 0.0);
        let d = V3::new(0.0, 0.0, 1.0);
        Mesh::new(vec![
            Triangle3::new(a, c, b),
            Triangle3::new(a, b, d),
            Triangle3::new(a, d, c),
            Triangle3::new(b, c, d),
        ])
    }

    #[test]
    fn tetra_volume_and_closure() {
        let m = tetra();
        assert_relative_eq!(m.volume(), 1.0 / 6.0, epsilon = 1e-12);
        let w = m.weld(1e-9);
        assert_eq!(w.vertices.len(), 4);
        assert_eq!(w.boundary_edge_count(), 0);
        assert_eq!(w.connected_components(), 1);
    }

    #[test]
    fn weld_merges_near_duplicates() {
        let mut m = tetra();
        m.triangles[0].v[0] += V3::repeat(1e-7);
        let w = m.weld(1e-6);
        assert_eq!(w.vertices.len(), 4);
    }

    #[test]
    fn outline_square_area() {
        let p = [V2::new(0.0, 0.0), V2::new(2.0, 0.0), V2::new(2.0, 1.0), V2::new(0.0, 1.0)];
        let o = Outline::new((0..4).map(|i| Segment2::new(p[i], p[(i + 1) % 4])).collect());
        assert_relative_eq!(o.signed_area(), 2.0);
        assert_relative_eq!(o.total_length(), 6.0);
    }
}
