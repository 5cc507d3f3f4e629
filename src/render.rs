//! Extraction entry points.
//!
//! [`mesh`] turns a 3D field into a triangle soup and [`outline`] turns a
//! 2D field into line segments. Both validate their settings, build a
//! worker pool of the requested size and honor a [`CancelToken`] shared
//! with the caller. The `render_*` functions extract and write a file in
//! one call.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::SdfResult;
use crate::export;
use crate::mesh::{Mesh, Outline};
use crate::sdf::{Sdf2, Sdf3};
use crate::types::{ContourSettings, MeshSettings};
use crate::{octree, quadtree};

/// Cooperative cancellation flag. Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every extraction holding this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Terminal state of an extraction. Cancellation is not an error.
#[derive(Clone, Debug)]
pub enum Outcome<T> {
    Complete(T),
    /// Stopped by the token; carries the output produced so far when the
    /// settings asked for partial results.
    Cancelled(Option<T>),
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled(_))
    }

    /// The output of a completed extraction.
    pub fn complete(self) -> Option<T> {
        match self {
            Outcome::Complete(t) => Some(t),
            Outcome::Cancelled(_) => None,
        }
    }

    /// Whatever output exists, complete or partial.
    pub fn into_output(self) -> Option<T> {
        match self {
            Outcome::Complete(t) => Some(t),
            Outcome::Cancelled(t) => t,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Complete(t) => Outcome::Complete(f(t)),
            Outcome::Cancelled(t) => Outcome::Cancelled(t.map(f)),
        }
    }
}

fn build_pool(workers: Option<usize>) -> SdfResult<rayon::ThreadPool> {
    let threads = workers.unwrap_or_else(|| {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    });
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("sdfkit-{i}"))
        .build()?)
}

/// Extract the surface of a 3D field as a triangle mesh.
///
/// Triangles are wound counter-clockwise seen from outside. The output is
/// identical for every worker count.
pub fn mesh(sdf: &dyn Sdf3, settings: &MeshSettings, cancel: &CancelToken) -> SdfResult<Outcome<Mesh>> {
    settings.validate()?;
    let pool = build_pool(settings.workers)?;
    let start = Instant::now();
    info!(quality = settings.quality, workers = pool.current_num_threads(), "meshing");
    let outcome = octree::extract(sdf, settings, cancel, &pool)?;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match &outcome {
        Outcome::Complete(m) => info!(triangles = m.len(), elapsed_ms, "mesh complete"),
        Outcome::Cancelled(partial) => warn!(
            partial_triangles = partial.as_ref().map_or(0, Mesh::len),
            elapsed_ms,
            "meshing cancelled"
        ),
    }
    Ok(outcome)
}

/// Extract the outline of a 2D field as line segments with the inside on
/// their left.
pub fn outline(
    sdf: &dyn Sdf2,
    settings: &ContourSettings,
    cancel: &CancelToken,
) -> SdfResult<Outcome<Outline>> {
    settings.validate()?;
    let pool = build_pool(settings.workers)?;
    let start = Instant::now();
    info!(
        quality = settings.quality,
        workers = pool.current_num_threads(),
        method = ?settings.method,
        "contouring"
    );
    let outcome = quadtree::extract(sdf, settings, cancel, &pool)?;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match &outcome {
        Outcome::Complete(o) => info!(segments = o.len(), elapsed_ms, "outline complete"),
        Outcome::Cancelled(partial) => warn!(
            partial_segments = partial.as_ref().map_or(0, Outline::len),
            elapsed_ms,
            "contouring cancelled"
        ),
    }
    Ok(outcome)
}

/// Mesh `sdf` and write it as binary STL. Nothing is written when cancelled.
pub fn render_stl(
    sdf: &dyn Sdf3,
    path: impl AsRef<Path>,
    settings: &MeshSettings,
    cancel: &CancelToken,
) -> SdfResult<Outcome<Mesh>> {
    let outcome = mesh(sdf, settings, cancel)?;
    if let Outcome::Complete(m) = &outcome {
        export::save_stl(path, m)?;
    }
    Ok(outcome)
}

/// Contour `sdf` and write it as DXF. Nothing is written when cancelled.
pub fn render_dxf(
    sdf: &dyn Sdf2,
    path: impl AsRef<Path>,
    settings: &ContourSettings,
    cancel: &CancelToken,
) -> SdfResult<Outcome<Outline>> {
    let outcome = outline(sdf, settings, cancel)?;
    if let Outcome::Complete(o) = &outcome {
        export::save_dxf(path, o)?;
    }
    Ok(outcome)
}

/// Contour `sdf` and write it as SVG. Nothing is written when cancelled.
pub fn render_svg(
    sdf: &dyn Sdf2,
    path: impl AsRef<Path>,
    settings: &ContourSettings,
    cancel: &CancelToken,
) -> SdfResult<Outcome<Outline>> {
    let outcome = outline(sdf, settings, cancel)?;
    if let Outcome::Complete(o) = &outcome {
        export::save_svg(path, o)?;
    }
    Ok(outcome)
}
