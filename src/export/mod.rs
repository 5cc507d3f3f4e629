//! Export writers for meshes and outlines.
//!
//! - **STL**: binary (the default for slicers) and ASCII triangle meshes
//! - **DXF**: R12 `LINE` entities for outlines
//! - **SVG**: `<line>` elements with +y pointing up
//!
//! Writers take any `std::io::Write`; the `save_*` helpers create a file
//! and buffer it.

pub mod dxf;
pub mod stl;
pub mod svg;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::SdfResult;
use crate::mesh::{Mesh, Outline};

pub use dxf::write_dxf;
pub use stl::{write_stl, write_stl_ascii};
pub use svg::write_svg;

fn create(path: &Path) -> SdfResult<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Write `mesh` to `path` as binary STL.
pub fn save_stl(path: impl AsRef<Path>, mesh: &Mesh) -> SdfResult<()> {
    let path = path.as_ref();
    let mut w = create(path)?;
    write_stl(mesh, &mut w)?;
    w.flush()?;
    debug!(path = %path.display(), triangles = mesh.len(), "wrote binary STL");
    Ok(())
}

/// Write `mesh` to `path` as ASCII STL.
pub fn save_stl_ascii(path: impl AsRef<Path>, mesh: &Mesh) -> SdfResult<()> {
    let path = path.as_ref();
    let mut w = create(path)?;
    write_stl_ascii(mesh, &mut w)?;
    w.flush()?;
    debug!(path = %path.display(), triangles = mesh.len(), "wrote ASCII STL");
    Ok(())
}

/// Write `outline` to `path` as DXF.
pub fn save_dxf(path: impl AsRef<Path>, outline: &Outline) -> SdfResult<()> {
    let path = path.as_ref();
    let mut w = create(path)?;
    write_dxf(outline, &mut w)?;
    w.flush()?;
    debug!(path = %path.display(), segments = outline.len(), "wrote DXF");
    Ok(())
}

/// Write `outline` to `path` as SVG.
pub fn save_svg(path: impl AsRef<Path>, outline: &Outline) -> SdfResult<()> {
    let path = path.as_ref();
    let mut w = create(path)?;
    write_svg(outline, &mut w)?;
    w.flush()?;
    debug!(path = %path.display(), segments = outline.len(), "wrote SVG");
    Ok(())
}
