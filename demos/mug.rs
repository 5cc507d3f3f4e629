//! Coffee mug: a hollowed cylinder with a blended torus handle, meshed to STL.
//!
//! Run with: RUST_LOG=sdfkit=debug cargo run --release --example mug

use std::f64::consts::FRAC_PI_2;

use sdfkit::blend;
use sdfkit::{CancelToken, MeshSettings, Outcome, SdfResult, Shape};
use tracing_subscriber::EnvFilter;

fn main() -> SdfResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let outer = Shape::cylinder(10.0, 4.0)?;
    let inner = Shape::cylinder(10.0, 3.5)?.translate(0.0, 0.0, 1.0);
    let handle = Shape::torus(2.5, 0.5)?
        .rotate_x(FRAC_PI_2)
        .translate(4.5, 0.0, 0.0);
    let mug = outer
        .union_blend(handle, blend::round(0.4)?)
        .difference(inner);

    let settings = MeshSettings::default().with_quality(200);
    let path = std::env::temp_dir().join("mug.stl");
    match sdfkit::render_stl(&mug, &path, &settings, &CancelToken::new())? {
        Outcome::Complete(mesh) => {
            let welded = mesh.weld(1e-9);
            println!("=== sdfkit demo: mug ===");
            println!("  Triangles:      {}", mesh.len());
            println!("  Volume:         {:.2}", mesh.volume());
            println!("  Boundary edges: {}", welded.boundary_edge_count());
            println!("  Written to:     {}", path.display());
        }
        Outcome::Cancelled(_) => println!("cancelled"),
    }
    Ok(())
}
