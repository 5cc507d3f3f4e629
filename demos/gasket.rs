//! Flange gasket: a filleted plate with a bore and a ring of bolt holes,
//! contoured with dual contouring and written as DXF and SVG.
//!
//! Run with: RUST_LOG=sdfkit=debug cargo run --example gasket

use sdfkit::{
    nagon, render_dxf, render_svg, CancelToken, ContourMethod, ContourSettings, Polygon,
    SdfResult, Sketch,
};
use tracing_subscriber::EnvFilter;

fn main() -> SdfResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut outline = Polygon::new();
    outline.add(-30.0, -20.0).smooth(6.0, 8);
    outline.add(30.0, -20.0).smooth(6.0, 8);
    outline.add(30.0, 20.0).smooth(6.0, 8);
    outline.add(-30.0, 20.0).smooth(6.0, 8);
    outline.close();

    let mut gasket = Sketch::from_polygon(outline)?.difference(Sketch::circle(12.0)?);
    for p in nagon(6, 16.0)? {
        gasket = gasket.difference(Sketch::circle(2.5)?.translate(p.x, p.y));
    }

    let settings = ContourSettings::default()
        .with_quality(400)
        .with_method(ContourMethod::DualContouring);
    let cancel = CancelToken::new();
    let dir = std::env::temp_dir();

    let dxf = dir.join("gasket.dxf");
    let svg = dir.join("gasket.svg");
    if let Some(o) = render_dxf(&gasket, &dxf, &settings, &cancel)?.complete() {
        println!("=== sdfkit demo: gasket ===");
        println!("  Segments:   {}", o.len());
        println!("  Area:       {:.2}", o.signed_area());
        println!("  Perimeter:  {:.2}", o.total_length());
        println!("  Written to: {}", dxf.display());
    }
    render_svg(&gasket, &svg, &settings, &cancel)?;
    println!("  Written to: {}", svg.display());
    Ok(())
}
