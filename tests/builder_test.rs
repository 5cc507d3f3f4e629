use std::f64::consts::{FRAC_PI_2, PI};

use approx::assert_abs_diff_eq;
use sdfkit::blend;
use sdfkit::{ContourSettings, MeshSettings, Polygon, Sdf2, Sdf3, Shape, Sketch, V2, V3};

#[test]
fn shape_csg_chain() {
    let body = Shape::box3(4.0, 4.0, 4.0).unwrap();
    let hole = Shape::cylinder(10.0, 1.0).unwrap();
    let part = body.difference(hole);
    assert!(part.evaluate(V3::zeros()) > 0.0);
    assert!(part.evaluate(V3::new(1.5, 1.5, 0.0)) < 0.0);
    assert_abs_diff_eq!(part.evaluate(V3::new(1.0, 0.0, 0.0)), 0.0, epsilon = 1e-12);
}

#[test]
fn transforms_move_the_field() {
    let s = Shape::sphere(1.0).unwrap().translate(5.0, 0.0, 0.0).rotate_z(FRAC_PI_2);
    assert_abs_diff_eq!(s.evaluate(V3::new(0.0, 5.0, 0.0)), -1.0, epsilon = 1e-12);
    let big = Shape::sphere(1.0).unwrap().scale(3.0).unwrap();
    assert_abs_diff_eq!(big.evaluate(V3::zeros()), -3.0, epsilon = 1e-12);
    let grown = Shape::sphere(1.0).unwrap().offset(0.5).unwrap();
    assert_abs_diff_eq!(grown.evaluate(V3::new(1.5, 0.0, 0.0)), 0.0, epsilon = 1e-12);
}

#[test]
fn blended_union_fills_the_crease() {
    let a = Shape::sphere(1.0).unwrap().translate(-0.9, 0.0, 0.0);
    let b = Shape::sphere(1.0).unwrap().translate(0.9, 0.0, 0.0);
    let hard = a.clone().union(b.clone());
    let soft = a.union_blend(b, blend::round(0.5).unwrap());
    let crease = V3::new(0.0, 0.5, 0.0);
    assert!(soft.evaluate(crease) < hard.evaluate(crease));
    // Far from the joint the blend leaves the surface alone.
    assert_abs_diff_eq!(soft.evaluate(V3::new(-2.9, 0.0, 0.0)), 1.0, epsilon = 1e-9);
}

#[test]
fn extrude_and_revolve_sketches() {
    let slab = Sketch::rect(4.0, 2.0, 0.0).unwrap().extrude(1.0).unwrap();
    assert!(slab.evaluate(V3::new(1.9, 0.9, 0.4)) < 0.0);
    assert!(slab.evaluate(V3::new(0.0, 0.0, 0.6)) > 0.0);

    let ring = Sketch::circle(1.0).unwrap().translate(3.0, 0.0).revolve().unwrap();
    assert_abs_diff_eq!(ring.evaluate(V3::new(3.0, 0.0, 0.0)), -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(ring.evaluate(V3::new(0.0, -3.0, 0.0)), -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(ring.evaluate(V3::zeros()), 2.0, epsilon = 1e-12);
}

#[test]
fn shape_mesh_matches_volume() {
    let cube = Shape::box3(2.0, 2.0, 2.0).unwrap();
    let mesh = cube.mesh(&MeshSettings::default().with_quality(40)).unwrap();
    assert!((mesh.volume() - 8.0).abs() < 0.2, "volume {}", mesh.volume());
}

#[test]
fn sketch_outline_and_export() {
    let mut p = Polygon::new();
    p.add(0.0, 0.0);
    p.add(6.0, 0.0).smooth(1.0, 8);
    p.add(6.0, 4.0);
    p.add(0.0, 4.0);
    p.close();
    let plate = Sketch::from_polygon(p)
        .unwrap()
        .difference(Sketch::circle(1.0).unwrap().translate(2.0, 2.0));
    assert!(plate.evaluate(V2::new(2.0, 2.0)) > 0.0);
    assert!(plate.evaluate(V2::new(4.5, 2.0)) < 0.0);

    let settings = ContourSettings::default().with_quality(120);
    let expected = 24.0 - (1.0 - PI / 4.0) - PI;
    let outline = plate.outline(&settings).unwrap();
    assert!((outline.signed_area() - expected).abs() < 0.1, "area {}", outline.signed_area());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.svg");
    let written = plate.export_svg(&path, &settings).unwrap();
    assert_eq!(written.len(), outline.len());
    assert!(path.exists());
}

#[test]
fn invalid_dimensions_are_rejected() {
    assert!(Shape::sphere(-1.0).is_err());
    assert!(Shape::torus(1.0, f64::NAN).is_err());
    assert!(Sketch::circle(1.0).unwrap().extrude(-2.0).is_err());
    assert!(Shape::sphere(1.0).unwrap().scale(0.0).is_err());
}
