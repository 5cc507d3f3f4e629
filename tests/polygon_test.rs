use approx::assert_relative_eq;
use sdfkit::{nagon, Polygon, Sdf2, SdfError, V2};

fn rounded_plate() -> Polygon {
    let mut p = Polygon::new();
    p.add(0.0, 0.0).smooth(1.0, 6);
    p.add(10.0, 0.0).smooth(1.0, 6);
    p.add(10.0, 6.0).smooth(2.0, 8);
    p.add(0.0, 6.0);
    p.close();
    p
}

#[test]
fn smoothing_is_idempotent() {
    let mut p = rounded_plate();
    assert_eq!(p.smooth().unwrap(), 3);
    let once = p.vertices();
    assert_eq!(p.smooth().unwrap(), 0);
    assert_eq!(p.vertices(), once);
    assert_eq!(p.pending(), 0);
}

#[test]
fn smoothing_adds_facet_points() {
    let mut p = rounded_plate();
    p.smooth().unwrap();
    // Each fillet replaces one corner with facets + 1 points.
    assert_eq!(p.len(), 7 + 7 + 9 + 1);
}

#[test]
fn fillet_trims_area() {
    let mut p = rounded_plate();
    p.smooth().unwrap();
    let sdf = p.to_sdf2().unwrap();
    // The sharp corner point is now outside.
    assert!(sdf.evaluate(V2::new(9.99, 5.99)) > 0.0);
    assert!(sdf.evaluate(V2::new(5.0, 3.0)) < 0.0);
    // Each fillet removes r^2 (1 - π/4) plus the slivers between its
    // chords and the true arc.
    let cut = (1.0 + 1.0 + 4.0) * (1.0 - std::f64::consts::FRAC_PI_4);
    let area = p.to_outline().signed_area();
    assert!(area < 60.0 - cut);
    assert!(area > 60.0 - cut - 0.1);
}

#[test]
fn oversized_request_stays_pending() {
    let mut p = Polygon::new();
    p.add(0.0, 0.0);
    p.add(1.0, 0.0).smooth(5.0, 4);
    p.add(1.0, 1.0);
    p.close();
    assert_eq!(p.smooth().unwrap(), 0);
    assert_eq!(p.pending(), 1);
}

#[test]
fn negative_fillet_radius_rejected() {
    let mut p = Polygon::new();
    p.add(0.0, 0.0);
    p.add(1.0, 0.0).smooth(-1.0, 4);
    p.add(1.0, 1.0);
    p.close();
    assert!(matches!(p.smooth(), Err(SdfError::InvalidParameter { .. })));
}

#[test]
fn relative_and_polar_vertices() {
    let mut p = Polygon::new();
    p.add(1.0, 1.0);
    p.add_rel(2.0, 0.0);
    p.add_polar(2.0, std::f64::consts::FRAC_PI_2);
    assert_eq!(p.vertices()[1], V2::new(3.0, 1.0));
    assert_relative_eq!(p.vertices()[2], V2::new(0.0, 2.0), epsilon = 1e-12);
}

#[test]
fn hexagon() {
    let v = nagon(6, 2.0).unwrap();
    assert_eq!(v.len(), 6);
    for p in &v {
        assert_relative_eq!(p.norm(), 2.0, epsilon = 1e-12);
    }
    assert!(nagon(2, 1.0).is_err());
}
