use std::f64::consts::{FRAC_PI_2, PI};

use approx::assert_abs_diff_eq;
use sdfkit::{
    Box2Sdf, BoxSdf3, Capsule, Circle, Cone, Cylinder, Line2, PolySdf2, Sdf2, Sdf3, Sphere,
    Spiral2, Torus, V2, V3,
};

#[test]
fn sphere_zero_on_surface() {
    let s = Sphere::new(3.0).unwrap();
    for p in [V3::new(3.0, 0.0, 0.0), V3::new(0.0, -3.0, 0.0), V3::new(1.0, 2.0, 2.0)] {
        assert_abs_diff_eq!(s.evaluate(p), 0.0, epsilon = 1e-12);
    }
    assert_abs_diff_eq!(s.evaluate(V3::zeros()), -3.0, epsilon = 1e-12);
}

#[test]
fn box_zero_on_faces_edges_and_corners() {
    let b = BoxSdf3::new(V3::new(2.0, 4.0, 6.0), 0.0).unwrap();
    for p in [
        V3::new(1.0, 0.0, 0.0),
        V3::new(0.3, -2.0, 1.0),
        V3::new(0.0, 0.0, 3.0),
        V3::new(1.0, 2.0, 0.0),
        V3::new(-1.0, -2.0, -3.0),
    ] {
        assert_abs_diff_eq!(b.evaluate(p), 0.0, epsilon = 1e-12);
    }
    assert_abs_diff_eq!(b.evaluate(V3::new(2.0, 0.0, 0.0)), 1.0, epsilon = 1e-12);
}

#[test]
fn rounded_box_keeps_its_extent() {
    let b = BoxSdf3::new(V3::repeat(4.0), 0.5).unwrap();
    assert_abs_diff_eq!(b.evaluate(V3::new(2.0, 0.0, 0.0)), 0.0, epsilon = 1e-12);
    // The corner is rounded away.
    assert!(b.evaluate(V3::repeat(2.0)) > 0.0);
}

#[test]
fn cylinder_zero_on_side_and_caps() {
    let c = Cylinder::new(4.0, 1.5, 0.0).unwrap();
    assert_abs_diff_eq!(c.evaluate(V3::new(1.5, 0.0, 0.5)), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(c.evaluate(V3::new(0.0, 0.5, 2.0)), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(c.evaluate(V3::new(0.0, 0.0, -2.0)), 0.0, epsilon = 1e-12);
}

#[test]
fn capsule_zero_on_caps_and_side() {
    let c = Capsule::new(6.0, 1.0).unwrap();
    assert_abs_diff_eq!(c.evaluate(V3::new(0.0, 0.0, 3.0)), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(c.evaluate(V3::new(1.0, 0.0, 0.0)), 0.0, epsilon = 1e-12);
}

#[test]
fn cone_zero_on_rims() {
    let c = Cone::new(2.0, 2.0, 1.0, 0.0).unwrap();
    assert_abs_diff_eq!(c.evaluate(V3::new(2.0, 0.0, -1.0)), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(c.evaluate(V3::new(0.0, 1.0, 1.0)), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(c.evaluate(V3::new(1.5, 0.0, 0.0)), 0.0, epsilon = 1e-9);
}

#[test]
fn torus_zero_on_tube() {
    let t = Torus::new(4.0, 1.0).unwrap();
    assert_abs_diff_eq!(t.evaluate(V3::new(5.0, 0.0, 0.0)), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(t.evaluate(V3::new(0.0, 4.0, 1.0)), 0.0, epsilon = 1e-12);
}

#[test]
fn planar_primitives_zero_on_boundary() {
    let c = Circle::new(2.0).unwrap();
    assert_abs_diff_eq!(c.evaluate(V2::new(0.0, 2.0)), 0.0, epsilon = 1e-12);

    let r = Box2Sdf::new(V2::new(4.0, 2.0), 0.0).unwrap();
    assert_abs_diff_eq!(r.evaluate(V2::new(2.0, 0.3)), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(r.evaluate(V2::new(-1.0, -1.0)), 0.0, epsilon = 1e-12);

    let l = Line2::new(4.0, 0.5).unwrap();
    assert_abs_diff_eq!(l.evaluate(V2::new(1.0, 0.5)), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(l.evaluate(V2::new(2.5, 0.0)), 0.0, epsilon = 1e-12);

    let tri = PolySdf2::new(vec![V2::new(0.0, 0.0), V2::new(4.0, 0.0), V2::new(0.0, 3.0)]).unwrap();
    assert_abs_diff_eq!(tri.evaluate(V2::new(2.0, 1.5)), 0.0, epsilon = 1e-12);
    assert!(tri.evaluate(V2::new(1.0, 1.0)) < 0.0);
    assert!(tri.evaluate(V2::new(3.0, 3.0)) > 0.0);
}

#[test]
fn spiral_passes_through_its_curve() {
    let s = Spiral2::new(0.0, 4.0 * PI, 0.1).unwrap();
    let t = 2.5 * PI;
    let on_curve = V2::new(t * t.cos(), t * t.sin());
    assert_abs_diff_eq!(s.evaluate(on_curve), -0.1, epsilon = 1e-6);
    assert_abs_diff_eq!(s.evaluate(V2::new(0.0, FRAC_PI_2)), -0.1, epsilon = 1e-6);
}

#[test]
fn bounding_boxes_enclose_surface_points() {
    let c = Cylinder::new(4.0, 1.5, 0.2).unwrap();
    let b = c.bounding_box();
    assert!(b.contains(V3::new(1.5, 0.0, 2.0)));
    let t = Torus::new(4.0, 1.0).unwrap().bounding_box();
    assert!(t.contains(V3::new(-5.0, 0.0, 0.0)) && t.contains(V3::new(0.0, 5.0, 1.0)));
}

#[test]
fn invalid_parameters_rejected() {
    assert!(Sphere::new(-1.0).is_err());
    assert!(Sphere::new(f64::NAN).is_err());
    assert!(BoxSdf3::new(V3::new(1.0, 1.0, 1.0), 0.6).is_err());
    assert!(Cylinder::new(-2.0, 1.0, 0.0).is_err());
    assert!(Torus::new(1.0, -0.5).is_err());
    assert!(Circle::new(-2.0).is_err());
    assert!(PolySdf2::new(vec![]).is_err());
}
