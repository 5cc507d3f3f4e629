use std::f64::consts::TAU;
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use sdfkit::ops2::{multi2, Cut2, Elongate2, RotateCopy2, Transform2};
use sdfkit::ops3::{Cut3, Elongate3, Offset3, RotateCopy3, Transform3};
use sdfkit::{Affine2, Affine3, Circle, Sdf2, Sdf2Ref, Sdf3, Sdf3Ref, SdfError, Sphere, V2, V3};

fn sphere(r: f64) -> Sdf3Ref {
    Arc::new(Sphere::new(r).unwrap())
}

fn circle(r: f64) -> Sdf2Ref {
    Arc::new(Circle::new(r).unwrap())
}

#[test]
fn elongate_stretches_into_a_capsule() {
    let e = Elongate3::new(sphere(1.0), V3::new(0.0, 0.0, 4.0)).unwrap();
    assert_abs_diff_eq!(e.evaluate(V3::new(1.0, 0.0, 2.0)), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(e.evaluate(V3::new(0.0, 0.0, 3.0)), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(e.evaluate(V3::new(0.0, 0.0, 4.0)), 1.0, epsilon = 1e-12);
    let b = e.bounding_box();
    assert_abs_diff_eq!(b.max.z, 3.0, epsilon = 1e-12);

    let e2 = Elongate2::new(circle(1.0), V2::new(2.0, 0.0)).unwrap();
    assert_abs_diff_eq!(e2.evaluate(V2::new(0.5, 1.0)), 0.0, epsilon = 1e-12);
    assert!(Elongate2::new(circle(1.0), V2::new(-1.0, 0.0)).is_err());
}

#[test]
fn cut_keeps_the_side_the_normal_points_to() {
    let half = Cut3::new(sphere(2.0), V3::zeros(), V3::new(0.0, 0.0, 1.0)).unwrap();
    assert!(half.evaluate(V3::new(0.0, 0.0, 1.0)) < 0.0);
    assert!(half.evaluate(V3::new(0.0, 0.0, -1.0)) > 0.0);
    assert_abs_diff_eq!(half.evaluate(V3::new(0.0, 0.0, -1.0)), 1.0, epsilon = 1e-12);

    let right = Cut2::new(circle(1.0), V2::zeros(), V2::new(1.0, 0.0)).unwrap();
    assert!(right.evaluate(V2::new(0.5, 0.0)) < 0.0);
    assert!(right.evaluate(V2::new(-0.5, 0.0)) > 0.0);
    assert!(matches!(
        Cut2::new(circle(1.0), V2::zeros(), V2::zeros()),
        Err(SdfError::InvalidParameter { .. })
    ));
}

#[test]
fn rotate_copy_repeats_around_z() {
    let arm: Sdf3Ref = Arc::new(Transform3::new(sphere(0.5), Affine3::translation(V3::new(3.0, 0.0, 0.0))));
    let star = RotateCopy3::new(arm, 4).unwrap();
    for p in [V3::new(3.0, 0.0, 0.0), V3::new(0.0, 3.0, 0.0), V3::new(-3.0, 0.0, 0.0), V3::new(0.0, -3.0, 0.0)] {
        assert_abs_diff_eq!(star.evaluate(p), -0.5, epsilon = 1e-9);
    }
    assert!(star.evaluate(V3::new(2.1, 2.1, 0.0)) > 0.0);

    let dot: Sdf2Ref = Arc::new(Transform2::new(circle(0.2), Affine2::translation(V2::new(1.0, 0.0))));
    let ring = RotateCopy2::new(dot, 3).unwrap();
    let third = 2.0 * TAU / 3.0;
    let at = V2::new(third.cos(), third.sin());
    assert_abs_diff_eq!(ring.evaluate(at), -0.2, epsilon = 1e-9);
}

#[test]
fn multi_places_copies() {
    let holes = multi2(circle(0.5), &[V2::new(-2.0, 0.0), V2::new(2.0, 0.0)]).unwrap();
    assert_abs_diff_eq!(holes.evaluate(V2::new(2.0, 0.0)), -0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(holes.evaluate(V2::zeros()), 1.5, epsilon = 1e-12);
    assert!(matches!(multi2(circle(0.5), &[]), Err(SdfError::MissingOperand(_))));
}

#[test]
fn mirror_is_rigid() {
    let t = Affine3::mirror_yz();
    assert!(t.is_rigid());
    let moved = Transform3::new(
        Arc::new(Transform3::new(sphere(1.0), Affine3::translation(V3::new(2.0, 0.0, 0.0)))),
        t,
    );
    assert_abs_diff_eq!(moved.evaluate(V3::new(-2.0, 0.0, 0.0)), -1.0, epsilon = 1e-12);
}

#[test]
fn negative_offset_shrinks() {
    let s = Offset3::new(sphere(2.0), -0.5).unwrap();
    assert_abs_diff_eq!(s.evaluate(V3::new(1.5, 0.0, 0.0)), 0.0, epsilon = 1e-12);
    assert!(Offset3::new(sphere(2.0), f64::INFINITY).is_err());
}
