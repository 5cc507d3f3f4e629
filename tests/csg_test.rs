use std::sync::Arc;

use approx::assert_abs_diff_eq;
use sdfkit::blend::{self, Blend};
use sdfkit::ops3::Transform3;
use sdfkit::{
    difference3, intersection3, union2, union3, Affine3, BoxSdf3, Circle, Difference2,
    Difference3, Intersection2, Sdf2, Sdf2Ref, Sdf3, Sdf3Ref, SdfError, Sphere, Union3, V2, V3,
};

fn sphere_at(r: f64, c: V3) -> Sdf3Ref {
    Arc::new(Transform3::new(Arc::new(Sphere::new(r).unwrap()), Affine3::translation(c)))
}

fn sample_points() -> Vec<V3> {
    let mut pts = Vec::new();
    for i in -3..=3 {
        for j in -3..=3 {
            for k in -2..=2 {
                pts.push(V3::new(i as f64 * 1.7, j as f64 * 1.3 + 0.1, k as f64 * 2.1));
            }
        }
    }
    pts
}

#[test]
fn hard_union_is_minimum() {
    let a = sphere_at(2.0, V3::new(-1.0, 0.0, 0.0));
    let b: Sdf3Ref = Arc::new(BoxSdf3::new(V3::new(3.0, 2.0, 5.0), 0.0).unwrap());
    let u = Union3::new(vec![a.clone(), b.clone()]).unwrap();
    for p in sample_points() {
        assert_eq!(u.evaluate(p), a.evaluate(p).min(b.evaluate(p)));
    }
}

#[test]
fn difference_is_max_of_negated() {
    let a: Sdf3Ref = Arc::new(BoxSdf3::new(V3::repeat(10.0), 0.0).unwrap());
    let b: Sdf3Ref = Arc::new(Sphere::new(4.0).unwrap());
    let d = Difference3::new(a.clone(), b.clone());
    for p in sample_points() {
        assert_eq!(d.evaluate(p), a.evaluate(p).max(-b.evaluate(p)));
    }
    // Difference does not grow the base box.
    assert_eq!(d.bounding_box(), a.bounding_box());
}

#[test]
fn union_box_contains_children() {
    let children: Vec<Sdf3Ref> = vec![
        sphere_at(1.0, V3::new(5.0, 0.0, 0.0)),
        sphere_at(2.0, V3::new(-3.0, 4.0, 1.0)),
        Arc::new(BoxSdf3::new(V3::new(1.0, 2.0, 8.0), 0.0).unwrap()),
    ];
    let u = Union3::new(children.clone()).unwrap();
    for c in &children {
        assert!(u.bounding_box().contains_box(&c.bounding_box()));
    }
    let rounded = Union3::new(children.clone()).unwrap().with_blend(blend::round(0.5).unwrap());
    assert!(rounded.bounding_box().contains_box(&u.bounding_box()));
}

#[test]
fn pruned_union_matches_exhaustive() {
    let children: Vec<Sdf3Ref> = (0..12)
        .map(|i| {
            let a = i as f64 * 0.7;
            sphere_at(0.5 + 0.1 * i as f64, V3::new(6.0 * a.cos(), 6.0 * a.sin(), i as f64 - 6.0))
        })
        .collect();
    let u = Union3::new(children).unwrap();
    for p in sample_points() {
        assert_abs_diff_eq!(u.evaluate(p), u.evaluate_exhaustive(p), epsilon = 1e-12);
    }
}

#[test]
fn set_blend_changes_union() {
    let a = sphere_at(1.0, V3::new(-0.9, 0.0, 0.0));
    let b = sphere_at(1.0, V3::new(0.9, 0.0, 0.0));
    let mut u = Union3::new(vec![a, b]).unwrap();
    let hard = u.evaluate(V3::new(0.0, 0.9, 0.0));
    u.set_blend(blend::poly(0.5).unwrap());
    assert!(matches!(u.blend(), Blend::Poly(_)));
    let soft = u.evaluate(V3::new(0.0, 0.9, 0.0));
    assert!(soft < hard, "blend should fill the crease: {soft} vs {hard}");
}

#[test]
fn planar_nodes_report_their_blend() {
    let a: Sdf2Ref = Arc::new(Circle::new(2.0).unwrap());
    let b: Sdf2Ref = Arc::new(Circle::new(1.0).unwrap());
    let mut d = Difference2::new(a.clone(), b.clone());
    assert!(matches!(d.blend(), Blend::Hard));
    d.set_blend(blend::chamfer(0.25).unwrap());
    assert!(matches!(d.blend(), Blend::Chamfer(k) if *k == 0.25));
    let i = Intersection2::new(a, b).with_blend(blend::round(0.1).unwrap());
    assert!(matches!(i.blend(), Blend::Round(_)));
}

#[test]
fn rigid_transform_preserves_distance() {
    let child: Sdf3Ref = Arc::new(BoxSdf3::new(V3::new(2.0, 3.0, 4.0), 0.3).unwrap());
    let t = Affine3::rotation(V3::new(1.0, 2.0, -0.5), 0.8)
        .unwrap()
        .then(&Affine3::translation(V3::new(3.0, -1.0, 2.0)));
    assert!(t.is_rigid());
    let moved = Transform3::new(child.clone(), t);
    for p in sample_points() {
        assert_abs_diff_eq!(moved.evaluate(t.apply(p)), child.evaluate(p), epsilon = 1e-9);
    }
}

#[test]
fn operand_rules() {
    let a = sphere_at(1.0, V3::zeros());
    assert!(matches!(union3(Vec::<Sdf3Ref>::new()), Err(SdfError::MissingOperand(_))));
    assert!(matches!(difference3(None, Some(a.clone())), Err(SdfError::MissingOperand(_))));
    assert!(matches!(intersection3(Some(a.clone()), None), Err(SdfError::MissingOperand(_))));

    // A missing subtrahend leaves the base untouched.
    let same = difference3(Some(a.clone()), None).unwrap();
    assert!(Arc::ptr_eq(&same, &a));
    let single = union3(vec![a.clone()]).unwrap();
    assert!(Arc::ptr_eq(&single, &a));
}

#[test]
fn disjoint_intersection_is_empty() {
    let a = sphere_at(1.0, V3::new(-5.0, 0.0, 0.0));
    let b = sphere_at(1.0, V3::new(5.0, 0.0, 0.0));
    let i = intersection3(Some(a), Some(b)).unwrap();
    assert!(i.bounding_box().is_degenerate());
    assert!(i.evaluate(V3::zeros()) > 0.0);
}

#[test]
fn planar_union() {
    let a: Arc<dyn Sdf2> = Arc::new(Circle::new(1.0).unwrap());
    let b: Arc<dyn Sdf2> = Arc::new(sdfkit::ops2::Transform2::new(
        Arc::new(Circle::new(1.0).unwrap()),
        sdfkit::Affine2::translation(V2::new(3.0, 0.0)),
    ));
    let u = union2(vec![a.clone(), b.clone()]).unwrap();
    let p = V2::new(1.4, 0.2);
    assert_eq!(u.evaluate(p), a.evaluate(p).min(b.evaluate(p)));
    assert!(u.bounding_box().contains_box(&b.bounding_box()));
}
