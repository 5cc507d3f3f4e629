use std::fs;

use sdfkit::export::{save_stl, write_stl};
use sdfkit::{
    render_dxf, render_stl, render_svg, CancelToken, Circle, ContourSettings, Mesh, MeshSettings,
    Outcome, SdfError, Sphere,
};

#[test]
fn stl_file_size_matches_triangle_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sphere.stl");
    let sphere = Sphere::new(2.0).unwrap();
    let settings = MeshSettings::default().with_quality(16);
    let mesh = match render_stl(&sphere, &path, &settings, &CancelToken::new()).unwrap() {
        Outcome::Complete(m) => m,
        Outcome::Cancelled(_) => panic!("not cancelled"),
    };
    assert!(!mesh.is_empty());
    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 84 + 50 * mesh.len());
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]);
    assert_eq!(count as usize, mesh.len());
}

#[test]
fn file_matches_in_memory_writer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sphere.stl");
    let mesh = render_stl(
        &Sphere::new(1.0).unwrap(),
        &path,
        &MeshSettings::default().with_quality(10),
        &CancelToken::new(),
    )
    .unwrap()
    .complete()
    .unwrap();
    let mut buf = Vec::new();
    write_stl(&mesh, &mut buf).unwrap();
    assert_eq!(fs::read(&path).unwrap(), buf);
}

#[test]
fn dxf_and_svg_outlines() {
    let dir = tempfile::tempdir().unwrap();
    let circle = Circle::new(3.0).unwrap();
    let settings = ContourSettings::default().with_quality(40);

    let dxf = dir.path().join("circle.dxf");
    let outline = render_dxf(&circle, &dxf, &settings, &CancelToken::new())
        .unwrap()
        .complete()
        .unwrap();
    let text = fs::read_to_string(&dxf).unwrap();
    assert_eq!(text.matches("\nLINE\n").count(), outline.len());
    assert!(text.trim_end().ends_with("EOF"));

    let svg = dir.path().join("circle.svg");
    render_svg(&circle, &svg, &settings, &CancelToken::new()).unwrap();
    let text = fs::read_to_string(&svg).unwrap();
    assert!(text.starts_with("<?xml") || text.starts_with("<svg"));
    assert_eq!(text.matches("<line ").count(), outline.len());
}

#[test]
fn cancelled_render_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.stl");
    let cancel = CancelToken::new();
    cancel.cancel();
    let outcome = render_stl(
        &Sphere::new(1.0).unwrap(),
        &path,
        &MeshSettings::default().with_quality(10),
        &cancel,
    )
    .unwrap();
    assert!(outcome.is_cancelled());
    assert!(!path.exists());

    let svg = dir.path().join("never.svg");
    let outcome = render_svg(&Circle::new(1.0).unwrap(), &svg, &ContourSettings::default(), &cancel).unwrap();
    assert!(outcome.is_cancelled());
    assert!(!svg.exists());
}

#[test]
fn missing_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no/such/dir/out.stl");
    let err = save_stl(&path, &Mesh::default()).unwrap_err();
    assert!(matches!(err, SdfError::Io(_)));
}
