//! STL export.
//!
//! Binary STL is an 80-byte header, a little-endian `u32` facet count, then
//! 50 bytes per facet: the unit normal and three vertices as `f32`, and a
//! zero attribute word.

use std::io::{self, Write};

use crate::mesh::Mesh;

const HEADER: &[u8] = b"binary STL written by sdfkit";

/// Write `mesh` as binary STL.
pub fn write_stl<W: Write>(mesh: &Mesh, writer: &mut W) -> io::Result<()> {
    let mut header = [0u8; 80];
    header[..HEADER.len()].copy_from_slice(HEADER);
    writer.write_all(&header)?;

    let count = u32::try_from(mesh.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many triangles for STL"))?;
    writer.write_all(&count.to_le_bytes())?;

    let mut facet = [0u8; 50];
    for t in &mesh.triangles {
        let n = t.normal();
        let values = [n, t.v[0], t.v[1], t.v[2]];
        for (i, v) in values.iter().enumerate() {
            for (j, c) in v.iter().enumerate() {
                let at = 12 * i + 4 * j;
                facet[at..at + 4].copy_from_slice(&(*c as f32).to_le_bytes());
            }
        }
        writer.write_all(&facet)?;
    }
    Ok(())
}

/// Write `mesh` as ASCII STL.
pub fn write_stl_ascii<W: Write>(mesh: &Mesh, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "solid sdfkit")?;
    for t in &mesh.triangles {
        let n = t.normal();
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for v in &t.v {
            writeln!(writer, "      vertex {:e} {:e} {:e}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid sdfkit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Triangle3;
    use crate::types::V3;

    fn one_triangle() -> Mesh {
        Mesh::new(vec![Triangle3::new(V3::zeros(), V3::x(), V3::y())])
    }

    #[test]
    fn binary_layout() {
        let mut buf = Vec::new();
        write_stl(&one_triangle(), &mut buf).unwrap();
        assert_eq!(buf.len(), 84 + 50);
        assert!(buf.starts_with(HEADER));
        assert_eq!(u32::from_le_bytes([buf[80], buf[81], buf[82], buf[83]]), 1);
        // Normal is +z.
        let nz = f32::from_le_bytes([buf[92], buf[93], buf[94], buf[95]]);
        assert_eq!(nz, 1.0);
        // Second vertex x.
        let x = f32::from_le_bytes([buf[108], buf[109], buf[110], buf[111]]);
        assert_eq!(x, 1.0);
        assert_eq!(&buf[132..134], &[0, 0]);
    }

    #[test]
    fn ascii_has_one_facet_per_triangle() {
        let mut buf = Vec::new();
        write_stl_ascii(&one_triangle(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("solid sdfkit"));
        assert_eq!(text.lines().filter(|l| l.trim_start().starts_with("facet normal")).count(), 1);
        assert_eq!(text.lines().filter(|l| l.trim_start().starts_with("vertex")).count(), 3);
        assert!(text.trim_end().ends_with("endsolid sdfkit"));
    }
}
