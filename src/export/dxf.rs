//! DXF (R12) export of outlines as `LINE` entities on layer 0.

use std::io::{self, Write};

use crate::mesh::Outline;
use crate::types::{Box2, V2};

fn pair<W: Write>(writer: &mut W, code: u16, value: impl std::fmt::Display) -> io::Result<()> {
    writeln!(writer, "{code}")?;
    writeln!(writer, "{value}")
}

/// Write `outline` as an R12 DXF drawing. The header extents are the
/// segment bounding box.
pub fn write_dxf<W: Write>(outline: &Outline, writer: &mut W) -> io::Result<()> {
    let extents = outline
        .bounding_box()
        .unwrap_or_else(|| Box2::new(V2::zeros(), V2::zeros()));

    pair(writer, 0, "SECTION")?;
    pair(writer, 2, "HEADER")?;
    pair(writer, 9, "$ACADVER")?;
    pair(writer, 1, "AC1009")?;
    pair(writer, 9, "$EXTMIN")?;
    pair(writer, 10, extents.min.x)?;
    pair(writer, 20, extents.min.y)?;
    pair(writer, 9, "$EXTMAX")?;
    pair(writer, 10, extents.max.x)?;
    pair(writer, 20, extents.max.y)?;
    pair(writer, 0, "ENDSEC")?;

    pair(writer, 0, "SECTION")?;
    pair(writer, 2, "ENTITIES")?;
    for s in &outline.segments {
        pair(writer, 0, "LINE")?;
        pair(writer, 8, "0")?;
        pair(writer, 10, s.a.x)?;
        pair(writer, 20, s.a.y)?;
        pair(writer, 30, 0.0)?;
        pair(writer, 11, s.b.x)?;
        pair(writer, 21, s.b.y)?;
        pair(writer, 31, 0.0)?;
    }
    pair(writer, 0, "ENDSEC")?;
    pair(writer, 0, "EOF")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Segment2;

    #[test]
    fn one_line_entity_per_segment() {
        let outline = Outline::new(vec![
            Segment2::new(V2::new(0.0, 0.0), V2::new(2.0, 0.0)),
            Segment2::new(V2::new(2.0, 0.0), V2::new(2.0, 3.0)),
        ]);
        let mut buf = Vec::new();
        write_dxf(&outline, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.iter().filter(|l| **l == "LINE").count(), 2);
        assert_eq!(lines.last(), Some(&"EOF"));
        // $EXTMAX follows the segment extents.
        let at = lines.iter().position(|l| *l == "$EXTMAX").unwrap();
        assert_eq!(lines[at + 2], "2");
        assert_eq!(lines[at + 4], "3");
    }
}
