//! SVG export of outlines.
//!
//! SVG's y axis points down, so y is negated on output and the drawing
//! keeps its orientation.

use std::io::{self, Write};

use crate::mesh::Outline;

/// Stroke width as a fraction of the larger drawing extent.
const STROKE_FRACTION: f64 = 0.002;

/// Write `outline` as an SVG document with one `<line>` per segment and a
/// `viewBox` fitted to the segment extents.
pub fn write_svg<W: Write>(outline: &Outline, writer: &mut W) -> io::Result<()> {
    let (x, y, w, h) = match outline.bounding_box() {
        Some(b) => {
            let size = b.size();
            (b.min.x, -b.max.y, size.x, size.y)
        }
        None => (0.0, 0.0, 0.0, 0.0),
    };
    let stroke = (w.max(h) * STROKE_FRACTION).max(f64::MIN_POSITIVE);

    writeln!(writer, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(
        writer,
        r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}">"#
    )?;
    writeln!(writer, r#"<g fill="none" stroke="black" stroke-width="{stroke}">"#)?;
    for s in &outline.segments {
        writeln!(
            writer,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
            s.a.x, -s.a.y, s.b.x, -s.b.y
        )?;
    }
    writeln!(writer, "</g>")?;
    writeln!(writer, "</svg>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Segment2;
    use crate::types::V2;

    #[test]
    fn view_box_flips_y() {
        let outline = Outline::new(vec![Segment2::new(V2::new(1.0, 2.0), V2::new(4.0, 6.0))]);
        let mut buf = Vec::new();
        write_svg(&outline, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(r#"viewBox="1 -6 3 4""#), "{text}");
        assert!(text.contains(r#"<line x1="1" y1="-2" x2="4" y2="-6"/>"#));
        assert!(text.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn empty_outline_is_valid_document() {
        let mut buf = Vec::new();
        write_svg(&Outline::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches("<line").count(), 0);
        assert!(text.contains("</svg>"));
    }
}
