//! Count drawable elements in serialized SVG.

use quick_xml::{Reader, events::Event};

/// Element names that paint something.
const DRAWABLE: &[&[u8]] = &[
    b"path",
    b"rect",
    b"circle",
    b"ellipse",
    b"polygon",
    b"polyline",
    b"line",
];

/// Containers whose children are not rendered directly.
const NON_RENDERED: &[&[u8]] = &[b"defs", b"clipPath", b"mask", b"symbol", b"pattern"];

/// Number of drawable elements outside non-rendered containers.
pub fn count_elements(svg: &str) -> Result<usize, quick_xml::Error> {
    let mut reader = Reader::from_str(svg);
    let mut count = 0;
    let mut hidden_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name();
                if hidden_depth > 0 || NON_RENDERED.contains(&name.as_ref()) {
                    hidden_depth += 1;
                } else if DRAWABLE.contains(&name.as_ref()) {
                    count += 1;
                }
            }
            Event::Empty(e) => {
                if hidden_depth == 0 && DRAWABLE.contains(&e.local_name().as_ref()) {
                    count += 1;
                }
            }
            Event::End(_) => {
                hidden_depth = hidden_depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(count)
}
