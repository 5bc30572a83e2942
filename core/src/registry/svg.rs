//! Building a [`MemoryDiagram`] from SVG markup

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::MemoryDiagram;
use super::RegionRegistry;

/// Errors raised while reading a diagram resource
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("malformed SVG: {0}")]
    Malformed(#[from] quick_xml::Error),

    #[error("document has no <svg> root element")]
    MissingRoot,
}

impl MemoryDiagram {
    /// Parse SVG markup, registering every element that carries an `id`
    /// plus every `text`/`tspan` element. Inline `style` attributes seed the
    /// element's properties so hidden-by-default regions start hidden.
    pub fn from_svg(markup: &str) -> Result<Self, DiagramError> {
        let mut reader = Reader::from_str(markup);
        reader.config_mut().trim_text(true);

        let mut diagram = MemoryDiagram::new();
        let mut saw_root = false;

        loop {
            match reader.read_event()? {
                Event::Start(el) | Event::Empty(el) => {
                    let tag = String::from_utf8_lossy(el.local_name().as_ref()).into_owned();
                    if tag == "svg" {
                        saw_root = true;
                    }
                    register(&mut diagram, &el, &tag)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(DiagramError::MissingRoot);
        }

        tracing::debug!(
            elements = diagram.len(),
            addressable = diagram.element_ids().len(),
            "Loaded SVG diagram"
        );
        Ok(diagram)
    }
}

fn register(diagram: &mut MemoryDiagram, el: &BytesStart<'_>, tag: &str) -> Result<(), DiagramError> {
    let mut id = None;
    let mut style = None;

    for attr in el.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        match attr.key.local_name().as_ref() {
            b"id" => id = Some(attr.unescape_value().map_err(quick_xml::Error::from)?.into_owned()),
            b"style" => style = Some(attr.unescape_value().map_err(quick_xml::Error::from)?.into_owned()),
            _ => {}
        }
    }

    let is_text = matches!(tag, "text" | "tspan");
    let handle = match id {
        Some(id) if !id.is_empty() => diagram.insert(id, tag),
        _ if is_text => diagram.insert_anonymous(tag),
        _ => return Ok(()),
    };

    if let Some(style) = style {
        for (property, value) in parse_inline_style(&style) {
            diagram.set_property(handle, property, value);
        }
    }
    Ok(())
}

/// Split `"display: none; opacity:0"` into property/value pairs
fn parse_inline_style(style: &str) -> impl Iterator<Item = (&str, &str)> {
    style.split(';').filter_map(|decl| {
        let (property, value) = decl.split_once(':')?;
        let property = property.trim();
        let value = value.trim();
        (!property.is_empty() && !value.is_empty()).then_some((property, value))
    })
}
