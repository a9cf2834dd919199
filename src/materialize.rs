//! Module to turn mediainfo XML into tracks without a predeclared schema

use roxmltree::{Document, Node};

use crate::{
    config::DEFAULT_XML_PARSER,
    domain::{Track, TrackCollection},
    error::{MediaInfoError, Result},
};

const TRACK_ELEMENT: &str = "track";
const TYPE_ATTRIBUTE: &str = "type";

/// Fails unless `name` is a parser this crate can load
pub fn ensure_parser(name: &str) -> Result<()> {
    if name.trim().eq_ignore_ascii_case(DEFAULT_XML_PARSER) {
        Ok(())
    } else {
        Err(MediaInfoError::UnsupportedParser(name.to_string()))
    }
}

/// Parses `xml` and builds one [`Track`] per `<track>` element, in document order.
///
/// Every child element becomes an attribute. Children that group further fields
/// (such as `<extra>`) contribute `<group>_<field>` attributes instead, at any depth.
pub fn materialize(xml: &str) -> Result<TrackCollection> {
    log::debug!("materializing {} bytes of XML", xml.len());
    let doc = Document::parse(xml)?;

    let tracks = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == TRACK_ELEMENT)
        .map(track_from_element)
        .collect::<Vec<_>>();

    Ok(TrackCollection::new(tracks))
}

fn track_from_element(element: Node) -> Track {
    let mut track = Track::new(element.attribute(TYPE_ATTRIBUTE).unwrap_or_default());

    for field in element.children().filter(Node::is_element) {
        flatten_field(&mut track, field.tag_name().name().to_string(), field);
    }

    track
}

/// Leaf elements become attributes, groups recurse with their name joined by `_`
fn flatten_field(track: &mut Track, name: String, field: Node) {
    let mut nested = field.children().filter(Node::is_element).peekable();

    if nested.peek().is_none() {
        set_field(track, &name, field);
        return;
    }

    for inner in nested {
        flatten_field(track, format!("{name}_{}", inner.tag_name().name()), inner);
    }
}

fn set_field(track: &mut Track, name: &str, node: Node) {
    let value = node.text().map(str::trim).unwrap_or_default();
    if let Some(previous) = track.insert(name, value) {
        log::warn!(
            "field {name} of {} track collides with an earlier field, {previous:?} replaced by {value:?}",
            track.kind()
        );
    }
}
