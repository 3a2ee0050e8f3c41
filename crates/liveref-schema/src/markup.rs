//! Persisted markup
//!
//! A reference node persists as one inline element carrying the node-type
//! discriminator and the codec's attribute bag:
//!
//! ```text
//! <span data-type="entity-reference" data-id="B07XJ8C8F5" data-alignment="center"></span>
//! ```
//!
//! Everything else in a document is host markup and is carried through
//! byte-for-byte.

use crate::document::Inline;
use crate::node::{NodeKind, ReferenceNode, DISCRIMINATOR, ELEMENT};
use liveref_codec::{decode, AttrBag};
use quick_xml::escape::{escape, resolve_html5_entity};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Write;

/// Serialize one reference node to its persisted element
#[must_use]
pub fn serialize_node(node: &ReferenceNode) -> String {
    let mut out = format!(
        "<{ELEMENT} {DISCRIMINATOR}=\"{}\"",
        node.kind().type_name()
    );
    for (key, value) in node.encode() {
        let _ = write!(out, " {key}=\"{}\"", escape(value.as_str()));
    }
    let _ = write!(out, "></{ELEMENT}>");
    out
}

/// Parse a persisted document into host markup chunks and reference nodes
///
/// Reference elements are recognized by their discriminator alone; their
/// interior, if any, is discarded. Parsing never fails:
///
/// - a reference element whose required identifier is empty, or whose
///   attributes cannot be unescaped, is kept as host markup
/// - a reference element that is never closed is read as self-closing
/// - input the tokenizer rejects is kept verbatim from that point on
#[must_use]
pub fn parse_pieces(markup: &str) -> Vec<Inline> {
    let mut pieces = Vec::new();
    let mut pending = String::new();
    scan(markup, &mut pieces, &mut pending);
    if !pending.is_empty() {
        pieces.push(Inline::Markup(pending));
    }
    pieces
}

/// Parse the first reference node found in a markup fragment
#[must_use]
pub fn parse_node(fragment: &str) -> Option<ReferenceNode> {
    parse_pieces(fragment).into_iter().find_map(|piece| match piece {
        Inline::Node(node) => Some(node),
        Inline::Markup(_) => None,
    })
}

fn scan(markup: &str, pieces: &mut Vec<Inline>, pending: &mut String) {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().check_end_names = false;

    loop {
        let start = position(&reader, markup);
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(position = start, error = %err, "keeping untokenizable markup verbatim");
                pending.push_str(&markup[start..]);
                return;
            }
        };

        let (element, has_interior) = match &event {
            Event::Eof => return,
            Event::Start(e) => (Some(e), true),
            Event::Empty(e) => (Some(e), false),
            _ => (None, false),
        };

        let Some((e, kind)) = element.and_then(|e| reference_kind(e).map(|kind| (e, kind))) else {
            pending.push_str(&markup[start..position(&reader, markup)]);
            continue;
        };

        let after_start = position(&reader, markup);
        let unclosed = has_interior && reader.read_to_end(e.name()).is_err();
        let end = if unclosed { after_start } else { position(&reader, markup) };
        push_reference(kind, e, &markup[start..end], pieces, pending);

        if unclosed {
            tracing::warn!(kind = kind.type_name(), position = start, "reference element never closed");
            scan(&markup[after_start..], pieces, pending);
            return;
        }
    }
}

fn push_reference(kind: NodeKind, e: &BytesStart<'_>, raw: &str, pieces: &mut Vec<Inline>, pending: &mut String) {
    let Some(bag) = attribute_bag(e) else {
        tracing::warn!(kind = kind.type_name(), "keeping reference element with unresolvable entities as markup");
        pending.push_str(raw);
        return;
    };
    let node = match kind {
        NodeKind::EntityReference => ReferenceNode::EntityReference(decode(&bag)),
        NodeKind::FieldProjection => ReferenceNode::FieldProjection(decode(&bag)),
    };
    match node.validate() {
        Ok(()) => {
            if !pending.is_empty() {
                pieces.push(Inline::Markup(std::mem::take(pending)));
            }
            pieces.push(Inline::Node(node));
        }
        Err(err) => {
            tracing::warn!(kind = kind.type_name(), error = %err, "keeping invalid reference element as markup");
            pending.push_str(raw);
        }
    }
}

fn position(reader: &Reader<&[u8]>, markup: &str) -> usize {
    usize::try_from(reader.buffer_position()).map_or(markup.len(), |p| p.min(markup.len()))
}

fn reference_kind(e: &BytesStart<'_>) -> Option<NodeKind> {
    e.html_attributes()
        .flatten()
        .find(|a| a.key.as_ref() == DISCRIMINATOR.as_bytes())
        .and_then(|a| attr_value(&a))
        .and_then(|name| NodeKind::from_type_name(&name))
}

/// Attribute value with XML and HTML5 named entities resolved
fn attr_value(attr: &Attribute<'_>) -> Option<String> {
    attr.unescape_value_with(resolve_html5_entity)
        .ok()
        .map(std::borrow::Cow::into_owned)
}

/// `None` if any value holds an entity that cannot be resolved
fn attribute_bag(e: &BytesStart<'_>) -> Option<AttrBag> {
    e.html_attributes()
        .flatten()
        .filter(|a| a.key.as_ref() != DISCRIMINATOR.as_bytes())
        .map(|a| Some((String::from_utf8_lossy(a.key.as_ref()).into_owned(), attr_value(&a)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveref_codec::{Alignment, DisplayStyle, EntityReferenceAttrs, FieldProjectionAttrs};
    use pretty_assertions::assert_eq;

    #[test]
    fn serialize_entity_reference() {
        let node = ReferenceNode::EntityReference(
            EntityReferenceAttrs::new("B07XJ8C8F5").with_alignment(Alignment::Center),
        );
        assert_eq!(
            serialize_node(&node),
            r#"<span data-type="entity-reference" data-alignment="center" data-id="B07XJ8C8F5"></span>"#
        );
    }

    #[test]
    fn serialize_escapes_values() {
        let node = ReferenceNode::EntityReference(EntityReferenceAttrs {
            title: Some(r#"Tom & Jerry "Deluxe" <Box>"#.to_string()),
            ..EntityReferenceAttrs::new("B07XJ8C8F5")
        });
        let markup = serialize_node(&node);
        assert!(markup.contains("data-title=\"Tom &amp; Jerry &quot;Deluxe&quot; &lt;Box&gt;\""));

        let parsed = parse_node(&markup).unwrap();
        assert_eq!(parsed, node);
    }

    #[test]
    fn parse_self_closing_and_paired_elements() {
        let paired = r#"<span data-type="field-projection" data-entity-id="B07XJ8C8F5" data-field-id="price">$9.99</span>"#;
        let empty = r#"<span data-type="field-projection" data-entity-id="B07XJ8C8F5" data-field-id="price"/>"#;
        let expected = ReferenceNode::FieldProjection(FieldProjectionAttrs::new("B07XJ8C8F5", "price"));

        assert_eq!(parse_node(paired), Some(expected.clone()));
        assert_eq!(parse_node(empty), Some(expected));
    }

    #[test]
    fn parse_legacy_discriminator_and_aliases() {
        let legacy = r#"<div data-type="product-embed" data-asin="B07XJ8C8F5" data-style="card" data-image-url="a.jpg"></div>"#;
        let node = parse_node(legacy).unwrap();
        let ReferenceNode::EntityReference(attrs) = node else {
            panic!("expected entity reference");
        };
        assert_eq!(attrs.id, "B07XJ8C8F5");
        assert_eq!(attrs.display_style, DisplayStyle::Card);
        assert_eq!(attrs.image.as_deref(), Some("a.jpg"));
    }

    #[test]
    fn host_markup_is_preserved_verbatim() {
        let markup = r#"<p>Try <strong>this</strong>&nbsp;kettle: <span data-type="entity-reference" data-id="B07XJ8C8F5"></span><br> it boils fast.</p>"#;
        let pieces = parse_pieces(markup);
        assert_eq!(pieces.len(), 3);
        assert_eq!(
            pieces[0],
            Inline::Markup("<p>Try <strong>this</strong>&nbsp;kettle: ".to_string())
        );
        assert!(matches!(pieces[1], Inline::Node(_)));
        assert_eq!(pieces[2], Inline::Markup("<br> it boils fast.</p>".to_string()));
    }

    #[test]
    fn invalid_reference_is_kept_as_markup() {
        let markup = r#"<span data-type="entity-reference" data-id=""></span>"#;
        let pieces = parse_pieces(markup);
        assert_eq!(pieces, vec![Inline::Markup(markup.to_string())]);
    }

    #[test]
    fn unrelated_spans_are_markup() {
        let markup = r#"<span class="note">hi</span>"#;
        assert_eq!(parse_node(markup), None);
    }

    fn rejoin(pieces: &[Inline]) -> String {
        pieces
            .iter()
            .map(|piece| match piece {
                Inline::Markup(raw) => raw.clone(),
                Inline::Node(node) => serialize_node(node),
            })
            .collect()
    }

    #[test]
    fn unclosed_reference_reads_as_self_closing() {
        let markup = r#"<p>See <span data-type="entity-reference" data-id="B07XJ8C8F5"> for details</p>"#;
        let pieces = parse_pieces(markup);
        assert_eq!(
            pieces,
            vec![
                Inline::Markup("<p>See ".to_string()),
                Inline::Node(ReferenceNode::EntityReference(EntityReferenceAttrs::new("B07XJ8C8F5"))),
                Inline::Markup(" for details</p>".to_string()),
            ]
        );
    }

    #[test]
    fn bare_angle_bracket_in_text_is_kept() {
        let markup = r#"<p>5 < 6 <span data-type="entity-reference" data-id="B07XJ8C8F5"></span></p>"#;
        let pieces = parse_pieces(markup);
        assert!(!pieces.is_empty());
        assert_eq!(rejoin(&pieces), markup);
    }

    #[test]
    fn html_entities_in_attributes_resolve() {
        let markup = r#"<span data-type="entity-reference" data-id="B07XJ8C8F5" data-title="A&amp;B&nbsp;C"></span>"#;
        let ReferenceNode::EntityReference(attrs) = parse_node(markup).unwrap() else {
            panic!("expected entity reference");
        };
        assert_eq!(attrs.title.as_deref(), Some("A&B\u{a0}C"));

        let saved = rejoin(&parse_pieces(markup));
        assert!(!saved.contains("&amp;amp;"));
        assert_eq!(rejoin(&parse_pieces(&saved)), saved);
        assert_eq!(parse_node(&saved), Some(ReferenceNode::EntityReference(attrs)));
    }

    #[test]
    fn unknown_entity_keeps_element_verbatim() {
        let markup = r#"<span data-type="entity-reference" data-id="B07XJ8C8F5" data-title="A&bogus;B"></span>"#;
        assert_eq!(parse_pieces(markup), vec![Inline::Markup(markup.to_string())]);
    }
}
