//! Persisted markup round trips through the document model

use liveref_codec::{normalize, Alignment, DisplayStyle, EntityReferenceAttrs};
use liveref_schema::{parse_node, serialize_node, Document, Inline, PartialAttrs, ReferenceNode};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const STORED: &str = concat!(
    "<h2>Gift ideas</h2>",
    "<p>The ",
    r#"<span data-type="entity-reference" data-display-style="card" data-id="B07XJ8C8F5" data-title="Kettle"></span>"#,
    " costs ",
    r#"<span data-type="field-projection" data-entity-id="B07XJ8C8F5" data-field-id="price"></span>"#,
    " today.</p>",
);

#[test]
fn canonical_document_round_trips_byte_for_byte() {
    let doc = Document::from_markup(STORED);
    assert_eq!(doc.references().count(), 2);
    assert_eq!(doc.to_markup(), STORED);
}

#[test]
fn entity_escaped_titles_survive_repeated_saves() {
    let stored = r#"<p><span data-type="entity-reference" data-id="B07XJ8C8F5" data-title="A&amp;B&nbsp;C"></span></p>"#;
    let first = Document::from_markup(stored).to_markup();
    let second = Document::from_markup(&first).to_markup();
    assert_eq!(second, first);
    assert!(first.contains("data-title=\"A&amp;B\u{a0}C\""));
}

#[test]
fn unclosed_reference_does_not_swallow_the_paragraph() {
    let stored = r#"<p>See <span data-type="entity-reference" data-id="B07XJ8C8F5"> for details</p>"#;
    let doc = Document::from_markup(stored);
    assert_eq!(doc.references().count(), 1);
    assert_eq!(
        doc.to_markup(),
        r#"<p>See <span data-type="entity-reference" data-id="B07XJ8C8F5"></span> for details</p>"#
    );
}

#[test]
fn legacy_document_is_rewritten_canonically() {
    let legacy = r#"<p><span data-type="product-embed" data-product-id="B07XJ8C8F5" data-align="left" data-image_url="k.jpg"></span></p>"#;
    let doc = Document::from_markup(legacy);
    assert_eq!(
        doc.to_markup(),
        r#"<p><span data-type="entity-reference" data-id="B07XJ8C8F5" data-image="k.jpg"></span></p>"#
    );
}

#[test]
fn edit_session_persists_only_recognized_non_default_attributes() {
    let mut doc = Document::from_markup("<p>Pick: </p>");
    doc.set_cursor(1);

    let mut attrs = PartialAttrs::new();
    attrs.insert("id".to_string(), "B07XJ8C8F5".into());
    attrs.insert("alignment".to_string(), "left".into());
    attrs.insert("trackingPixel".to_string(), "https://evil.example".into());
    let index = doc.insert_entity_reference(attrs).unwrap();

    let mut patch = PartialAttrs::new();
    patch.insert("alignment".to_string(), "center".into());
    doc.update_attributes(index, patch).unwrap();

    assert_eq!(
        doc.to_markup(),
        r#"<p>Pick: </p><span data-type="entity-reference" data-alignment="center" data-id="B07XJ8C8F5"></span>"#
    );

    let reparsed = Document::from_markup(&doc.to_markup());
    let Some(Inline::Node(ReferenceNode::EntityReference(attrs))) = reparsed.pieces().get(1) else {
        panic!("expected entity reference");
    };
    assert_eq!(attrs.alignment, Alignment::Center);
    assert_eq!(attrs.display_style, DisplayStyle::Simple);
}

prop_compose! {
    fn node_attrs()(
        id in "[A-Za-z0-9]{1,12}",
        title in proptest::option::of(".*"),
        price in proptest::option::of(0.0f64..10_000.0),
        style in proptest::sample::select(DisplayStyle::ALL.to_vec()),
        alignment in proptest::sample::select(Alignment::ALL.to_vec()),
        is_prime in any::<bool>(),
    ) -> EntityReferenceAttrs {
        EntityReferenceAttrs {
            title,
            price,
            is_prime,
            ..EntityReferenceAttrs::new(id).with_display_style(style).with_alignment(alignment)
        }
    }
}

proptest! {
    #[test]
    fn element_round_trip(attrs in node_attrs()) {
        let node = ReferenceNode::EntityReference(attrs.clone());
        let parsed = parse_node(&serialize_node(&node));
        prop_assert_eq!(parsed, Some(ReferenceNode::EntityReference(normalize(&attrs))));
    }
}
