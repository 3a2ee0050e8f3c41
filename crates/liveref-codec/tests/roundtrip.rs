//! Round-trip law for the attribute codec
//!
//! `decode(encode(attrs)) == normalize(attrs)` for every attribute set.

use liveref_codec::{
    decode, encode, normalize, Alignment, AttrValue, CouponType, DisplayStyle,
    EntityReferenceAttrs, FieldProjectionAttrs, NodeAttrs,
};
use proptest::prelude::*;

fn number() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        3 => (-1.0e9f64..1.0e9).prop_map(Some),
        1 => Just(None),
        1 => Just(Some(f64::NAN)),
        1 => Just(Some(f64::INFINITY)),
    ]
}

fn text() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(any::<String>())
}

fn display_style() -> impl Strategy<Value = DisplayStyle> {
    proptest::sample::select(DisplayStyle::ALL.to_vec())
}

fn alignment() -> impl Strategy<Value = Alignment> {
    proptest::sample::select(Alignment::ALL.to_vec())
}

fn coupon_type() -> impl Strategy<Value = Option<CouponType>> {
    proptest::option::of(proptest::sample::select(CouponType::ALL.to_vec()))
}

prop_compose! {
    fn entity_attrs()(
        (id, display_style, alignment, title, price, image) in
            (any::<String>(), display_style(), alignment(), text(), number(), text()),
        (url, alt_url, brand, original_price, discount_percent) in
            (text(), text(), text(), number(), number()),
        (coupon_type, coupon_value, coupon_expiry, is_prime, is_free_shipping) in
            (coupon_type(), number(), text(), any::<bool>(), any::<bool>()),
    ) -> EntityReferenceAttrs {
        EntityReferenceAttrs {
            id,
            display_style,
            alignment,
            title,
            price,
            image,
            url,
            alt_url,
            brand,
            original_price,
            discount_percent,
            coupon_type,
            coupon_value,
            coupon_expiry,
            is_prime,
            is_free_shipping,
        }
    }
}

proptest! {
    #[test]
    fn entity_reference_round_trips(attrs in entity_attrs()) {
        let decoded: EntityReferenceAttrs = decode(&encode(&attrs));
        prop_assert_eq!(decoded, normalize(&attrs));
    }

    #[test]
    fn field_projection_round_trips(entity_id in any::<String>(), field_id in any::<String>()) {
        let attrs = FieldProjectionAttrs::new(entity_id, field_id);
        let decoded: FieldProjectionAttrs = decode(&encode(&attrs));
        prop_assert_eq!(decoded, normalize(&attrs));
    }

    #[test]
    fn each_attribute_round_trips_alone(
        index in 0..EntityReferenceAttrs::SPECS.len(),
        attrs in entity_attrs(),
    ) {
        let spec = &EntityReferenceAttrs::SPECS[index];
        let mut single = EntityReferenceAttrs::default();
        single.set(spec.name, attrs.get(spec.name)).unwrap();

        let decoded: EntityReferenceAttrs = decode(&encode(&single));
        prop_assert_eq!(decoded.get(spec.name), normalize(&single).get(spec.name));
        for other in EntityReferenceAttrs::SPECS.iter().filter(|s| s.name != spec.name) {
            prop_assert_eq!(decoded.get(other.name), other.default.to_value());
        }
    }

    #[test]
    fn encode_never_persists_defaults(attrs in entity_attrs()) {
        let bag = encode(&attrs);
        for spec in EntityReferenceAttrs::SPECS {
            if spec.is_default(&attrs.get(spec.name).normalized()) {
                prop_assert!(!bag.contains_key(spec.key), "{} persisted at default", spec.name);
            }
        }
    }
}

#[test]
fn normalize_drops_non_finite_numbers() {
    let attrs = EntityReferenceAttrs {
        price: Some(f64::NAN),
        coupon_value: Some(2.5),
        ..EntityReferenceAttrs::new("B000123456")
    };
    let normalized = normalize(&attrs);
    assert_eq!(normalized.price, None);
    assert_eq!(normalized.coupon_value, Some(2.5));
    assert_eq!(normalized.get("price"), AttrValue::Null);
}
