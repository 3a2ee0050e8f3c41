//! Entity reference attributes
//!
//! An entity reference stands in for one catalog product. Only `id` is
//! authoritative; the snapshot fields are captured at insertion time and are
//! used as a fallback when live resolution fails.

use crate::attr::{private, AttrDefault, AttrKind, AttrSpec, AttrValue, NodeAttrs};
use crate::error::AttrError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every value, in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Persisted spelling of every value
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            /// Persisted spelling
            #[inline]
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = AttrError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(AttrError::invalid_choice(stringify!($name), other)),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum! {
    /// Renderer selection for an entity reference
    DisplayStyle {
        /// Inline text link
        Simple => "simple",
        /// Boxed card with image, price and badges
        Card => "card",
        /// Wide row with image on the left
        Horizontal => "horizontal",
        /// Compact inline chip
        Mini => "mini",
    }
}

text_enum! {
    /// Horizontal alignment of the rendered reference
    Alignment {
        /// Left aligned
        Left => "left",
        /// Centered
        Center => "center",
        /// Right aligned
        Right => "right",
    }
}

text_enum! {
    /// Coupon discount kind
    CouponType {
        /// Value is a percentage off
        Percentage => "percentage",
        /// Value is a fixed amount off
        Fixed => "fixed",
    }
}

impl Default for DisplayStyle {
    fn default() -> Self {
        Self::Simple
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::Left
    }
}

/// Attributes of an entity reference node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReferenceAttrs {
    /// Internal id or external catalog code
    pub id: String,
    /// Renderer selection
    pub display_style: DisplayStyle,
    /// Horizontal alignment
    pub alignment: Alignment,
    /// Snapshot title; a snapshot without one is never rendered
    pub title: Option<String>,
    /// Snapshot price
    pub price: Option<f64>,
    /// Snapshot image url
    pub image: Option<String>,
    /// Snapshot product url
    pub url: Option<String>,
    /// Alternate affiliate url
    pub alt_url: Option<String>,
    /// Snapshot brand
    pub brand: Option<String>,
    /// List price before discount
    pub original_price: Option<f64>,
    /// Discount in percent
    pub discount_percent: Option<f64>,
    /// Coupon kind
    pub coupon_type: Option<CouponType>,
    /// Coupon amount, in percent or currency per `coupon_type`
    pub coupon_value: Option<f64>,
    /// Coupon expiry as authored (usually an ISO date)
    pub coupon_expiry: Option<String>,
    /// Prime eligible
    pub is_prime: bool,
    /// Ships free
    pub is_free_shipping: bool,
}

const fn text(name: &'static str, key: &'static str, aliases: &'static [&'static str]) -> AttrSpec {
    AttrSpec {
        name,
        key,
        aliases,
        kind: AttrKind::Text,
        default: AttrDefault::Null,
    }
}

const fn number(name: &'static str, key: &'static str, aliases: &'static [&'static str]) -> AttrSpec {
    AttrSpec {
        name,
        key,
        aliases,
        kind: AttrKind::Number,
        default: AttrDefault::Null,
    }
}

const fn flag(name: &'static str, key: &'static str, aliases: &'static [&'static str]) -> AttrSpec {
    AttrSpec {
        name,
        key,
        aliases,
        kind: AttrKind::Bool,
        default: AttrDefault::Bool(false),
    }
}

const ENTITY_SPECS: &[AttrSpec] = &[
    AttrSpec {
        name: "id",
        key: "data-id",
        aliases: &["data-product-id", "data-asin"],
        kind: AttrKind::Text,
        default: AttrDefault::Text(""),
    },
    AttrSpec {
        name: "displayStyle",
        key: "data-display-style",
        aliases: &["data-style"],
        kind: AttrKind::Choice(DisplayStyle::NAMES),
        default: AttrDefault::Text("simple"),
    },
    AttrSpec {
        name: "alignment",
        key: "data-alignment",
        aliases: &["data-align"],
        kind: AttrKind::Choice(Alignment::NAMES),
        default: AttrDefault::Text("left"),
    },
    text("title", "data-title", &["data-name"]),
    number("price", "data-price", &[]),
    text("image", "data-image", &["data-image-url", "data-image_url"]),
    text("url", "data-url", &["data-product-url"]),
    text("altUrl", "data-alt-url", &["data-alternate-url", "data-alt-affiliate-url"]),
    text("brand", "data-brand", &[]),
    number("originalPrice", "data-original-price", &["data-list-price"]),
    number("discountPercent", "data-discount-percent", &["data-discount"]),
    AttrSpec {
        name: "couponType",
        key: "data-coupon-type",
        aliases: &[],
        kind: AttrKind::Choice(CouponType::NAMES),
        default: AttrDefault::Null,
    },
    number("couponValue", "data-coupon-value", &[]),
    text("couponExpiry", "data-coupon-expiry", &[]),
    flag("isPrime", "data-is-prime", &["data-prime"]),
    flag("isFreeShipping", "data-is-free-shipping", &["data-free-shipping"]),
];

fn choice<T: FromStr<Err = AttrError>>(name: &str, value: AttrValue) -> Result<Option<T>, AttrError> {
    value
        .into_text(name)?
        .map(|s| s.parse().map_err(|_| AttrError::invalid_choice(name, s)))
        .transpose()
}

impl EntityReferenceAttrs {
    /// Attributes for `id` with every other attribute at its default
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// With display style
    #[inline]
    #[must_use]
    pub fn with_display_style(mut self, style: DisplayStyle) -> Self {
        self.display_style = style;
        self
    }

    /// With alignment
    #[inline]
    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Whether the insertion-time snapshot carries enough to render a fallback
    #[inline]
    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

impl private::Sealed for EntityReferenceAttrs {}

impl NodeAttrs for EntityReferenceAttrs {
    const SPECS: &'static [AttrSpec] = ENTITY_SPECS;

    fn get(&self, name: &str) -> AttrValue {
        match name {
            "id" => AttrValue::Text(self.id.clone()),
            "displayStyle" => self.display_style.as_str().into(),
            "alignment" => self.alignment.as_str().into(),
            "title" => self.title.clone().into(),
            "price" => self.price.into(),
            "image" => self.image.clone().into(),
            "url" => self.url.clone().into(),
            "altUrl" => self.alt_url.clone().into(),
            "brand" => self.brand.clone().into(),
            "originalPrice" => self.original_price.into(),
            "discountPercent" => self.discount_percent.into(),
            "couponType" => self.coupon_type.map(CouponType::as_str).into(),
            "couponValue" => self.coupon_value.into(),
            "couponExpiry" => self.coupon_expiry.clone().into(),
            "isPrime" => self.is_prime.into(),
            "isFreeShipping" => self.is_free_shipping.into(),
            _ => AttrValue::Null,
        }
    }

    fn set(&mut self, name: &str, value: AttrValue) -> Result<(), AttrError> {
        match name {
            "id" => self.id = value.into_text(name)?.unwrap_or_default(),
            "displayStyle" => self.display_style = choice(name, value)?.unwrap_or_default(),
            "alignment" => self.alignment = choice(name, value)?.unwrap_or_default(),
            "title" => self.title = value.into_text(name)?,
            "price" => self.price = value.into_number(name)?,
            "image" => self.image = value.into_text(name)?,
            "url" => self.url = value.into_text(name)?,
            "altUrl" => self.alt_url = value.into_text(name)?,
            "brand" => self.brand = value.into_text(name)?,
            "originalPrice" => self.original_price = value.into_number(name)?,
            "discountPercent" => self.discount_percent = value.into_number(name)?,
            "couponType" => self.coupon_type = choice(name, value)?,
            "couponValue" => self.coupon_value = value.into_number(name)?,
            "couponExpiry" => self.coupon_expiry = value.into_text(name)?,
            "isPrime" => self.is_prime = value.into_bool(name, false)?,
            "isFreeShipping" => self.is_free_shipping = value.into_bool(name, false)?,
            _ => return Err(AttrError::UnknownAttribute(name.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use crate::AttrBag;
    use pretty_assertions::assert_eq;

    fn bag(pairs: &[(&str, &str)]) -> AttrBag {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn every_table_row_is_readable_and_writable() {
        let mut attrs = EntityReferenceAttrs::default();
        for spec in EntityReferenceAttrs::SPECS {
            let value = attrs.get(spec.name);
            assert!(attrs.set(spec.name, value).is_ok(), "{}", spec.name);
        }
    }

    #[test]
    fn default_alignment_is_suppressed() {
        let attrs = EntityReferenceAttrs::new("B000123456");
        let encoded = encode(&attrs);
        assert!(!encoded.contains_key("data-alignment"));
        assert!(!encoded.contains_key("data-display-style"));
        assert_eq!(encoded, bag(&[("data-id", "B000123456")]));
    }

    #[test]
    fn non_default_alignment_is_persisted() {
        let attrs = EntityReferenceAttrs::new("B000123456").with_alignment(Alignment::Center);
        let encoded = encode(&attrs);
        assert_eq!(encoded.get("data-alignment").map(String::as_str), Some("center"));
    }

    #[test]
    fn snapshot_fields_encode_losslessly() {
        let attrs = EntityReferenceAttrs {
            price: Some(19.0),
            discount_percent: Some(12.5),
            is_prime: true,
            coupon_type: Some(CouponType::Fixed),
            ..EntityReferenceAttrs::new("B000123456")
        };
        let encoded = encode(&attrs);
        assert_eq!(encoded.get("data-price").map(String::as_str), Some("19"));
        assert_eq!(encoded.get("data-discount-percent").map(String::as_str), Some("12.5"));
        assert_eq!(encoded.get("data-is-prime").map(String::as_str), Some("true"));
        assert_eq!(encoded.get("data-coupon-type").map(String::as_str), Some("fixed"));
        assert!(!encoded.contains_key("data-is-free-shipping"));
    }

    #[test]
    fn legacy_image_alias_decodes_to_image() {
        let decoded: EntityReferenceAttrs = decode(&bag(&[
            ("data-id", "B000123456"),
            ("data-image-url", "https://img.example/a.jpg"),
        ]));
        assert_eq!(decoded.image.as_deref(), Some("https://img.example/a.jpg"));
    }

    #[test]
    fn canonical_key_wins_over_alias() {
        let decoded: EntityReferenceAttrs = decode(&bag(&[
            ("data-id", "B000123456"),
            ("data-image", "canonical.jpg"),
            ("data-image-url", "legacy.jpg"),
        ]));
        assert_eq!(decoded.image.as_deref(), Some("canonical.jpg"));
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let decoded: EntityReferenceAttrs = decode(&bag(&[
            ("data-id", "B000123456"),
            ("data-price", "twelve"),
            ("data-display-style", "carousel"),
            ("data-alignment", "middle"),
            ("data-coupon-type", "bogo"),
            ("data-is-prime", "yes"),
        ]));
        assert_eq!(decoded, EntityReferenceAttrs::new("B000123456"));
    }

    #[test]
    fn unknown_attribute_is_rejected_by_set() {
        let mut attrs = EntityReferenceAttrs::default();
        assert_eq!(
            attrs.set("color", "red".into()),
            Err(AttrError::UnknownAttribute("color".to_string()))
        );
    }

    #[test]
    fn set_rejects_shape_mismatch() {
        let mut attrs = EntityReferenceAttrs::default();
        assert!(attrs.set("price", "cheap".into()).is_err());
        assert!(attrs.set("alignment", "middle".into()).is_err());
        assert!(attrs.set("isPrime", AttrValue::Number(1.0)).is_err());
    }

    #[test]
    fn display_style_parse() {
        assert_eq!("card".parse::<DisplayStyle>(), Ok(DisplayStyle::Card));
        assert!("grid".parse::<DisplayStyle>().is_err());
        assert_eq!(DisplayStyle::ALL.len(), DisplayStyle::NAMES.len());
    }

    #[test]
    fn has_snapshot_requires_title() {
        let mut attrs = EntityReferenceAttrs::new("B000123456");
        assert!(!attrs.has_snapshot());
        attrs.title = Some("  ".to_string());
        assert!(!attrs.has_snapshot());
        attrs.title = Some("Kettle".to_string());
        assert!(attrs.has_snapshot());
    }
}
