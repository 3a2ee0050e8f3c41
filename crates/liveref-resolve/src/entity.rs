//! Resolved entity snapshot
//!
//! Transient and never persisted. One `Arc<ResolvedEntity>` is shared by
//! every node currently showing the same identifier.

use crate::key::CatalogKey;
use liveref_codec::CouponType;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Canonical live snapshot of one catalog entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntity {
    /// Key this snapshot was resolved under
    pub key: CatalogKey,
    /// Internal id reported by the backend, if any
    pub id: Option<String>,
    /// External catalog code reported by the backend, if any
    pub code: Option<String>,
    /// Display title; always present
    pub title: String,
    /// Brand or manufacturer
    pub brand: Option<String>,
    /// Main image url
    pub image: Option<String>,
    /// Product url
    pub url: Option<String>,
    /// Alternate affiliate url
    pub alt_url: Option<String>,
    /// ISO currency code; `None` means USD
    pub currency: Option<String>,
    /// Current price
    pub price: Option<f64>,
    /// List price before discount
    pub original_price: Option<f64>,
    /// Discount in percent, reported or derived from the two prices
    pub discount_percent: Option<f64>,
    /// Coupon kind
    pub coupon_type: Option<CouponType>,
    /// Coupon amount, in percent or currency per `coupon_type`
    pub coupon_value: Option<f64>,
    /// Coupon expiry as reported (RFC 3339 or `YYYY-MM-DD`)
    pub coupon_expiry: Option<String>,
    /// Prime eligible
    pub is_prime: bool,
    /// Ships free
    pub is_free_shipping: bool,
    /// Average rating out of 5
    pub rating: Option<f64>,
    /// Number of reviews
    pub review_count: Option<u64>,
    /// Payload fields with no canonical mapping, kept for raw projection
    pub extra: BTreeMap<String, Value>,
}

impl ResolvedEntity {
    /// Create snapshot with only the required fields set
    #[must_use]
    pub fn new(key: CatalogKey, title: impl Into<String>) -> Self {
        Self {
            key,
            id: None,
            code: None,
            title: title.into(),
            brand: None,
            image: None,
            url: None,
            alt_url: None,
            currency: None,
            price: None,
            original_price: None,
            discount_percent: None,
            coupon_type: None,
            coupon_value: None,
            coupon_expiry: None,
            is_prime: false,
            is_free_shipping: false,
            rating: None,
            review_count: None,
            extra: BTreeMap::new(),
        }
    }

    /// Amount saved against the original price, if discounted
    #[must_use]
    pub fn savings(&self) -> Option<f64> {
        match (self.original_price, self.price) {
            (Some(original), Some(price)) if original > price => Some(original - price),
            _ => None,
        }
    }

    /// Preferred outbound link
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.url.as_deref().or(self.alt_url.as_deref())
    }

    /// Raw value of a projectable field
    ///
    /// Known field ids read canonical fields (or derive them); any other id
    /// reads the payload's unmapped fields. `None` means the field is absent
    /// on this entity.
    #[must_use]
    pub fn field(&self, field_id: &str) -> Option<FieldValue> {
        let text = |v: &Option<String>| v.clone().map(FieldValue::Text);
        let number = |v: Option<f64>| v.map(FieldValue::Number);
        match field_id {
            "title" => Some(FieldValue::Text(self.title.clone())),
            "id" => text(&self.id),
            "code" => text(&self.code),
            "brand" => text(&self.brand),
            "image" => text(&self.image),
            "url" => text(&self.url),
            "altUrl" => text(&self.alt_url),
            "currency" => text(&self.currency),
            "price" => number(self.price),
            "originalPrice" => number(self.original_price),
            "discountPercent" => number(self.discount_percent),
            "savings" => number(self.savings()),
            "couponType" => self
                .coupon_type
                .map(|t| FieldValue::Text(t.as_str().to_string())),
            "couponValue" => number(self.coupon_value),
            "couponExpiry" => text(&self.coupon_expiry),
            "couponLabel" => self.coupon_label().map(FieldValue::Text),
            "isPrime" => Some(FieldValue::Bool(self.is_prime)),
            "isFreeShipping" => Some(FieldValue::Bool(self.is_free_shipping)),
            "rating" => number(self.rating),
            "reviewCount" => self.review_count.map(FieldValue::Integer),
            other => self.extra.get(other).and_then(FieldValue::from_json),
        }
    }

    fn coupon_label(&self) -> Option<String> {
        let value = self.coupon_value?;
        match self.coupon_type? {
            CouponType::Percentage => Some(format!("{value}% off")),
            CouponType::Fixed => Some(format!("{value:.2} off")),
        }
    }
}

/// Raw value of one projected field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text
    Text(String),
    /// Floating point number
    Number(f64),
    /// Count
    Integer(u64),
    /// Flag
    Bool(bool),
}

impl FieldValue {
    /// Convert an unmapped payload value; `null` is absent
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_u64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Number)),
            Value::String(s) => Some(Self::Text(s.clone())),
            other => Some(Self::Text(other.to_string())),
        }
    }

    /// Numeric view, if any
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }
}

/// Raw string coercion used when no formatter applies
impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}
