//! Backend payload normalization
//!
//! Catalog payloads arrive in several legacy shapes. This is the only place
//! that maps them onto [`ResolvedEntity`]; nothing downstream sees the
//! source-format variance.

use crate::entity::ResolvedEntity;
use crate::error::{ResolutionError, ResolutionResult};
use crate::key::CatalogKey;
use liveref_codec::{parse_number, CouponType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// An amount with an optional currency mark or trailing percent sign.
/// Commas only group thousands; the decimal separator is a dot.
static PRICE_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[$€£¥]|[A-Z]{3})?\s*(-?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?)\s*(?:%|[$€£¥]|[A-Z]{3})?$")
        .expect("price pattern is valid")
});

const ID: &[&str] = &["id", "product_id", "productId"];
const CODE: &[&str] = &["asin", "code", "catalog_code"];
const TITLE: &[&str] = &["title", "name", "product_name", "productName"];
const BRAND: &[&str] = &["brand", "manufacturer"];
const IMAGE: &[&str] = &["image", "image_url", "imageUrl", "main_image"];
const URL: &[&str] = &["url", "product_url", "affiliate_url", "link"];
const ALT_URL: &[&str] = &["alt_url", "altUrl", "alternate_affiliate_url", "alternateAffiliateUrl"];
const CURRENCY: &[&str] = &["currency", "currency_code"];
const PRICE: &[&str] = &["price", "current_price", "sale_price", "currentPrice"];
const ORIGINAL_PRICE: &[&str] = &["original_price", "originalPrice", "list_price", "listPrice"];
const DISCOUNT: &[&str] = &["discount_percent", "discountPercent", "discount"];
const COUPON_TYPE: &[&str] = &["coupon_type", "couponType"];
const COUPON_VALUE: &[&str] = &["coupon_value", "couponValue"];
const COUPON_EXPIRY: &[&str] = &["coupon_expiry", "couponExpiry", "coupon_expires_at"];
const PRIME: &[&str] = &["is_prime", "isPrime", "prime"];
const FREE_SHIPPING: &[&str] = &["is_free_shipping", "isFreeShipping", "free_shipping"];
const RATING: &[&str] = &["rating", "stars"];
const REVIEW_COUNT: &[&str] = &["review_count", "reviewCount", "reviews"];

const ENVELOPES: &[&str] = &["data", "product", "item"];

const KNOWN: &[&[&str]] = &[
    ID, CODE, TITLE, BRAND, IMAGE, URL, ALT_URL, CURRENCY, PRICE, ORIGINAL_PRICE, DISCOUNT,
    COUPON_TYPE, COUPON_VALUE, COUPON_EXPIRY, PRIME, FREE_SHIPPING, RATING, REVIEW_COUNT,
];

/// Normalize a backend payload into the canonical entity shape
///
/// Accepts a bare object, a non-empty array (first element), or an object
/// wrapped in a `data` / `product` / `item` envelope.
///
/// # Errors
/// - `ResolutionError::NotFound` for an empty array or `null`
/// - `ResolutionError::MalformedPayload` if no object is found or it has no title
pub fn normalize_payload(key: &CatalogKey, payload: &Value) -> ResolutionResult<ResolvedEntity> {
    let object = unwrap_payload(key, payload)?;

    let title = first_text(object, TITLE)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ResolutionError::malformed(key, "missing title"))?;

    let price = first_number(object, PRICE);
    let original_price = first_number(object, ORIGINAL_PRICE);
    let discount_percent = first_number(object, DISCOUNT).or_else(|| derive_discount(price, original_price));

    let extra = object
        .iter()
        .filter(|(k, _)| !KNOWN.iter().any(|aliases| aliases.contains(&k.as_str())))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(ResolvedEntity {
        key: key.clone(),
        id: first_text(object, ID),
        code: first_text(object, CODE),
        title,
        brand: first_text(object, BRAND),
        image: first_text(object, IMAGE),
        url: first_text(object, URL),
        alt_url: first_text(object, ALT_URL),
        currency: first_text(object, CURRENCY),
        price,
        original_price,
        discount_percent,
        coupon_type: first_text(object, COUPON_TYPE).and_then(|t| parse_coupon_type(&t)),
        coupon_value: first_number(object, COUPON_VALUE),
        coupon_expiry: first_text(object, COUPON_EXPIRY),
        is_prime: first_bool(object, PRIME),
        is_free_shipping: first_bool(object, FREE_SHIPPING),
        rating: first_number(object, RATING),
        review_count: first_number(object, REVIEW_COUNT)
            .filter(|n| *n >= 0.0)
            .map(|n| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let count = n.round() as u64;
                count
            }),
        extra,
    })
}

fn unwrap_payload<'a>(key: &CatalogKey, payload: &'a Value) -> ResolutionResult<&'a Map<String, Value>> {
    match payload {
        Value::Null => Err(ResolutionError::NotFound(key.to_string())),
        Value::Array(items) => match items.first() {
            Some(first) => unwrap_payload(key, first),
            None => Err(ResolutionError::NotFound(key.to_string())),
        },
        Value::Object(object) => {
            let inner = ENVELOPES
                .iter()
                .filter_map(|name| object.get(*name))
                .find(|v| v.is_object() || v.is_array());
            match inner {
                Some(inner) if first_text(object, TITLE).is_none() => unwrap_payload(key, inner),
                _ => Ok(object),
            }
        }
        other => Err(ResolutionError::malformed(
            key,
            format!("expected object, got {}", json_type(other)),
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn first<'a>(object: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|name| object.get(*name))
        .find(|v| !v.is_null())
}

fn first_text(object: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    match first(object, aliases)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_number(object: &Map<String, Value>, aliases: &[&str]) -> Option<f64> {
    match first(object, aliases)? {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

fn first_bool(object: &Map<String, Value>, aliases: &[&str]) -> bool {
    match first(object, aliases) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        _ => false,
    }
}

/// Parse a price string such as `"$1,299.00"`, `"12.50 EUR"` or `"15%"`
///
/// Anything else, including comma-decimal amounts, is `None`.
fn parse_price(raw: &str) -> Option<f64> {
    let amount = PRICE_TEXT.captures(raw.trim())?.get(1)?.as_str().replace(',', "");
    parse_number(&amount)
}

fn parse_coupon_type(raw: &str) -> Option<CouponType> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "percentage" | "percent" | "%" => Some(CouponType::Percentage),
        "fixed" | "amount" | "$" => Some(CouponType::Fixed),
        _ => None,
    }
}

fn derive_discount(price: Option<f64>, original: Option<f64>) -> Option<f64> {
    match (price, original) {
        (Some(price), Some(original)) if original > price && price >= 0.0 => {
            Some(((1.0 - price / original) * 100.0).round())
        }
        _ => None,
    }
}
