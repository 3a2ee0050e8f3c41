//! Attribute encoding and decoding
//!
//! `encode` and `decode` are inverse up to [`normalize`]:
//!
//! ```text
//! decode(encode(attrs)) == normalize(attrs)
//! ```
//!
//! Each attribute is handled independently from its table row; there is no
//! cross-field coupling.

use crate::attr::{AttrBag, AttrKind, AttrSpec, AttrValue, NodeAttrs};

/// Encode typed attributes into a persisted attribute bag
///
/// Values equal to their declared default are dropped, as are nulls and
/// non-finite numbers. Numbers and booleans are stringified losslessly.
#[must_use]
pub fn encode<A: NodeAttrs>(attrs: &A) -> AttrBag {
    let mut bag = AttrBag::new();
    for spec in A::SPECS {
        let value = attrs.get(spec.name).normalized();
        if spec.is_default(&value) {
            continue;
        }
        let raw = match value {
            AttrValue::Null => continue,
            AttrValue::Text(s) => s,
            AttrValue::Number(n) => n.to_string(),
            AttrValue::Bool(b) => b.to_string(),
        };
        bag.insert(spec.key.to_string(), raw);
    }
    bag
}

/// Decode a persisted attribute bag into typed attributes
///
/// Never fails. Canonical keys take precedence over legacy aliases; keys not
/// declared for the node kind are ignored; a value that cannot be parsed
/// falls back to the attribute's declared default.
#[must_use]
pub fn decode<A: NodeAttrs>(bag: &AttrBag) -> A {
    let mut attrs = A::default();
    for spec in A::SPECS {
        let Some((key, raw)) = spec
            .keys()
            .find_map(|key| bag.get(key).map(|raw| (key, raw.as_str())))
        else {
            continue;
        };
        if key != spec.key {
            tracing::debug!(attribute = spec.name, alias = key, "decoded legacy attribute alias");
        }
        let value = decode_value(spec, raw);
        if let Err(e) = attrs.set(spec.name, value) {
            tracing::debug!(attribute = spec.name, error = %e, "attribute fell back to default");
        }
    }
    attrs
}

/// Fill declared defaults and collapse values the persisted form cannot carry
#[must_use]
pub fn normalize<A: NodeAttrs>(attrs: &A) -> A {
    let mut out = A::default();
    for spec in A::SPECS {
        let value = attrs.get(spec.name).normalized();
        if out.set(spec.name, value).is_err() {
            tracing::debug!(attribute = spec.name, "normalized to default");
        }
    }
    out
}

fn decode_value(spec: &AttrSpec, raw: &str) -> AttrValue {
    match spec.kind {
        AttrKind::Text => AttrValue::Text(raw.to_string()),
        AttrKind::Bool => AttrValue::Bool(parse_bool(raw)),
        AttrKind::Number => match parse_number(raw) {
            Some(n) => AttrValue::Number(n),
            None => {
                tracing::debug!(attribute = spec.name, raw, "unparsable number");
                spec.default.to_value()
            }
        },
        AttrKind::Choice(allowed) => {
            if allowed.contains(&raw) {
                AttrValue::Text(raw.to_string())
            } else {
                tracing::debug!(attribute = spec.name, raw, "unrecognized choice");
                spec.default.to_value()
            }
        }
    }
}

/// Boolean decoding: exact equality with `"true"`
#[inline]
#[must_use]
pub fn parse_bool(raw: &str) -> bool {
    raw == "true"
}

/// Tolerant number parsing
///
/// Skips leading whitespace and parses the longest numeric prefix
/// (`"12.5kg"` → `12.5`). Returns `None` instead of NaN when no digits are
/// found or the result is not finite.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}
