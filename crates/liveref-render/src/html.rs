//! HTML fragment helpers
//!
//! Every interpolated value goes through [`text`] or [`attr`].

use quick_xml::escape::escape;
use std::borrow::Cow;
use std::fmt::Write;

/// Escape text content
#[inline]
#[must_use]
pub fn text(raw: &str) -> Cow<'_, str> {
    escape(raw)
}

/// Escape an attribute value
#[inline]
#[must_use]
pub fn attr(raw: &str) -> Cow<'_, str> {
    escape(raw)
}

/// Optional `<span>` around escaped text
pub(crate) fn push_text_span(out: &mut String, class: &str, value: Option<&str>) {
    if let Some(value) = value {
        let _ = write!(out, "<span class=\"{class}\">{}</span>", text(value));
    }
}

/// Outbound link around already escaped inner content, or the content alone
#[must_use]
pub(crate) fn link(href: Option<&str>, inner: &str) -> String {
    match href {
        Some(href) => format!(
            "<a href=\"{}\" rel=\"sponsored noopener\" target=\"_blank\">{inner}</a>",
            attr(href)
        ),
        None => inner.to_string(),
    }
}

/// Image tag, or nothing
pub(crate) fn push_image(out: &mut String, src: Option<&str>, alt: &str) {
    if let Some(src) = src {
        let _ = write!(
            out,
            "<img class=\"liveref-image\" src=\"{}\" alt=\"{}\" loading=\"lazy\">",
            attr(src),
            attr(alt)
        );
    }
}

/// Format a price with its currency symbol
#[must_use]
pub fn money(value: f64, currency: Option<&str>) -> String {
    match currency.map(str::to_ascii_uppercase).as_deref() {
        None | Some("USD") => format!("${value:.2}"),
        Some("EUR") => format!("€{value:.2}"),
        Some("GBP") => format!("£{value:.2}"),
        Some("JPY") => format!("¥{value:.0}"),
        Some(other) => format!("{value:.2} {other}"),
    }
}

/// Group an integer with thousands separators
#[must_use]
pub fn grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
