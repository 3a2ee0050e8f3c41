//! Field registry for field projections
//!
//! Maps a projectable `field_id` to its display name and formatter. Field ids
//! are unique across categories; the registry only grows, so a document
//! authored against an older registry never loses a field.

use crate::error::{FormatError, FormatResult, RegistryError};
use crate::html::{grouped, money};
use chrono::{DateTime, NaiveDate};
use indexmap::IndexMap;
use liveref_resolve::{FieldValue, ResolvedEntity};
use std::fmt;
use std::sync::Arc;

/// Formatter from a raw field value to display text
///
/// The entity the value was read from is passed along for context such as
/// its currency. Formatters are not trusted: they may return an error or panic, and the
/// presenter contains both to the one field.
pub type Formatter = Arc<dyn Fn(&FieldValue, &ResolvedEntity) -> FormatResult + Send + Sync>;

/// Field category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    /// Identity and description
    Basic,
    /// Pricing
    Price,
    /// Shipping perks
    Shipping,
    /// Coupons
    Coupon,
}

impl FieldCategory {
    /// Every category, in display order
    pub const ALL: &'static [Self] = &[Self::Basic, Self::Price, Self::Shipping, Self::Coupon];

    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Price => "price",
            Self::Shipping => "shipping",
            Self::Coupon => "coupon",
        }
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One registered field
#[derive(Clone)]
pub struct FieldDef {
    /// Stable id stored in field projection nodes
    pub field_id: String,
    /// Human readable name
    pub display_name: String,
    /// Category the field is listed under
    pub category: FieldCategory,
    /// Display formatter
    pub formatter: Formatter,
}

impl FieldDef {
    /// Create field definition
    pub fn new<F>(field_id: impl Into<String>, display_name: impl Into<String>, category: FieldCategory, formatter: F) -> Self
    where
        F: Fn(&FieldValue, &ResolvedEntity) -> FormatResult + Send + Sync + 'static,
    {
        Self {
            field_id: field_id.into(),
            display_name: display_name.into(),
            category,
            formatter: Arc::new(formatter),
        }
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("field_id", &self.field_id)
            .field("display_name", &self.display_name)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// Registry of projectable fields
#[derive(Debug, Default, Clone)]
pub struct FieldRegistry {
    fields: IndexMap<String, FieldDef>,
}

impl FieldRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Create registry with built-in fields
    #[must_use]
    pub fn with_defaults() -> Self {
        use FieldCategory::{Basic, Coupon, Price, Shipping};

        let builtins = [
            FieldDef::new("title", "Title", Basic, format_text),
            FieldDef::new("brand", "Brand", Basic, format_text),
            FieldDef::new("image", "Image", Basic, format_text),
            FieldDef::new("url", "Link", Basic, format_text),
            FieldDef::new("code", "Catalog code", Basic, format_text),
            FieldDef::new("rating", "Rating", Basic, format_rating),
            FieldDef::new("reviewCount", "Reviews", Basic, format_count),
            FieldDef::new("price", "Price", Price, format_price),
            FieldDef::new("originalPrice", "List price", Price, format_price),
            FieldDef::new("discountPercent", "Discount", Price, format_percent),
            FieldDef::new("savings", "You save", Price, format_price),
            FieldDef::new("isPrime", "Prime", Shipping, format_flag),
            FieldDef::new("isFreeShipping", "Free shipping", Shipping, format_flag),
            FieldDef::new("couponType", "Coupon type", Coupon, format_coupon_type),
            FieldDef::new("couponValue", "Coupon value", Coupon, format_number),
            FieldDef::new("couponExpiry", "Coupon expires", Coupon, format_date),
            FieldDef::new("couponLabel", "Coupon", Coupon, format_text),
        ];

        let mut registry = Self::new();
        for def in builtins {
            // Built-in ids are distinct literals.
            let _ = registry.register(def);
        }
        registry
    }

    /// Register a field
    ///
    /// # Errors
    /// - `RegistryError::DuplicateField` if the id exists in any category
    /// - `RegistryError::EmptyFieldId` for an empty id
    pub fn register(&mut self, def: FieldDef) -> Result<(), RegistryError> {
        if def.field_id.trim().is_empty() {
            return Err(RegistryError::EmptyFieldId);
        }
        if self.fields.contains_key(&def.field_id) {
            return Err(RegistryError::DuplicateField(def.field_id));
        }
        tracing::debug!(field_id = %def.field_id, category = %def.category, "registered field");
        self.fields.insert(def.field_id.clone(), def);
        Ok(())
    }

    /// Look up a field
    #[inline]
    #[must_use]
    pub fn get(&self, field_id: &str) -> Option<&FieldDef> {
        self.fields.get(field_id)
    }

    /// Check if field exists
    #[inline]
    #[must_use]
    pub fn contains(&self, field_id: &str) -> bool {
        self.fields.contains_key(field_id)
    }

    /// Fields of one category, in registration order
    pub fn by_category(&self, category: FieldCategory) -> impl Iterator<Item = &FieldDef> {
        self.fields.values().filter(move |def| def.category == category)
    }

    /// Iterate over all fields
    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    /// Get number of registered fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn number(formatter: &'static str, value: &FieldValue) -> Result<f64, FormatError> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| FormatError::unsupported(formatter, value))
}

fn format_text(value: &FieldValue, _: &ResolvedEntity) -> FormatResult {
    match value {
        FieldValue::Text(s) => Ok(s.clone()),
        other => Err(FormatError::unsupported("text", other)),
    }
}

fn format_price(value: &FieldValue, entity: &ResolvedEntity) -> FormatResult {
    let n = number("price", value)?;
    if n < 0.0 {
        return Err(FormatError::invalid("price", "negative amount"));
    }
    Ok(money(n, entity.currency.as_deref()))
}

fn format_percent(value: &FieldValue, _: &ResolvedEntity) -> FormatResult {
    Ok(format!("{}%", number("percent", value)?.round()))
}

fn format_number(value: &FieldValue, _: &ResolvedEntity) -> FormatResult {
    Ok(number("number", value)?.to_string())
}

fn format_rating(value: &FieldValue, _: &ResolvedEntity) -> FormatResult {
    let n = number("rating", value)?;
    if !(0.0..=5.0).contains(&n) {
        return Err(FormatError::invalid("rating", format!("{n} is outside 0-5")));
    }
    Ok(format!("{n:.1} out of 5"))
}

fn format_count(value: &FieldValue, _: &ResolvedEntity) -> FormatResult {
    match value {
        FieldValue::Integer(n) => Ok(grouped(*n)),
        other => Err(FormatError::unsupported("count", other)),
    }
}

fn format_flag(value: &FieldValue, _: &ResolvedEntity) -> FormatResult {
    match value {
        FieldValue::Bool(true) => Ok("Yes".to_string()),
        FieldValue::Bool(false) => Ok("No".to_string()),
        other => Err(FormatError::unsupported("flag", other)),
    }
}

fn format_coupon_type(value: &FieldValue, _: &ResolvedEntity) -> FormatResult {
    match value {
        FieldValue::Text(t) if t == "percentage" => Ok("Percent off".to_string()),
        FieldValue::Text(t) if t == "fixed" => Ok("Amount off".to_string()),
        other => Err(FormatError::unsupported("coupon type", other)),
    }
}

fn format_date(value: &FieldValue, _: &ResolvedEntity) -> FormatResult {
    let FieldValue::Text(raw) = value else {
        return Err(FormatError::unsupported("date", value));
    };
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|e| FormatError::invalid("date", e.to_string()))?;
    Ok(date.format("%b %-d, %Y").to_string())
}
