//! Field projection presentation
//!
//! Four distinguishable outcomes: a formatted (or raw) value, and three
//! fixed placeholders for loading, failure, and a field absent on an
//! otherwise resolved entity.

use crate::html::{attr, text};
use crate::registry::FieldRegistry;
use crate::state::ViewState;
use liveref_codec::FieldProjectionAttrs;
use liveref_resolve::{FieldValue, ResolvedEntity};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Placeholder while resolving
pub const LOADING_PLACEHOLDER: &str = "…";

/// Placeholder when the entity could not be resolved
pub const ERROR_PLACEHOLDER: &str = "N/A";

/// Placeholder when the entity has no value for the field
pub const ABSENT_PLACEHOLDER: &str = "—";

/// Field projection presenter
#[derive(Debug, Clone, Default)]
pub struct FieldPresenter {
    registry: FieldRegistry,
}

impl FieldPresenter {
    /// Create presenter over a registry
    #[inline]
    #[must_use]
    pub fn new(registry: FieldRegistry) -> Self {
        Self { registry }
    }

    /// Create presenter over the built-in registry
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FieldRegistry::with_defaults())
    }

    /// Registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Render a field projection in its current state
    #[must_use]
    pub fn render(&self, attrs: &FieldProjectionAttrs, state: &ViewState) -> String {
        let (class, inner) = match state {
            ViewState::Loading => ("liveref-field liveref-field-loading", LOADING_PLACEHOLDER.to_string()),
            ViewState::Failed(_) => ("liveref-field liveref-field-error", ERROR_PLACEHOLDER.to_string()),
            ViewState::Ready(entity) => match self.display_value(entity, &attrs.field_id) {
                Some(value) => ("liveref-field", text(&value).into_owned()),
                None => ("liveref-field liveref-field-absent", ABSENT_PLACEHOLDER.to_string()),
            },
        };
        format!(
            "<span class=\"{class}\" data-entity-id=\"{}\" data-field-id=\"{}\">{inner}</span>",
            attr(&attrs.entity_id),
            attr(&attrs.field_id)
        )
    }

    /// Display text of one field, or `None` if the entity lacks it
    ///
    /// Unregistered fields and failing formatters yield the raw value.
    #[must_use]
    pub fn display_value(&self, entity: &ResolvedEntity, field_id: &str) -> Option<String> {
        let value = entity.field(field_id)?;
        let Some(def) = self.registry.get(field_id) else {
            return Some(value.to_string());
        };
        Some(guarded(field_id, def.formatter.as_ref(), &value, entity))
    }
}

fn guarded<F>(field_id: &str, formatter: &F, value: &FieldValue, entity: &ResolvedEntity) -> String
where
    F: Fn(&FieldValue, &ResolvedEntity) -> crate::error::FormatResult + ?Sized,
{
    match catch_unwind(AssertUnwindSafe(|| formatter(value, entity))) {
        Ok(Ok(formatted)) => formatted,
        Ok(Err(e)) => {
            tracing::warn!(field_id, error = %e, "formatter failed, using raw value");
            value.to_string()
        }
        Err(_) => {
            tracing::warn!(field_id, "formatter panicked, using raw value");
            value.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FieldCategory, FieldDef};
    use liveref_resolve::{CatalogKey, ResolutionError};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn kettle() -> ViewState {
        ViewState::Ready(Arc::new(ResolvedEntity {
            price: Some(29.99),
            ..ResolvedEntity::new(CatalogKey::Code("B07XJ8C8F5".to_string()), "Kettle & Co")
        }))
    }

    fn projection(field_id: &str) -> FieldProjectionAttrs {
        FieldProjectionAttrs::new("B07XJ8C8F5", field_id)
    }

    #[test]
    fn formatted_value() {
        let html = FieldPresenter::with_defaults().render(&projection("price"), &kettle());
        assert_eq!(
            html,
            "<span class=\"liveref-field\" data-entity-id=\"B07XJ8C8F5\" data-field-id=\"price\">$29.99</span>"
        );
    }

    #[test]
    fn price_uses_entity_currency() {
        let euro = ViewState::Ready(Arc::new(ResolvedEntity {
            price: Some(5.0),
            currency: Some("EUR".to_string()),
            ..ResolvedEntity::new(CatalogKey::Code("B07XJ8C8F5".to_string()), "Kettle")
        }));
        let html = FieldPresenter::with_defaults().render(&projection("price"), &euro);
        assert!(html.ends_with(">€5.00</span>"), "{html}");
    }

    #[test]
    fn value_text_is_escaped() {
        let html = FieldPresenter::with_defaults().render(&projection("title"), &kettle());
        assert!(html.ends_with(">Kettle &amp; Co</span>"));
    }

    #[test]
    fn three_placeholders_are_distinct() {
        let presenter = FieldPresenter::with_defaults();
        let attrs = projection("brand");
        let loading = presenter.render(&attrs, &ViewState::Loading);
        let failed = presenter.render(
            &attrs,
            &ViewState::Failed(ResolutionError::NotFound("code:B07XJ8C8F5".to_string())),
        );
        let absent = presenter.render(&attrs, &kettle());

        assert!(loading.contains("liveref-field-loading") && loading.contains(LOADING_PLACEHOLDER));
        assert!(failed.contains("liveref-field-error") && failed.contains(ERROR_PLACEHOLDER));
        assert!(absent.contains("liveref-field-absent") && absent.contains(ABSENT_PLACEHOLDER));
        assert_ne!(loading, failed);
        assert_ne!(failed, absent);
        assert_ne!(loading, absent);
    }

    #[test]
    fn unregistered_field_uses_raw_value() {
        let mut entity = ResolvedEntity::new(CatalogKey::Code("B07XJ8C8F5".to_string()), "Kettle");
        entity.extra.insert("warrantyYears".to_string(), 2.into());
        let presenter = FieldPresenter::with_defaults();
        assert_eq!(presenter.display_value(&entity, "warrantyYears").as_deref(), Some("2"));
    }

    #[test]
    fn formatter_error_falls_back_to_raw() {
        let mut registry = FieldRegistry::new();
        registry
            .register(FieldDef::new("price", "Price", FieldCategory::Price, |v, _| {
                Err(crate::error::FormatError::unsupported("broken", v))
            }))
            .unwrap();
        let presenter = FieldPresenter::new(registry);
        let html = presenter.render(&projection("price"), &kettle());
        assert!(html.ends_with(">29.99</span>"));
    }

    #[test]
    fn formatter_panic_is_contained_to_the_field() {
        let mut registry = FieldRegistry::with_defaults();
        registry
            .register(FieldDef::new("explodes", "Boom", FieldCategory::Basic, |_, _| {
                panic!("formatter bug")
            }))
            .unwrap();
        let presenter = FieldPresenter::new(registry);
        let mut entity = ResolvedEntity::new(CatalogKey::Code("B07XJ8C8F5".to_string()), "Kettle");
        entity.extra.insert("explodes".to_string(), "raw".into());

        assert_eq!(presenter.display_value(&entity, "explodes").as_deref(), Some("raw"));
        assert_eq!(presenter.display_value(&entity, "title").as_deref(), Some("Kettle"));
    }
}
