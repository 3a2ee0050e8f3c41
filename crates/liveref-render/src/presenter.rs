//! Entity reference presentation
//!
//! Display styles dispatch through a lookup table; a style without an entry
//! renders with `simple`. Adding a style means adding one table entry.

use crate::html::{attr, link, money, push_image, push_text_span, text};
use crate::state::ViewState;
use liveref_codec::{DisplayStyle, EntityReferenceAttrs};
use liveref_resolve::{CatalogKey, ResolvedEntity};
use std::collections::HashMap;
use std::fmt::Write;

/// Renders a resolved entity in one display style
pub type StyleRenderer = fn(&ResolvedEntity, &EntityReferenceAttrs, Freshness) -> String;

/// Renders the loading placeholder of one display style
pub type SkeletonRenderer = fn(&EntityReferenceAttrs) -> String;

/// Marker class on snapshot fallbacks
pub const STALE_CLASS: &str = "liveref-stale";

/// Where the rendered entity data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Resolved from the catalog
    #[default]
    Live,
    /// Insertion-time snapshot shown after resolution failed
    Stale,
}

/// Text of the unavailable fragment
pub const UNAVAILABLE_TEXT: &str = "Product unavailable";

/// Entity reference presenter
#[derive(Debug, Clone)]
pub struct EntityPresenter {
    styles: HashMap<DisplayStyle, StyleRenderer>,
    skeletons: HashMap<DisplayStyle, SkeletonRenderer>,
    snapshot_fallback: bool,
}

impl Default for EntityPresenter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl EntityPresenter {
    /// Create presenter with only the `simple` style
    #[must_use]
    pub fn new() -> Self {
        let mut styles: HashMap<DisplayStyle, StyleRenderer> = HashMap::new();
        styles.insert(DisplayStyle::Simple, render_simple);
        let mut skeletons: HashMap<DisplayStyle, SkeletonRenderer> = HashMap::new();
        skeletons.insert(DisplayStyle::Simple, skeleton_simple);
        Self {
            styles,
            skeletons,
            snapshot_fallback: true,
        }
    }

    /// Create presenter with every built-in style
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with_style(DisplayStyle::Card, render_card, skeleton_card)
            .with_style(DisplayStyle::Horizontal, render_horizontal, skeleton_horizontal)
            .with_style(DisplayStyle::Mini, render_mini, skeleton_mini)
    }

    /// With a style renderer and its skeleton, replacing any previous entry
    #[must_use]
    pub fn with_style(mut self, style: DisplayStyle, render: StyleRenderer, skeleton: SkeletonRenderer) -> Self {
        self.styles.insert(style, render);
        self.skeletons.insert(style, skeleton);
        self
    }

    /// With snapshot fallback on resolution failure enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_snapshot_fallback(mut self, enabled: bool) -> Self {
        self.snapshot_fallback = enabled;
        self
    }

    /// Whether a style has its own renderer
    #[inline]
    #[must_use]
    pub fn has_style(&self, style: DisplayStyle) -> bool {
        self.styles.contains_key(&style)
    }

    /// Render an entity reference in its current state
    #[must_use]
    pub fn render(&self, attrs: &EntityReferenceAttrs, state: &ViewState) -> String {
        match state {
            ViewState::Loading => self.skeleton(attrs),
            ViewState::Ready(entity) => self.styled(entity, attrs, Freshness::Live),
            ViewState::Failed(error) => {
                tracing::debug!(id = %attrs.id, %error, "rendering failed reference");
                self.failed(attrs)
            }
        }
    }

    fn renderer(&self, style: DisplayStyle) -> StyleRenderer {
        self.styles
            .get(&style)
            .or_else(|| self.styles.get(&DisplayStyle::Simple))
            .copied()
            .unwrap_or(render_simple)
    }

    fn skeleton(&self, attrs: &EntityReferenceAttrs) -> String {
        let render = self
            .skeletons
            .get(&attrs.display_style)
            .or_else(|| self.skeletons.get(&DisplayStyle::Simple))
            .copied()
            .unwrap_or(skeleton_simple);
        render(attrs)
    }

    fn styled(&self, entity: &ResolvedEntity, attrs: &EntityReferenceAttrs, freshness: Freshness) -> String {
        (self.renderer(attrs.display_style))(entity, attrs, freshness)
    }

    fn failed(&self, attrs: &EntityReferenceAttrs) -> String {
        match snapshot_entity(attrs).filter(|_| self.snapshot_fallback) {
            Some(snapshot) => self.styled(&snapshot, attrs, Freshness::Stale),
            None => unavailable(&attrs.id),
        }
    }
}

/// Fixed unavailable fragment carrying the original id
#[must_use]
pub fn unavailable(id: &str) -> String {
    format!(
        "<span class=\"liveref liveref-unavailable\" data-id=\"{}\">{UNAVAILABLE_TEXT}</span>",
        attr(id)
    )
}

/// Insertion-time snapshot as an entity, when it carries a title
fn snapshot_entity(attrs: &EntityReferenceAttrs) -> Option<ResolvedEntity> {
    let title = attrs.title.as_deref().filter(|t| !t.trim().is_empty())?;
    let key = CatalogKey::parse(&attrs.id).ok()?;
    Some(ResolvedEntity {
        brand: attrs.brand.clone(),
        image: attrs.image.clone(),
        url: attrs.url.clone(),
        alt_url: attrs.alt_url.clone(),
        price: attrs.price,
        original_price: attrs.original_price,
        discount_percent: attrs.discount_percent,
        coupon_type: attrs.coupon_type,
        coupon_value: attrs.coupon_value,
        coupon_expiry: attrs.coupon_expiry.clone(),
        is_prime: attrs.is_prime,
        is_free_shipping: attrs.is_free_shipping,
        ..ResolvedEntity::new(key, title)
    })
}

fn open(out: &mut String, style: &str, attrs: &EntityReferenceAttrs, freshness: Freshness) {
    out.push_str("<span class=\"liveref ");
    if freshness == Freshness::Stale {
        let _ = write!(out, "{STALE_CLASS} ");
    }
    let _ = write!(
        out,
        "liveref-{style} liveref-align-{}\" data-id=\"{}\">",
        attrs.alignment,
        attr(&attrs.id)
    );
}

fn push_price(out: &mut String, entity: &ResolvedEntity, with_original: bool) {
    let currency = entity.currency.as_deref();
    if let Some(price) = entity.price {
        let _ = write!(out, "<span class=\"liveref-price\">{}</span>", text(&money(price, currency)));
    }
    if with_original {
        if let Some(original) = entity.original_price.filter(|o| entity.price.is_some_and(|p| *o > p)) {
            let _ = write!(
                out,
                "<s class=\"liveref-original-price\">{}</s>",
                text(&money(original, currency))
            );
        }
    }
}

fn push_badges(out: &mut String, entity: &ResolvedEntity) {
    if let Some(discount) = entity.discount_percent.filter(|d| *d > 0.0) {
        let _ = write!(out, "<span class=\"liveref-badge liveref-discount\">-{}%</span>", discount.round());
    }
    if entity.is_prime {
        out.push_str("<span class=\"liveref-badge liveref-prime\">Prime</span>");
    }
    if entity.is_free_shipping {
        out.push_str("<span class=\"liveref-badge liveref-free-shipping\">Free shipping</span>");
    }
    if let Some(label) = entity.field("couponLabel") {
        let _ = write!(out, "<span class=\"liveref-badge liveref-coupon\">{}</span>", text(&label.to_string()));
    }
}

fn title_link(entity: &ResolvedEntity) -> String {
    let title = format!("<span class=\"liveref-title\">{}</span>", text(&entity.title));
    link(entity.link(), &title)
}

fn render_simple(entity: &ResolvedEntity, attrs: &EntityReferenceAttrs, freshness: Freshness) -> String {
    let mut out = String::new();
    open(&mut out, "simple", attrs, freshness);
    out.push_str(&title_link(entity));
    push_price(&mut out, entity, false);
    out.push_str("</span>");
    out
}

fn render_card(entity: &ResolvedEntity, attrs: &EntityReferenceAttrs, freshness: Freshness) -> String {
    let mut out = String::new();
    open(&mut out, "card", attrs, freshness);
    push_image(&mut out, entity.image.as_deref(), &entity.title);
    out.push_str(&title_link(entity));
    push_text_span(&mut out, "liveref-brand", entity.brand.as_deref());
    push_price(&mut out, entity, true);
    push_badges(&mut out, entity);
    if let Some(href) = entity.link() {
        let _ = write!(
            out,
            "<a class=\"liveref-cta\" href=\"{}\" rel=\"sponsored noopener\" target=\"_blank\">View deal</a>",
            attr(href)
        );
    }
    out.push_str("</span>");
    out
}

fn render_horizontal(entity: &ResolvedEntity, attrs: &EntityReferenceAttrs, freshness: Freshness) -> String {
    let mut out = String::new();
    open(&mut out, "horizontal", attrs, freshness);
    push_image(&mut out, entity.image.as_deref(), &entity.title);
    out.push_str("<span class=\"liveref-body\">");
    out.push_str(&title_link(entity));
    push_text_span(&mut out, "liveref-brand", entity.brand.as_deref());
    push_price(&mut out, entity, true);
    push_badges(&mut out, entity);
    out.push_str("</span></span>");
    out
}

fn render_mini(entity: &ResolvedEntity, attrs: &EntityReferenceAttrs, freshness: Freshness) -> String {
    let mut out = String::new();
    open(&mut out, "mini", attrs, freshness);
    out.push_str(&title_link(entity));
    push_price(&mut out, entity, false);
    if entity.is_prime {
        out.push_str("<span class=\"liveref-badge liveref-prime\">Prime</span>");
    }
    out.push_str("</span>");
    out
}

fn skeleton(style: &str, attrs: &EntityReferenceAttrs, blocks: &[&str]) -> String {
    let mut out = format!(
        "<span class=\"liveref liveref-{style} liveref-align-{} liveref-loading\" data-id=\"{}\" aria-busy=\"true\">",
        attrs.alignment,
        attr(&attrs.id)
    );
    for block in blocks {
        let _ = write!(out, "<span class=\"liveref-skeleton liveref-skeleton-{block}\"></span>");
    }
    out.push_str("</span>");
    out
}

fn skeleton_simple(attrs: &EntityReferenceAttrs) -> String {
    skeleton("simple", attrs, &["line"])
}

fn skeleton_card(attrs: &EntityReferenceAttrs) -> String {
    skeleton("card", attrs, &["image", "line", "line-short", "button"])
}

fn skeleton_horizontal(attrs: &EntityReferenceAttrs) -> String {
    skeleton("horizontal", attrs, &["thumb", "line", "line-short"])
}

fn skeleton_mini(attrs: &EntityReferenceAttrs) -> String {
    skeleton("mini", attrs, &["line-short"])
}
