//! Whole-document rendering
//!
//! Parses persisted markup, resolves every distinct referenced id
//! concurrently through one shared [`EntityResolver`], and renders each
//! node. Host markup between nodes is emitted verbatim.

use crate::config::LiverefConfig;
use futures::future::join_all;
use liveref_render::{EntityPresenter, FieldPresenter, Presenters, ViewState};
use liveref_resolve::{CatalogBackend, EntityResolver};
use liveref_schema::{Document, Inline};
use serde::Serialize;
use std::collections::HashMap;

/// Outcome counts of one render
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    /// Reference nodes rendered
    pub references: usize,
    /// Distinct entity ids among them
    pub distinct_ids: usize,
    /// Distinct ids that resolved
    pub resolved: usize,
    /// Distinct ids that failed, with the reason
    pub failures: Vec<(String, String)>,
}

impl RenderReport {
    /// Distinct ids that failed
    #[inline]
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Rendered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    /// HTML fragment
    pub html: String,
    /// Outcome counts
    pub report: RenderReport,
}

/// Summary of one reference node, for inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    /// Position among the document's pieces
    pub index: usize,
    /// Node type name
    pub kind: &'static str,
    /// Referenced entity id
    pub entity_id: String,
    /// Persisted attributes, defaults omitted
    pub attributes: Vec<(String, String)>,
}

/// Renders persisted documents against live catalog data
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    resolver: EntityResolver,
    presenters: Presenters,
}

impl DocumentRenderer {
    /// Create renderer over a backend
    #[must_use]
    pub fn new(backend: impl CatalogBackend, config: &LiverefConfig) -> Self {
        let resolver = EntityResolver::with_config(backend, config.resolver_config());
        let presenters = Presenters {
            entity: EntityPresenter::with_defaults().with_snapshot_fallback(config.render_snapshot_fallback),
            field: FieldPresenter::with_defaults(),
        };
        Self::from_parts(resolver, presenters)
    }

    /// Create renderer from an existing resolver and presenters
    #[inline]
    #[must_use]
    pub fn from_parts(resolver: EntityResolver, presenters: Presenters) -> Self {
        Self { resolver, presenters }
    }

    /// Shared resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &EntityResolver {
        &self.resolver
    }

    /// Render persisted markup
    ///
    /// Never fails. Unreadable markup is emitted as is, and resolution
    /// failures render as placeholders counted in the report.
    pub async fn render(&self, markup: &str) -> RenderOutput {
        self.render_document(&Document::from_markup(markup)).await
    }

    /// Render a parsed document
    pub async fn render_document(&self, document: &Document) -> RenderOutput {
        let ids = document.entity_ids();
        let results = join_all(ids.iter().map(|id| self.resolver.resolve(id))).await;

        let mut report = RenderReport {
            distinct_ids: ids.len(),
            ..RenderReport::default()
        };
        let mut states: HashMap<&str, ViewState> = HashMap::with_capacity(ids.len());
        for (id, result) in ids.iter().zip(results) {
            match &result {
                Ok(_) => report.resolved += 1,
                Err(e) => report.failures.push((id.clone(), e.to_string())),
            }
            states.insert(id.as_str(), ViewState::from(result));
        }

        let mut html = String::new();
        for piece in document.pieces() {
            match piece {
                Inline::Markup(raw) => html.push_str(raw),
                Inline::Node(node) => {
                    report.references += 1;
                    let state = states.get(node.entity_id().trim()).cloned().unwrap_or_default();
                    html.push_str(&self.presenters.render(node, &state));
                }
            }
        }

        tracing::info!(
            references = report.references,
            distinct_ids = report.distinct_ids,
            resolved = report.resolved,
            failed = report.failed(),
            "rendered document"
        );
        RenderOutput { html, report }
    }
}

/// List the reference nodes of persisted markup
#[must_use]
pub fn inspect(markup: &str) -> Vec<NodeSummary> {
    Document::from_markup(markup)
        .references()
        .map(|(index, node)| NodeSummary {
            index,
            kind: node.kind().type_name(),
            entity_id: node.entity_id().to_string(),
            attributes: node.encode().into_iter().collect(),
        })
        .collect()
}
