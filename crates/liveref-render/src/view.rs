//! Mounted reference node views
//!
//! A view owns its local [`ViewState`]. Mounting spawns the resolution on the
//! tokio runtime; the task holds only a `Weak` handle, so a dropped (unmounted)
//! view never receives state while the shared request keeps running for the
//! other views on the same key.

use crate::field::FieldPresenter;
use crate::presenter::EntityPresenter;
use crate::state::ViewState;
use liveref_resolve::{EntityResolver, ReferenceLease};
use liveref_schema::ReferenceNode;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Shared {
    state: RwLock<ViewState>,
    changed: Notify,
}

impl Shared {
    fn set(&self, state: ViewState) {
        *self.state.write() = state;
        self.changed.notify_waiters();
    }
}

/// Presenters for both node kinds
#[derive(Debug, Clone, Default)]
pub struct Presenters {
    /// Entity reference presenter
    pub entity: EntityPresenter,
    /// Field projection presenter
    pub field: FieldPresenter,
}

impl Presenters {
    /// Create presenters with every built-in style and field
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            entity: EntityPresenter::with_defaults(),
            field: FieldPresenter::with_defaults(),
        }
    }

    /// Render a node in a given state
    #[must_use]
    pub fn render(&self, node: &ReferenceNode, state: &ViewState) -> String {
        match node {
            ReferenceNode::EntityReference(attrs) => self.entity.render(attrs, state),
            ReferenceNode::FieldProjection(attrs) => self.field.render(attrs, state),
        }
    }
}

/// View of one mounted reference node
///
/// Dropping the view unmounts it.
#[derive(Debug)]
pub struct ReferenceView {
    node: ReferenceNode,
    shared: Arc<Shared>,
    _lease: Option<ReferenceLease>,
}

impl ReferenceView {
    /// Mount a node: retain its key and start resolving
    ///
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn mount(resolver: &EntityResolver, node: ReferenceNode) -> Self {
        let shared = Arc::new(Shared::default());
        let lease = resolver.retain(node.entity_id());

        let weak: Weak<Shared> = Arc::downgrade(&shared);
        let resolver = resolver.clone();
        let id = node.entity_id().to_string();
        tokio::spawn(async move {
            let state = ViewState::from(resolver.resolve(&id).await);
            match weak.upgrade() {
                Some(shared) => {
                    tracing::trace!(%id, state = state.name(), "reference settled");
                    shared.set(state);
                }
                None => tracing::trace!(%id, "reference unmounted before settling"),
            }
        });

        Self {
            node,
            shared,
            _lease: lease,
        }
    }

    /// Node this view presents
    #[inline]
    #[must_use]
    pub fn node(&self) -> &ReferenceNode {
        &self.node
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ViewState {
        self.shared.state.read().clone()
    }

    /// Wait until resolution settles, then return the final state
    pub async fn settled(&self) -> ViewState {
        loop {
            let notified = self.shared.changed.notified();
            let state = self.state();
            if !state.is_loading() {
                return state;
            }
            notified.await;
        }
    }

    /// Render the node in its current state
    #[must_use]
    pub fn render(&self, presenters: &Presenters) -> String {
        presenters.render(&self.node, &self.shared.state.read())
    }
}
