//! Per-node resolution state

use liveref_resolve::{ResolutionError, ResolutionResult, ResolvedEntity};
use std::sync::Arc;

/// Local view state of one mounted reference node
///
/// Loading and failure are distinct observable states.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewState {
    /// Resolution still in flight
    #[default]
    Loading,
    /// Resolved snapshot, shared with every node on the same key
    Ready(Arc<ResolvedEntity>),
    /// Resolution failed
    Failed(ResolutionError),
}

impl ViewState {
    /// Whether resolution has not settled yet
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Resolved snapshot, if ready
    #[inline]
    #[must_use]
    pub fn entity(&self) -> Option<&Arc<ResolvedEntity>> {
        match self {
            Self::Ready(entity) => Some(entity),
            _ => None,
        }
    }

    /// Short state name for logs and markup classes
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

impl From<ResolutionResult<Arc<ResolvedEntity>>> for ViewState {
    fn from(result: ResolutionResult<Arc<ResolvedEntity>>) -> Self {
        match result {
            Ok(entity) => Self::Ready(entity),
            Err(e) => Self::Failed(e),
        }
    }
}
