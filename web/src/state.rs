//! Application state shared by the handlers.

use dudu_hub_core::catalog::CatalogSource;
use dudu_hub_core::orchestrator::ResponseOrchestrator;
use std::fmt;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cheap to clone: everything sits behind an [`Arc`].
#[derive(Clone)]
pub struct AppState {
    /// Chat reply orchestrator.
    pub orchestrator: Arc<ResponseOrchestrator>,
    /// Catalog used for listings and readiness checks.
    pub catalog: Arc<dyn CatalogSource>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(orchestrator: ResponseOrchestrator, catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            catalog,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}
