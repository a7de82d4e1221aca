//! Application state shared by the axum handlers.

use std::path::Path;
use std::sync::Arc;

use evepath_lib::{Error as LibError, RoutePlanner, SourcesConfig, StaticTopology};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// The systems dataset does not exist.
    DatasetNotFound(String),

    /// The systems dataset could not be read or parsed.
    TopologyLoad(LibError),

    /// A configured source could not be constructed.
    SourceSetup(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatasetNotFound(path) => write!(f, "dataset not found: {}", path),
            Self::TopologyLoad(e) => write!(f, "failed to load static topology: {}", e),
            Self::SourceSetup(e) => write!(f, "failed to configure sources: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TopologyLoad(e) | Self::SourceSetup(e) => Some(e),
            Self::DatasetNotFound(_) => None,
        }
    }
}

/// Shared application state for all axum handlers.
///
/// Cheap to clone; the planner and its per-source caches live behind an
/// `Arc` so every request sees the same cached connections.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    planner: RoutePlanner,
}

impl AppState {
    /// Load the static topology from `dataset` and build the configured
    /// sources on top of it.
    pub fn load(
        dataset: impl AsRef<Path>,
        sources: &SourcesConfig,
    ) -> Result<Self, AppStateError> {
        let dataset = dataset.as_ref();

        if !dataset.exists() {
            return Err(AppStateError::DatasetNotFound(
                dataset.display().to_string(),
            ));
        }

        tracing::info!(path = %dataset.display(), "loading static topology");
        let topology = StaticTopology::load(dataset).map_err(AppStateError::TopologyLoad)?;

        let planner = RoutePlanner::from_config(Arc::new(topology), sources)
            .map_err(AppStateError::SourceSetup)?;
        tracing::info!(
            systems = planner.topology().len(),
            sources = planner.sources().len(),
            "route planner ready"
        );

        Ok(Self::from_planner(planner))
    }

    /// Wrap an already-built planner. Tests use this to inject sources.
    pub fn from_planner(planner: RoutePlanner) -> Self {
        Self {
            inner: Arc::new(AppStateInner { planner }),
        }
    }

    pub fn planner(&self) -> &RoutePlanner {
        &self.inner.planner
    }

    /// Number of systems in the static topology.
    pub fn systems_loaded(&self) -> usize {
        self.inner.planner.topology().len()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("planner", &self.inner.planner)
            .finish()
    }
}
