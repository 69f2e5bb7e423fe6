//! Tracking Service adapter: the only place that talks to the tracking server.

mod memory;
mod mlflow;

pub use memory::InMemoryTracking;
pub use mlflow::MlflowClient;

use crate::error::Result;
use crate::models::{ArtifactNode, Experiment, LocalArtifactFile, RegisteredModel, Run};

/// Read-only queries against a tracking service.
///
/// Implementations report every network or server failure as
/// [`DashError::TrackingServiceUnavailable`](crate::DashError::TrackingServiceUnavailable).
/// An empty answer is not an error.
pub trait TrackingService: Send + Sync {
    /// All experiments, sorted by name ascending.
    fn list_experiments(&self) -> Result<Vec<Experiment>>;

    /// Runs of one experiment, in a stable order.
    fn list_runs(&self, experiment_id: &str) -> Result<Vec<Run>>;

    fn list_registered_models(&self) -> Result<Vec<RegisteredModel>>;

    /// One level of the run's artifact tree. `path` is empty for the root.
    fn list_artifacts(&self, run_id: &str, path: &str) -> Result<Vec<ArtifactNode>>;

    /// Downloads one artifact into a fresh local file.
    fn fetch_artifact(&self, run_id: &str, path: &str) -> Result<LocalArtifactFile>;
}
