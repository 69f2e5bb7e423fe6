//! In-memory tracking service, for tests and offline demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{DashError, Result};
use crate::models::{ArtifactNode, Experiment, LocalArtifactFile, RegisteredModel, Run};

use super::TrackingService;

/// A fixed snapshot of tracking-server state.
///
/// Artifacts are stored as flat `path -> bytes` entries per run; directory
/// levels are derived from the `/`-separated paths in insertion order.
#[derive(Default)]
pub struct InMemoryTracking {
    experiments: Vec<Experiment>,
    runs: HashMap<String, Vec<Run>>,
    models: Vec<RegisteredModel>,
    artifacts: HashMap<String, Vec<(String, Vec<u8>)>>,
    listings: HashMap<(String, String), Vec<ArtifactNode>>,
    unavailable: AtomicBool,
    listing_calls: AtomicUsize,
}

impl InMemoryTracking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_experiment(mut self, experiment: Experiment) -> Self {
        self.experiments.push(experiment);
        self
    }

    pub fn with_run(mut self, experiment_id: &str, run: Run) -> Self {
        self.runs.entry(experiment_id.to_string()).or_default().push(run);
        self
    }

    pub fn with_model(mut self, model: RegisteredModel) -> Self {
        self.models.push(model);
        self
    }

    pub fn with_artifact(mut self, run_id: &str, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.artifacts
            .entry(run_id.to_string())
            .or_default()
            .push((path.to_string(), bytes.into()));
        self
    }

    /// Overrides the listing returned for one directory, bypassing the
    /// derived tree. Lets tests model servers that break the tree contract.
    pub fn with_listing(mut self, run_id: &str, path: &str, nodes: Vec<ArtifactNode>) -> Self {
        self.listings
            .insert((run_id.to_string(), path.to_string()), nodes);
        self
    }

    /// Makes every subsequent query fail as if the server were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `list_artifacts` calls served so far.
    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DashError::TrackingServiceUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

impl TrackingService for InMemoryTracking {
    fn list_experiments(&self) -> Result<Vec<Experiment>> {
        self.check_available()?;
        let mut experiments = self.experiments.clone();
        experiments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(experiments)
    }

    fn list_runs(&self, experiment_id: &str) -> Result<Vec<Run>> {
        self.check_available()?;
        Ok(self.runs.get(experiment_id).cloned().unwrap_or_default())
    }

    fn list_registered_models(&self) -> Result<Vec<RegisteredModel>> {
        self.check_available()?;
        Ok(self.models.clone())
    }

    fn list_artifacts(&self, run_id: &str, path: &str) -> Result<Vec<ArtifactNode>> {
        self.check_available()?;
        self.listing_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(nodes) = self.listings.get(&(run_id.to_string(), path.to_string())) {
            return Ok(nodes.clone());
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        };
        let mut nodes: Vec<ArtifactNode> = vec![];
        for (file, _) in self.artifacts.get(run_id).into_iter().flatten() {
            let Some(rest) = file.strip_prefix(&prefix) else {
                continue;
            };
            let node = match rest.split_once('/') {
                Some((dir, _)) => ArtifactNode::dir(format!("{}{}", prefix, dir)),
                None => ArtifactNode::file(file.clone()),
            };
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    fn fetch_artifact(&self, run_id: &str, path: &str) -> Result<LocalArtifactFile> {
        self.check_available()?;
        let bytes = self
            .artifacts
            .get(run_id)
            .and_then(|files| files.iter().find(|(p, _)| p == path))
            .map(|(_, bytes)| bytes.as_slice())
            .ok_or_else(|| {
                DashError::TrackingServiceUnavailable(format!(
                    "artifact '{}' not found for run {}",
                    path, run_id
                ))
            })?;
        LocalArtifactFile::materialize(run_id, path, bytes)
    }
}
