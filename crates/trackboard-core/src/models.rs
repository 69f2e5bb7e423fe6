//! Data models: read-only snapshots of tracking-server state.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::error::Result;

/// Lifecycle stage of an experiment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStage {
    #[default]
    Active,
    Deleted,
}

impl std::fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleStage::Active => write!(f, "active"),
            LifecycleStage::Deleted => write!(f, "deleted"),
        }
    }
}

/// An experiment as listed by the tracking service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    pub id: String,
    pub name: String,
    pub lifecycle_stage: LifecycleStage,
}

impl Experiment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lifecycle_stage: LifecycleStage::Active,
        }
    }
}

/// Status of a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Running,
    Scheduled,
    Finished,
    Failed,
    Killed,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "RUNNING"),
            RunStatus::Scheduled => write!(f, "SCHEDULED"),
            RunStatus::Finished => write!(f, "FINISHED"),
            RunStatus::Failed => write!(f, "FAILED"),
            RunStatus::Killed => write!(f, "KILLED"),
            RunStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One recorded execution of a tracked job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Run {
    pub run_id: String,
    pub status: RunStatus,
    /// Milliseconds since the Unix epoch.
    pub start_time: Option<i64>,
    /// Milliseconds since the Unix epoch.
    pub end_time: Option<i64>,
    pub params: BTreeMap<String, String>,
    /// Latest value of every metric logged by the run.
    pub metrics: BTreeMap<String, f64>,
}

impl Run {
    pub fn new(run_id: impl Into<String>, status: RunStatus) -> Self {
        Self {
            run_id: run_id.into(),
            status,
            start_time: None,
            end_time: None,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_times(mut self, start_time: Option<i64>, end_time: Option<i64>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }
}

/// Model registry stage of a model version.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ModelStage {
    #[default]
    #[serde(rename = "None")]
    NoStage,
    Staging,
    Production,
    Archived,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ModelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelStage::NoStage => write!(f, "None"),
            ModelStage::Staging => write!(f, "Staging"),
            ModelStage::Production => write!(f, "Production"),
            ModelStage::Archived => write!(f, "Archived"),
            ModelStage::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelVersion {
    pub version: u32,
    pub stage: ModelStage,
    pub run_id: String,
}

/// A named, versioned pointer to one or more runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisteredModel {
    pub name: String,
    pub description: Option<String>,
    pub latest_versions: Vec<ModelVersion>,
}

/// One entry of a single-level artifact listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactNode {
    /// Path relative to the run's artifact root.
    pub path: String,
    pub is_directory: bool,
}

impl ArtifactNode {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_directory: false,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_directory: true,
        }
    }
}

/// A local copy of one remote artifact.
///
/// The copy lives in a private temporary directory that is removed when the
/// value is dropped, so it only survives the preview render that fetched it.
#[derive(Debug)]
pub struct LocalArtifactFile {
    run_id: String,
    artifact_path: String,
    local_path: PathBuf,
    _dir: TempDir,
}

impl LocalArtifactFile {
    /// Materializes `bytes` as a fresh temporary file named after the
    /// artifact's last path segment.
    pub fn materialize(run_id: &str, artifact_path: &str, bytes: &[u8]) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("trackboard-").tempdir()?;
        let file_name = artifact_path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or("artifact");
        let local_path = dir.path().join(file_name);
        fs::write(&local_path, bytes)?;
        Ok(Self {
            run_id: run_id.to_string(),
            artifact_path: artifact_path.to_string(),
            local_path,
            _dir: dir,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn artifact_path(&self) -> &str {
        &self.artifact_path
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.local_path)?)
    }
}
