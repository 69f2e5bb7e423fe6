//! Blocking client for the MLflow REST API (v2.0).

use std::collections::BTreeMap;

use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::config::DashConfig;
use crate::error::{DashError, Result};
use crate::models::{
    ArtifactNode, Experiment, LifecycleStage, LocalArtifactFile, ModelStage, ModelVersion,
    RegisteredModel, Run, RunStatus,
};

use super::TrackingService;

const MAX_RESULTS: u32 = 1000;

pub struct MlflowClient {
    base_url: Url,
    client: Client,
}

impl MlflowClient {
    pub fn new(config: &DashConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("trackboard/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DashError::Config(format!("build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: config.tracking_uri.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issues the cheapest query the service answers, to fail fast at startup.
    pub fn probe(&self) -> Result<()> {
        let _: SearchExperimentsResponse = self.post_json(
            "api/2.0/mlflow/experiments/search",
            &SearchExperimentsRequest {
                max_results: 1,
                order_by: vec![],
            },
        )?;
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| DashError::Config(format!("bad endpoint '{}': {}", path, e)))
    }

    fn ensure_ok(resp: Response, label: &str) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        Err(DashError::TrackingServiceUnavailable(format!(
            "{} returned {}: {}",
            label, status, snippet
        )))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        debug!(path, "GET tracking service");
        let resp = self.client.get(self.url(path)?).query(query).send()?;
        Ok(Self::ensure_ok(resp, path)?.json()?)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        debug!(path, "POST tracking service");
        let resp = self.client.post(self.url(path)?).json(body).send()?;
        Ok(Self::ensure_ok(resp, path)?.json()?)
    }
}

impl TrackingService for MlflowClient {
    fn list_experiments(&self) -> Result<Vec<Experiment>> {
        let resp: SearchExperimentsResponse = self.post_json(
            "api/2.0/mlflow/experiments/search",
            &SearchExperimentsRequest {
                max_results: MAX_RESULTS,
                order_by: vec!["name ASC".to_string()],
            },
        )?;
        let mut experiments: Vec<Experiment> =
            resp.experiments.into_iter().map(Experiment::from).collect();
        experiments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(experiments)
    }

    fn list_runs(&self, experiment_id: &str) -> Result<Vec<Run>> {
        let resp: SearchRunsResponse = self.post_json(
            "api/2.0/mlflow/runs/search",
            &SearchRunsRequest {
                experiment_ids: vec![experiment_id.to_string()],
                max_results: MAX_RESULTS,
            },
        )?;
        Ok(resp.runs.into_iter().map(Run::from).collect())
    }

    fn list_registered_models(&self) -> Result<Vec<RegisteredModel>> {
        let max_results = MAX_RESULTS.to_string();
        let resp: SearchModelsResponse = self.get_json(
            "api/2.0/mlflow/registered-models/search",
            &[("max_results", max_results.as_str())],
        )?;
        Ok(resp
            .registered_models
            .into_iter()
            .map(RegisteredModel::from)
            .collect())
    }

    fn list_artifacts(&self, run_id: &str, path: &str) -> Result<Vec<ArtifactNode>> {
        let mut query = vec![("run_id", run_id)];
        if !path.is_empty() {
            query.push(("path", path));
        }
        let resp: ListArtifactsResponse =
            self.get_json("api/2.0/mlflow/artifacts/list", &query)?;
        Ok(resp
            .files
            .into_iter()
            .map(|f| ArtifactNode {
                path: f.path,
                is_directory: f.is_dir,
            })
            .collect())
    }

    fn fetch_artifact(&self, run_id: &str, path: &str) -> Result<LocalArtifactFile> {
        debug!(run_id, path, "downloading artifact");
        let resp = self
            .client
            .get(self.url("get-artifact")?)
            .query(&[("path", path), ("run_uuid", run_id)])
            .send()?;
        let bytes = Self::ensure_ok(resp, "get-artifact")?.bytes()?;
        LocalArtifactFile::materialize(run_id, path, &bytes)
    }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SearchExperimentsRequest {
    max_results: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    order_by: Vec<String>,
}

#[derive(Deserialize)]
struct SearchExperimentsResponse {
    #[serde(default)]
    experiments: Vec<WireExperiment>,
}

#[derive(Deserialize)]
struct WireExperiment {
    experiment_id: String,
    name: String,
    #[serde(default)]
    lifecycle_stage: LifecycleStage,
}

impl From<WireExperiment> for Experiment {
    fn from(w: WireExperiment) -> Self {
        Experiment {
            id: w.experiment_id,
            name: w.name,
            lifecycle_stage: w.lifecycle_stage,
        }
    }
}

#[derive(Serialize)]
struct SearchRunsRequest {
    experiment_ids: Vec<String>,
    max_results: u32,
}

#[derive(Deserialize)]
struct SearchRunsResponse {
    #[serde(default)]
    runs: Vec<WireRun>,
}

#[derive(Deserialize)]
struct WireRun {
    info: WireRunInfo,
    #[serde(default)]
    data: WireRunData,
}

#[derive(Deserialize)]
struct WireRunInfo {
    #[serde(default)]
    run_id: Option<String>,
    /// Older servers only send the deprecated `run_uuid`.
    #[serde(default)]
    run_uuid: Option<String>,
    status: RunStatus,
    #[serde(default, deserialize_with = "de_opt_i64")]
    start_time: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    end_time: Option<i64>,
}

#[derive(Deserialize, Default)]
struct WireRunData {
    #[serde(default)]
    metrics: Vec<WireMetric>,
    #[serde(default)]
    params: Vec<WireParam>,
}

#[derive(Deserialize)]
struct WireMetric {
    key: String,
    #[serde(deserialize_with = "de_f64")]
    value: f64,
}

#[derive(Deserialize)]
struct WireParam {
    key: String,
    #[serde(default)]
    value: String,
}

impl From<WireRun> for Run {
    fn from(w: WireRun) -> Self {
        let params: BTreeMap<String, String> =
            w.data.params.into_iter().map(|p| (p.key, p.value)).collect();
        let metrics: BTreeMap<String, f64> =
            w.data.metrics.into_iter().map(|m| (m.key, m.value)).collect();
        Run {
            run_id: w.info.run_id.or(w.info.run_uuid).unwrap_or_default(),
            status: w.info.status,
            start_time: w.info.start_time,
            end_time: w.info.end_time,
            params,
            metrics,
        }
    }
}

#[derive(Deserialize)]
struct SearchModelsResponse {
    #[serde(default)]
    registered_models: Vec<WireRegisteredModel>,
}

#[derive(Deserialize)]
struct WireRegisteredModel {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    latest_versions: Vec<WireModelVersion>,
}

#[derive(Deserialize)]
struct WireModelVersion {
    #[serde(deserialize_with = "de_u32")]
    version: u32,
    #[serde(default)]
    current_stage: ModelStage,
    #[serde(default)]
    run_id: String,
}

impl From<WireRegisteredModel> for RegisteredModel {
    fn from(w: WireRegisteredModel) -> Self {
        RegisteredModel {
            name: w.name,
            description: w.description.filter(|d| !d.is_empty()),
            latest_versions: w
                .latest_versions
                .into_iter()
                .map(|v| ModelVersion {
                    version: v.version,
                    stage: v.current_stage,
                    run_id: v.run_id,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct ListArtifactsResponse {
    #[serde(default)]
    files: Vec<WireFileInfo>,
}

#[derive(Deserialize)]
struct WireFileInfo {
    path: String,
    #[serde(default)]
    is_dir: bool,
}

// MLflow encodes int64 as JSON numbers, but proto3 JSON encoders send strings.

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

fn de_opt_i64<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<i64>, D::Error> {
    match Option::<NumberRepr>::deserialize(d)? {
        None => Ok(None),
        Some(NumberRepr::Int(n)) => Ok(Some(n)),
        Some(NumberRepr::Float(f)) => Ok(Some(f as i64)),
        Some(NumberRepr::Text(s)) => s.parse().map(Some).map_err(de::Error::custom),
    }
}

fn de_u32<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u32, D::Error> {
    match NumberRepr::deserialize(d)? {
        NumberRepr::Int(n) => u32::try_from(n).map_err(de::Error::custom),
        NumberRepr::Float(f) => Ok(f as u32),
        NumberRepr::Text(s) => s.parse().map_err(de::Error::custom),
    }
}

fn de_f64<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    match NumberRepr::deserialize(d)? {
        NumberRepr::Int(n) => Ok(n as f64),
        NumberRepr::Float(f) => Ok(f),
        NumberRepr::Text(s) => s.parse().map_err(de::Error::custom),
    }
}
