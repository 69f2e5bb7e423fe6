//! View router and the five dashboard views.
//!
//! Rendering is stateless: every interaction calls [`render`] with the active
//! [`View`] and the user's current [`Selection`], and the view queries the
//! tracking service from scratch.

mod artifacts;
mod experiments;
mod metrics;
mod registry;
mod runs;

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::client::TrackingService;
use crate::config::DashConfig;
use crate::error::{DashError, Result};
use crate::models::Experiment;
use crate::surface::{Block, NoticeLevel, Page, SelectControl};

pub use metrics::{metric_keys, metric_series};

/// Navigation targets, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Experiments,
    Runs,
    RegisteredModels,
    MetricsOverview,
    Artifacts,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Experiments,
        View::Runs,
        View::RegisteredModels,
        View::MetricsOverview,
        View::Artifacts,
    ];

    /// Sidebar label.
    pub fn label(self) -> &'static str {
        match self {
            View::Experiments => "Experiments",
            View::Runs => "Runs",
            View::RegisteredModels => "Registered Models",
            View::MetricsOverview => "Metrics Overview",
            View::Artifacts => "Artifacts",
        }
    }

    /// URL and command-line identifier.
    pub fn slug(self) -> &'static str {
        match self {
            View::Experiments => "experiments",
            View::Runs => "runs",
            View::RegisteredModels => "models",
            View::MetricsOverview => "metrics",
            View::Artifacts => "artifacts",
        }
    }

    pub fn from_slug(slug: &str) -> Option<View> {
        View::ALL.into_iter().find(|v| v.slug() == slug)
    }

}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The user's choices within the active view. Any value may be missing or
/// stale; views fall back to the first available option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Selection {
    /// Experiment name.
    #[serde(default)]
    pub experiment: Option<String>,
    #[serde(default)]
    pub run: Option<String>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub artifact: Option<String>,
}

/// Everything a view needs, passed explicitly into each render.
#[derive(Clone)]
pub struct DashContext {
    pub service: Arc<dyn TrackingService>,
    pub max_artifact_depth: usize,
}

impl DashContext {
    pub fn new(service: Arc<dyn TrackingService>) -> Self {
        Self {
            service,
            max_artifact_depth: DashConfig::DEFAULT_MAX_ARTIFACT_DEPTH,
        }
    }

    pub fn from_config(service: Arc<dyn TrackingService>, config: &DashConfig) -> Self {
        Self {
            service,
            max_artifact_depth: config.max_artifact_depth,
        }
    }
}

/// Renders one view. Failures never escape: whatever the view managed to
/// render is kept and the failure is appended as an inline notice.
pub fn render(ctx: &DashContext, view: View, selection: &Selection) -> Page {
    let mut page = Page::new(view);
    let outcome = match view {
        View::Experiments => experiments::render(ctx, &mut page),
        View::Runs => runs::render(ctx, selection, &mut page),
        View::RegisteredModels => registry::render(ctx, &mut page),
        View::MetricsOverview => metrics::render(ctx, selection, &mut page),
        View::Artifacts => artifacts::render(ctx, selection, &mut page),
    };
    if let Err(err) = outcome {
        warn!(view = view.slug(), error = %err, "view degraded to notice");
        let level = match err {
            DashError::PreviewParse { .. } => NoticeLevel::Error,
            _ => NoticeLevel::Warning,
        };
        page.notice(level, err.to_string());
    }
    page
}

/// Picks `wanted` if it is one of `options`, else the first option.
fn choose(options: &[String], wanted: Option<&str>) -> Option<String> {
    wanted
        .and_then(|w| options.iter().find(|o| o.as_str() == w))
        .or_else(|| options.first())
        .cloned()
}

/// Adds the experiment selector and returns the chosen experiment, or
/// `None` after adding a notice when there are no experiments.
fn select_experiment(
    ctx: &DashContext,
    label: &str,
    selection: &Selection,
    page: &mut Page,
) -> Result<Option<Experiment>> {
    let experiments = ctx.service.list_experiments()?;
    if experiments.is_empty() {
        page.notice(NoticeLevel::Warning, experiments::NO_EXPERIMENTS);
        return Ok(None);
    }
    let names: Vec<String> = experiments.iter().map(|e| e.name.clone()).collect();
    let chosen = choose(&names, selection.experiment.as_deref());
    page.push(Block::Select(SelectControl {
        label: label.to_string(),
        param: "experiment",
        options: names,
        selected: chosen.clone(),
        carry: vec![],
    }));
    Ok(chosen.and_then(|name| experiments.into_iter().find(|e| e.name == name)))
}
