use std::collections::BTreeSet;

use crate::error::Result;
use crate::format::format_metric;
use crate::models::Run;
use crate::surface::{Block, LineChart, NoticeLevel, Page, SelectControl};
use crate::tabular::Table;

use super::{choose, select_experiment, DashContext, Selection};

/// Union of metric keys logged by any of `runs`, sorted.
pub fn metric_keys(runs: &[Run]) -> Vec<String> {
    runs.iter()
        .flat_map(|run| run.metrics.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `(run_id, value)` for each run that logged `key`, in run order. Runs
/// without the metric are left out rather than shown as gaps.
pub fn metric_series(runs: &[Run], key: &str) -> Vec<(String, f64)> {
    runs.iter()
        .filter_map(|run| run.metrics.get(key).map(|v| (run.run_id.clone(), *v)))
        .collect()
}

pub(super) fn render(ctx: &DashContext, selection: &Selection, page: &mut Page) -> Result<()> {
    page.push(Block::Title("Metrics Dashboard".to_string()));

    let Some(experiment) =
        select_experiment(ctx, "Select Experiment for Metrics", selection, page)?
    else {
        return Ok(());
    };
    let runs = ctx.service.list_runs(&experiment.id)?;
    if runs.is_empty() {
        page.notice(NoticeLevel::Warning, "No runs found to display metrics.");
        return Ok(());
    }

    let keys = metric_keys(&runs);
    let Some(key) = choose(&keys, selection.metric.as_deref()) else {
        page.notice(NoticeLevel::Warning, "No metrics found for this experiment.");
        return Ok(());
    };
    page.push(Block::Select(SelectControl {
        label: "Select Metric to Visualize".to_string(),
        param: "metric",
        options: keys,
        selected: Some(key.clone()),
        carry: vec![("experiment", experiment.name.clone())],
    }));

    let series = metric_series(&runs, &key);
    page.push(Block::LineChart(LineChart {
        title: key.clone(),
        x_label: "Run ID".to_string(),
        y_label: key.clone(),
        points: series.clone(),
    }));

    let mut table = Table::new(vec!["Run ID".to_string(), key]);
    for (run_id, value) in series {
        table.push_row(vec![run_id, format_metric(value)]);
    }
    page.push(Block::Table(table));
    Ok(())
}
