//! Integration tests for trackboard-core, run against the in-memory service.

use std::sync::Arc;

use trackboard_core::models::{ArtifactNode, ModelStage, ModelVersion, RegisteredModel};
use trackboard_core::preview::{classify, PreviewKind};
use trackboard_core::walker::walk_artifacts;
use trackboard_core::{
    views, Block, DashContext, DashError, Experiment, InMemoryTracking, NoticeLevel, Run,
    RunStatus, Selection, TrackingService, View,
};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn context(service: InMemoryTracking) -> DashContext {
    DashContext::new(Arc::new(service))
}

fn tree_service() -> InMemoryTracking {
    InMemoryTracking::new()
        .with_experiment(Experiment::new("1", "vision"))
        .with_run("1", Run::new("run-a", RunStatus::Finished))
        .with_artifact("run-a", "a.csv", "epoch,loss\n1,0.5\n2,0.3\n")
        .with_artifact("run-a", "sub/b.png", PNG_BYTES)
        .with_artifact("run-a", "sub/c.unknown", "??")
}

fn selection(experiment: &str) -> Selection {
    Selection {
        experiment: Some(experiment.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_walker_flattens_depth_first() {
    let service = tree_service();
    let files = walk_artifacts(&service, "run-a", "", 32).unwrap();
    assert_eq!(files, vec!["a.csv", "sub/b.png", "sub/c.unknown"]);

    let kinds: Vec<PreviewKind> = files.iter().map(|f| classify(f)).collect();
    assert_eq!(
        kinds,
        vec![PreviewKind::Tabular, PreviewKind::Image, PreviewKind::Unsupported]
    );
}

#[test]
fn test_walker_is_deterministic_and_not_memoized() {
    let service = tree_service();
    let first = walk_artifacts(&service, "run-a", "", 32).unwrap();
    let calls_after_first = service.listing_calls();
    let second = walk_artifacts(&service, "run-a", "", 32).unwrap();
    assert_eq!(first, second);
    assert_eq!(service.listing_calls(), calls_after_first * 2);
}

#[test]
fn test_walker_from_subdirectory() {
    let service = tree_service();
    let files = walk_artifacts(&service, "run-a", "sub", 32).unwrap();
    assert_eq!(files, vec!["sub/b.png", "sub/c.unknown"]);
}

#[test]
fn test_walker_guards_against_self_referencing_directories() {
    let service = InMemoryTracking::new().with_listing(
        "run-x",
        "loop",
        vec![ArtifactNode::dir("loop"), ArtifactNode::file("loop/f.txt")],
    ).with_listing("run-x", "", vec![ArtifactNode::dir("loop")]);

    let err = walk_artifacts(&service, "run-x", "", 5).unwrap_err();
    assert!(matches!(err, DashError::MaxDepthExceeded { max_depth: 5, .. }));
}

#[test]
fn test_walker_empty_run() {
    let service = InMemoryTracking::new();
    assert!(walk_artifacts(&service, "nothing", "", 32).unwrap().is_empty());
}

#[test]
fn test_experiments_view_sorted_by_name() {
    let ctx = context(
        InMemoryTracking::new()
            .with_experiment(Experiment::new("3", "zeta"))
            .with_experiment(Experiment::new("1", "alpha"))
            .with_experiment(Experiment::new("2", "mid")),
    );
    let page = views::render(&ctx, View::Experiments, &Selection::default());
    let tables = page.tables();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].columns, vec!["Experiment ID", "Name", "Lifecycle Stage"]);
    assert_eq!(tables[0].column("Name").unwrap(), vec!["alpha", "mid", "zeta"]);
    assert_eq!(tables[0].column("Lifecycle Stage").unwrap(), vec!["active"; 3]);
}

#[test]
fn test_zero_experiments_renders_notice_not_table() {
    let ctx = context(InMemoryTracking::new());
    let page = views::render(&ctx, View::Experiments, &Selection::default());
    assert!(page.tables().is_empty());
    assert_eq!(
        page.notices(),
        vec![(NoticeLevel::Warning, "No experiments found in the tracking service.")]
    );
}

#[test]
fn test_every_view_reports_missing_experiments() {
    let ctx = context(InMemoryTracking::new());
    for view in [View::Runs, View::MetricsOverview, View::Artifacts] {
        let page = views::render(&ctx, view, &Selection::default());
        assert_eq!(page.notices().len(), 1, "{view}");
        assert!(page.select("experiment").is_none());
    }
}

#[test]
fn test_runs_table_unions_columns() {
    let ctx = context(
        InMemoryTracking::new()
            .with_experiment(Experiment::new("7", "tabular"))
            .with_run(
                "7",
                Run::new("r1", RunStatus::Finished)
                    .with_param("lr", "0.1")
                    .with_metric("accuracy", 0.9),
            )
            .with_run(
                "7",
                Run::new("r2", RunStatus::Failed)
                    .with_param("depth", "4")
                    .with_metric("loss", 0.25),
            ),
    );
    let page = views::render(&ctx, View::Runs, &selection("tabular"));
    let table = page.tables()[0];
    assert_eq!(
        table.columns,
        vec![
            "Run ID", "Status", "Start Time", "End Time", "lr", "accuracy", "depth", "loss"
        ]
    );
    assert_eq!(table.rows[0], vec!["r1", "FINISHED", "", "", "0.1", "0.9", "", ""]);
    assert_eq!(table.rows[1], vec!["r2", "FAILED", "", "", "", "", "4", "0.25"]);
}

#[test]
fn test_runs_view_formats_timestamps() {
    let start = 1_700_000_000_000;
    let ctx = context(
        InMemoryTracking::new()
            .with_experiment(Experiment::new("1", "e"))
            .with_run("1", Run::new("r", RunStatus::Running).with_times(Some(start), None)),
    );
    let page = views::render(&ctx, View::Runs, &Selection::default());
    let table = page.tables()[0];
    let started = table.column("Start Time").unwrap()[0].to_string();
    assert_eq!(trackboard_core::format::parse_timestamp_millis(&started), Some(start));
    assert_eq!(table.column("End Time").unwrap(), vec![""]);
}

#[test]
fn test_runs_view_without_runs() {
    let ctx = context(InMemoryTracking::new().with_experiment(Experiment::new("1", "empty")));
    let page = views::render(&ctx, View::Runs, &Selection::default());
    assert!(page.tables().is_empty());
    assert_eq!(
        page.notices(),
        vec![(NoticeLevel::Warning, "No runs found for this experiment.")]
    );
}

#[test]
fn test_stale_experiment_selection_falls_back_to_first() {
    let ctx = context(
        InMemoryTracking::new()
            .with_experiment(Experiment::new("1", "b-exp"))
            .with_experiment(Experiment::new("2", "a-exp")),
    );
    let page = views::render(&ctx, View::Runs, &selection("deleted-long-ago"));
    let select = page.select("experiment").unwrap();
    assert_eq!(select.options, vec!["a-exp", "b-exp"]);
    assert_eq!(select.selected.as_deref(), Some("a-exp"));
}

#[test]
fn test_metrics_overview_drops_runs_without_metric() {
    let ctx = context(
        InMemoryTracking::new()
            .with_experiment(Experiment::new("1", "e"))
            .with_run("1", Run::new("r1", RunStatus::Finished).with_metric("accuracy", 0.8))
            .with_run("1", Run::new("r2", RunStatus::Finished).with_metric("loss", 0.4))
            .with_run("1", Run::new("r3", RunStatus::Finished).with_metric("accuracy", 0.85)),
    );
    let sel = Selection {
        metric: Some("accuracy".to_string()),
        ..Default::default()
    };
    let page = views::render(&ctx, View::MetricsOverview, &sel);

    let metric_select = page.select("metric").unwrap();
    assert_eq!(metric_select.options, vec!["accuracy", "loss"]);
    assert_eq!(metric_select.carry, vec![("experiment", "e".to_string())]);

    let table = page.tables()[0];
    assert_eq!(table.columns, vec!["Run ID", "accuracy"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.column("Run ID").unwrap(), vec!["r1", "r3"]);

    let chart = page
        .blocks
        .iter()
        .find_map(|b| match b {
            Block::LineChart(c) => Some(c),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        chart.points,
        vec![("r1".to_string(), 0.8), ("r3".to_string(), 0.85)]
    );
}

#[test]
fn test_metrics_overview_without_metrics() {
    let ctx = context(
        InMemoryTracking::new()
            .with_experiment(Experiment::new("1", "e"))
            .with_run("1", Run::new("r1", RunStatus::Finished)),
    );
    let page = views::render(&ctx, View::MetricsOverview, &Selection::default());
    assert!(page.select("metric").is_none());
    assert_eq!(
        page.notices(),
        vec![(NoticeLevel::Warning, "No metrics found for this experiment.")]
    );
}

#[test]
fn test_registered_models_view() {
    let ctx = context(
        InMemoryTracking::new()
            .with_model(RegisteredModel {
                name: "churn".to_string(),
                description: None,
                latest_versions: vec![ModelVersion {
                    version: 2,
                    stage: ModelStage::Production,
                    run_id: "r9".to_string(),
                }],
            })
            .with_model(RegisteredModel {
                name: "draft".to_string(),
                description: Some("work in progress".to_string()),
                latest_versions: vec![],
            }),
    );
    let page = views::render(&ctx, View::RegisteredModels, &Selection::default());
    assert!(page.blocks.contains(&Block::Subheader("churn".to_string())));
    assert!(page.blocks.contains(&Block::Field {
        label: "Description".to_string(),
        value: "No description".to_string(),
    }));
    assert!(page.blocks.contains(&Block::Bullets(vec![
        "Version 2 | Stage: Production | Run ID: r9".to_string()
    ])));
    assert!(page
        .blocks
        .contains(&Block::Caption("No versions available".to_string())));
}

#[test]
fn test_registered_models_empty() {
    let ctx = context(InMemoryTracking::new());
    let page = views::render(&ctx, View::RegisteredModels, &Selection::default());
    assert_eq!(page.notices().len(), 1);
}

#[test]
fn test_artifacts_view_previews_first_file_by_default() {
    let ctx = context(tree_service());
    let page = views::render(&ctx, View::Artifacts, &Selection::default());

    let artifact_select = page.select("artifact").unwrap();
    assert_eq!(artifact_select.options, vec!["a.csv", "sub/b.png", "sub/c.unknown"]);
    assert_eq!(
        artifact_select.carry,
        vec![("experiment", "vision".to_string()), ("run", "run-a".to_string())]
    );

    let table = page.tables()[0];
    assert_eq!(table.columns, vec!["epoch", "loss"]);
    assert_eq!(table.rows.len(), 2);
}

#[test]
fn test_artifacts_view_image_and_unsupported() {
    let ctx = context(tree_service());

    let sel = Selection {
        artifact: Some("sub/b.png".to_string()),
        ..Default::default()
    };
    let page = views::render(&ctx, View::Artifacts, &sel);
    assert!(page
        .blocks
        .iter()
        .any(|b| matches!(b, Block::Image { mime: "image/png", name, .. } if name == "b.png")));

    let sel = Selection {
        artifact: Some("sub/c.unknown".to_string()),
        ..Default::default()
    };
    let page = views::render(&ctx, View::Artifacts, &sel);
    assert_eq!(
        page.notices(),
        vec![(NoticeLevel::Info, "Preview not supported for this file type.")]
    );
}

#[test]
fn test_artifacts_view_malformed_csv_is_recoverable() {
    let ctx = context(
        InMemoryTracking::new()
            .with_experiment(Experiment::new("1", "e"))
            .with_run("1", Run::new("r", RunStatus::Finished))
            .with_artifact("r", "bad.csv", "a,b\n1,2,3\n"),
    );
    let page = views::render(&ctx, View::Artifacts, &Selection::default());
    let notices = page.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, NoticeLevel::Error);
    assert!(notices[0].1.contains("bad.csv"));
    // The selectors rendered before the failure are kept.
    assert!(page.select("artifact").is_some());
}

#[test]
fn test_artifacts_view_without_artifacts() {
    let ctx = context(
        InMemoryTracking::new()
            .with_experiment(Experiment::new("1", "e"))
            .with_run("1", Run::new("r", RunStatus::Finished)),
    );
    let page = views::render(&ctx, View::Artifacts, &Selection::default());
    assert_eq!(
        page.notices(),
        vec![(NoticeLevel::Warning, "No artifacts found for this run.")]
    );
}

#[test]
fn test_unavailable_service_becomes_warning() {
    let service = Arc::new(tree_service());
    service.set_unavailable(true);
    let ctx = DashContext::new(service.clone());
    for view in View::ALL {
        let page = views::render(&ctx, view, &Selection::default());
        let notices = page.notices();
        assert_eq!(notices.len(), 1, "{view}");
        assert_eq!(notices[0].0, NoticeLevel::Warning);
        assert!(notices[0].1.starts_with("tracking service unavailable"));
    }
    service.set_unavailable(false);
    assert_eq!(service.list_experiments().unwrap().len(), 1);
}

#[test]
fn test_local_artifact_file_is_removed_on_drop() {
    let service = tree_service();
    let local = service.fetch_artifact("run-a", "sub/b.png").unwrap();
    let path = local.local_path().to_path_buf();
    assert!(path.ends_with("b.png"));
    assert_eq!(local.read_bytes().unwrap(), PNG_BYTES);
    drop(local);
    assert!(!path.exists());
}
