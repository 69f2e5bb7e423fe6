use crate::error::Result;
use crate::preview::render_preview;
use crate::surface::{Block, NoticeLevel, Page, SelectControl};
use crate::walker::walk_artifacts;

use super::{choose, select_experiment, DashContext, Selection};

pub(super) fn render(ctx: &DashContext, selection: &Selection, page: &mut Page) -> Result<()> {
    page.push(Block::Title("Artifacts Overview".to_string()));

    let Some(experiment) =
        select_experiment(ctx, "Select Experiment for Artifacts", selection, page)?
    else {
        return Ok(());
    };
    let runs = ctx.service.list_runs(&experiment.id)?;
    let run_ids: Vec<String> = runs.into_iter().map(|r| r.run_id).collect();
    let Some(run_id) = choose(&run_ids, selection.run.as_deref()) else {
        page.notice(NoticeLevel::Warning, "No runs found to display artifacts.");
        return Ok(());
    };
    page.push(Block::Select(SelectControl {
        label: "Select Run".to_string(),
        param: "run",
        options: run_ids,
        selected: Some(run_id.clone()),
        carry: vec![("experiment", experiment.name.clone())],
    }));

    let files = walk_artifacts(ctx.service.as_ref(), &run_id, "", ctx.max_artifact_depth)?;
    let Some(artifact) = choose(&files, selection.artifact.as_deref()) else {
        page.notice(NoticeLevel::Warning, "No artifacts found for this run.");
        return Ok(());
    };
    page.push(Block::Select(SelectControl {
        label: "Select artifact to preview".to_string(),
        param: "artifact",
        options: files,
        selected: Some(artifact.clone()),
        carry: vec![
            ("experiment", experiment.name.clone()),
            ("run", run_id.clone()),
        ],
    }));

    let local = ctx.service.fetch_artifact(&run_id, &artifact)?;
    page.push(render_preview(&local)?);
    Ok(())
}
