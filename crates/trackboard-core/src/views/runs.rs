use crate::error::Result;
use crate::surface::{Block, NoticeLevel, Page};
use crate::tabular::runs_table;

use super::{select_experiment, DashContext, Selection};

pub(super) fn render(ctx: &DashContext, selection: &Selection, page: &mut Page) -> Result<()> {
    page.push(Block::Title("Model Runs".to_string()));

    let Some(experiment) = select_experiment(ctx, "Select Experiment", selection, page)? else {
        return Ok(());
    };
    let runs = ctx.service.list_runs(&experiment.id)?;
    if runs.is_empty() {
        page.notice(NoticeLevel::Warning, "No runs found for this experiment.");
        return Ok(());
    }
    page.push(Block::Table(runs_table(&runs)));
    Ok(())
}
