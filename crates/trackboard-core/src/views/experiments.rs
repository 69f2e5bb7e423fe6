use crate::error::Result;
use crate::surface::{Block, NoticeLevel, Page};
use crate::tabular::experiment_table;

use super::DashContext;

pub(super) const NO_EXPERIMENTS: &str = "No experiments found in the tracking service.";

pub(super) fn render(ctx: &DashContext, page: &mut Page) -> Result<()> {
    page.push(Block::Title("Experiments Overview".to_string()));

    let experiments = ctx.service.list_experiments()?;
    if experiments.is_empty() {
        page.notice(NoticeLevel::Warning, NO_EXPERIMENTS);
        return Ok(());
    }
    page.push(Block::Table(experiment_table(&experiments)));
    Ok(())
}
