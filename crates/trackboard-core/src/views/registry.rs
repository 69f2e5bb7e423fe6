use crate::error::Result;
use crate::models::RegisteredModel;
use crate::surface::{Block, NoticeLevel, Page};

use super::DashContext;

pub(super) fn render(ctx: &DashContext, page: &mut Page) -> Result<()> {
    page.push(Block::Title("Registered Models".to_string()));

    let models = ctx.service.list_registered_models()?;
    if models.is_empty() {
        page.notice(
            NoticeLevel::Warning,
            "No registered models found in the model registry.",
        );
        return Ok(());
    }
    for model in &models {
        render_model(model, page);
    }
    Ok(())
}

fn render_model(model: &RegisteredModel, page: &mut Page) {
    page.push(Block::Subheader(model.name.clone()));
    page.push(Block::Field {
        label: "Description".to_string(),
        value: model
            .description
            .clone()
            .unwrap_or_else(|| "No description".to_string()),
    });
    if model.latest_versions.is_empty() {
        page.push(Block::Caption("No versions available".to_string()));
        return;
    }
    let lines = model
        .latest_versions
        .iter()
        .map(|v| {
            format!(
                "Version {} | Stage: {} | Run ID: {}",
                v.version, v.stage, v.run_id
            )
        })
        .collect();
    page.push(Block::Bullets(lines));
}
