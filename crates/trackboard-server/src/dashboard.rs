//! The HTML dashboard at `/`.

use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;
use tracing::debug;

use trackboard_core::surface::NoticeLevel;
use trackboard_core::{Page, Selection, View};

use crate::html;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub view: Option<String>,
    pub experiment: Option<String>,
    pub run: Option<String>,
    pub metric: Option<String>,
    pub artifact: Option<String>,
}

impl DashboardQuery {
    /// Unknown or missing view slugs fall back to the default view.
    pub fn view(&self) -> View {
        self.view
            .as_deref()
            .and_then(View::from_slug)
            .unwrap_or_default()
    }

    pub fn selection(&self) -> Selection {
        Selection {
            experiment: non_empty(&self.experiment),
            run: non_empty(&self.run),
            metric: non_empty(&self.metric),
            artifact: non_empty(&self.artifact),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let view = query.view();
    let selection = query.selection();
    debug!(view = view.slug(), ?selection, "render");

    let ctx = state.ctx.clone();
    let page = tokio::task::spawn_blocking(move || trackboard_core::views::render(&ctx, view, &selection))
        .await
        .unwrap_or_else(|err| {
            let mut page = Page::new(view);
            page.notice(NoticeLevel::Error, format!("render task failed: {}", err));
            page
        });

    Html(html::render_page(&page))
}
