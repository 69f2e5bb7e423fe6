//! Plain-text rendering of dashboard pages.

use comfy_table::{presets::UTF8_FULL, Table};

use trackboard::surface::{Block, NoticeLevel, Page, SelectControl};

pub fn render_page(page: &Page) -> String {
    let mut out = String::new();
    for block in &page.blocks {
        render_block(&mut out, block);
    }
    out
}

fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

fn render_block(out: &mut String, block: &Block) {
    match block {
        Block::Title(text) => {
            line(out, format!("── {} ", text));
            line(out, "");
        }
        Block::Subheader(text) => line(out, format!("{}:", text)),
        Block::Field { label, value } => line(out, format!("  {}: {}", label, value)),
        Block::Bullets(items) => {
            for item in items {
                line(out, format!("  - {}", item));
            }
        }
        Block::Caption(text) => line(out, format!("  ({})", text)),
        Block::Notice { level, message } => {
            let tag = match level {
                NoticeLevel::Info => "info",
                NoticeLevel::Warning => "warning",
                NoticeLevel::Error => "error",
            };
            line(out, format!("{}: {}", tag, message));
        }
        Block::Select(select) => render_select(out, select),
        Block::Table(data) => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(&data.columns);
            for row in &data.rows {
                table.add_row(row);
            }
            line(out, table.to_string());
        }
        // The metrics view always pairs its chart with a table of the same points.
        Block::LineChart(chart) => {
            line(out, format!("{} ({} points)", chart.title, chart.points.len()))
        }
        Block::Image { name, mime, base64 } => line(
            out,
            format!("[image {} ({}, {} base64 chars)]", name, mime, base64.len()),
        ),
        Block::Code { content, .. } => {
            out.push_str(content);
            if !content.ends_with('\n') {
                out.push('\n');
            }
        }
        Block::Json(value) => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            line(out, pretty);
        }
        Block::Document { name, mime, .. } => line(out, format!("[document {} ({})]", name, mime)),
    }
}

fn render_select(out: &mut String, select: &SelectControl) {
    let chosen = select.selected.as_deref().unwrap_or("-");
    line(
        out,
        format!(
            "{}: {}  [{} option(s), --{} to change]",
            select.label,
            chosen,
            select.options.len(),
            select.param
        ),
    );
}
