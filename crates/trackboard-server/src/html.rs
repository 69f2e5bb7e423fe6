//! HTML rendering of dashboard pages.

use serde_json::Value;

use trackboard_core::surface::{Block, LineChart, NoticeLevel, Page, SelectControl};
use trackboard_core::tabular::Table;
use trackboard_core::View;

use crate::chart::line_chart_svg;

pub const APP_TITLE: &str = "Developer Dashboard";

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Renders a full document: sidebar navigation plus the page's blocks.
pub fn render_page(page: &Page) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!(
        "<title>{} | {}</title>\n",
        escape_html(page.view.label()),
        APP_TITLE
    ));
    out.push_str("<link rel=\"stylesheet\" href=\"/assets/style.css\">\n</head>\n<body>\n");
    render_sidebar(&mut out, page.view);
    out.push_str("<main class=\"content\">\n");
    for block in &page.blocks {
        render_block(&mut out, page.view, block);
    }
    out.push_str("</main>\n</body>\n</html>\n");
    out
}

fn render_sidebar(out: &mut String, active: View) {
    out.push_str("<nav class=\"sidebar\">\n");
    out.push_str(&format!("<h1>{}</h1>\n<ul>\n", APP_TITLE));
    for view in View::ALL {
        let class = if view == active { " class=\"active\"" } else { "" };
        out.push_str(&format!(
            "<li><a href=\"/?view={}\"{}>{}</a></li>\n",
            view.slug(),
            class,
            escape_html(view.label())
        ));
    }
    out.push_str("</ul>\n</nav>\n");
}

fn render_block(out: &mut String, view: View, block: &Block) {
    match block {
        Block::Title(text) => out.push_str(&format!("<h2>{}</h2>\n", escape_html(text))),
        Block::Subheader(text) => out.push_str(&format!("<h3>{}</h3>\n", escape_html(text))),
        Block::Field { label, value } => out.push_str(&format!(
            "<p><strong>{}:</strong> {}</p>\n",
            escape_html(label),
            escape_html(value)
        )),
        Block::Bullets(items) => {
            out.push_str("<ul class=\"bullets\">\n");
            for item in items {
                out.push_str(&format!("<li>{}</li>\n", escape_html(item)));
            }
            out.push_str("</ul>\n");
        }
        Block::Caption(text) => {
            out.push_str(&format!("<p class=\"caption\">{}</p>\n", escape_html(text)))
        }
        Block::Notice { level, message } => render_notice(out, *level, message),
        Block::Select(select) => render_select(out, view, select),
        Block::Table(table) => render_table(out, table),
        Block::LineChart(chart) => render_chart(out, chart),
        Block::Image { name, mime, base64 } => out.push_str(&format!(
            "<figure><img src=\"data:{};base64,{}\" alt=\"{}\"><figcaption>{}</figcaption></figure>\n",
            mime,
            base64,
            escape_html(name),
            escape_html(name)
        )),
        Block::Code { language, content } => {
            let class = language
                .map(|l| format!(" class=\"language-{}\"", l))
                .unwrap_or_default();
            out.push_str(&format!(
                "<pre><code{}>{}</code></pre>\n",
                class,
                escape_html(content)
            ));
        }
        Block::Json(value) => {
            out.push_str("<div class=\"json\">\n");
            render_json(out, None, value);
            out.push_str("</div>\n");
        }
        Block::Document { name, mime, base64 } => out.push_str(&format!(
            "<iframe class=\"document\" title=\"{}\" src=\"data:{};base64,{}\" width=\"100%\" height=\"600\"></iframe>\n",
            escape_html(name),
            mime,
            base64
        )),
    }
}

fn render_notice(out: &mut String, level: NoticeLevel, message: &str) {
    let class = match level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    out.push_str(&format!(
        "<div class=\"notice {}\">{}</div>\n",
        class,
        escape_html(message)
    ));
}

/// A GET form that resubmits the active view and the upstream selections.
fn render_select(out: &mut String, view: View, select: &SelectControl) {
    out.push_str("<form class=\"select\" method=\"get\" action=\"/\">\n");
    out.push_str(&format!(
        "<input type=\"hidden\" name=\"view\" value=\"{}\">\n",
        view.slug()
    ));
    for (name, value) in &select.carry {
        out.push_str(&format!(
            "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
            name,
            escape_html(value)
        ));
    }
    out.push_str(&format!(
        "<label>{}\n<select name=\"{}\" onchange=\"this.form.submit()\">\n",
        escape_html(&select.label),
        select.param
    ));
    for option in &select.options {
        let selected = if select.selected.as_deref() == Some(option.as_str()) {
            " selected"
        } else {
            ""
        };
        let escaped = escape_html(option);
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            escaped, selected, escaped
        ));
    }
    out.push_str("</select>\n</label>\n<noscript><button type=\"submit\">Show</button></noscript>\n</form>\n");
}

fn render_table(out: &mut String, table: &Table) {
    out.push_str("<div class=\"table-wrap\"><table>\n<thead><tr>");
    for column in &table.columns {
        out.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table></div>\n");
}

fn render_chart(out: &mut String, chart: &LineChart) {
    match line_chart_svg(chart) {
        Ok(svg) => {
            out.push_str("<div class=\"chart\">\n");
            out.push_str(&svg);
            out.push_str("\n</div>\n");
        }
        Err(err) => render_notice(out, NoticeLevel::Error, &err),
    }
}

/// Objects and arrays become collapsible `<details>` nodes; scalars are
/// shown inline.
fn render_json(out: &mut String, key: Option<&str>, value: &Value) {
    let key_html = key
        .map(|k| format!("<span class=\"key\">{}</span>: ", escape_html(k)))
        .unwrap_or_default();
    match value {
        Value::Object(map) => {
            out.push_str(&format!(
                "<details open><summary>{}{{{}}}</summary>\n",
                key_html,
                map.len()
            ));
            for (k, v) in map {
                render_json(out, Some(k), v);
            }
            out.push_str("</details>\n");
        }
        Value::Array(items) => {
            out.push_str(&format!(
                "<details open><summary>{}[{}]</summary>\n",
                key_html,
                items.len()
            ));
            for (i, v) in items.iter().enumerate() {
                render_json(out, Some(&i.to_string()), v);
            }
            out.push_str("</details>\n");
        }
        scalar => out.push_str(&format!(
            "<div class=\"leaf\">{}<code>{}</code></div>\n",
            key_html,
            escape_html(&scalar.to_string())
        )),
    }
}
