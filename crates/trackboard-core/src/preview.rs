//! Artifact previewer: suffix classification and per-kind rendering.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use tracing::debug;

use crate::error::{DashError, Result};
use crate::models::LocalArtifactFile;
use crate::surface::{Block, NoticeLevel};
use crate::tabular::Table;

pub const UNSUPPORTED_NOTICE: &str = "Preview not supported for this file type.";

/// How an artifact is shown, decided from its file name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Image,
    Tabular,
    Structured,
    Text,
    Document,
    Unsupported,
}

const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg"];
const TEXT_SUFFIXES: &[&str] = &[".txt", ".log", ".py", ".sh"];

/// Classifies `path` by exact, case-sensitive suffix. Rules are checked in a
/// fixed order and the first match wins.
pub fn classify(path: &str) -> PreviewKind {
    let has = |suffixes: &[&str]| suffixes.iter().any(|s| path.ends_with(s));
    if has(IMAGE_SUFFIXES) {
        PreviewKind::Image
    } else if path.ends_with(".csv") {
        PreviewKind::Tabular
    } else if path.ends_with(".json") {
        PreviewKind::Structured
    } else if has(TEXT_SUFFIXES) {
        PreviewKind::Text
    } else if path.ends_with(".pdf") {
        PreviewKind::Document
    } else {
        PreviewKind::Unsupported
    }
}

fn image_mime(path: &str) -> &'static str {
    if path.ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

fn code_language(path: &str) -> Option<&'static str> {
    if path.ends_with(".py") {
        Some("python")
    } else if path.ends_with(".sh") {
        Some("bash")
    } else {
        None
    }
}

fn display_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Renders a downloaded artifact as a display block.
///
/// Malformed content of a recognized kind is a [`DashError::PreviewParse`];
/// an unrecognized kind is an informational notice, not an error.
pub fn render_preview(file: &LocalArtifactFile) -> Result<Block> {
    let path = file.artifact_path();
    let kind = classify(path);
    debug!(run_id = file.run_id(), path, ?kind, "rendering preview");
    if kind == PreviewKind::Unsupported {
        return Ok(Block::Notice {
            level: NoticeLevel::Info,
            message: UNSUPPORTED_NOTICE.to_string(),
        });
    }
    let bytes = file.read_bytes()?;
    render_bytes(kind, path, bytes)
}

pub fn render_bytes(kind: PreviewKind, path: &str, bytes: Vec<u8>) -> Result<Block> {
    let block = match kind {
        PreviewKind::Image => Block::Image {
            name: display_name(path),
            mime: image_mime(path),
            base64: STANDARD.encode(&bytes),
        },
        PreviewKind::Tabular => {
            let text = decode_text(path, bytes)?;
            Block::Table(parse_csv(&text).map_err(|reason| DashError::preview(path, reason))?)
        }
        PreviewKind::Structured => {
            let value: serde_json::Value =
                serde_json::from_slice(&bytes).map_err(|e| DashError::preview(path, e))?;
            Block::Json(value)
        }
        PreviewKind::Text => Block::Code {
            language: code_language(path),
            content: decode_text(path, bytes)?,
        },
        PreviewKind::Document => Block::Document {
            name: display_name(path),
            mime: "application/pdf",
            base64: STANDARD.encode(&bytes),
        },
        PreviewKind::Unsupported => Block::Notice {
            level: NoticeLevel::Info,
            message: UNSUPPORTED_NOTICE.to_string(),
        },
    };
    Ok(block)
}

fn decode_text(path: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| DashError::preview(path, e))
}

/// Parses comma-separated text with a header row.
///
/// Fields may be double-quoted, with `""` escaping a quote; a quote inside an
/// unquoted field is kept as a literal character. Blank lines are
/// skipped. Short rows are padded with empty cells; a row with more fields
/// than the header is an error.
pub fn parse_csv(text: &str) -> std::result::Result<Table, String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text)?.into_iter();

    let Some((_, columns)) = records.next() else {
        return Err("no columns to parse".to_string());
    };
    let width = columns.len();
    let mut table = Table::new(columns);

    for (line, mut fields) in records {
        if fields.len() > width {
            return Err(format!(
                "expected {} fields in line {}, saw {}",
                width,
                line,
                fields.len()
            ));
        }
        fields.resize(width, String::new());
        table.push_row(fields);
    }
    Ok(table)
}

/// Splits text into records of fields, each tagged with its 1-based
/// starting line number.
fn split_records(text: &str) -> std::result::Result<Vec<(usize, Vec<String>)>, String> {
    let mut records = vec![];
    let mut fields: Vec<String> = vec![];
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted_field = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() && !quoted_field => {
                in_quotes = true;
                quoted_field = true;
            }
            '"' => field.push(c),
            ',' => {
                fields.push(std::mem::take(&mut field));
                quoted_field = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                end_record(&mut records, &mut fields, &mut field, quoted_field, record_line);
                quoted_field = false;
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }
    if in_quotes {
        return Err(format!("unterminated quoted field starting in line {}", record_line));
    }
    end_record(&mut records, &mut fields, &mut field, quoted_field, record_line);
    Ok(records)
}

fn end_record(
    records: &mut Vec<(usize, Vec<String>)>,
    fields: &mut Vec<String>,
    field: &mut String,
    quoted_field: bool,
    line: usize,
) {
    let blank = fields.is_empty() && field.trim().is_empty() && !quoted_field;
    if blank {
        field.clear();
        return;
    }
    fields.push(std::mem::take(field));
    records.push((line, std::mem::take(fields)));
}
