//! Renderer-independent page model.
//!
//! Views only describe what to show; the HTML renderer in trackboard-server
//! and the terminal renderer in trackboard-cli decide how.

use crate::tabular::Table;
use crate::views::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A single-choice selector.
///
/// `carry` lists the upstream selections that must be resubmitted with this
/// control; anything downstream of it is dropped when it changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectControl {
    pub label: String,
    pub param: &'static str,
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub carry: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Subheader(String),
    /// A label in bold followed by plain text.
    Field { label: String, value: String },
    Bullets(Vec<String>),
    Caption(String),
    Notice { level: NoticeLevel, message: String },
    Select(SelectControl),
    Table(Table),
    LineChart(LineChart),
    Image { name: String, mime: &'static str, base64: String },
    Code { language: Option<&'static str>, content: String },
    Json(serde_json::Value),
    Document { name: String, mime: &'static str, base64: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub view: View,
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new(view: View) -> Self {
        Self {
            view,
            blocks: vec![],
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.blocks.push(Block::Notice {
            level,
            message: message.into(),
        });
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, &str)> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Notice { level, message } => Some((*level, message.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn tables(&self) -> Vec<&Table> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn select(&self, param: &str) -> Option<&SelectControl> {
        self.blocks.iter().find_map(|b| match b {
            Block::Select(s) if s.param == param => Some(s),
            _ => None,
        })
    }
}
