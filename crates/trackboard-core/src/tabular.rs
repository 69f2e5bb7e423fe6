//! Sparse records and the tables built from them.

use serde::Serialize;

use crate::format::{format_metric, format_timestamp_millis};
use crate::models::{Experiment, Run};

/// A record whose fields are all optional.
///
/// Fields keep their first insertion position; setting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRecord {
    fields: Vec<(String, String)>,
}

impl SparseRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

/// Union of the keys of `records`, in first-seen order.
pub fn union_columns(records: &[SparseRecord]) -> Vec<String> {
    let mut columns: Vec<String> = vec![];
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.to_string());
            }
        }
    }
    columns
}

/// A rectangular table of display strings. Absent cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: vec![],
        }
    }

    pub fn from_records(records: &[SparseRecord]) -> Self {
        let columns = union_columns(records);
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).unwrap_or_default().to_string())
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or_default())
                .collect(),
        )
    }
}

pub fn experiment_table(experiments: &[Experiment]) -> Table {
    let mut table = Table::new(vec![
        "Experiment ID".to_string(),
        "Name".to_string(),
        "Lifecycle Stage".to_string(),
    ]);
    for exp in experiments {
        table.push_row(vec![
            exp.id.clone(),
            exp.name.clone(),
            exp.lifecycle_stage.to_string(),
        ]);
    }
    table
}

/// Flattens a run into one sparse record: identity and timing columns
/// first, then params, then metrics. A metric sharing a param's key
/// overwrites the param value.
pub fn run_record(run: &Run) -> SparseRecord {
    let mut record = SparseRecord::new();
    record.set("Run ID", run.run_id.as_str());
    record.set("Status", run.status.to_string());
    record.set("Start Time", format_timestamp_millis(run.start_time));
    record.set("End Time", format_timestamp_millis(run.end_time));
    for (key, value) in &run.params {
        record.set(key.as_str(), value.as_str());
    }
    for (key, value) in &run.metrics {
        record.set(key.as_str(), format_metric(*value));
    }
    record
}

pub fn runs_table(runs: &[Run]) -> Table {
    let records: Vec<SparseRecord> = runs.iter().map(run_record).collect();
    Table::from_records(&records)
}
