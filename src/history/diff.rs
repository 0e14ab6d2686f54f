use std::collections::HashSet;

use serde::{Serialize, Serializer};

use crate::metrics::MetricsRecord;

/// Status value attached to rows that were present in the previous
/// snapshot but are no longer returned as open.
pub const CLOSED: &str = "CLOSED";

/// A numeric display cell: either the bare value, or the value annotated
/// with its change since the previous run. The tag decides both display
/// formatting and delta eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Plain(i64),
    Delta { value: i64, delta: i64 },
}

impl Cell {
    fn from_change(current: i64, previous: i64) -> Cell {
        let delta = current - previous;
        if delta == 0 {
            Cell::Plain(current)
        } else {
            Cell::Delta {
                value: current,
                delta,
            }
        }
    }

    pub fn delta(&self) -> Option<i64> {
        match self {
            Cell::Plain(_) => None,
            Cell::Delta { delta, .. } => Some(*delta),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Plain(value) => write!(f, "{value}"),
            Cell::Delta { value, delta } => write!(f, "{value} ({delta:+})"),
        }
    }
}

impl Serialize for Cell {
    /// Plain cells serialize as numbers; annotated cells as their display
    /// text, so the change survives structured output.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Plain(value) => serializer.serialize_i64(*value),
            Cell::Delta { .. } => serializer.serialize_str(&self.to_string()),
        }
    }
}

/// One output row: a current record with per-field change annotations, or a
/// previously seen record that disappeared and is presumed closed.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedRecord {
    #[serde(rename = "PR #")]
    pub number: u64,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Days Open")]
    pub days_open: Cell,
    #[serde(rename = "Files Changed")]
    pub files_changed: Cell,
    #[serde(rename = "Commits")]
    pub commits: Cell,
    #[serde(rename = "File Types")]
    pub file_types: String,
    #[serde(rename = "Comments")]
    pub comments: Cell,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl AnnotatedRecord {
    fn new(record: &MetricsRecord, status: Option<String>) -> Self {
        AnnotatedRecord {
            number: record.number,
            title: record.title.clone(),
            days_open: Cell::Plain(record.days_open),
            files_changed: Cell::Plain(record.files_changed as i64),
            commits: Cell::Plain(record.commits as i64),
            file_types: record.file_types.clone(),
            comments: Cell::Plain(record.comments as i64),
            status,
        }
    }

    /// Annotate a current record against its previous version. Title and
    /// File Types are identifying or textual and are never annotated.
    fn with_deltas(current: &MetricsRecord, previous: &MetricsRecord) -> Self {
        AnnotatedRecord {
            number: current.number,
            title: current.title.clone(),
            days_open: Cell::from_change(current.days_open, previous.days_open),
            files_changed: Cell::from_change(
                current.files_changed as i64,
                previous.files_changed as i64,
            ),
            commits: Cell::from_change(current.commits as i64, previous.commits as i64),
            file_types: current.file_types.clone(),
            comments: Cell::from_change(current.comments as i64, previous.comments as i64),
            status: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status.as_deref() == Some(CLOSED)
    }
}

/// Compare this run's records against the previous snapshot for the same
/// user, joining on PR number.
///
/// Current rows keep their order and pick up per-field deltas where a
/// previous version exists. Records present before but absent now are
/// appended after them in their prior order, marked CLOSED even though the
/// API no longer returns them. Inputs are not mutated.
pub fn diff(current: &[MetricsRecord], previous: &[MetricsRecord]) -> Vec<AnnotatedRecord> {
    let mut rows: Vec<AnnotatedRecord> = current
        .iter()
        .map(|record| {
            match previous.iter().find(|p| p.number == record.number) {
                Some(prev) => AnnotatedRecord::with_deltas(record, prev),
                None => AnnotatedRecord::new(record, None),
            }
        })
        .collect();

    let open: HashSet<u64> = current.iter().map(|r| r.number).collect();
    rows.extend(
        previous
            .iter()
            .filter(|p| !open.contains(&p.number))
            .map(|p| AnnotatedRecord::new(p, Some(CLOSED.to_string()))),
    );

    rows
}
