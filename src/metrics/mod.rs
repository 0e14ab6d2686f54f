pub mod status;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::github::{PrDetails, PullRequest};

/// Display-order field names; also the accepted sort keys.
pub const FIELDS: [&str; 7] = [
    "PR #",
    "Title",
    "Days Open",
    "Files Changed",
    "Commits",
    "File Types",
    "Comments",
];

pub const DEFAULT_SORT_FIELD: &str = "Days Open";

#[derive(Debug, Error)]
#[error("Unknown sort field '{0}' (expected one of: PR #, Title, Days Open, Files Changed, Commits, File Types, Comments)")]
pub struct UnknownFieldError(pub String);

/// Flat per-PR metrics row.
///
/// Serialized field names are the display names in display order; the same
/// shape serves JSON output and the snapshot file, so a saved run can be
/// diffed against a later one without translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsRecord {
    #[serde(rename = "PR #")]
    pub number: u64,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Days Open")]
    pub days_open: i64,
    #[serde(rename = "Files Changed")]
    pub files_changed: u64,
    #[serde(rename = "Commits")]
    pub commits: u64,
    #[serde(rename = "File Types")]
    pub file_types: String,
    #[serde(rename = "Comments")]
    pub comments: u64,
}

/// Reduce one PR and its detail set to a metrics row. Pure; `now` is passed
/// in so Days Open is deterministic for a fixed reference time.
pub fn summarize(pr: &PullRequest, details: &PrDetails, now: DateTime<Utc>) -> MetricsRecord {
    let days_open = (now - pr.created_at).num_days().max(0);

    let extensions: BTreeSet<&str> = details.files.iter().map(|f| f.extension()).collect();
    let file_types = extensions.into_iter().collect::<Vec<_>>().join(", ");

    MetricsRecord {
        number: pr.number,
        title: pr.title.clone(),
        days_open,
        files_changed: details.files.len() as u64,
        commits: details.commits.len() as u64,
        file_types,
        comments: details.comments.len() as u64,
    }
}

/// Sort records descending by the given display field. Unknown fields are
/// rejected so a typo in --sort cannot silently reorder output.
pub fn sort_by_field(records: &mut [MetricsRecord], field: &str) -> Result<(), UnknownFieldError> {
    match field {
        "PR #" => records.sort_by(|a, b| b.number.cmp(&a.number)),
        "Title" => records.sort_by(|a, b| b.title.cmp(&a.title)),
        "Days Open" => records.sort_by(|a, b| b.days_open.cmp(&a.days_open)),
        "Files Changed" => records.sort_by(|a, b| b.files_changed.cmp(&a.files_changed)),
        "Commits" => records.sort_by(|a, b| b.commits.cmp(&a.commits)),
        "File Types" => records.sort_by(|a, b| b.file_types.cmp(&a.file_types)),
        "Comments" => records.sort_by(|a, b| b.comments.cmp(&a.comments)),
        other => return Err(UnknownFieldError(other.to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::{Author, Comment, CommitEntry, PrFile};
    use chrono::TimeZone;

    pub fn test_pr(number: u64, created_at: DateTime<Utc>) -> PullRequest {
        PullRequest {
            number,
            title: format!("PR {number}"),
            user: Author {
                login: "alice".to_string(),
            },
            created_at,
            draft: false,
        }
    }

    pub fn test_details(number: u64, filenames: &[&str]) -> PrDetails {
        PrDetails {
            number,
            reviews: vec![],
            comments: vec![Comment { id: 1 }, Comment { id: 2 }],
            commits: vec![CommitEntry {
                sha: "abc123".to_string(),
            }],
            files: filenames
                .iter()
                .map(|name| PrFile {
                    filename: name.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_summarize_basic_fields() {
        let created = Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 7, 11, 18, 30, 0).unwrap();
        let pr = test_pr(42, created);
        let details = test_details(42, &["a.go", "b.go", "README"]);

        let record = summarize(&pr, &details, now);
        assert_eq!(record.number, 42);
        assert_eq!(record.days_open, 10);
        assert_eq!(record.files_changed, 3);
        assert_eq!(record.commits, 1);
        assert_eq!(record.comments, 2);
    }

    #[test]
    fn test_file_types_sorted_and_distinct() {
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let pr = test_pr(1, now);
        let details = test_details(1, &["a.go", "b.go", "README"]);

        let record = summarize(&pr, &details, now);
        assert_eq!(record.file_types, "go, no_ext");
    }

    #[test]
    fn test_file_types_empty_for_no_files() {
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let pr = test_pr(1, now);
        let details = test_details(1, &[]);

        let record = summarize(&pr, &details, now);
        assert_eq!(record.files_changed, 0);
        assert_eq!(record.file_types, "");
    }

    #[test]
    fn test_days_open_truncates_partial_days() {
        let created = Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 7, 2, 11, 59, 59).unwrap();
        let record = summarize(&test_pr(1, created), &test_details(1, &[]), now);
        assert_eq!(record.days_open, 0);
    }

    #[test]
    fn test_days_open_monotone_in_now() {
        let created = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        let pr = test_pr(1, created);
        let details = test_details(1, &[]);

        let mut previous = 0;
        for day in 1..30 {
            let now = created + chrono::Duration::days(day) + chrono::Duration::hours(3);
            let record = summarize(&pr, &details, now);
            assert!(record.days_open >= previous);
            previous = record.days_open;
        }
    }

    #[test]
    fn test_days_open_clamped_non_negative() {
        let created = Utc.with_ymd_and_hms(2026, 7, 2, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let record = summarize(&test_pr(1, created), &test_details(1, &[]), now);
        assert_eq!(record.days_open, 0);
    }

    #[test]
    fn test_serialized_field_names_are_display_names() {
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let record = summarize(&test_pr(3, now), &test_details(3, &["x.rs"]), now);
        let json = serde_json::to_value(&record).unwrap();
        for field in FIELDS {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
    }

    #[test]
    fn test_sort_by_numeric_field_descending() {
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let mut records: Vec<_> = [1u64, 3, 2]
            .iter()
            .map(|n| {
                let mut record = summarize(&test_pr(*n, now), &test_details(*n, &[]), now);
                record.comments = *n * 10;
                record
            })
            .collect();

        sort_by_field(&mut records, "Comments").unwrap();
        let order: Vec<u64> = records.iter().map(|r| r.number).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn test_sort_unknown_field_rejected() {
        let mut records = vec![];
        let err = sort_by_field(&mut records, "Reviewers").unwrap_err();
        assert!(err.to_string().contains("Reviewers"));
    }
}
