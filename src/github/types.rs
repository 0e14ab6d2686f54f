use chrono::{DateTime, Utc};
use serde::Deserialize;

/// An open pull request as returned by `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    /// PR number, unique within the repository
    pub number: u64,
    /// PR title
    pub title: String,
    /// Author of the PR
    pub user: Author,
    /// Creation timestamp, UTC
    pub created_at: DateTime<Utc>,
    /// Whether the PR is marked as a draft
    #[serde(default)]
    pub draft: bool,
}

impl PullRequest {
    pub fn author(&self) -> &str {
        &self.user.login
    }
}

/// The `user` object nested in PR and review payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub login: String,
}

/// A submitted review. `state` is a raw API value such as `APPROVED`,
/// `COMMENTED`, or `CHANGES_REQUESTED`; callers compare it
/// case-insensitively.
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub user: Author,
    pub state: String,
}

/// A review comment on a PR. Only the count is consumed downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: u64,
}

/// A commit on the PR branch. Only the count is consumed downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitEntry {
    pub sha: String,
}

/// A changed file within a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct PrFile {
    pub filename: String,
}

impl PrFile {
    /// File extension after the last `.`, or `no_ext` for undotted names.
    pub fn extension(&self) -> &str {
        match self.filename.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => "no_ext",
        }
    }
}

/// The four detail sub-resources of one pull request, merged by resource
/// kind regardless of which request completed first.
#[derive(Debug, Clone)]
pub struct PrDetails {
    /// Number of the owning PR
    pub number: u64,
    pub reviews: Vec<Review>,
    pub comments: Vec<Comment>,
    pub commits: Vec<CommitEntry>,
    pub files: Vec<PrFile>,
}
