pub mod types;

pub use types::{PrDetails, PullRequest};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use types::{Comment, CommitEntry, PrFile, Review};

const BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "pr-pulse";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("GitHub API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}")]
    Status { status: u16, url: String },
}

/// Source of per-PR detail sub-resources. The batch orchestrator depends on
/// this seam rather than on the concrete client so it can be exercised
/// without a network.
#[async_trait]
pub trait DetailSource: Send + Sync {
    async fn fetch_details(&self, number: u64) -> Result<PrDetails, ApiError>;
}

/// Authenticated client for one repository's pull-request endpoints.
///
/// Owns a single `reqwest::Client`, so every concurrent call in a run
/// shares one connection pool.
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    pub fn new(token: String, owner: String, repo: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            owner,
            repo,
        }
    }

    fn pulls_url(&self) -> String {
        format!("{}/repos/{}/{}/pulls", BASE_URL, self.owner, self.repo)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.v3+json")
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// List the repository's open pull requests.
    #[instrument(skip(self))]
    pub async fn list_pull_requests(&self) -> Result<Vec<PullRequest>, ApiError> {
        self.get_json(&self.pulls_url()).await
    }

    /// List open pull requests authored by `user`. The pulls endpoint has
    /// no author parameter, so this filters client-side.
    #[instrument(skip(self))]
    pub async fn list_pull_requests_by_user(
        &self,
        user: &str,
    ) -> Result<Vec<PullRequest>, ApiError> {
        let prs = self.list_pull_requests().await?;
        Ok(prs.into_iter().filter(|pr| pr.author() == user).collect())
    }

    /// Distinct author logins across the repository's open pull requests,
    /// sorted for stable prompt ordering.
    pub async fn list_authors(&self) -> Result<Vec<String>, ApiError> {
        let prs = self.list_pull_requests().await?;
        let mut authors: Vec<String> = prs.iter().map(|pr| pr.author().to_string()).collect();
        authors.sort();
        authors.dedup();
        Ok(authors)
    }
}

#[async_trait]
impl DetailSource for GitHubClient {
    /// Fetch the four detail sub-resources of one PR concurrently and merge
    /// them by resource kind. If any request fails the whole call fails; no
    /// partial detail sets are produced.
    #[instrument(skip(self))]
    async fn fetch_details(&self, number: u64) -> Result<PrDetails, ApiError> {
        let base = format!("{}/{}", self.pulls_url(), number);

        let (reviews, comments, commits, files) = tokio::try_join!(
            self.get_json::<Vec<Review>>(&format!("{base}/reviews")),
            self.get_json::<Vec<Comment>>(&format!("{base}/comments")),
            self.get_json::<Vec<CommitEntry>>(&format!("{base}/commits")),
            self.get_json::<Vec<PrFile>>(&format!("{base}/files")),
        )?;

        debug!(
            pr = number,
            reviews = reviews.len(),
            comments = comments.len(),
            commits = commits.len(),
            files = files.len(),
            "fetched PR details"
        );

        Ok(PrDetails {
            number,
            reviews,
            comments,
            commits,
            files,
        })
    }
}
