use std::time::Duration;

use futures::future;
use indicatif::ProgressBar;
use tracing::{debug, instrument};

use crate::github::{ApiError, DetailSource, PrDetails, PullRequest};

/// Fetch details for every PR in `prs`, `batch_size` at a time.
///
/// Results are positionally aligned with the input. Each batch is joined in
/// full before the next one starts and a fixed pause separates batches, so
/// at most `batch_size` requests are in flight at once. A single failure
/// aborts the whole run with no partial results; later batches are never
/// issued.
#[instrument(skip_all, fields(prs = prs.len(), batch_size))]
pub async fn fetch_all_details<S: DetailSource>(
    source: &S,
    prs: &[PullRequest],
    batch_size: usize,
    pause: Duration,
    progress: Option<&ProgressBar>,
) -> Result<Vec<PrDetails>, ApiError> {
    let mut details = Vec::with_capacity(prs.len());

    for (i, batch) in prs.chunks(batch_size.max(1)).enumerate() {
        if i > 0 {
            tokio::time::sleep(pause).await;
        }
        debug!(batch = i, size = batch.len(), "fetching detail batch");
        let results =
            future::try_join_all(batch.iter().map(|pr| source.fetch_details(pr.number))).await?;
        details.extend(results);
        if let Some(bar) = progress {
            bar.inc(batch.len() as u64);
        }
    }

    Ok(details)
}
