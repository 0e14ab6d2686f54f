use std::collections::{BTreeSet, HashSet};

use crate::github::types::Review;
use crate::github::{PrDetails, PullRequest};

/// Reserved marker offered in the status picker; expands to every observed
/// status and is never used as a filter value itself.
pub const ALL_MARKER: &str = "ALL";

/// Primary status derived from a PR's draft flag and its reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrStatus {
    Draft,
    Ready,
    PendingReview,
}

impl std::fmt::Display for PrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrStatus::Draft => write!(f, "DRAFT"),
            PrStatus::Ready => write!(f, "READY"),
            PrStatus::PendingReview => write!(f, "PENDING REVIEW"),
        }
    }
}

/// Classify one PR. The draft flag wins outright and reviews are not
/// consulted for drafts. Otherwise at least one reviewer with an APPROVED
/// review (case-insensitive, distinct logins) makes the PR READY, else it
/// is PENDING REVIEW.
pub fn classify(pr: &PullRequest, reviews: &[Review]) -> PrStatus {
    if pr.draft {
        return PrStatus::Draft;
    }

    let approvers: HashSet<&str> = reviews
        .iter()
        .filter(|review| review.state.eq_ignore_ascii_case("APPROVED"))
        .map(|review| review.user.login.as_str())
        .collect();

    if approvers.is_empty() {
        PrStatus::PendingReview
    } else {
        PrStatus::Ready
    }
}

/// Review states outside the classification vocabulary (anything other than
/// APPROVED or COMMENTED), upper-cased. These surface in the selectable
/// status list alongside the derived statuses.
pub fn extra_states(reviews: &[Review]) -> BTreeSet<String> {
    reviews
        .iter()
        .filter(|review| {
            !review.state.eq_ignore_ascii_case("APPROVED")
                && !review.state.eq_ignore_ascii_case("COMMENTED")
        })
        .map(|review| review.state.to_uppercase())
        .collect()
}

/// All statuses observed across `prs` (matched positionally with
/// `details`), plus the reserved ALL marker, sorted lexicographically.
/// Draft PRs contribute only DRAFT; their reviews are not inspected.
pub fn aggregate_statuses(prs: &[PullRequest], details: &[PrDetails]) -> Vec<String> {
    let mut statuses = BTreeSet::from([ALL_MARKER.to_string()]);

    for (pr, detail) in prs.iter().zip(details) {
        if pr.draft {
            statuses.insert(PrStatus::Draft.to_string());
            continue;
        }
        statuses.insert(classify(pr, &detail.reviews).to_string());
        statuses.extend(extra_states(&detail.reviews));
    }

    statuses.into_iter().collect()
}

/// Expand a selection: ALL means every available status except the marker
/// itself; any other selection passes through unchanged.
pub fn expand_selection(selected: &[String], available: &[String]) -> Vec<String> {
    if selected.iter().any(|s| s == ALL_MARKER) {
        available
            .iter()
            .filter(|s| s.as_str() != ALL_MARKER)
            .cloned()
            .collect()
    } else {
        selected.to_vec()
    }
}

/// Whether a PR passes the status filter: its primary status or any of its
/// extra review states is selected.
pub fn matches(pr: &PullRequest, reviews: &[Review], selected: &[String]) -> bool {
    let primary = classify(pr, reviews).to_string();
    if selected.iter().any(|s| *s == primary) {
        return true;
    }
    if pr.draft {
        return false;
    }
    extra_states(reviews)
        .iter()
        .any(|state| selected.iter().any(|s| s == state))
}
