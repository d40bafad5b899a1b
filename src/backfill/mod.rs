//! The backfill pipeline: fetch issues, compute label updates, submit them.

pub mod engine;
pub mod fetcher;
pub mod submitter;

use thiserror::Error;

pub use engine::{compute_updates, evaluate_issue, Decision, IssueUpdate, SkipReason};
pub use fetcher::{fetch_all_issues, IssuePager, IssueSource};
pub use submitter::{submit_updates, LabelWriter, RunMode, SubmissionReport, UpdateOutcome, UpdateStatus};

use crate::github::GitHubError;
use crate::labels::LabelMatcher;

#[derive(Debug, Error)]
pub enum BackfillError {
    #[error("listing issues: {0}")]
    Fetch(#[from] GitHubError),
    #[error("failed to update {failed} / {total} issues")]
    PartialFailure { failed: usize, total: usize },
}

#[derive(Debug, Clone)]
pub struct BackfillOptions {
    /// RFC 3339 timestamp; only issues updated after it are considered.
    pub since: String,
    pub per_page: u8,
    pub max_pages: u32,
    pub mode: RunMode,
}

#[derive(Debug, Clone)]
pub struct BackfillSummary {
    pub issues_fetched: usize,
    pub updates: Vec<IssueUpdate>,
    pub report: SubmissionReport,
}

/// Run one backfill pass against `client`.
pub async fn run_backfill<C, M>(
    client: &C,
    matcher: &M,
    options: &BackfillOptions,
) -> Result<BackfillSummary, BackfillError>
where
    C: IssueSource + LabelWriter + ?Sized,
    M: LabelMatcher + ?Sized,
{
    let issues = fetch_all_issues(client, &options.since, options.per_page, options.max_pages).await?;
    let updates = compute_updates(&issues, matcher);
    tracing::info!(
        issues = issues.len(),
        updates = updates.len(),
        mode = ?options.mode,
        "Computed label updates"
    );

    let report = submit_updates(client, &updates, options.mode).await.into_result()?;

    Ok(BackfillSummary {
        issues_fetched: issues.len(),
        updates,
        report,
    })
}
