use governor::DefaultDirectRateLimiter;
use octocrab::Octocrab;
use serde::Serialize;
use std::sync::Arc;

use super::errors::GitHubError;
use super::types::{ApiMessage, IssuePage, IssueUpdateBody, PageQuery};

/// Handler for the two issue endpoints the backfill touches
#[derive(Debug, Clone)]
pub struct IssueHandler {
    octocrab: Octocrab,
    owner: String,
    repo: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

#[derive(Serialize)]
struct ListParams<'a> {
    state: &'a str,
    since: &'a str,
    per_page: u8,
    page: u32,
}

impl IssueHandler {
    pub fn new(
        octocrab: Octocrab,
        owner: String,
        repo: String,
        rate_limiter: Arc<DefaultDirectRateLimiter>,
    ) -> Self {
        Self {
            octocrab,
            owner,
            repo,
            rate_limiter,
        }
    }

    pub fn issues_route(&self) -> String {
        format!("/repos/{}/{}/issues", self.owner, self.repo)
    }

    pub fn issue_route(&self, issue_number: u64) -> String {
        format!("/repos/{}/{}/issues/{}", self.owner, self.repo, issue_number)
    }

    /// Fetch one page of open issues updated since `query.since`.
    pub async fn list_page(&self, query: &PageQuery) -> Result<IssuePage, GitHubError> {
        let params = ListParams {
            state: "open",
            since: &query.since,
            per_page: query.per_page,
            page: query.page,
        };

        self.rate_limiter.until_ready().await;
        tracing::debug!(page = query.page, since = %query.since, "Listing issues");

        let value: serde_json::Value = self.octocrab.get(self.issues_route(), Some(&params)).await?;
        IssuePage::from_value(value)
    }

    /// Replace the full label list of an issue.
    pub async fn replace_labels(&self, issue_number: u64, labels: &[String]) -> Result<(), GitHubError> {
        let body = IssueUpdateBody {
            labels: labels.to_vec(),
        };

        self.rate_limiter.until_ready().await;
        let response: serde_json::Value = self
            .octocrab
            .patch(self.issue_route(issue_number), Some(&body))
            .await?;

        let payload: ApiMessage = serde_json::from_value(response)?;
        match payload.message {
            Some(message) if !message.is_empty() => Err(GitHubError::RemoteMessage(message)),
            _ => Ok(()),
        }
    }
}
