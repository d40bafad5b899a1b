use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use octocrab::Octocrab;
use std::num::NonZeroU32;
use std::sync::Arc;

use super::errors::GitHubError;
use super::issues::IssueHandler;
use super::types::{IssuePage, PageQuery};
use crate::backfill::{IssueSource, LabelWriter};
use crate::config::GitHubConfig;

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// GitHub REST client scoped to a single repository.
///
/// Everything it needs (token, base URL, request pacing) comes in through
/// [`GitHubConfig`]; nothing is read from the environment here.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    issues: IssueHandler,
    api_base: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Build a client for `repository` (`owner/repo`).
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new(config: &GitHubConfig, repository: &str) -> Result<Self, GitHubError> {
        let (owner, repo) = parse_repository(repository)?;

        let token = config
            .token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                GitHubError::TokenNotFound("no GitHub token configured for this run".to_string())
            })?;

        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(base_url) = &config.api_base_url {
            builder = builder.base_uri(base_url.as_str())?;
        }
        let octocrab = builder.build()?;
        let api_base = config
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();

        let per_second = NonZeroU32::new(config.rate_limit.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.rate_limit.burst_capacity).unwrap_or(NonZeroU32::MIN);
        let rate_limiter: Arc<DefaultDirectRateLimiter> =
            Arc::new(RateLimiter::direct(Quota::per_second(per_second).allow_burst(burst)));

        tracing::debug!(
            owner = %owner,
            repo = %repo,
            requests_per_second = per_second.get(),
            burst = burst.get(),
            "GitHub client initialized"
        );

        Ok(Self {
            issues: IssueHandler::new(octocrab, owner.clone(), repo.clone(), rate_limiter),
            api_base,
            owner,
            repo,
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// `owner/repo`, as used in issue URLs.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn issues(&self) -> &IssueHandler {
        &self.issues
    }
}

#[async_trait]
impl IssueSource for GitHubClient {
    async fn fetch_page(&self, query: &PageQuery) -> Result<IssuePage, GitHubError> {
        self.issues.list_page(query).await
    }
}

#[async_trait]
impl LabelWriter for GitHubClient {
    async fn replace_labels(&self, issue_number: u64, labels: &[String]) -> Result<(), GitHubError> {
        self.issues.replace_labels(issue_number, labels).await
    }

    fn describe_target(&self, issue_number: u64) -> String {
        format!(
            "PATCH {}{} (https://github.com/{}/issues/{})",
            self.api_base,
            self.issues.issue_route(issue_number),
            self.full_name(),
            issue_number
        )
    }
}

/// Split `owner/repo` into its two non-empty halves.
pub fn parse_repository(repository: &str) -> Result<(String, String), GitHubError> {
    match repository.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GitHubError::InvalidRepository(repository.to_string())),
    }
}
