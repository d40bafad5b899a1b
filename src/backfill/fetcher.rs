use async_trait::async_trait;

use crate::github::errors::BAD_CREDENTIALS;
use crate::github::{GitHubError, Issue, IssuePage, PageQuery};

/// Where issue pages come from.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn fetch_page(&self, query: &PageQuery) -> Result<IssuePage, GitHubError>;
}

/// Walks an issue listing one page at a time.
///
/// Each call to [`IssuePager::next_batch`] yields the next non-empty page, or
/// `None` once the listing is exhausted. Page `max_pages + 1` is only
/// requested to confirm the listing ended there; if it still carries issues
/// the pager fails with [`GitHubError::PaginationLimit`].
/// [`IssuePager::restart`] rewinds it to the first page.
pub struct IssuePager<'a, S: IssueSource + ?Sized> {
    source: &'a S,
    since: String,
    per_page: u8,
    max_pages: u32,
    next_page: u32,
    exhausted: bool,
}

impl<'a, S: IssueSource + ?Sized> IssuePager<'a, S> {
    pub fn new(source: &'a S, since: impl Into<String>, per_page: u8, max_pages: u32) -> Self {
        Self {
            source,
            since: since.into(),
            per_page: per_page.max(1),
            max_pages,
            next_page: 1,
            exhausted: false,
        }
    }

    pub fn restart(&mut self) {
        self.next_page = 1;
        self.exhausted = false;
    }

    /// Pages fetched so far.
    pub fn pages_fetched(&self) -> u32 {
        self.next_page - 1
    }

    pub async fn next_batch(&mut self) -> Result<Option<Vec<Issue>>, GitHubError> {
        if self.exhausted {
            return Ok(None);
        }
        let past_limit = self.next_page > self.max_pages;

        let query = PageQuery {
            since: self.since.clone(),
            page: self.next_page,
            per_page: self.per_page,
        };

        match self.source.fetch_page(&query).await {
            Ok(IssuePage::Issues(issues)) if !issues.is_empty() => {
                if past_limit {
                    return Err(GitHubError::PaginationLimit {
                        max_pages: self.max_pages,
                    });
                }
                self.next_page += 1;
                Ok(Some(issues))
            }
            Ok(IssuePage::Issues(_)) | Ok(IssuePage::Empty { message: None }) => {
                self.exhausted = true;
                Ok(None)
            }
            Ok(IssuePage::Empty {
                message: Some(message),
            }) => {
                if message == BAD_CREDENTIALS {
                    return Err(GitHubError::BadCredentials);
                }
                if !message.is_empty() {
                    tracing::info!(page = query.page, "API returned message: {}", message);
                }
                self.exhausted = true;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Fetch every open issue updated since `since`.
///
/// Any error, including an authentication failure on a later page, discards
/// the pages collected so far.
pub async fn fetch_all_issues<S: IssueSource + ?Sized>(
    source: &S,
    since: &str,
    per_page: u8,
    max_pages: u32,
) -> Result<Vec<Issue>, GitHubError> {
    let mut pager = IssuePager::new(source, since, per_page, max_pages);
    let mut issues = Vec::new();

    while let Some(batch) = pager.next_batch().await? {
        issues.extend(batch);
    }

    tracing::info!(
        issues = issues.len(),
        pages = pager.pages_fetched(),
        since = %since,
        "Fetched issues"
    );
    Ok(issues)
}
