use octocrab::Error as OctocrabError;
use thiserror::Error;

/// Message GitHub returns when the bearer token is rejected.
pub const BAD_CREDENTIALS: &str = "Bad credentials";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error(
        "GitHub token not found: {0}\n\
         🔧 Set GITHUB_TOKEN or ISSUE_LABELER_GITHUB__TOKEN, or add `token` under [github] in issue-labeler.toml"
    )]
    TokenNotFound(String),

    #[error("invalid repository '{0}': expected <owner>/<repo>")]
    InvalidRepository(String),

    #[error(
        "Error from API: Bad credentials\n\
         🔧 The token is invalid or expired. Create one at https://github.com/settings/tokens"
    )]
    BadCredentials,

    #[error("GitHub API error: {0}")]
    ApiError(OctocrabError),

    #[error("failed to decode GitHub response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected GitHub response payload: {0}")]
    UnexpectedPayload(String),

    #[error("API error: {0}")]
    RemoteMessage(String),

    #[error("issue listing did not finish within {max_pages} pages")]
    PaginationLimit { max_pages: u32 },
}

impl From<OctocrabError> for GitHubError {
    fn from(err: OctocrabError) -> Self {
        match &err {
            OctocrabError::GitHub { source, .. }
                if source.status_code.as_u16() == 401 || source.message == BAD_CREDENTIALS =>
            {
                GitHubError::BadCredentials
            }
            _ => GitHubError::ApiError(err),
        }
    }
}

impl GitHubError {
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, GitHubError::BadCredentials | GitHubError::TokenNotFound(_))
    }
}
