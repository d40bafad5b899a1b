pub mod client;
pub mod errors;
pub mod issues;
pub mod types;

pub use client::{parse_repository, GitHubClient};
pub use errors::GitHubError;
pub use issues::IssueHandler;
pub use types::{Issue, IssuePage, IssueUpdateBody, Label, PageQuery};
