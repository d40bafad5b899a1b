use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use super::errors::GitHubError;

/// The subset of a GitHub issue record the backfill needs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Present (and non-empty) only when the record is a pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.as_ref().is_some_and(|pr| !pr.is_empty())
    }

    /// Attached label names with duplicates removed.
    pub fn label_set(&self) -> BTreeSet<String> {
        self.labels.iter().map(|label| label.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Label {
    pub name: String,
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Request body for replacing an issue's labels. The list is exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueUpdateBody {
    pub labels: Vec<String>,
}

/// Error payload shape shared by GitHub REST responses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// One page of the issue listing.
#[derive(Debug, Clone, PartialEq)]
pub enum IssuePage {
    Issues(Vec<Issue>),
    /// No issues on this page. GitHub sometimes explains why in `message`.
    Empty { message: Option<String> },
}

impl IssuePage {
    /// Interpret a raw listing response. Arrays are issue pages, objects are
    /// message payloads, anything else is a decode failure.
    pub fn from_value(value: serde_json::Value) -> Result<Self, GitHubError> {
        match value {
            serde_json::Value::Array(ref items) if items.is_empty() => Ok(Self::Empty { message: None }),
            serde_json::Value::Array(_) => {
                let issues: Vec<Issue> = serde_json::from_value(value)?;
                Ok(Self::Issues(issues))
            }
            serde_json::Value::Object(_) => {
                let payload: ApiMessage = serde_json::from_value(value)?;
                Ok(Self::Empty {
                    message: payload.message,
                })
            }
            other => Err(GitHubError::UnexpectedPayload(other.to_string())),
        }
    }
}

/// Parameters for a single listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub since: String,
    pub page: u32,
    pub per_page: u8,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
