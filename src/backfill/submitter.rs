use async_trait::async_trait;

use super::engine::IssueUpdate;
use super::BackfillError;
use crate::github::{GitHubError, IssueUpdateBody};

/// Where label replacements are sent.
#[async_trait]
pub trait LabelWriter: Send + Sync {
    async fn replace_labels(&self, issue_number: u64, labels: &[String]) -> Result<(), GitHubError>;

    /// Human-readable description of the request target, for previews.
    fn describe_target(&self, issue_number: u64) -> String {
        format!("issue #{issue_number}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Print intended changes only.
    Preview,
    Live,
}

impl RunMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            RunMode::Preview
        } else {
            RunMode::Live
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    Previewed,
    Applied,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub number: u64,
    pub status: UpdateStatus,
}

/// Per-instruction results of a submission, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    pub outcomes: Vec<UpdateOutcome>,
}

impl SubmissionReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, UpdateStatus::Failed(_)))
            .count()
    }

    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == UpdateStatus::Applied)
            .count()
    }

    /// Succeeds only if no instruction failed.
    pub fn into_result(self) -> Result<Self, BackfillError> {
        match self.failed() {
            0 => Ok(self),
            failed => Err(BackfillError::PartialFailure {
                failed,
                total: self.total(),
            }),
        }
    }
}

fn describe_update<W: LabelWriter + ?Sized>(writer: &W, update: &IssueUpdate) -> String {
    let body = IssueUpdateBody {
        labels: update.labels.clone(),
    };
    let pretty = serde_json::to_string_pretty(&body).unwrap_or_else(|_| format!("{body:?}"));
    format!(
        "Existing labels: {:?}\nNew labels: {:?}\n{}\n{}",
        update.old_labels,
        update.labels,
        writer.describe_target(update.number),
        pretty
    )
}

/// Send every update independently. A failed update is recorded and the
/// loop moves on; nothing here aborts the batch.
pub async fn submit_updates<W: LabelWriter + ?Sized>(
    writer: &W,
    updates: &[IssueUpdate],
    mode: RunMode,
) -> SubmissionReport {
    let mut report = SubmissionReport::default();

    for update in updates {
        println!("{}", describe_update(writer, update));

        let status = match mode {
            RunMode::Preview => UpdateStatus::Previewed,
            RunMode::Live => match writer.replace_labels(update.number, &update.labels).await {
                Ok(()) => {
                    println!("✅ Issue #{} updated successfully", update.number);
                    UpdateStatus::Applied
                }
                Err(e) => {
                    tracing::error!(issue = update.number, error = %e, "Error updating issue");
                    println!("❌ Issue #{} failed: {}", update.number, e);
                    UpdateStatus::Failed(e.to_string())
                }
            },
        };

        report.outcomes.push(UpdateOutcome {
            number: update.number,
            status,
        });
    }

    report
}
