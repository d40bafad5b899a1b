// Issue Labeler Library - service label backfill for GitHub issues
// This exposes the core components for testing and integration

pub mod backfill;
pub mod cli;
pub mod config;
pub mod github;
pub mod labels;
pub mod telemetry;

// Re-export key types for easy access
pub use backfill::{
    compute_updates, evaluate_issue, run_backfill, BackfillError, BackfillOptions, Decision,
    IssueUpdate, RunMode, SkipReason, SubmissionReport,
};
pub use config::LabelerConfig;
pub use github::{GitHubClient, GitHubError, Issue, Label};
pub use labels::{LabelMatcher, RuleSet};
pub use telemetry::init_telemetry;
