//! Label reconciliation: decides which issues get new labels and what the
//! replacement label list is.
//!
//! The engine is pure. It never removes a label, and it only proposes an
//! update when the matcher contributes at least one label the issue does not
//! already carry.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::github::Issue;
use crate::labels::{LabelMatcher, FORWARD_EXEMPT, FORWARD_LINKED, FORWARD_REVIEW, SERVICE_TERRAFORM};

/// A label replacement for one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueUpdate {
    pub number: u64,
    /// Full replacement list, sorted, without duplicates.
    pub labels: Vec<String>,
    /// Labels before the update, sorted.
    pub old_labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    PullRequest,
    Terraform,
    Exempt,
    /// Already forwarded. Re-forwarding means removing `forward/linked` by hand.
    Linked,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            SkipReason::PullRequest => "pull request",
            SkipReason::Terraform => SERVICE_TERRAFORM,
            SkipReason::Exempt => FORWARD_EXEMPT,
            SkipReason::Linked => FORWARD_LINKED,
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skipped(SkipReason),
    Unchanged,
    Update(IssueUpdate),
}

fn exclusion(labels: &BTreeSet<String>) -> Option<SkipReason> {
    if labels.contains(SERVICE_TERRAFORM) {
        Some(SkipReason::Terraform)
    } else if labels.contains(FORWARD_EXEMPT) {
        Some(SkipReason::Exempt)
    } else if labels.contains(FORWARD_LINKED) {
        Some(SkipReason::Linked)
    } else {
        None
    }
}

/// Decide what to do with a single issue.
pub fn evaluate_issue<M: LabelMatcher + ?Sized>(issue: &Issue, matcher: &M) -> Decision {
    if issue.is_pull_request() {
        return Decision::Skipped(SkipReason::PullRequest);
    }

    let current = issue.label_set();
    if let Some(reason) = exclusion(&current) {
        return Decision::Skipped(reason);
    }

    let mut desired = current.clone();
    desired.extend(matcher.labels_for(&issue.body));

    if desired.len() <= current.len() {
        return Decision::Unchanged;
    }

    // Linked issues never reach this point, so every proposal is flagged.
    desired.insert(FORWARD_REVIEW.to_string());

    Decision::Update(IssueUpdate {
        number: issue.number,
        labels: desired.into_iter().collect(),
        old_labels: current.into_iter().collect(),
    })
}

/// Compute label updates for `issues`, preserving input order.
pub fn compute_updates<M: LabelMatcher + ?Sized>(issues: &[Issue], matcher: &M) -> Vec<IssueUpdate> {
    issues
        .iter()
        .filter_map(|issue| match evaluate_issue(issue, matcher) {
            Decision::Update(update) => {
                tracing::debug!(
                    issue = issue.number,
                    old = ?update.old_labels,
                    new = ?update.labels,
                    "Issue needs new labels"
                );
                Some(update)
            }
            Decision::Skipped(reason) => {
                tracing::debug!(issue = issue.number, %reason, "Skipping issue");
                None
            }
            Decision::Unchanged => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::Label;

    fn issue(number: u64, labels: &[&str], body: &str) -> Issue {
        Issue {
            number,
            body: body.to_string(),
            labels: labels.iter().map(|name| Label::from(*name)).collect(),
            pull_request: None,
        }
    }

    fn storage_matcher(body: &str) -> Vec<String> {
        if body.contains("google_storage_bucket") {
            vec!["service/storage".to_string()]
        } else {
            Vec::new()
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_unlabeled_issue_gets_service_and_review_labels() {
        let updates = compute_updates(&[issue(1, &[], "google_storage_bucket")], &storage_matcher);
        assert_eq!(
            updates,
            vec![IssueUpdate {
                number: 1,
                labels: strings(&["forward/review", "service/storage"]),
                old_labels: vec![],
            }]
        );
    }

    #[test]
    fn test_existing_service_label_means_no_update() {
        let issues = [issue(2, &["service/storage"], "google_storage_bucket")];
        assert!(compute_updates(&issues, &storage_matcher).is_empty());
        assert_eq!(evaluate_issue(&issues[0], &storage_matcher), Decision::Unchanged);
    }

    #[test]
    fn test_exempt_issue_is_skipped() {
        let exempt = issue(3, &["forward/exempt"], "google_storage_bucket");
        assert_eq!(
            evaluate_issue(&exempt, &storage_matcher),
            Decision::Skipped(SkipReason::Exempt)
        );
    }

    #[test]
    fn test_terraform_and_linked_issues_are_skipped() {
        let terraform = issue(4, &["service/terraform"], "google_storage_bucket");
        let linked = issue(5, &["forward/linked", "service/compute"], "google_storage_bucket");
        assert_eq!(
            evaluate_issue(&terraform, &storage_matcher),
            Decision::Skipped(SkipReason::Terraform)
        );
        assert_eq!(
            evaluate_issue(&linked, &storage_matcher),
            Decision::Skipped(SkipReason::Linked)
        );
    }

    #[test]
    fn test_pull_requests_are_skipped() {
        let mut pr = issue(6, &[], "google_storage_bucket");
        let mut marker = serde_json::Map::new();
        marker.insert("url".to_string(), serde_json::json!("https://example.test/pulls/6"));
        pr.pull_request = Some(marker);
        assert_eq!(
            evaluate_issue(&pr, &storage_matcher),
            Decision::Skipped(SkipReason::PullRequest)
        );
    }

    #[test]
    fn test_prior_labels_are_kept_and_sorted() {
        let updates = compute_updates(
            &[issue(7, &["size/xl", "bug", "bug"], "google_storage_bucket")],
            &storage_matcher,
        );
        assert_eq!(updates.len(), 1);
        assert_eq!(
            updates[0].labels,
            strings(&["bug", "forward/review", "service/storage", "size/xl"])
        );
        assert_eq!(updates[0].old_labels, strings(&["bug", "size/xl"]));
    }

    #[test]
    fn test_existing_review_marker_is_not_duplicated() {
        let updates = compute_updates(
            &[issue(8, &["forward/review"], "google_storage_bucket")],
            &storage_matcher,
        );
        assert_eq!(
            updates[0].labels,
            strings(&["forward/review", "service/storage"])
        );
    }

    #[test]
    fn test_review_marker_suggestion_only_grows_unmarked_issues() {
        let review_only = |_: &str| vec![FORWARD_REVIEW.to_string()];
        assert!(compute_updates(&[issue(9, &["forward/review"], "")], &review_only).is_empty());
        assert_eq!(
            compute_updates(&[issue(1, &[], "")], &review_only),
            vec![IssueUpdate {
                number: 1,
                labels: strings(&["forward/review"]),
                old_labels: vec![],
            }]
        );
    }

    #[test]
    fn test_output_follows_input_order() {
        let issues = [
            issue(30, &[], "google_storage_bucket"),
            issue(10, &["forward/exempt"], "google_storage_bucket"),
            issue(20, &[], "google_storage_bucket"),
        ];
        let numbers: Vec<_> = compute_updates(&issues, &storage_matcher)
            .iter()
            .map(|u| u.number)
            .collect();
        assert_eq!(numbers, vec![30, 20]);
    }
}
