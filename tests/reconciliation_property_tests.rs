// Property-based tests for label reconciliation
// Checks the engine's invariants over arbitrary label sets and matcher output

use issue_labeler::github::{Issue, Label};
use issue_labeler::labels::{EXCLUSION_LABELS, FORWARD_REVIEW};
use issue_labeler::{compute_updates, evaluate_issue, Decision};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn label_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("bug".to_string()),
        Just("enhancement".to_string()),
        Just("service/storage".to_string()),
        Just("service/compute".to_string()),
        Just("service/cloudsql".to_string()),
        Just(FORWARD_REVIEW.to_string()),
        "[a-z]{1,6}/[a-z]{1,6}",
    ]
}

fn issue_strategy() -> impl Strategy<Value = Issue> {
    (
        1u64..=10_000,
        prop::collection::vec(label_strategy(), 0..6),
        prop::collection::vec(label_strategy(), 0..4),
    )
        .prop_map(|(number, labels, suggested)| Issue {
            number,
            // The matcher under test reads its suggestions back out of the body
            body: suggested.join(","),
            labels: labels.iter().map(|name| Label::from(name.as_str())).collect(),
            pull_request: None,
        })
}

fn body_matcher(body: &str) -> Vec<String> {
    body.split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn nothing(_: &str) -> Vec<String> {
    Vec::new()
}

proptest! {
    #[test]
    fn empty_matcher_never_produces_updates(issues in prop::collection::vec(issue_strategy(), 0..20)) {
        prop_assert!(compute_updates(&issues, &nothing).is_empty());
    }

    #[test]
    fn excluded_issues_never_update(mut issue in issue_strategy(), which in 0usize..3) {
        issue.labels.push(Label::from(EXCLUSION_LABELS[which]));
        prop_assert!(!matches!(evaluate_issue(&issue, &body_matcher), Decision::Update(_)));
    }

    #[test]
    fn pull_requests_never_update(mut issue in issue_strategy()) {
        let mut marker = serde_json::Map::new();
        marker.insert("url".to_string(), serde_json::json!("https://api.github.com/pulls/1"));
        issue.pull_request = Some(marker);
        prop_assert!(compute_updates(&[issue], &body_matcher).is_empty());
    }

    #[test]
    fn updates_only_grow_and_are_sorted(issues in prop::collection::vec(issue_strategy(), 0..20)) {
        for update in compute_updates(&issues, &body_matcher) {
            let old: BTreeSet<_> = update.old_labels.iter().collect();
            let new: BTreeSet<_> = update.labels.iter().collect();

            prop_assert!(new.len() > old.len());
            prop_assert!(old.is_subset(&new));
            prop_assert!(update.labels.contains(&FORWARD_REVIEW.to_string()));

            // strictly increasing means sorted with no duplicates
            prop_assert!(update.labels.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(update.old_labels.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn update_emitted_iff_matcher_adds_something(issue in issue_strategy()) {
        let current: BTreeSet<String> = issue.labels.iter().map(|l| l.name.clone()).collect();
        let suggested: BTreeSet<String> = body_matcher(&issue.body).into_iter().collect();
        let excluded = EXCLUSION_LABELS.iter().any(|l| current.contains(*l));
        let grows = !suggested.is_subset(&current);

        let updates = compute_updates(std::slice::from_ref(&issue), &body_matcher);
        prop_assert_eq!(updates.len() == 1, grows && !excluded);
    }
}
