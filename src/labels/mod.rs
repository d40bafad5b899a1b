//! Label names and the matcher seam used by the backfill engine.

pub mod rules;

pub use rules::{compute_labels, extract_affected_resources, RegexpLabel, RuleError, RuleSet};

/// Issue already triaged under Terraform policy.
pub const SERVICE_TERRAFORM: &str = "service/terraform";
/// Issue already forwarded to a service team.
pub const FORWARD_LINKED: &str = "forward/linked";
/// Issue explicitly excluded from automatic relabeling.
pub const FORWARD_EXEMPT: &str = "forward/exempt";
/// Marker asking a human to confirm machine-proposed labels.
pub const FORWARD_REVIEW: &str = "forward/review";

/// Labels that take an issue out of the backfill entirely.
pub const EXCLUSION_LABELS: [&str; 3] = [SERVICE_TERRAFORM, FORWARD_EXEMPT, FORWARD_LINKED];

/// Anything that can suggest service labels for an issue body.
///
/// The backfill engine only depends on this trait, so tests can swap the
/// regex rule set for a closure.
pub trait LabelMatcher {
    fn labels_for(&self, body: &str) -> Vec<String>;
}

impl<F> LabelMatcher for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn labels_for(&self, body: &str) -> Vec<String> {
        self(body)
    }
}

impl LabelMatcher for RuleSet {
    fn labels_for(&self, body: &str) -> Vec<String> {
        let resources = extract_affected_resources(body);
        compute_labels(&resources, self.rules())
    }
}
