//! Resource extraction and regex rule matching.
//!
//! Issue bodies follow the repository's issue template, which contains an
//! "Affected Resource(s)" markdown section listing Terraform resource names.
//! Rules come from an enrolled-teams document mapping each service label to
//! the resource name patterns that team owns:
//!
//! ```yaml
//! service/storage:
//!   team: storage-eng
//!   resources:
//!     - google_storage_.*
//! ```

use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to read rules file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML rules document: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid TOML rules document: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid resource pattern '{pattern}' for label '{label}': {source}")]
    InvalidPattern {
        label: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unsupported rules file extension for {0} (expected .yml, .yaml or .toml)")]
    UnsupportedFormat(String),
}

/// One entry of the enrolled-teams document.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelData {
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// A compiled resource pattern and the label it implies.
#[derive(Debug, Clone)]
pub struct RegexpLabel {
    pub regexp: Regex,
    pub label: String,
}

impl RegexpLabel {
    /// Compile `pattern` anchored at both ends, so `google_storage_.*` never
    /// matches inside a longer name.
    pub fn new(pattern: &str, label: &str) -> Result<Self, RuleError> {
        let regexp = Regex::new(&format!("^{pattern}$")).map_err(|source| RuleError::InvalidPattern {
            label: label.to_string(),
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            regexp,
            label: label.to_string(),
        })
    }
}

/// The full, deterministically ordered set of matching rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<RegexpLabel>,
}

impl RuleSet {
    pub fn new(mut rules: Vec<RegexpLabel>) -> Self {
        rules.sort_by(|a, b| {
            a.label
                .cmp(&b.label)
                .then_with(|| a.regexp.as_str().cmp(b.regexp.as_str()))
        });
        Self { rules }
    }

    pub fn from_yaml(document: &str) -> Result<Self, RuleError> {
        let teams: BTreeMap<String, LabelData> = serde_yaml::from_str(document)?;
        Self::from_teams(teams)
    }

    pub fn from_toml(document: &str) -> Result<Self, RuleError> {
        let teams: BTreeMap<String, LabelData> = toml::from_str(document)?;
        Self::from_teams(teams)
    }

    /// Load rules from disk, choosing the parser by file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RuleError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: shown.clone(),
            source,
        })?;

        let rules = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yml") | Some("yaml") => Self::from_yaml(&contents)?,
            Some("toml") => Self::from_toml(&contents)?,
            _ => return Err(RuleError::UnsupportedFormat(shown)),
        };

        tracing::info!(path = %shown, rules = rules.len(), "Loaded label rules");
        Ok(rules)
    }

    fn from_teams(teams: BTreeMap<String, LabelData>) -> Result<Self, RuleError> {
        let mut rules = Vec::new();
        for (label, data) in &teams {
            for resource in &data.resources {
                rules.push(RegexpLabel::new(resource, label)?);
            }
        }
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[RegexpLabel] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

struct BodyPatterns {
    section: Regex,
    comment: Regex,
    resource: Regex,
}

fn body_patterns() -> &'static BodyPatterns {
    static PATTERNS: OnceLock<BodyPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| BodyPatterns {
        section: Regex::new(r"#+ (New or )?Affected Resource\(s\)[^#]+")
            .expect("section pattern compiles"),
        comment: Regex::new(r"<!--.*?-->").expect("comment pattern compiles"),
        resource: Regex::new(r"google_[\w*.]+").expect("resource pattern compiles"),
    })
}

/// Return every resource name listed in the body's "Affected Resource(s)"
/// section, in order of appearance. HTML comments inside the section (the
/// template's placeholder hints) are ignored.
pub fn extract_affected_resources(body: &str) -> Vec<String> {
    let patterns = body_patterns();
    let Some(section) = patterns.section.find(body) else {
        return Vec::new();
    };

    let section = patterns.comment.replace_all(section.as_str(), "");
    patterns
        .resource
        .find_iter(&section)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Map resource names to the sorted, deduplicated set of labels whose rules
/// match them.
pub fn compute_labels(resources: &[String], rules: &[RegexpLabel]) -> Vec<String> {
    let mut labels = BTreeSet::new();
    for resource in resources {
        for rule in rules {
            if rule.regexp.is_match(resource) {
                labels.insert(rule.label.clone());
            }
        }
    }
    labels.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAMS_YAML: &str = r#"
service/storage:
  team: storage-eng
  resources:
    - google_storage_.*
service/compute-instances:
  resources:
    - google_compute_instance
    - google_compute_instance_template
service/cloudsql:
  resources:
    - google_sql_.*
"#;

    fn body(resources: &str) -> String {
        format!(
            "### Community Note\n\nsome text\n\n### New or Affected Resource(s)\n\n<!-- list google_placeholder here -->\n{resources}\n\n### Terraform Configuration\n\n```hcl\nresource \"google_bigquery_dataset\" \"x\" {{}}\n```\n"
        )
    }

    #[test]
    fn test_extract_resources_from_affected_section() {
        let resources = extract_affected_resources(&body(
            "* google_storage_bucket\n* google_compute_instance",
        ));
        assert_eq!(resources, vec!["google_storage_bucket", "google_compute_instance"]);
    }

    #[test]
    fn test_extract_ignores_resources_outside_section() {
        let text = "resource \"google_storage_bucket\" \"b\" {}";
        assert!(extract_affected_resources(text).is_empty());
    }

    #[test]
    fn test_extract_ignores_html_comments() {
        let resources = extract_affected_resources(&body("none listed"));
        assert!(resources.is_empty());
    }

    #[test]
    fn test_extract_accepts_legacy_heading_and_wildcards() {
        let text = "## Affected Resource(s)\n\n- google_compute_*\n";
        assert_eq!(extract_affected_resources(text), vec!["google_compute_*"]);
    }

    #[test]
    fn test_compute_labels_anchors_patterns() {
        let rules = RuleSet::from_yaml(TEAMS_YAML).unwrap();
        let resources = vec![
            "google_compute_instance_group".to_string(),
            "google_storage_bucket".to_string(),
            "google_storage_bucket_iam_member".to_string(),
        ];
        assert_eq!(compute_labels(&resources, rules.rules()), vec!["service/storage"]);
    }

    #[test]
    fn test_compute_labels_sorted_and_deduplicated() {
        let rules = RuleSet::from_yaml(TEAMS_YAML).unwrap();
        let resources = vec![
            "google_sql_database".to_string(),
            "google_compute_instance".to_string(),
            "google_sql_user".to_string(),
        ];
        assert_eq!(
            compute_labels(&resources, rules.rules()),
            vec!["service/cloudsql", "service/compute-instances"]
        );
    }

    #[test]
    fn test_rule_set_order_is_deterministic() {
        let rules = RuleSet::from_yaml(TEAMS_YAML).unwrap();
        let labels: Vec<_> = rules.rules().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "service/cloudsql",
                "service/compute-instances",
                "service/compute-instances",
                "service/storage",
            ]
        );
    }

    #[test]
    fn test_toml_rules_match_yaml_rules() {
        let toml_doc = r#"
["service/storage"]
resources = ["google_storage_.*"]
"#;
        let rules = RuleSet::from_toml(toml_doc).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules()[0].label, "service/storage");
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = RuleSet::from_yaml("service/broken:\n  resources:\n    - google_(\n").unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { .. }));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(RuleSet::load(&path), Err(RuleError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enrolled_teams.yml");
        std::fs::write(&path, TEAMS_YAML).unwrap();
        let rules = RuleSet::load(&path).unwrap();
        assert_eq!(rules.len(), 4);
    }
}
