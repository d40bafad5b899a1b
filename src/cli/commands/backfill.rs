use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::PathBuf;
use tracing::Instrument;

use super::{load_rules, Command};
use crate::backfill::{run_backfill, BackfillError, BackfillOptions, RunMode};
use crate::config::LabelerConfig;
use crate::github::GitHubClient;
use crate::telemetry::{create_backfill_span, generate_run_id};

pub struct BackfillCommand {
    pub config: LabelerConfig,
    pub repository: String,
    pub since: String,
    pub dry_run: bool,
    pub rules: Option<PathBuf>,
}

impl BackfillCommand {
    pub fn new(config: LabelerConfig, repository: String, since: String) -> Self {
        Self {
            config,
            repository,
            since,
            dry_run: false,
            rules: None,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_rules(mut self, rules: Option<PathBuf>) -> Self {
        self.rules = rules;
        self
    }

    async fn run(&self) -> Result<()> {
        let since = normalize_since(&self.since)?;
        let rules = load_rules(self.rules.as_deref(), &self.config.backfill.rules_file)?;
        let client = GitHubClient::new(&self.config.github, &self.repository)?;

        let mode = RunMode::from_dry_run(self.dry_run);
        if mode == RunMode::Preview {
            println!("🔍 Dry run: no issues will be modified");
        }
        println!("📋 Scanning {} for issues updated since {}", client.full_name(), since);

        let options = BackfillOptions {
            since,
            per_page: self.config.backfill.page_size,
            max_pages: self.config.backfill.max_pages,
            mode,
        };

        match run_backfill(&client, &rules, &options).await {
            Ok(summary) => {
                println!();
                println!("✅ Backfill complete:");
                println!("   📋 {} issues scanned", summary.issues_fetched);
                println!("   🏷️  {} issues need new labels", summary.updates.len());
                if mode == RunMode::Live {
                    println!("   ✏️  {} issues updated", summary.report.applied());
                }
                Ok(())
            }
            Err(BackfillError::Fetch(e)) => {
                println!("❌ Failed to fetch issues");
                Err(anyhow::Error::new(e).context("listing issues"))
            }
            Err(e @ BackfillError::PartialFailure { .. }) => {
                println!("❌ {e}");
                Err(e.into())
            }
        }
    }
}

impl Command for BackfillCommand {
    async fn execute(&self) -> Result<()> {
        let run_id = generate_run_id();
        let span = create_backfill_span(&run_id, &self.repository, self.dry_run);
        self.run().instrument(span).await
    }
}

/// Validate an RFC 3339 timestamp and render it the way the GitHub API
/// expects (`YYYY-MM-DDTHH:MM:SSZ`).
pub fn normalize_since(since: &str) -> Result<String> {
    let parsed = DateTime::parse_from_rfc3339(since.trim())
        .with_context(|| format!("--since must be an RFC 3339 timestamp, got '{since}'"))?;
    Ok(parsed
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true))
}
