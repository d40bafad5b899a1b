use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use super::{load_rules, Command};
use crate::config::LabelerConfig;
use crate::labels::{extract_affected_resources, LabelMatcher};

/// Print the labels the rules would assign to one issue body, as a JSON array.
pub struct ComputeCommand {
    pub config: LabelerConfig,
    pub rules: Option<PathBuf>,
    pub body: Option<String>,
}

impl Command for ComputeCommand {
    async fn execute(&self) -> Result<()> {
        let rules = load_rules(self.rules.as_deref(), &self.config.backfill.rules_file)?;

        let body = match &self.body {
            Some(body) => body.clone(),
            None => {
                let mut buffer = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut buffer)
                    .await
                    .context("reading issue body from stdin")?;
                buffer
            }
        };

        tracing::debug!(resources = ?extract_affected_resources(&body), "Extracted affected resources");
        let labels = rules.labels_for(&body);
        println!("{}", serde_json::to_string(&labels)?);
        Ok(())
    }
}
