use anyhow::{Context, Result};
use std::path::Path;

use crate::labels::RuleSet;

pub mod backfill;
pub mod compute;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Load the rules file, preferring the command-line override.
pub fn load_rules(override_path: Option<&Path>, configured: &Path) -> Result<RuleSet> {
    let path = override_path.unwrap_or(configured);
    RuleSet::load(path).with_context(|| format!("loading label rules from {}", path.display()))
}
