use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "issue-labeler")]
#[command(about = "Backfill service labels on GitHub issues from the resources they mention")]
#[command(long_about = "issue-labeler reads the \"Affected Resource(s)\" section of each open issue, \
                       maps the Terraform resources it lists to service labels using the enrolled-teams \
                       rules, and adds any missing labels together with a forward/review marker.")]
pub struct Cli {
    /// Configuration file (defaults to ./issue-labeler.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add missing service labels to open issues updated since a point in time
    Backfill {
        /// Repository to backfill, as owner/repo
        #[arg(long, help = "Target repository in owner/repo form")]
        repository: String,
        /// Only consider issues updated at or after this RFC 3339 timestamp
        #[arg(long, help = "RFC 3339 timestamp, e.g. 2024-01-01T00:00:00Z")]
        since: String,
        /// Show what would be changed without updating any issue
        #[arg(long, help = "Preview label changes without sending them")]
        dry_run: bool,
        /// Enrolled-teams rules file
        #[arg(long, help = "Rules file (.yml, .yaml or .toml); overrides backfill.rules_file")]
        rules: Option<PathBuf>,
    },
    /// Print the service labels the rules assign to an issue body
    Compute {
        /// Enrolled-teams rules file
        #[arg(long, help = "Rules file (.yml, .yaml or .toml); overrides backfill.rules_file")]
        rules: Option<PathBuf>,
        /// Issue body to inspect; read from stdin when omitted
        #[arg(long)]
        body: Option<String>,
    },
}
