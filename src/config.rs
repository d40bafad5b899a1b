use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "issue-labeler.toml";

/// Main configuration structure for the issue labeler
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LabelerConfig {
    /// GitHub configuration
    pub github: GitHubConfig,
    /// Backfill settings
    pub backfill: BackfillConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GitHubConfig {
    /// GitHub API token (can be set via env var)
    pub token: Option<String>,
    /// API base URL, for GitHub Enterprise
    pub api_base_url: Option<String>,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_capacity: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackfillConfig {
    /// Issues requested per listing page (GitHub caps this at 100)
    pub page_size: u8,
    /// Upper bound on listing pages per run
    pub max_pages: u32,
    /// Enrolled-teams rules document (.yml, .yaml or .toml)
    pub rules_file: PathBuf,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 1000,
            rules_file: PathBuf::from("enrolled_teams.yml"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl LabelerConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`explicit_file`, else issue-labeler.toml if present)
    /// 3. Environment variables (prefixed with ISSUE_LABELER_, `__` between sections)
    pub fn load(explicit_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match explicit_file {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix("ISSUE_LABELER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut labeler_config: LabelerConfig = builder.build()?.try_deserialize()?;

        // The conventional GitHub Actions variable is the last resort
        if labeler_config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                labeler_config.github.token = Some(token);
            }
        }

        Ok(labeler_config)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
