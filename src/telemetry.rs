use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Install the global tracing subscriber.
///
/// Logs go to stderr so stdout stays reserved for the command's own output.
/// `RUST_LOG` wins over the configured level when set.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    tracing::debug!("Telemetry initialized");
    Ok(())
}

/// Generate a run ID for correlating the log lines of one backfill
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one backfill run
pub fn create_backfill_span(run_id: &str, repository: &str, dry_run: bool) -> tracing::Span {
    tracing::info_span!(
        "backfill_run",
        run.id = run_id,
        repository = repository,
        dry_run = dry_run
    )
}
