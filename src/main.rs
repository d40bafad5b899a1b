use anyhow::Result;
use clap::Parser;

use issue_labeler::cli::commands::backfill::BackfillCommand;
use issue_labeler::cli::commands::compute::ComputeCommand;
use issue_labeler::cli::commands::Command;
use issue_labeler::cli::{Cli, Commands};
use issue_labeler::config::LabelerConfig;
use issue_labeler::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    LabelerConfig::load_env_file()?;
    let mut config = LabelerConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }
    init_telemetry(&config.observability)?;

    // Requests are issued one at a time; a single-threaded runtime is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Commands::Backfill {
            repository,
            since,
            dry_run,
            rules,
        } => runtime.block_on(async {
            BackfillCommand::new(config, repository, since)
                .with_dry_run(dry_run)
                .with_rules(rules)
                .execute()
                .await
        }),
        Commands::Compute { rules, body } => runtime.block_on(async {
            ComputeCommand {
                config,
                rules,
                body,
            }
            .execute()
            .await
        }),
    }
}
