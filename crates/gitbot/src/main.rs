mod bootstrap_helpers;
mod cli_args;
mod startup;

use anyhow::Result;
use clap::Parser;
use gitbot_slack_runtime::run_slack_bridge;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::startup::{build_command_pipeline, build_slack_bridge_config};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    tracing::info!(
        organization = cli.github_org.as_str(),
        repository = cli.github_repo.as_str(),
        github_api_base = cli.resolved_github_api_base(),
        "starting gitbot"
    );

    let pipeline = build_command_pipeline(&cli)?;
    run_slack_bridge(build_slack_bridge_config(&cli, pipeline)).await
}
