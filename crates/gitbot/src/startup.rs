use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use gitbot_command::CommandCatalog;
use gitbot_github::{ActionDispatcher, GithubApiClient, RepoTarget};
use gitbot_slack_runtime::{ChatCommandPipeline, SlackBridgeRuntimeConfig};

use crate::cli_args::Cli;

pub(crate) fn version_label() -> String {
    format!("gitbot {}", env!("CARGO_PKG_VERSION"))
}

pub(crate) fn build_command_pipeline(cli: &Cli) -> Result<ChatCommandPipeline> {
    let api_base = cli.resolved_github_api_base();
    let client = GithubApiClient::new(api_base, &cli.github_token, cli.github_request_timeout_ms)
        .with_context(|| format!("failed to create github client for {api_base}"))?;

    let mut dispatcher = ActionDispatcher::new(
        Arc::new(client),
        RepoTarget::new(cli.github_org.as_str(), cli.github_repo.as_str()),
    );
    if !cli.exclude_teams.is_empty() {
        dispatcher = dispatcher.with_excluded_teams(cli.exclude_teams.clone());
    }

    let mut catalog = CommandCatalog::default();
    if !cli.protected_teams.is_empty() {
        catalog = catalog.with_protected_teams(cli.protected_teams.iter().cloned());
    }

    Ok(ChatCommandPipeline::new(catalog, dispatcher, version_label()))
}

pub(crate) fn build_slack_bridge_config(
    cli: &Cli,
    pipeline: ChatCommandPipeline,
) -> SlackBridgeRuntimeConfig {
    SlackBridgeRuntimeConfig {
        pipeline: Arc::new(pipeline),
        api_base: cli.slack_api_base.clone(),
        app_token: cli.slack_app_token.clone(),
        bot_token: cli.slack_bot_token.clone(),
        bot_user_id: cli.slack_bot_user_id.clone(),
        request_timeout_ms: cli.slack_request_timeout_ms,
        retry_max_attempts: cli.slack_retry_max_attempts,
        retry_base_delay_ms: cli.slack_retry_base_delay_ms,
        processed_event_cap: cli.slack_processed_event_cap,
        max_event_age_seconds: cli.slack_max_event_age_seconds,
        reconnect_delay: Duration::from_millis(cli.slack_reconnect_delay_ms),
    }
}
