use clap::Parser;
use gitbot_github::DEFAULT_GITHUB_API_BASE;

fn parse_non_empty(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_api_url(value: &str) -> Result<String, String> {
    let trimmed = parse_non_empty(value)?;
    let url = reqwest::Url::parse(&trimmed).map_err(|error| format!("invalid url: {error}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported url scheme '{}'", url.scheme()));
    }
    Ok(trimmed)
}

#[derive(Debug, Parser)]
#[command(
    name = "gitbot",
    about = "Slack bot that answers GitHub member, team, label and issue queries",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long = "slack-app-token",
        env = "SLACK_APP_TOKEN",
        hide_env_values = true,
        value_parser = parse_non_empty,
        help = "Slack Socket Mode app token (xapp-...)"
    )]
    pub(crate) slack_app_token: String,

    #[arg(
        long = "slack-bot-token",
        env = "SLACK_BOT_TOKEN",
        hide_env_values = true,
        value_parser = parse_non_empty,
        help = "Slack bot token used for Web API calls (xoxb-...)"
    )]
    pub(crate) slack_bot_token: String,

    #[arg(
        long = "slack-bot-user-id",
        env = "SLACK_BOT_USER_ID",
        value_parser = parse_non_empty,
        help = "Bot user id; resolved through auth.test when omitted"
    )]
    pub(crate) slack_bot_user_id: Option<String>,

    #[arg(
        long = "slack-api-base",
        env = "SLACK_API_BASE",
        default_value = "https://slack.com/api",
        value_parser = parse_api_url,
        help = "Slack Web API base url"
    )]
    pub(crate) slack_api_base: String,

    #[arg(
        long = "slack-reconnect-delay-ms",
        env = "SLACK_RECONNECT_DELAY_MS",
        default_value_t = 5_000,
        help = "Delay before reconnecting after socket/session errors"
    )]
    pub(crate) slack_reconnect_delay_ms: u64,

    #[arg(
        long = "slack-retry-max-attempts",
        env = "SLACK_RETRY_MAX_ATTEMPTS",
        default_value_t = 4,
        value_parser = parse_positive_usize,
        help = "Maximum attempts for retryable slack api failures (429/5xx/transport)"
    )]
    pub(crate) slack_retry_max_attempts: usize,

    #[arg(
        long = "slack-retry-base-delay-ms",
        env = "SLACK_RETRY_BASE_DELAY_MS",
        default_value_t = 500,
        value_parser = parse_positive_u64,
        help = "Base backoff delay in milliseconds for slack api retries"
    )]
    pub(crate) slack_retry_base_delay_ms: u64,

    #[arg(
        long = "slack-request-timeout-ms",
        env = "SLACK_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Timeout for slack api requests in milliseconds"
    )]
    pub(crate) slack_request_timeout_ms: u64,

    #[arg(
        long = "slack-processed-event-cap",
        env = "SLACK_PROCESSED_EVENT_CAP",
        default_value_t = 10_000,
        value_parser = parse_positive_usize,
        help = "Maximum processed event keys remembered for duplicate suppression"
    )]
    pub(crate) slack_processed_event_cap: usize,

    #[arg(
        long = "slack-max-event-age-seconds",
        env = "SLACK_MAX_EVENT_AGE_SECONDS",
        default_value_t = 7_200,
        help = "Ignore inbound Slack events older than this many seconds (0 disables age checks)"
    )]
    pub(crate) slack_max_event_age_seconds: u64,

    #[arg(
        long = "github-token",
        env = "GITHUB_OAUTH_TOKEN",
        hide_env_values = true,
        value_parser = parse_non_empty,
        help = "GitHub OAuth or personal access token"
    )]
    pub(crate) github_token: String,

    #[arg(
        long = "github-org",
        env = "GITHUB_ORG",
        value_parser = parse_non_empty,
        help = "GitHub organization every command operates on"
    )]
    pub(crate) github_org: String,

    #[arg(
        long = "github-repo",
        env = "GITHUB_REPO",
        value_parser = parse_non_empty,
        help = "GitHub repository used by label and issue commands"
    )]
    pub(crate) github_repo: String,

    #[arg(
        long = "github-api-base",
        env = "GITHUB_API_BASE",
        default_value = DEFAULT_GITHUB_API_BASE,
        value_parser = parse_api_url,
        help = "GitHub REST api base url"
    )]
    pub(crate) github_api_base: String,

    #[arg(
        long = "github-enterprise-url",
        env = "GITHUB_ENTERPRISE_URL",
        value_parser = parse_api_url,
        help = "GitHub Enterprise api url; overrides --github-api-base when set"
    )]
    pub(crate) github_enterprise_url: Option<String>,

    #[arg(
        long = "github-request-timeout-ms",
        env = "GITHUB_REQUEST_TIMEOUT_MS",
        default_value_t = 0,
        help = "Timeout for github api requests in milliseconds (0 disables the timeout)"
    )]
    pub(crate) github_request_timeout_ms: u64,

    #[arg(
        long = "exclude-team",
        env = "GITBOT_EXCLUDE_TEAMS",
        value_delimiter = ',',
        value_parser = parse_non_empty,
        help = "Team name hidden from `team list`; repeatable or comma-separated (defaults to legacy-team,admin)"
    )]
    pub(crate) exclude_teams: Vec<String>,

    #[arg(
        long = "protected-team",
        env = "GITBOT_PROTECTED_TEAMS",
        value_delimiter = ',',
        value_parser = parse_non_empty,
        help = "Team that `member add` refuses to modify; repeatable or comma-separated (defaults to admin)"
    )]
    pub(crate) protected_teams: Vec<String>,
}

impl Cli {
    pub(crate) fn resolved_github_api_base(&self) -> &str {
        self.github_enterprise_url
            .as_deref()
            .unwrap_or(self.github_api_base.as_str())
    }
}
