//! Slack Socket Mode bridge that feeds chat messages to the command pipeline.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use crate::command_pipeline::{ChatCommandPipeline, CommandReply};
use crate::slack_helpers::current_unix_timestamp_ms;

mod processed_event_cache;
mod slack_api_client;

use processed_event_cache::ProcessedEventCache;
use slack_api_client::SlackApiClient;

#[derive(Clone)]
/// Runtime configuration for the Slack bridge transport loop.
pub struct SlackBridgeRuntimeConfig {
    pub pipeline: Arc<ChatCommandPipeline>,
    pub api_base: String,
    pub app_token: String,
    pub bot_token: String,
    pub bot_user_id: Option<String>,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
    pub processed_event_cap: usize,
    pub max_event_age_seconds: u64,
    pub reconnect_delay: Duration,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackSocketEnvelope {
    #[serde(default)]
    envelope_id: Option<String>,
    #[serde(rename = "type")]
    envelope_type: String,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlackBridgeEventKind {
    AppMention,
    DirectMessage,
}

impl SlackBridgeEventKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::AppMention => "app_mention",
            Self::DirectMessage => "message.im",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SlackBridgeEvent {
    key: String,
    kind: SlackBridgeEventKind,
    event_id: String,
    occurred_unix_ms: u64,
    channel_id: String,
    user_id: String,
    text: String,
}

impl SlackBridgeEvent {
    fn is_direct_message(&self) -> bool {
        self.kind == SlackBridgeEventKind::DirectMessage
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Reconnect,
    Shutdown,
}

/// Runs the Slack bridge until Ctrl-C, reconnecting after every dropped session.
pub async fn run_slack_bridge(config: SlackBridgeRuntimeConfig) -> Result<()> {
    let mut runtime = SlackBridgeRuntime::new(config).await?;
    runtime.run().await
}

struct SlackBridgeRuntime {
    config: SlackBridgeRuntimeConfig,
    slack_client: SlackApiClient,
    processed_events: ProcessedEventCache,
    bot_user_id: String,
}

impl SlackBridgeRuntime {
    async fn new(config: SlackBridgeRuntimeConfig) -> Result<Self> {
        let slack_client = SlackApiClient::new(
            &config.api_base,
            &config.app_token,
            &config.bot_token,
            config.request_timeout_ms,
            config.retry_max_attempts,
            config.retry_base_delay_ms,
        )?;

        let bot_user_id = match config.bot_user_id.as_deref() {
            Some(user_id) if !user_id.trim().is_empty() => user_id.trim().to_string(),
            _ => slack_client
                .resolve_bot_user_id()
                .await
                .context("failed to resolve slack bot user id")?,
        };
        tracing::info!(bot_user_id = bot_user_id.as_str(), "slack bridge initialized");

        let processed_events = ProcessedEventCache::new(config.processed_event_cap);
        Ok(Self {
            config,
            slack_client,
            processed_events,
            bot_user_id,
        })
    }

    async fn run(&mut self) -> Result<()> {
        loop {
            match self.slack_client.open_socket_connection().await {
                Ok(socket_url) => {
                    tracing::info!("slack bridge socket connected");
                    match self.run_socket_session(&socket_url).await {
                        Ok(SessionEnd::Shutdown) => {
                            tracing::info!("slack bridge shutdown requested");
                            return Ok(());
                        }
                        Ok(SessionEnd::Reconnect) => {
                            tracing::info!("slack bridge socket session ended");
                        }
                        Err(error) => {
                            tracing::warn!(
                                error = %format!("{error:#}"),
                                "slack bridge socket session error"
                            );
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        error = %format!("{error:#}"),
                        "slack bridge failed to open socket connection"
                    );
                }
            }

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("slack bridge shutdown requested");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }
    }

    async fn run_socket_session(&mut self, socket_url: &str) -> Result<SessionEnd> {
        let (stream, _response) = connect_async(socket_url)
            .await
            .context("failed to connect slack socket mode websocket")?;
        let (mut sink, mut source) = stream.split();

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    return Ok(SessionEnd::Shutdown);
                }
                maybe_message = source.next() => {
                    let Some(message_result) = maybe_message else {
                        return Ok(SessionEnd::Reconnect);
                    };
                    let message = message_result.context("failed reading slack websocket message")?;
                    let Some(envelope) = parse_socket_envelope(message)? else {
                        continue;
                    };
                    if let Some(envelope_id) = envelope.envelope_id.as_deref() {
                        ack_envelope(&mut sink, envelope_id).await?;
                    }
                    match envelope.envelope_type.as_str() {
                        "hello" => tracing::debug!("slack socket hello received"),
                        "disconnect" => {
                            tracing::info!(
                                reason = envelope.reason.as_deref().unwrap_or("unspecified"),
                                "slack requested socket disconnect"
                            );
                            return Ok(SessionEnd::Reconnect);
                        }
                        _ => {
                            if let Err(error) = self.handle_envelope(&envelope) {
                                tracing::warn!(
                                    error = %format!("{error:#}"),
                                    "failed to handle slack envelope"
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    fn handle_envelope(&mut self, envelope: &SlackSocketEnvelope) -> Result<()> {
        let Some(event) = normalize_socket_envelope(envelope, &self.bot_user_id)? else {
            return Ok(());
        };

        if self.processed_events.contains(&event.key) {
            tracing::debug!(key = event.key.as_str(), "skipping duplicate slack event");
            return Ok(());
        }
        self.processed_events.mark_processed(&event.key);
        if event_is_stale(
            &event,
            self.config.max_event_age_seconds,
            current_unix_timestamp_ms(),
        ) {
            tracing::info!(key = event.key.as_str(), "skipping stale slack event");
            return Ok(());
        }

        let text = normalize_slack_message_text(&event, &self.bot_user_id);
        tracing::info!(
            kind = event.kind.as_str(),
            channel = event.channel_id.as_str(),
            user = event.user_id.as_str(),
            event_id = event.event_id.as_str(),
            "slack command received"
        );

        let pipeline = Arc::clone(&self.config.pipeline);
        let slack_client = self.slack_client.clone();
        tokio::spawn(async move {
            let reply = pipeline.handle(&text, event.is_direct_message()).await;
            if let Err(error) = deliver_reply(&slack_client, &event.channel_id, &reply).await {
                tracing::warn!(
                    channel = event.channel_id.as_str(),
                    error = %format!("{error:#}"),
                    "failed to deliver slack reply"
                );
            }
        });
        Ok(())
    }
}

/// Posts the summary, then each chunk in order as its own attachment message.
async fn deliver_reply(
    slack_client: &SlackApiClient,
    channel_id: &str,
    reply: &CommandReply,
) -> Result<()> {
    slack_client.post_message(channel_id, &reply.summary).await?;
    for chunk in &reply.chunks {
        slack_client.post_attachment(channel_id, chunk).await?;
    }
    Ok(())
}

async fn ack_envelope<S>(sink: &mut S, envelope_id: &str) -> Result<()>
where
    S: futures_util::Sink<WsMessage> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let ack = json!({ "envelope_id": envelope_id }).to_string();
    sink.send(WsMessage::Text(ack.into()))
        .await
        .context("failed to send slack socket ack")
}

fn parse_socket_envelope(message: WsMessage) -> Result<Option<SlackSocketEnvelope>> {
    let text = match message {
        WsMessage::Text(text) => text.as_str().to_string(),
        WsMessage::Binary(bytes) => {
            String::from_utf8(bytes.to_vec()).context("invalid utf-8 slack socket payload")?
        }
        WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Close(_) | WsMessage::Frame(_) => {
            return Ok(None)
        }
    };
    serde_json::from_str::<SlackSocketEnvelope>(&text)
        .map(Some)
        .context("failed to parse slack socket envelope")
}

#[derive(Debug, Deserialize)]
struct SlackEventCallbackEnvelope {
    #[serde(rename = "type")]
    callback_type: String,
    event_id: String,
    event_time: u64,
    event: SlackEventPayload,
}

#[derive(Debug, Deserialize)]
struct SlackEventPayload {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    bot_id: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    channel_type: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

fn normalize_socket_envelope(
    envelope: &SlackSocketEnvelope,
    bot_user_id: &str,
) -> Result<Option<SlackBridgeEvent>> {
    if envelope.envelope_type != "events_api" {
        return Ok(None);
    }

    let callback = serde_json::from_value::<SlackEventCallbackEnvelope>(envelope.payload.clone())
        .context("failed to decode slack event callback payload")?;
    if callback.callback_type != "event_callback" {
        return Ok(None);
    }

    let event = callback.event;
    if event.subtype.as_deref() == Some("bot_message") || event.bot_id.is_some() {
        return Ok(None);
    }
    let user_id = match event.user {
        Some(user) if !user.trim().is_empty() => user,
        _ => return Ok(None),
    };
    if user_id == bot_user_id {
        return Ok(None);
    }

    let channel_id = match event.channel {
        Some(channel) if !channel.trim().is_empty() => channel,
        _ => return Ok(None),
    };
    let message_ts = match event.ts {
        Some(ts) if !ts.trim().is_empty() => ts,
        _ => return Ok(None),
    };

    let kind = match event.event_type.as_str() {
        "app_mention" => SlackBridgeEventKind::AppMention,
        "message"
            if event.subtype.is_none()
                && is_direct_message_channel(event.channel_type.as_deref(), &channel_id) =>
        {
            SlackBridgeEventKind::DirectMessage
        }
        _ => return Ok(None),
    };

    let key = format!("{}:{}:{}", callback.event_id, channel_id, message_ts);
    Ok(Some(SlackBridgeEvent {
        key,
        kind,
        event_id: callback.event_id,
        occurred_unix_ms: callback.event_time.saturating_mul(1000),
        channel_id,
        user_id,
        text: event.text.unwrap_or_default(),
    }))
}

fn is_direct_message_channel(channel_type: Option<&str>, channel_id: &str) -> bool {
    channel_type == Some("im") || channel_id.starts_with('D')
}

/// Drops the bot mention: every occurrence for app mentions, a leading one for direct messages.
fn normalize_slack_message_text(event: &SlackBridgeEvent, bot_user_id: &str) -> String {
    let message_text = event.text.trim();
    let mention = format!("<@{bot_user_id}>");
    match event.kind {
        SlackBridgeEventKind::AppMention => message_text.replace(&mention, "").trim().to_string(),
        SlackBridgeEventKind::DirectMessage => message_text
            .strip_prefix(mention.as_str())
            .unwrap_or(message_text)
            .trim()
            .to_string(),
    }
}

fn event_is_stale(event: &SlackBridgeEvent, max_event_age_seconds: u64, now_unix_ms: u64) -> bool {
    if max_event_age_seconds == 0 {
        return false;
    }
    let max_age_ms = max_event_age_seconds.saturating_mul(1000);
    now_unix_ms.saturating_sub(event.occurred_unix_ms) > max_age_ms
}

#[cfg(test)]
mod tests;
