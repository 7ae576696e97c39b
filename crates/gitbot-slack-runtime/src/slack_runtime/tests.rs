//! Tests for Slack bridge envelope handling and reply delivery.

use httpmock::prelude::*;
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message as WsMessage;

use super::{
    ack_envelope, deliver_reply, event_is_stale, normalize_slack_message_text,
    normalize_socket_envelope, parse_socket_envelope, SlackApiClient, SlackBridgeEvent,
    SlackBridgeEventKind, SlackSocketEnvelope,
};
use crate::command_pipeline::CommandReply;

fn events_api_envelope(event: Value) -> SlackSocketEnvelope {
    SlackSocketEnvelope {
        envelope_id: Some("env-1".to_string()),
        envelope_type: "events_api".to_string(),
        payload: json!({
            "type": "event_callback",
            "event_id": "Ev1",
            "event_time": 1_700_000_000_u64,
            "event": event,
        }),
        reason: None,
    }
}

fn event(kind: SlackBridgeEventKind, text: &str, occurred_unix_ms: u64) -> SlackBridgeEvent {
    SlackBridgeEvent {
        key: "Ev1:D1:1.1".to_string(),
        kind,
        event_id: "Ev1".to_string(),
        occurred_unix_ms,
        channel_id: "D1".to_string(),
        user_id: "U1".to_string(),
        text: text.to_string(),
    }
}

#[test]
fn unit_parse_socket_envelope_accepts_text_and_ignores_control_frames() {
    let hello = WsMessage::Text(r#"{"type":"hello","num_connections":1}"#.into());
    let parsed = parse_socket_envelope(hello)
        .expect("parse")
        .expect("envelope");
    assert_eq!(parsed.envelope_type, "hello");
    assert_eq!(parsed.envelope_id, None);

    let binary = WsMessage::Binary(
        br#"{"envelope_id":"e2","type":"events_api","payload":{}}"#
            .to_vec()
            .into(),
    );
    let parsed = parse_socket_envelope(binary)
        .expect("parse")
        .expect("envelope");
    assert_eq!(parsed.envelope_id.as_deref(), Some("e2"));

    assert!(parse_socket_envelope(WsMessage::Ping(vec![].into()))
        .expect("ping")
        .is_none());
    assert!(parse_socket_envelope(WsMessage::Text("not json".into())).is_err());
}

#[test]
fn unit_disconnect_envelope_carries_reason() {
    let message = WsMessage::Text(
        r#"{"type":"disconnect","reason":"refresh_requested","debug_info":{}}"#.into(),
    );
    let parsed = parse_socket_envelope(message)
        .expect("parse")
        .expect("envelope");
    assert_eq!(parsed.envelope_type, "disconnect");
    assert_eq!(parsed.reason.as_deref(), Some("refresh_requested"));
}

#[test]
fn functional_normalize_socket_envelope_accepts_direct_messages_and_mentions() {
    let dm = events_api_envelope(json!({
        "type": "message",
        "channel_type": "im",
        "channel": "D1",
        "user": "U1",
        "text": "issue get 234",
        "ts": "1.1",
    }));
    let event = normalize_socket_envelope(&dm, "UBOT")
        .expect("normalize")
        .expect("event");
    assert_eq!(event.kind, SlackBridgeEventKind::DirectMessage);
    assert_eq!(event.key, "Ev1:D1:1.1");
    assert_eq!(event.occurred_unix_ms, 1_700_000_000_000);
    assert!(event.is_direct_message());

    let mention = events_api_envelope(json!({
        "type": "app_mention",
        "channel": "C1",
        "user": "U1",
        "text": "<@UBOT> version",
        "ts": "2.1",
    }));
    let event = normalize_socket_envelope(&mention, "UBOT")
        .expect("normalize")
        .expect("event");
    assert_eq!(event.kind, SlackBridgeEventKind::AppMention);
    assert!(!event.is_direct_message());
    assert_eq!(normalize_slack_message_text(&event, "UBOT"), "version");
}

#[test]
fn regression_normalize_socket_envelope_skips_bots_self_and_channel_chatter() {
    let cases = [
        json!({"type": "message", "subtype": "bot_message", "channel": "D1", "user": "U1", "ts": "1.1"}),
        json!({"type": "message", "bot_id": "B1", "channel": "D1", "user": "U1", "ts": "1.1"}),
        json!({"type": "message", "channel": "D1", "user": "UBOT", "ts": "1.1"}),
        json!({"type": "message", "channel_type": "channel", "channel": "C1", "user": "U1", "ts": "1.1"}),
        json!({"type": "message", "subtype": "message_changed", "channel": "D1", "user": "U1", "ts": "1.1"}),
        json!({"type": "message", "channel": "D1", "ts": "1.1"}),
        json!({"type": "reaction_added", "channel": "D1", "user": "U1", "ts": "1.1"}),
    ];
    for case in cases {
        let envelope = events_api_envelope(case.clone());
        assert!(
            normalize_socket_envelope(&envelope, "UBOT")
                .expect("normalize")
                .is_none(),
            "{case}"
        );
    }

    let slash = SlackSocketEnvelope {
        envelope_id: Some("env-2".to_string()),
        envelope_type: "slash_commands".to_string(),
        payload: json!({}),
        reason: None,
    };
    assert!(normalize_socket_envelope(&slash, "UBOT")
        .expect("normalize")
        .is_none());
}

#[test]
fn unit_normalize_slack_message_text_strips_bot_mentions() {
    let dm = event(SlackBridgeEventKind::DirectMessage, "  <@UBOT> issue get 1 ", 0);
    assert_eq!(normalize_slack_message_text(&dm, "UBOT"), "issue get 1");

    let dm = event(SlackBridgeEventKind::DirectMessage, "labels get issue=<@UBOT>", 0);
    assert_eq!(
        normalize_slack_message_text(&dm, "UBOT"),
        "labels get issue=<@UBOT>"
    );

    let other = event(SlackBridgeEventKind::DirectMessage, "<@UOTHER> help", 0);
    assert_eq!(normalize_slack_message_text(&other, "UBOT"), "<@UOTHER> help");

    let mention = event(SlackBridgeEventKind::AppMention, "<@UBOT>  labels list", 0);
    assert_eq!(normalize_slack_message_text(&mention, "UBOT"), "labels list");
}

#[test]
fn regression_event_is_stale_respects_threshold() {
    let event = event(SlackBridgeEventKind::DirectMessage, "help", 1_000);
    assert!(event_is_stale(&event, 1, 4_000));
    assert!(!event_is_stale(&event, 10, 4_000));
    assert!(!event_is_stale(&event, 0, u64::MAX));
}

#[tokio::test]
async fn unit_ack_envelope_echoes_envelope_id() {
    let mut sink: Vec<WsMessage> = Vec::new();
    ack_envelope(&mut sink, "env-9").await.expect("ack");
    assert_eq!(sink.len(), 1);
    let WsMessage::Text(text) = &sink[0] else {
        panic!("expected text ack");
    };
    let payload: Value = serde_json::from_str(text.as_str()).expect("json ack");
    assert_eq!(payload, json!({"envelope_id": "env-9"}));
}

#[tokio::test]
async fn functional_deliver_reply_posts_summary_then_each_chunk() {
    let server = MockServer::start();
    let summary = server.mock(|when, then| {
        when.method(POST)
            .path("/chat.postMessage")
            .body_includes("\"text\":\"*`61 labels found`*\"");
        then.status(200)
            .json_body(json!({"ok": true, "channel": "D1", "ts": "1.1"}));
    });
    let chunks = server.mock(|when, then| {
        when.method(POST)
            .path("/chat.postMessage")
            .body_includes("\"attachments\"");
        then.status(200)
            .json_body(json!({"ok": true, "channel": "D1", "ts": "1.2"}));
    });
    let client = SlackApiClient::new(&server.base_url(), "xapp", "xoxb", 2_000, 1, 1)
        .expect("slack client");
    let reply = CommandReply {
        summary: "*`61 labels found`*".to_string(),
        chunks: vec!["first chunk".to_string(), "second chunk".to_string()],
    };

    deliver_reply(&client, "D1", &reply).await.expect("deliver");

    summary.assert_calls(1);
    chunks.assert_calls(2);
}

#[tokio::test]
async fn regression_deliver_reply_stops_after_failed_summary() {
    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.method(POST).path("/chat.postMessage");
        then.status(200)
            .json_body(json!({"ok": false, "error": "not_in_channel"}));
    });
    let client = SlackApiClient::new(&server.base_url(), "xapp", "xoxb", 2_000, 1, 1)
        .expect("slack client");
    let reply = CommandReply {
        summary: "summary".to_string(),
        chunks: vec!["chunk".to_string()],
    };

    let error = deliver_reply(&client, "D1", &reply)
        .await
        .expect_err("delivery failure");
    assert!(error.to_string().contains("not_in_channel"));
    failing.assert_calls(1);
}
