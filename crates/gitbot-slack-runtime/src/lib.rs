//! Slack Socket Mode transport for gitbot.
//!
//! Receives direct messages and app mentions, runs them through the
//! [`ChatCommandPipeline`], and posts the summary plus result chunks back.

pub mod command_pipeline;
pub mod result_chunker;
mod slack_helpers;
pub mod slack_runtime;

pub use command_pipeline::{ChatCommandPipeline, CommandReply, DIRECT_MESSAGE_ONLY_REPLY};
pub use result_chunker::{chunk_result_lines, RESULT_CHUNK_LINES};
pub use slack_runtime::{run_slack_bridge, SlackBridgeRuntimeConfig};
