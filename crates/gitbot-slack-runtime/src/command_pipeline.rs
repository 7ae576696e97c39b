//! Chat text in, reply out: routing, validation, dispatch, and chunking.

use gitbot_command::{
    command_requires_direct_message, help_text, parse_chat_command, ChatCommand, CommandCatalog,
};
use gitbot_github::ActionDispatcher;

use crate::result_chunker::{chunk_result_lines, RESULT_CHUNK_LINES};

pub const DIRECT_MESSAGE_ONLY_REPLY: &str = "this command is only accepted via direct message";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A summary message followed by zero or more ordered result chunks.
pub struct CommandReply {
    pub summary: String,
    pub chunks: Vec<String>,
}

impl CommandReply {
    fn text(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            chunks: Vec::new(),
        }
    }
}

pub struct ChatCommandPipeline {
    catalog: CommandCatalog,
    dispatcher: ActionDispatcher,
    version_label: String,
}

impl ChatCommandPipeline {
    pub fn new(
        catalog: CommandCatalog,
        dispatcher: ActionDispatcher,
        version_label: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            dispatcher,
            version_label: version_label.into(),
        }
    }

    pub fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }

    /// Runs one chat message to completion. GitHub is only contacted for a
    /// fully validated command received in a direct message.
    pub async fn handle(&self, text: &str, is_direct_message: bool) -> CommandReply {
        let text = text.trim();
        if !is_direct_message && command_requires_direct_message(text) {
            tracing::info!("github command rejected outside direct message");
            return CommandReply::text(DIRECT_MESSAGE_ONLY_REPLY);
        }

        let request = match parse_chat_command(text, &self.catalog) {
            Ok(ChatCommand::Help) => return CommandReply::text(help_text(&self.catalog)),
            Ok(ChatCommand::Version) => return CommandReply::text(self.version_label.clone()),
            Ok(ChatCommand::Action(request)) => request,
            Err(error) => {
                tracing::info!(error = %error, "chat command rejected");
                return CommandReply::text(error.to_string());
            }
        };

        match self.dispatcher.dispatch(&request).await {
            Ok(result) => {
                let chunks = chunk_result_lines(&result.lines, RESULT_CHUNK_LINES);
                tracing::info!(
                    family = request.family(),
                    action = request.action_name(),
                    lines = result.lines.len(),
                    chunks = chunks.len(),
                    "github action completed"
                );
                CommandReply {
                    summary: result.summary,
                    chunks,
                }
            }
            Err(failure) => {
                tracing::info!(
                    family = request.family(),
                    action = request.action_name(),
                    failure = failure.message.as_str(),
                    "github action failed"
                );
                CommandReply::text(failure.message)
            }
        }
    }
}
