//! Chat message to command routing: `<command> <positional...> [options]`.

use crate::action_request::{
    build_issue_request, build_label_request, build_member_request, build_team_request,
    ActionRequest,
};
use crate::command_catalog::{code_list, CommandCatalog};
use crate::command_error::CommandError;

pub const MEMBER_USAGE: &str = "member <action> <user> [options]";
pub const TEAM_USAGE: &str = "team <action>";
pub const LABEL_USAGE: &str = "labels <action> [options]";
pub const ISSUE_USAGE: &str = "issue <action> <state_or_id> [options]";
pub const VERSION_USAGE: &str = "version";

/// Command words that reach the GitHub API and are only served in direct messages.
const REMOTE_COMMAND_WORDS: &[&str] = &["member", "team", "label", "labels", "issue", "issues"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Help,
    Version,
    Action(ActionRequest),
}

/// Returns true when the message addresses a command that touches remote state.
pub fn command_requires_direct_message(text: &str) -> bool {
    let (word, _) = next_word(text);
    REMOTE_COMMAND_WORDS.contains(&word)
}

/// Parses and validates a chat message. No remote calls are made here.
pub fn parse_chat_command(
    text: &str,
    catalog: &CommandCatalog,
) -> Result<ChatCommand, CommandError> {
    let (command, remainder) = next_word(text);
    match command {
        "help" => Ok(ChatCommand::Help),
        "version" => {
            ensure_no_arguments(remainder, VERSION_USAGE)?;
            Ok(ChatCommand::Version)
        }
        "member" => {
            let (action, remainder) = required_action(remainder, &catalog.member.actions)?;
            let (user, options) = next_word(remainder);
            if user.is_empty() {
                return Err(CommandError::MissingUser);
            }
            build_member_request(action, user, options.trim(), catalog).map(ChatCommand::Action)
        }
        "team" => {
            let (action, remainder) = required_action(remainder, &catalog.team.actions)?;
            ensure_no_arguments(remainder, TEAM_USAGE)?;
            build_team_request(action, catalog).map(ChatCommand::Action)
        }
        "label" | "labels" => {
            let (action, options) = required_action(remainder, &catalog.label.actions)?;
            build_label_request(action, options.trim(), catalog).map(ChatCommand::Action)
        }
        "issue" | "issues" => {
            let (action, remainder) = required_action(remainder, &catalog.issue.actions)?;
            let (state_or_id, options) = next_word(remainder);
            build_issue_request(action, state_or_id, options.trim(), catalog)
                .map(ChatCommand::Action)
        }
        _ => Err(CommandError::UnrecognizedCommand),
    }
}

/// Help text listing every command with its supported actions and options.
pub fn help_text(catalog: &CommandCatalog) -> String {
    [
        "Supported commands (GitHub commands are only accepted via direct message):".to_string(),
        format!(
            "- `{MEMBER_USAGE}` actions {} options {}\n  e.g. `member add octocat team=storage`",
            code_list(&catalog.member.actions),
            code_list(&catalog.member.options)
        ),
        format!(
            "- `{TEAM_USAGE}` actions {}\n  e.g. `team list`",
            code_list(&catalog.team.actions)
        ),
        format!(
            "- `{LABEL_USAGE}` actions {} options {}\n  e.g. `labels list`, `labels get issue=234`",
            code_list(&catalog.label.actions),
            code_list(&catalog.label.options)
        ),
        format!(
            "- `{ISSUE_USAGE}` actions {} states {} options {}\n  e.g. `issue get 234`, `issue list assignedto user=octocat;noupdatesince=2022-07-01;labels=bug`",
            code_list(&catalog.issue.actions),
            code_list(&catalog.issue_states),
            code_list(&catalog.issue.options)
        ),
        format!("- `{VERSION_USAGE}` report the bot version"),
        "- `help` show this message".to_string(),
        "Options are `key=value` pairs separated by `;`, repeat a key to give several values."
            .to_string(),
    ]
    .join("\n")
}

fn next_word(input: &str) -> (&str, &str) {
    let trimmed = input.trim_start();
    match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (trimmed, ""),
    }
}

fn required_action<'a>(
    remainder: &'a str,
    supported: &[String],
) -> Result<(&'a str, &'a str), CommandError> {
    let (action, rest) = next_word(remainder);
    if action.is_empty() {
        return Err(CommandError::MissingAction {
            supported: code_list(supported),
        });
    }
    Ok((action, rest))
}

fn ensure_no_arguments(remainder: &str, usage: &str) -> Result<(), CommandError> {
    let arguments = remainder.trim();
    if arguments.is_empty() {
        return Ok(());
    }
    Err(CommandError::UnexpectedArguments {
        arguments: arguments.to_string(),
        usage: format!("`{usage}`"),
    })
}
