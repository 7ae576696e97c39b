use thiserror::Error;

use crate::option_grammar::OptionGrammarError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enumerates command rejections raised before any remote call is made.
///
/// `Display` output is sent to the chat user verbatim.
pub enum CommandError {
    #[error("unrecognized command, msg me `help` for a list of all commands")]
    UnrecognizedCommand,
    #[error("unexpected arguments `{arguments}`, usage: {usage}")]
    UnexpectedArguments { arguments: String, usage: String },
    #[error("you must specify what action need to be taken, supported actions: {supported}")]
    MissingAction { supported: String },
    #[error("action must not be empty or contain more than one word")]
    MalformedAction,
    #[error("invalid action `{action}`, supported actions: {supported}")]
    UnsupportedAction { action: String, supported: String },
    #[error("options could not be parsed: {0}")]
    Options(#[from] OptionGrammarError),
    #[error("unrecognized option: {key}, supported options: {supported}")]
    UnrecognizedOption { key: String, supported: String },
    #[error("option `{key}` requires a value, msg me `help` for example")]
    MissingOptionValue { key: String },
    #[error("option `{key}` may only be given once")]
    RepeatedOption { key: String },
    #[error("you must specify a user")]
    MissingUser,
    #[error("state/id must not be empty or many. msg me `help` for more information")]
    MissingStateOrId,
    #[error("invalid state or id: `{value}`. msg me `help` for more information")]
    InvalidStateOrId { value: String },
    #[error("invalid issue number `{value}`")]
    InvalidIssueNumber { value: String },
    #[error("invalid date string, msg me `help` for example")]
    InvalidDate { value: String },
    #[error("`{state}` requires github user name as input")]
    StateRequiresUser { state: String },
    #[error("`{action}` expects an issue number as input")]
    IssueNumberRequired { action: String },
    #[error("`{action}` expects team name as input")]
    TeamRequired { action: String },
    #[error("You are not privileged to update `{team}` team")]
    ProtectedTeam { team: String },
}
