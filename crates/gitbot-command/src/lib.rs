//! Command grammar and validation for the gitbot chat front end.
//!
//! Turns chat text into typed, whitelisted [`ActionRequest`] values without
//! touching the network; remote checks live in `gitbot-github`.

pub mod action_request;
pub mod chat_command;
pub mod command_catalog;
pub mod command_error;
pub mod option_grammar;
pub mod whitelist;

pub use action_request::{
    ActionRequest, IssueAction, IssueListQuery, IssueState, LabelAction, MemberAction, TeamAction,
};
pub use chat_command::{command_requires_direct_message, help_text, parse_chat_command, ChatCommand};
pub use command_catalog::CommandCatalog;
pub use command_error::CommandError;
pub use option_grammar::{parse_options, OptionGrammarError, ParsedOptions};
pub use whitelist::{validate_action, validate_options};
