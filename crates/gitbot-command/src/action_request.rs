//! Typed, validated requests built from positional arguments and option strings.

use chrono::NaiveDate;

use crate::command_catalog::CommandCatalog;
use crate::command_error::CommandError;
use crate::option_grammar::parse_options;
use crate::whitelist::{parse_date_value, single_option, validate_action, validate_options};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One validated request per command family.
pub enum ActionRequest {
    Member(MemberAction),
    Team(TeamAction),
    Label(LabelAction),
    Issue(IssueAction),
}

impl ActionRequest {
    pub fn family(&self) -> &'static str {
        match self {
            Self::Member(_) => "member",
            Self::Team(_) => "team",
            Self::Label(_) => "label",
            Self::Issue(_) => "issue",
        }
    }

    pub fn action_name(&self) -> &'static str {
        match self {
            Self::Member(MemberAction::Get { .. }) => "get",
            Self::Member(MemberAction::Add { .. }) => "add",
            Self::Team(TeamAction::List) => "list",
            Self::Label(LabelAction::Get { .. }) => "get",
            Self::Label(LabelAction::List) => "list",
            Self::Issue(IssueAction::Get { .. }) => "get",
            Self::Issue(IssueAction::List(_)) => "list",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberAction {
    Get { username: String },
    Add { username: String, team: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamAction {
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelAction {
    /// `None` when no positive `issue=` was supplied.
    Get { issue: Option<u64> },
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueAction {
    Get { number: u64 },
    List(IssueListQuery),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueListQuery {
    pub state: IssueState,
    pub user: Option<String>,
    /// Only issues last updated strictly before this date are listed.
    pub no_update_since: Option<NaiveDate>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
    Assigned,
    Unassigned,
    AssignedTo,
    CreatedBy,
}

impl IssueState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "assigned" => Some(Self::Assigned),
            "unassigned" => Some(Self::Unassigned),
            "assignedto" => Some(Self::AssignedTo),
            "createdby" => Some(Self::CreatedBy),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Assigned => "assigned",
            Self::Unassigned => "unassigned",
            Self::AssignedTo => "assignedto",
            Self::CreatedBy => "createdby",
        }
    }

    pub fn requires_user(self) -> bool {
        matches!(self, Self::AssignedTo | Self::CreatedBy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateOrId {
    State(IssueState),
    Number(u64),
}

pub fn parse_issue_state_or_id(
    value: &str,
    catalog: &CommandCatalog,
) -> Result<StateOrId, CommandError> {
    let mut words = value.split_whitespace();
    let (Some(word), None) = (words.next(), words.next()) else {
        return Err(CommandError::MissingStateOrId);
    };
    if catalog.issue_states.iter().any(|state| state == word) {
        if let Some(state) = IssueState::parse(word) {
            return Ok(StateOrId::State(state));
        }
    }
    word.parse::<u64>()
        .map(StateOrId::Number)
        .map_err(|_| CommandError::InvalidStateOrId {
            value: word.to_string(),
        })
}

pub fn build_member_request(
    action: &str,
    username: &str,
    options: &str,
    catalog: &CommandCatalog,
) -> Result<ActionRequest, CommandError> {
    let action = validate_action(action, &catalog.member.actions)?;
    let username = username.trim();
    if username.is_empty() || username.split_whitespace().count() > 1 {
        return Err(CommandError::MissingUser);
    }
    let parsed = parse_options(options)?;
    validate_options(&parsed, &catalog.member.options)?;
    let team = single_option(&parsed, "team")?
        .map(str::trim)
        .filter(|team| !team.is_empty());
    if let Some(team) = team {
        if catalog.is_protected_team(team) {
            return Err(CommandError::ProtectedTeam {
                team: team.to_string(),
            });
        }
    }

    let request = match action.as_str() {
        "add" => {
            let team = team.ok_or_else(|| CommandError::TeamRequired {
                action: action.clone(),
            })?;
            MemberAction::Add {
                username: username.to_string(),
                team: team.to_string(),
            }
        }
        _ => MemberAction::Get {
            username: username.to_string(),
        },
    };
    Ok(ActionRequest::Member(request))
}

pub fn build_team_request(
    action: &str,
    catalog: &CommandCatalog,
) -> Result<ActionRequest, CommandError> {
    validate_action(action, &catalog.team.actions)?;
    Ok(ActionRequest::Team(TeamAction::List))
}

pub fn build_label_request(
    action: &str,
    options: &str,
    catalog: &CommandCatalog,
) -> Result<ActionRequest, CommandError> {
    let action = validate_action(action, &catalog.label.actions)?;
    let parsed = parse_options(options)?;
    validate_options(&parsed, &catalog.label.options)?;
    let issue = single_option(&parsed, "issue")?
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| CommandError::InvalidIssueNumber {
                    value: raw.to_string(),
                })
        })
        .transpose()?
        .filter(|number| *number > 0);

    let request = match action.as_str() {
        "get" => LabelAction::Get { issue },
        _ => LabelAction::List,
    };
    Ok(ActionRequest::Label(request))
}

/// Builds an issue request. A numeric `state_or_id` always selects the single
/// issue lookup, whether the action was `get` or `list`.
pub fn build_issue_request(
    action: &str,
    state_or_id: &str,
    options: &str,
    catalog: &CommandCatalog,
) -> Result<ActionRequest, CommandError> {
    let action = validate_action(action, &catalog.issue.actions)?;
    let state_or_id = parse_issue_state_or_id(state_or_id, catalog)?;
    let parsed = parse_options(options)?;
    validate_options(&parsed, &catalog.issue.options)?;

    let no_update_since = single_option(&parsed, "noupdatesince")?
        .map(parse_date_value)
        .transpose()?;
    let user = single_option(&parsed, "user")?
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .map(ToOwned::to_owned);
    // Label names are forwarded verbatim.
    let labels = parsed.get("labels").cloned().unwrap_or_default();
    if labels.iter().any(|label| label.trim().is_empty()) {
        return Err(CommandError::MissingOptionValue {
            key: "labels".to_string(),
        });
    }

    let request = match state_or_id {
        StateOrId::Number(0) => {
            return Err(CommandError::IssueNumberRequired {
                action: "get".to_string(),
            })
        }
        StateOrId::Number(number) => IssueAction::Get { number },
        StateOrId::State(_) if action == "get" => {
            return Err(CommandError::IssueNumberRequired { action })
        }
        StateOrId::State(state) => {
            if state.requires_user() && user.is_none() {
                return Err(CommandError::StateRequiresUser {
                    state: state.as_str().to_string(),
                });
            }
            IssueAction::List(IssueListQuery {
                state,
                user,
                no_update_since,
                labels,
            })
        }
    };
    Ok(ActionRequest::Issue(request))
}
