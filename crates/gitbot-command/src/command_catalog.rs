//! Read-only whitelists of supported actions and options per command family.

pub const MEMBER_ACTIONS: &[&str] = &["get", "add"];
pub const MEMBER_OPTIONS: &[&str] = &["team"];
pub const TEAM_ACTIONS: &[&str] = &["list"];
pub const TEAM_OPTIONS: &[&str] = &[];
pub const LABEL_ACTIONS: &[&str] = &["get", "list"];
pub const LABEL_OPTIONS: &[&str] = &["issue"];
pub const ISSUE_ACTIONS: &[&str] = &["get", "list"];
pub const ISSUE_OPTIONS: &[&str] = &["user", "noupdatesince", "labels"];
pub const ISSUE_STATES: &[&str] = &[
    "open",
    "closed",
    "assigned",
    "unassigned",
    "assignedto",
    "createdby",
];
pub const DEFAULT_PROTECTED_TEAMS: &[&str] = &["admin"];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Supported actions and option keys for one command family.
pub struct CommandRules {
    pub actions: Vec<String>,
    pub options: Vec<String>,
}

impl CommandRules {
    fn from_static(actions: &[&str], options: &[&str]) -> Self {
        Self {
            actions: actions.iter().map(|value| value.to_string()).collect(),
            options: options.iter().map(|value| value.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable whitelist configuration injected into command parsing.
pub struct CommandCatalog {
    pub member: CommandRules,
    pub team: CommandRules,
    pub label: CommandRules,
    pub issue: CommandRules,
    pub issue_states: Vec<String>,
    /// Teams that `member add` refuses to modify (case-insensitive).
    pub protected_teams: Vec<String>,
}

impl Default for CommandCatalog {
    fn default() -> Self {
        Self {
            member: CommandRules::from_static(MEMBER_ACTIONS, MEMBER_OPTIONS),
            team: CommandRules::from_static(TEAM_ACTIONS, TEAM_OPTIONS),
            label: CommandRules::from_static(LABEL_ACTIONS, LABEL_OPTIONS),
            issue: CommandRules::from_static(ISSUE_ACTIONS, ISSUE_OPTIONS),
            issue_states: ISSUE_STATES.iter().map(|value| value.to_string()).collect(),
            protected_teams: DEFAULT_PROTECTED_TEAMS
                .iter()
                .map(|value| value.to_string())
                .collect(),
        }
    }
}

impl CommandCatalog {
    pub fn with_protected_teams(mut self, teams: impl IntoIterator<Item = String>) -> Self {
        self.protected_teams = teams
            .into_iter()
            .map(|team| team.trim().to_string())
            .filter(|team| !team.is_empty())
            .collect();
        self
    }

    pub fn is_protected_team(&self, team: &str) -> bool {
        let team = team.trim();
        self.protected_teams
            .iter()
            .any(|protected| protected.eq_ignore_ascii_case(team))
    }
}

/// Wraps each item in backticks for Slack rendering, e.g. `` `get`, `list` ``.
pub fn code_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("`{}`", item.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
