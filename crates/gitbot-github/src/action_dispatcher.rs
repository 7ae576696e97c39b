//! Executes validated [`ActionRequest`]s against GitHub and builds [`ResultSet`]s.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use gitbot_command::{
    ActionRequest, IssueAction, IssueListQuery, IssueState, LabelAction, MemberAction, TeamAction,
};
use thiserror::Error;

use crate::github_api::{GithubApi, GithubApiError, IssueListParams, RepoTarget};
use crate::pagination::{collect_pages, Aggregated};
use crate::preconditions::{CheckFailure, PreconditionChecker, INTERNAL_ERROR_REASON};
use crate::result_render::{
    render_issue_label_line, render_issue_line, render_issue_record,
    render_repository_label_line, render_team_line, render_user_profile,
};


pub const DEFAULT_EXCLUDED_TEAMS: &[&str] = &["legacy-team", "admin"];
const MUTATION_FAILED_REASON: &str = "Failed to Add";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Output of one dispatch: formatted result lines plus a summary message.
pub struct ResultSet {
    pub lines: Vec<String>,
    pub summary: String,
}

impl ResultSet {
    fn message(summary: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            summary: summary.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
/// User-facing failure of a dispatched action.
pub struct ActionFailure {
    pub message: String,
}

impl ActionFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn check(context: &str, failure: CheckFailure) -> Self {
        Self::new(format!("{context}: {}", failure.reason()))
    }

    fn internal(operation: &str, error: GithubApiError) -> Self {
        tracing::warn!(operation, error = %error, "github request failed");
        Self::new(INTERNAL_ERROR_REASON)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MembershipChange {
    Added,
    AlreadyMember,
}

pub struct ActionDispatcher {
    api: Arc<dyn GithubApi>,
    target: RepoTarget,
    excluded_teams: Vec<String>,
}

impl ActionDispatcher {
    pub fn new(api: Arc<dyn GithubApi>, target: RepoTarget) -> Self {
        Self {
            api,
            target,
            excluded_teams: DEFAULT_EXCLUDED_TEAMS
                .iter()
                .map(|team| team.to_string())
                .collect(),
        }
    }

    /// Replaces the team names hidden from `team list` (exact, case-sensitive match).
    pub fn with_excluded_teams(mut self, excluded_teams: Vec<String>) -> Self {
        self.excluded_teams = excluded_teams;
        self
    }

    pub fn target(&self) -> &RepoTarget {
        &self.target
    }

    fn checker(&self) -> PreconditionChecker<'_> {
        PreconditionChecker::new(self.api.as_ref())
    }

    pub async fn dispatch(&self, request: &ActionRequest) -> Result<ResultSet, ActionFailure> {
        tracing::info!(
            family = request.family(),
            action = request.action_name(),
            organization = self.target.organization.as_str(),
            repository = self.target.repository.as_str(),
            "dispatching github action"
        );
        match request {
            ActionRequest::Member(MemberAction::Get { username }) => self.member_get(username).await,
            ActionRequest::Member(MemberAction::Add { username, team }) => {
                self.member_add(username, team).await
            }
            ActionRequest::Team(TeamAction::List) => self.team_list().await,
            ActionRequest::Label(LabelAction::List) => self.label_list().await,
            ActionRequest::Label(LabelAction::Get { issue }) => self.label_get(*issue).await,
            ActionRequest::Issue(IssueAction::Get { number }) => self.issue_get(*number).await,
            ActionRequest::Issue(IssueAction::List(query)) => self.issue_list(query).await,
        }
    }

    async fn ensure_repository(&self) -> Result<(), ActionFailure> {
        self.checker()
            .repository_exists(&self.target)
            .await
            .map_err(|failure| ActionFailure::check("invalid org/repo", failure))
    }

    async fn member_get(&self, username: &str) -> Result<ResultSet, ActionFailure> {
        match self.api.get_user(username).await {
            Ok(user) => Ok(ResultSet::message(render_user_profile(&user))),
            Err(error) if error.is_not_found() => {
                Err(ActionFailure::new("unable to find user: Unknown User"))
            }
            Err(error) => Err(ActionFailure::internal("get user", error)),
        }
    }

    async fn member_add(&self, username: &str, team: &str) -> Result<ResultSet, ActionFailure> {
        let organization = self.target.organization.as_str();
        let org_change = self
            .ensure_org_membership(username)
            .await
            .map_err(|reason| {
                ActionFailure::new(format!(
                    "user `{username}` failed to add to the organization `{organization}`: {reason}"
                ))
            })?;
        let team_change = self
            .ensure_team_membership(username, team)
            .await
            .map_err(|reason| {
                ActionFailure::new(format!(
                    "user `{username}` failed to add to the team `{team}`: {reason}"
                ))
            })?;

        let summary = match (org_change, team_change) {
            (_, MembershipChange::AlreadyMember) => {
                format!("user `{username}` is already a member of team `{team}`")
            }
            (MembershipChange::Added, MembershipChange::Added) => format!(
                "user `{username}` added to organization `{organization}` and team `{team}`"
            ),
            (MembershipChange::AlreadyMember, MembershipChange::Added) => {
                format!("user `{username}` added to team `{team}`")
            }
        };
        tracing::info!(user = username, team, summary = summary.as_str(), "member add finished");
        Ok(ResultSet::message(summary))
    }

    async fn ensure_org_membership(&self, username: &str) -> Result<MembershipChange, String> {
        let organization = self.target.organization.as_str();
        let checker = self.checker();
        if checker
            .is_org_member(organization, username)
            .await
            .map_err(|failure| failure.reason().to_string())?
        {
            return Ok(MembershipChange::AlreadyMember);
        }
        checker
            .user_exists(username)
            .await
            .map_err(|failure| failure.reason().to_string())?;
        self.api
            .set_org_membership(organization, username)
            .await
            .map_err(mutation_failure_reason)?;
        tracing::info!(organization, user = username, "organization membership updated");
        Ok(MembershipChange::Added)
    }

    async fn ensure_team_membership(
        &self,
        username: &str,
        team: &str,
    ) -> Result<MembershipChange, String> {
        let organization = self.target.organization.as_str();
        let checker = self.checker();
        if checker
            .is_active_team_member(organization, team, username)
            .await
            .map_err(|failure| failure.reason().to_string())?
        {
            return Ok(MembershipChange::AlreadyMember);
        }
        checker
            .user_exists(username)
            .await
            .map_err(|failure| failure.reason().to_string())?;
        checker
            .team_exists(organization, team)
            .await
            .map_err(|failure| failure.reason().to_string())?;
        let membership = self
            .api
            .add_team_membership(organization, team, username)
            .await
            .map_err(mutation_failure_reason)?;
        tracing::info!(
            team,
            user = username,
            state = membership.state.as_str(),
            "team membership updated"
        );
        Ok(MembershipChange::Added)
    }

    async fn team_list(&self) -> Result<ResultSet, ActionFailure> {
        self.ensure_repository().await?;
        let organization = self.target.organization.as_str();
        let excluded = &self.excluded_teams;
        let teams = collect_pages(
            |page| self.api.list_org_teams(organization, page),
            |team| {
                (!excluded.iter().any(|name| *name == team.name)).then(|| render_team_line(&team))
            },
        )
        .await
        .map_err(|error| ActionFailure::internal("list teams", error))?
        .into_items();

        if teams.is_empty() {
            return Ok(ResultSet::message(format!(
                "No team found in Org: `\"{organization}\"`"
            )));
        }
        Ok(ResultSet {
            summary: format!("*`{} team/s found`*", teams.len()),
            lines: teams,
        })
    }

    async fn label_list(&self) -> Result<ResultSet, ActionFailure> {
        self.ensure_repository().await?;
        let RepoTarget {
            organization,
            repository,
        } = &self.target;
        let labels = collect_pages(
            |page| self.api.list_repository_labels(organization, repository, page),
            |label| Some(render_repository_label_line(&label)),
        )
        .await
        .map_err(|error| ActionFailure::internal("list repository labels", error))?
        .into_items();

        if labels.is_empty() {
            return Ok(ResultSet::message(format!(
                "No labels found in Org: `\"{organization}\"`, Repo: `\"{repository}\"`"
            )));
        }
        Ok(ResultSet {
            summary: format!("*`{} labels found`*", labels.len()),
            lines: labels,
        })
    }

    async fn label_get(&self, issue: Option<u64>) -> Result<ResultSet, ActionFailure> {
        self.ensure_repository().await?;
        if let Some(number) = issue {
            self.checker()
                .issue_exists(&self.target, number)
                .await
                .map_err(|failure| ActionFailure::check("invalid issue", failure))?;
        }
        let number = issue.unwrap_or(0);
        let defaulted_note = if issue.is_none() {
            " (no `issue=` given, defaulted to issue 0)"
        } else {
            ""
        };

        let RepoTarget {
            organization,
            repository,
        } = &self.target;
        let labels = match collect_pages(
            |page| {
                self.api
                    .list_issue_labels(organization, repository, number, page)
            },
            |label| Some(render_issue_label_line(&label)),
        )
        .await
        {
            Ok(labels) => labels.into_items(),
            Err(error) if error.is_not_found() => {
                return Err(ActionFailure::new(format!(
                    "invalid issue: Unknown Issue{defaulted_note}"
                )))
            }
            Err(error) => return Err(ActionFailure::internal("list issue labels", error)),
        };

        if labels.is_empty() {
            return Ok(ResultSet::message(format!(
                "No labels found for issue : `\"{number}\"`{defaulted_note}"
            )));
        }
        Ok(ResultSet {
            summary: format!(
                "*`{} labels found for issue {number}`*{defaulted_note}",
                labels.len()
            ),
            lines: labels,
        })
    }

    async fn issue_get(&self, number: u64) -> Result<ResultSet, ActionFailure> {
        self.ensure_repository().await?;
        match self
            .api
            .get_issue(&self.target.organization, &self.target.repository, number)
            .await
        {
            Ok(issue) => Ok(ResultSet::message(render_issue_record(&issue))),
            Err(error) if error.is_not_found() => {
                Err(ActionFailure::new("invalid issue: Unknown Issue"))
            }
            Err(error) => Err(ActionFailure::internal("get issue", error)),
        }
    }

    async fn issue_list(&self, query: &IssueListQuery) -> Result<ResultSet, ActionFailure> {
        self.ensure_repository().await?;
        if let Some(user) = query.user.as_deref() {
            self.checker()
                .user_exists(user)
                .await
                .map_err(|failure| ActionFailure::check("invalid user name", failure))?;
        }

        let params = issue_list_params(query);
        let cutoff = query.no_update_since.and_then(start_of_day_utc);
        let RepoTarget {
            organization,
            repository,
        } = &self.target;
        let aggregated = collect_pages(
            |page| {
                self.api
                    .list_repository_issues(organization, repository, &params, page)
            },
            |issue| {
                if issue.is_pull_request() {
                    return None;
                }
                if cutoff.is_some_and(|cutoff| issue.updated_at >= cutoff) {
                    return None;
                }
                Some(render_issue_line(&issue))
            },
        )
        .await
        .map_err(|error| ActionFailure::internal("list issues", error))?;

        let ignored_user = match (query.state.requires_user(), query.user.as_deref()) {
            (false, Some(user)) => format!(" (ignored input user={user})"),
            _ => String::new(),
        };
        let lines = match aggregated {
            Aggregated::NothingFound => {
                return Ok(ResultSet::message(format!(
                    "No issues found in Org: `\"{organization}\"`, Repo: `\"{repository}\"`{ignored_user}"
                )))
            }
            Aggregated::Collected(lines) => lines,
        };
        Ok(ResultSet {
            summary: format!("*`{} issues found`*{ignored_user}", lines.len()),
            lines,
        })
    }
}

/// Maps a list state to the remote issue filters.
pub fn issue_list_params(query: &IssueListQuery) -> IssueListParams {
    let user = query.user.clone();
    let (state, assignee, creator) = match query.state {
        IssueState::Open => ("open", None, None),
        IssueState::Closed => ("closed", None, None),
        IssueState::Assigned => ("open", Some("*".to_string()), None),
        IssueState::Unassigned => ("open", Some("none".to_string()), None),
        IssueState::AssignedTo => ("open", user, None),
        IssueState::CreatedBy => ("open", None, user),
    };
    IssueListParams {
        state: state.to_string(),
        assignee,
        creator,
        labels: query.labels.clone(),
    }
}

fn start_of_day_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|value| value.and_utc())
}

fn mutation_failure_reason(error: GithubApiError) -> String {
    tracing::warn!(error = %error, "github membership update failed");
    match error {
        GithubApiError::NotFound { .. } | GithubApiError::Status { .. } => {
            MUTATION_FAILED_REASON.to_string()
        }
        _ => INTERNAL_ERROR_REASON.to_string(),
    }
}
