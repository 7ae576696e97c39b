//! Scripted in-memory [`GithubApi`] used by precondition and dispatcher tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::github_api::{
    GithubAccount, GithubApi, GithubApiError, GithubIssue, GithubLabel, GithubRepository,
    GithubTeam, GithubTeamMembership, GithubUser, IssueListParams, Page, PageRequest,
};

#[derive(Default)]
pub(crate) struct FakeGithub {
    pub(crate) repository_pages: Vec<Vec<GithubRepository>>,
    pub(crate) users: Vec<GithubUser>,
    pub(crate) issues: Vec<GithubIssue>,
    pub(crate) issue_pages: Vec<Vec<GithubIssue>>,
    pub(crate) label_pages: Vec<Vec<GithubLabel>>,
    pub(crate) issue_labels: Vec<(u64, Vec<Vec<GithubLabel>>)>,
    pub(crate) team_pages: Vec<Vec<GithubTeam>>,
    pub(crate) org_members: Vec<String>,
    /// `(team slug, login, state)`
    pub(crate) team_memberships: Vec<(String, String, String)>,
    /// `(operation, status)` pairs that fail instead of answering.
    pub(crate) failing_operations: Vec<(&'static str, u16)>,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) issue_params: Mutex<Vec<IssueListParams>>,
}

impl FakeGithub {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn issue_params(&self) -> Vec<IssueListParams> {
        self.issue_params.lock().expect("params lock").clone()
    }

    fn record(
        &self,
        operation: &'static str,
        detail: impl std::fmt::Display,
    ) -> Result<(), GithubApiError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(format!("{operation}:{detail}"));
        match self
            .failing_operations
            .iter()
            .find(|(failing, _)| *failing == operation)
        {
            Some((_, 404)) => Err(GithubApiError::NotFound { operation }),
            Some((_, status)) => Err(GithubApiError::Status {
                operation,
                status: *status,
                body: "scripted failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn page_of<T: Clone>(pages: &[Vec<T>], request: PageRequest) -> Page<T> {
    let index = request.page.saturating_sub(1) as usize;
    Page {
        items: pages.get(index).cloned().unwrap_or_default(),
        next_page: (index + 1 < pages.len()).then_some(request.page + 1),
    }
}

fn not_found(operation: &'static str) -> GithubApiError {
    GithubApiError::NotFound { operation }
}

#[async_trait]
impl GithubApi for FakeGithub {
    async fn list_org_repositories(
        &self,
        _organization: &str,
        page: PageRequest,
    ) -> Result<Page<GithubRepository>, GithubApiError> {
        self.record("list_org_repositories", page.page)?;
        Ok(page_of(&self.repository_pages, page))
    }

    async fn get_user(&self, login: &str) -> Result<GithubUser, GithubApiError> {
        self.record("get_user", login)?;
        self.users
            .iter()
            .find(|user| user.login == login)
            .cloned()
            .ok_or_else(|| not_found("get_user"))
    }

    async fn get_issue(
        &self,
        _owner: &str,
        _repository: &str,
        number: u64,
    ) -> Result<GithubIssue, GithubApiError> {
        self.record("get_issue", number)?;
        self.issues
            .iter()
            .find(|issue| issue.number == number)
            .cloned()
            .ok_or_else(|| not_found("get_issue"))
    }

    async fn list_repository_issues(
        &self,
        _owner: &str,
        _repository: &str,
        params: &IssueListParams,
        page: PageRequest,
    ) -> Result<Page<GithubIssue>, GithubApiError> {
        self.record("list_repository_issues", page.page)?;
        self.issue_params
            .lock()
            .expect("params lock")
            .push(params.clone());
        Ok(page_of(&self.issue_pages, page))
    }

    async fn list_repository_labels(
        &self,
        _owner: &str,
        _repository: &str,
        page: PageRequest,
    ) -> Result<Page<GithubLabel>, GithubApiError> {
        self.record("list_repository_labels", page.page)?;
        Ok(page_of(&self.label_pages, page))
    }

    async fn list_issue_labels(
        &self,
        _owner: &str,
        _repository: &str,
        number: u64,
        page: PageRequest,
    ) -> Result<Page<GithubLabel>, GithubApiError> {
        self.record("list_issue_labels", format!("{number}:{}", page.page))?;
        self.issue_labels
            .iter()
            .find(|(issue, _)| *issue == number)
            .map(|(_, pages)| page_of(pages, page))
            .ok_or_else(|| not_found("list_issue_labels"))
    }

    async fn list_org_teams(
        &self,
        _organization: &str,
        page: PageRequest,
    ) -> Result<Page<GithubTeam>, GithubApiError> {
        self.record("list_org_teams", page.page)?;
        Ok(page_of(&self.team_pages, page))
    }

    async fn get_team(
        &self,
        _organization: &str,
        slug: &str,
    ) -> Result<GithubTeam, GithubApiError> {
        self.record("get_team", slug)?;
        self.team_pages
            .iter()
            .flatten()
            .find(|team| team.slug == slug)
            .cloned()
            .ok_or_else(|| not_found("get_team"))
    }

    async fn is_org_member(
        &self,
        _organization: &str,
        login: &str,
    ) -> Result<bool, GithubApiError> {
        self.record("is_org_member", login)?;
        Ok(self.org_members.iter().any(|member| member == login))
    }

    async fn set_org_membership(
        &self,
        _organization: &str,
        login: &str,
    ) -> Result<(), GithubApiError> {
        self.record("set_org_membership", login)
    }

    async fn get_team_membership(
        &self,
        _organization: &str,
        slug: &str,
        login: &str,
    ) -> Result<Option<GithubTeamMembership>, GithubApiError> {
        self.record("get_team_membership", format!("{slug}:{login}"))?;
        Ok(self
            .team_memberships
            .iter()
            .find(|(team, member, _)| team == slug && member == login)
            .map(|(_, _, state)| GithubTeamMembership {
                state: state.clone(),
                role: Some("member".to_string()),
            }))
    }

    async fn add_team_membership(
        &self,
        _organization: &str,
        slug: &str,
        login: &str,
    ) -> Result<GithubTeamMembership, GithubApiError> {
        self.record("add_team_membership", format!("{slug}:{login}"))?;
        Ok(GithubTeamMembership {
            state: "active".to_string(),
            role: Some("member".to_string()),
        })
    }
}

pub(crate) fn repository(name: &str, owner: &str) -> GithubRepository {
    GithubRepository {
        name: name.to_string(),
        owner: GithubAccount {
            login: owner.to_string(),
        },
    }
}

pub(crate) fn user(login: &str) -> GithubUser {
    GithubUser {
        login: login.to_string(),
        id: 583231,
        html_url: format!("https://github.com/{login}"),
        name: Some("The Octocat".to_string()),
        email: None,
        public_repos: 8,
        company: Some("@github".to_string()),
        location: Some("San Francisco".to_string()),
        blog: None,
        bio: None,
        followers: 20,
        following: 9,
        created_at: Some("2011-01-25T18:44:36Z".to_string()),
    }
}

pub(crate) fn issue(number: u64, title: &str, updated_at: &str) -> GithubIssue {
    GithubIssue {
        number,
        title: title.to_string(),
        html_url: format!("https://github.com/octo-org/widgets/issues/{number}"),
        state: "open".to_string(),
        body: Some("Steps to reproduce".to_string()),
        updated_at: updated_at
            .parse::<DateTime<Utc>>()
            .expect("valid fixture timestamp"),
        assignees: Vec::new(),
        pull_request: None,
    }
}

pub(crate) fn label(name: &str) -> GithubLabel {
    GithubLabel {
        name: name.to_string(),
        url: format!("https://api.github.com/repos/octo-org/widgets/labels/{name}"),
        description: Some(format!("{name} label")),
    }
}

pub(crate) fn team(name: &str, slug: &str) -> GithubTeam {
    GithubTeam {
        name: name.to_string(),
        slug: slug.to_string(),
        description: Some(format!("{name} maintainers")),
        html_url: Some(format!("https://github.com/orgs/octo-org/teams/{slug}")),
        url: None,
    }
}
