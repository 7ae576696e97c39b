use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::github_api::{
    GithubApi, GithubApiError, GithubIssue, GithubLabel, GithubRepository, GithubTeam,
    GithubTeamMembership, GithubUser, IssueListParams, Page, PageRequest,
};
use crate::github_transport_helpers::{parse_next_page, truncate_for_error};

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Clone)]
/// Single-attempt GitHub REST client. Failed calls are never retried.
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
}

impl GithubApiClient {
    /// `request_timeout_ms == 0` leaves requests without a client-side timeout.
    pub fn new(
        api_base: &str,
        token: &str,
        request_timeout_ms: u64,
    ) -> Result<Self, GithubApiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            )),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .map_err(|_| GithubApiError::InvalidToken)?,
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if request_timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(request_timeout_ms));
        }
        let http = builder.build().map_err(GithubApiError::Build)?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GithubApiError> {
        tracing::debug!(operation, "github api request");
        let response = request
            .send()
            .await
            .map_err(|source| GithubApiError::Transport { operation, source })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(GithubApiError::NotFound { operation });
        }
        let body = response.text().await.unwrap_or_default();
        Err(GithubApiError::Status {
            operation,
            status: status.as_u16(),
            body: truncate_for_error(&body, 800),
        })
    }

    async fn request_json<T>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GithubApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(operation, request).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| GithubApiError::Decode { operation, source })
    }

    async fn request_page<T>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
        page: PageRequest,
    ) -> Result<Page<T>, GithubApiError>
    where
        T: DeserializeOwned,
    {
        let request = request.query(&[
            ("per_page", page.per_page.to_string()),
            ("page", page.page.to_string()),
        ]);
        let response = self.send(operation, request).await?;
        let next_page = parse_next_page(response.headers());
        let items = response
            .json::<Vec<T>>()
            .await
            .map_err(|source| GithubApiError::Decode { operation, source })?;
        Ok(Page { items, next_page })
    }
}

#[async_trait]
impl GithubApi for GithubApiClient {
    async fn list_org_repositories(
        &self,
        organization: &str,
        page: PageRequest,
    ) -> Result<Page<GithubRepository>, GithubApiError> {
        let request = self
            .http
            .get(format!("{}/orgs/{organization}/repos", self.api_base))
            .query(&[("type", "all")]);
        self.request_page("list organization repositories", request, page)
            .await
    }

    async fn get_user(&self, login: &str) -> Result<GithubUser, GithubApiError> {
        let request = self.http.get(format!("{}/users/{login}", self.api_base));
        self.request_json("get user", request).await
    }

    async fn get_issue(
        &self,
        owner: &str,
        repository: &str,
        number: u64,
    ) -> Result<GithubIssue, GithubApiError> {
        let request = self.http.get(format!(
            "{}/repos/{owner}/{repository}/issues/{number}",
            self.api_base
        ));
        self.request_json("get issue", request).await
    }

    async fn list_repository_issues(
        &self,
        owner: &str,
        repository: &str,
        params: &IssueListParams,
        page: PageRequest,
    ) -> Result<Page<GithubIssue>, GithubApiError> {
        let mut request = self
            .http
            .get(format!(
                "{}/repos/{owner}/{repository}/issues",
                self.api_base
            ))
            .query(&[("state", params.state.as_str())]);
        if let Some(assignee) = params.assignee.as_deref() {
            request = request.query(&[("assignee", assignee)]);
        }
        if let Some(creator) = params.creator.as_deref() {
            request = request.query(&[("creator", creator)]);
        }
        if !params.labels.is_empty() {
            request = request.query(&[("labels", params.labels.join(","))]);
        }
        self.request_page("list issues", request, page).await
    }

    async fn list_repository_labels(
        &self,
        owner: &str,
        repository: &str,
        page: PageRequest,
    ) -> Result<Page<GithubLabel>, GithubApiError> {
        let request = self.http.get(format!(
            "{}/repos/{owner}/{repository}/labels",
            self.api_base
        ));
        self.request_page("list repository labels", request, page)
            .await
    }

    async fn list_issue_labels(
        &self,
        owner: &str,
        repository: &str,
        number: u64,
        page: PageRequest,
    ) -> Result<Page<GithubLabel>, GithubApiError> {
        let request = self.http.get(format!(
            "{}/repos/{owner}/{repository}/issues/{number}/labels",
            self.api_base
        ));
        self.request_page("list issue labels", request, page).await
    }

    async fn list_org_teams(
        &self,
        organization: &str,
        page: PageRequest,
    ) -> Result<Page<GithubTeam>, GithubApiError> {
        let request = self
            .http
            .get(format!("{}/orgs/{organization}/teams", self.api_base));
        self.request_page("list teams", request, page).await
    }

    async fn get_team(
        &self,
        organization: &str,
        slug: &str,
    ) -> Result<GithubTeam, GithubApiError> {
        let request = self
            .http
            .get(format!("{}/orgs/{organization}/teams/{slug}", self.api_base));
        self.request_json("get team", request).await
    }

    async fn is_org_member(
        &self,
        organization: &str,
        login: &str,
    ) -> Result<bool, GithubApiError> {
        let request = self.http.get(format!(
            "{}/orgs/{organization}/members/{login}",
            self.api_base
        ));
        match self.send("check organization membership", request).await {
            Ok(_) => Ok(true),
            Err(error) if error.is_not_found() => Ok(false),
            Err(error) => Err(error),
        }
    }

    async fn set_org_membership(
        &self,
        organization: &str,
        login: &str,
    ) -> Result<(), GithubApiError> {
        let request = self
            .http
            .put(format!(
                "{}/orgs/{organization}/memberships/{login}",
                self.api_base
            ))
            .json(&json!({ "role": "member" }));
        self.send("edit organization membership", request).await?;
        Ok(())
    }

    async fn get_team_membership(
        &self,
        organization: &str,
        slug: &str,
        login: &str,
    ) -> Result<Option<GithubTeamMembership>, GithubApiError> {
        let request = self.http.get(format!(
            "{}/orgs/{organization}/teams/{slug}/memberships/{login}",
            self.api_base
        ));
        match self.request_json("get team membership", request).await {
            Ok(membership) => Ok(Some(membership)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn add_team_membership(
        &self,
        organization: &str,
        slug: &str,
        login: &str,
    ) -> Result<GithubTeamMembership, GithubApiError> {
        let request = self
            .http
            .put(format!(
                "{}/orgs/{organization}/teams/{slug}/memberships/{login}",
                self.api_base
            ))
            .json(&json!({ "role": "member" }));
        self.request_json("add team membership", request).await
    }
}
