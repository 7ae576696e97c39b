use std::sync::Arc;

use gitbot_command::CommandCatalog;
use gitbot_github::{ActionDispatcher, GithubApiClient, RepoTarget};
use gitbot_slack_runtime::{ChatCommandPipeline, DIRECT_MESSAGE_ONLY_REPLY};
use httpmock::prelude::*;
use serde_json::json;

fn pipeline(server: &MockServer) -> ChatCommandPipeline {
    let client = GithubApiClient::new(&server.base_url(), "ghp-integration", 2_000)
        .expect("github client");
    let dispatcher = ActionDispatcher::new(Arc::new(client), RepoTarget::new("octo-org", "widgets"));
    ChatCommandPipeline::new(CommandCatalog::default(), dispatcher, "gitbot 0.1.0")
}

fn mock_repository(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/orgs/octo-org/repos")
            .query_param("type", "all")
            .header("authorization", "Bearer ghp-integration");
        then.status(200).json_body(json!([
            {"name": "gadgets", "owner": {"login": "octo-org"}},
            {"name": "widgets", "owner": {"login": "octo-org"}},
        ]));
    })
}

#[tokio::test]
async fn integration_issue_get_renders_issue_record() {
    let server = MockServer::start();
    let repos = mock_repository(&server);
    let issue = server.mock(|when, then| {
        when.method(GET).path("/repos/octo-org/widgets/issues/234");
        then.status(200).json_body(json!({
            "number": 234,
            "title": "Flaky upload",
            "html_url": "https://github.com/octo-org/widgets/issues/234",
            "state": "open",
            "body": "retries exhaust on slow links",
            "updated_at": "2024-03-05T10:20:30Z",
            "assignees": [{"login": "octocat"}, {"login": "hubot"}],
        }));
    });

    let reply = pipeline(&server).handle("issue get 234", true).await;

    assert!(reply.chunks.is_empty());
    assert!(reply
        .summary
        .starts_with("*ID*:\t*<https://github.com/octo-org/widgets/issues/234|234>*"));
    assert!(reply.summary.contains("*Title*: *`Flaky upload`*"));
    assert!(reply.summary.contains("*Assigned To:*\t*`octocat, hubot`*"));
    assert!(reply
        .summary
        .contains("*Last update on:*\t*`2024-03-05 10:20:30 UTC`*"));
    repos.assert_calls(1);
    issue.assert_calls(1);
}

#[tokio::test]
async fn integration_unknown_repository_short_circuits_issue_lookup() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/orgs/octo-org/repos");
        then.status(200)
            .json_body(json!([{"name": "gadgets", "owner": {"login": "octo-org"}}]));
    });
    let issue = server.mock(|when, then| {
        when.method(GET).path("/repos/octo-org/widgets/issues/234");
        then.status(200);
    });

    let reply = pipeline(&server).handle("issue get 234", true).await;

    assert_eq!(
        reply.summary,
        "invalid org/repo: Unknown Organization `octo-org` and/or Repository `widgets`"
    );
    issue.assert_calls(0);
}

#[tokio::test]
async fn integration_team_list_follows_link_pagination_and_hides_excluded_teams() {
    let server = MockServer::start();
    mock_repository(&server);
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/orgs/octo-org/teams")
            .query_param("per_page", "100")
            .query_param("page", "1");
        then.status(200)
            .header(
                "link",
                format!(
                    "<{}/orgs/octo-org/teams?per_page=100&page=2>; rel=\"next\"",
                    server.base_url()
                ),
            )
            .json_body(json!([
                {"name": "storage", "slug": "storage", "description": "disks",
                 "html_url": "https://github.com/orgs/octo-org/teams/storage"},
                {"name": "admin", "slug": "admin"},
            ]));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/orgs/octo-org/teams")
            .query_param("page", "2");
        then.status(200).json_body(json!([
            {"name": "legacy-team", "slug": "legacy-team"},
            {"name": "network", "slug": "network", "description": "links",
             "html_url": "https://github.com/orgs/octo-org/teams/network"},
        ]));
    });

    let reply = pipeline(&server).handle("team list", true).await;

    assert_eq!(reply.summary, "*`2 team/s found`*");
    assert_eq!(
        reply.chunks,
        vec![
            "*<https://github.com/orgs/octo-org/teams/storage|storage>*\t*`disks`*\n\
             *<https://github.com/orgs/octo-org/teams/network|network>*\t*`links`*"
                .to_string()
        ]
    );
    first.assert_calls(1);
    second.assert_calls(1);
}

#[tokio::test]
async fn integration_issue_list_filters_pull_requests_and_recent_updates() {
    let server = MockServer::start();
    mock_repository(&server);
    let issues = server.mock(|when, then| {
        when.method(GET)
            .path("/repos/octo-org/widgets/issues")
            .query_param("state", "open")
            .query_param("labels", "bug,p1");
        then.status(200).json_body(json!([
            {"number": 1, "title": "old bug", "html_url": "https://github.com/i/1",
             "updated_at": "2024-01-09T23:59:59Z"},
            {"number": 2, "title": "fresh bug", "html_url": "https://github.com/i/2",
             "updated_at": "2024-01-10T00:00:00Z"},
            {"number": 3, "title": "old pr", "html_url": "https://github.com/i/3",
             "updated_at": "2023-12-01T00:00:00Z", "pull_request": {"url": "x"}},
        ]));
    });

    let reply = pipeline(&server)
        .handle(
            "issue list open noupdatesince=2024-01-10;labels=bug;labels=p1",
            true,
        )
        .await;

    assert_eq!(reply.summary, "*`1 issues found`*");
    assert_eq!(reply.chunks, vec!["*<https://github.com/i/1|1>*\t*`old bug`*"]);
    issues.assert_calls(1);
}

#[tokio::test]
async fn integration_member_add_joins_organization_then_team() {
    let server = MockServer::start();
    let org_member = server.mock(|when, then| {
        when.method(GET).path("/orgs/octo-org/members/johns");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });
    let user = server.mock(|when, then| {
        when.method(GET).path("/users/johns");
        then.status(200).json_body(json!({"login": "johns", "id": 42}));
    });
    let org_put = server.mock(|when, then| {
        when.method(PUT)
            .path("/orgs/octo-org/memberships/johns")
            .body_includes("\"role\":\"member\"");
        then.status(200).json_body(json!({"state": "pending", "role": "member"}));
    });
    let team_membership = server.mock(|when, then| {
        when.method(GET)
            .path("/orgs/octo-org/teams/storage/memberships/johns");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });
    let team = server.mock(|when, then| {
        when.method(GET).path("/orgs/octo-org/teams/storage");
        then.status(200)
            .json_body(json!({"name": "storage", "slug": "storage"}));
    });
    let team_put = server.mock(|when, then| {
        when.method(PUT)
            .path("/orgs/octo-org/teams/storage/memberships/johns");
        then.status(200).json_body(json!({"state": "pending", "role": "member"}));
    });

    let reply = pipeline(&server)
        .handle("member add johns team=storage", true)
        .await;

    assert_eq!(
        reply.summary,
        "user `johns` added to organization `octo-org` and team `storage`"
    );
    org_member.assert_calls(1);
    user.assert_calls(2);
    org_put.assert_calls(1);
    team_membership.assert_calls(1);
    team.assert_calls(1);
    team_put.assert_calls(1);
}

#[tokio::test]
async fn integration_member_add_reports_failed_organization_step() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/orgs/octo-org/members/johns");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/users/johns");
        then.status(200).json_body(json!({"login": "johns", "id": 42}));
    });
    server.mock(|when, then| {
        when.method(PUT).path("/orgs/octo-org/memberships/johns");
        then.status(403).json_body(json!({"message": "Must have admin rights"}));
    });
    let team_put = server.mock(|when, then| {
        when.method(PUT)
            .path("/orgs/octo-org/teams/storage/memberships/johns");
        then.status(200).json_body(json!({"state": "active"}));
    });

    let reply = pipeline(&server)
        .handle("member add johns team=storage", true)
        .await;

    assert_eq!(
        reply.summary,
        "user `johns` failed to add to the organization `octo-org`: Failed to Add"
    );
    team_put.assert_calls(0);
}

#[tokio::test]
async fn integration_channel_messages_never_reach_github() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.method(GET);
        then.status(500);
    });

    let reply = pipeline(&server).handle("member get octocat", false).await;

    assert_eq!(reply.summary, DIRECT_MESSAGE_ONLY_REPLY);
    any.assert_calls(0);
}
