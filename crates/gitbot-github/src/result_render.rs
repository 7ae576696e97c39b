//! Slack mrkdwn formatting for GitHub records.

use crate::github_api::{GithubIssue, GithubLabel, GithubTeam, GithubUser};

const MISSING_VALUE: &str = "-";

pub fn render_team_line(team: &GithubTeam) -> String {
    let url = team
        .html_url
        .as_deref()
        .or(team.url.as_deref())
        .unwrap_or_default();
    format!(
        "*<{url}|{}>*\t*`{}`*",
        team.name,
        team.description.as_deref().unwrap_or_default()
    )
}

pub fn render_repository_label_line(label: &GithubLabel) -> String {
    format!(
        "*<{}|{}>*\t*`{}`*",
        label.url,
        label.name,
        label.description.as_deref().unwrap_or_default()
    )
}

pub fn render_issue_label_line(label: &GithubLabel) -> String {
    format!("*<{}|{}>*", label.url, label.name)
}

pub fn render_issue_line(issue: &GithubIssue) -> String {
    format!("*<{}|{}>*\t*`{}`*", issue.html_url, issue.number, issue.title)
}

/// Multi-line record for a single issue: id, title, assignees, state, last update, body.
pub fn render_issue_record(issue: &GithubIssue) -> String {
    let assignees = issue
        .assignees
        .iter()
        .map(|account| account.login.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "*ID*:\t*<{}|{}>*\n*Title*: *`{}`*\n*Assigned To:*\t*`{}`*\n*State:*\t*`{}`*\n*Last update on:*\t*`{}`*\n*Body:*\n \t{}\n",
        issue.html_url,
        issue.number,
        issue.title,
        assignees,
        issue.state,
        issue.updated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        issue.body.as_deref().unwrap_or_default()
    )
}

/// Profile with a fixed header followed by the remaining fields in alphabetical order.
pub fn render_user_profile(user: &GithubUser) -> String {
    let mut lines = vec![
        format!("Login:\t*<{}|{}>*", user.html_url, user.login),
        " ".to_string(),
        profile_line("Name", user.name.as_deref().unwrap_or(MISSING_VALUE)),
        profile_line("Email", user.email.as_deref().unwrap_or(MISSING_VALUE)),
        profile_line("ID", &user.id.to_string()),
        profile_line("Public Repos", &user.public_repos.to_string()),
    ];

    let mut extras = vec![
        ("Followers", Some(user.followers.to_string())),
        ("Following", Some(user.following.to_string())),
        ("Company", user.company.clone()),
        ("Location", user.location.clone()),
        ("Blog", user.blog.clone().filter(|blog| !blog.is_empty())),
        ("Bio", user.bio.clone()),
        ("Created At", user.created_at.clone()),
    ];
    extras.sort_by(|left, right| left.0.cmp(right.0));
    lines.extend(
        extras
            .into_iter()
            .filter_map(|(field, value)| value.map(|value| profile_line(field, &value))),
    );
    lines.join("\n")
}

fn profile_line(field: &str, value: &str) -> String {
    format!("{field}:\t*`{value}`*")
}
