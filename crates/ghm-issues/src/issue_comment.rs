use chrono::{DateTime, SecondsFormat, Utc};

pub const GROUP_CREATED_MESSAGE: &str =
    "Created runner group. The name of your runner group is of the form `ghm-<team slug>`";
pub const GROUP_DELETED_MESSAGE: &str = "Deleted runner group";
pub const REPOS_ADDED_MESSAGE: &str = "Added repos to runner group";
pub const REPOS_REMOVED_MESSAGE: &str = "Removed repos from runner group";
pub const REPOS_REPLACED_MESSAGE: &str = "Replaced repos in runner group";

pub const TEAM_NOT_VERIFIED_MESSAGE: &str = "Unable to verify team exists";
pub const TEAM_NOT_PRIVATE_MESSAGE: &str = "Team is not private";
pub const MAINTAINER_NOT_VERIFIED_MESSAGE: &str =
    "Unable to verify you are a maintainer of this team";
pub const RUNNER_GROUP_NOT_FOUND_MESSAGE: &str = "Failed to retrieve runner group ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerTokenKind {
    Registration,
    Removal,
}

impl RunnerTokenKind {
    fn label(self) -> &'static str {
        match self {
            RunnerTokenKind::Registration => "registration",
            RunnerTokenKind::Removal => "removal",
        }
    }
}

/// Renders the read-only listing posted for `group-list`.
pub fn render_group_list_message(repos: &[String], runners: &[String]) -> String {
    format!(
        "The following repos and runners are assigned to the runner group:\n\n```\nRepos:\n{}\n\nRunners:\n{}```",
        render_name_block(repos),
        render_name_block(runners)
    )
}

fn render_name_block(names: &[String]) -> String {
    if names.is_empty() {
        return "None\n".to_string();
    }
    names.iter().map(|name| format!("{name}\n")).collect()
}

pub fn render_runner_token_message(
    kind: RunnerTokenKind,
    token: &str,
    expires_at: &DateTime<Utc>,
    server_url: &str,
    org: &str,
) -> String {
    let command = match kind {
        RunnerTokenKind::Registration => format!(
            "./config.sh --url {}/{org} --token {token}",
            server_url.trim_end_matches('/')
        ),
        RunnerTokenKind::Removal => format!("./config.sh remove --token {token}"),
    };
    format!(
        "Created {} token\n\nToken: `{token}`\nExpiration: `{}`\n\nRun the following command to configure your runner:\n\n```\n{command}\n```",
        kind.label(),
        expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

pub fn workflow_run_url(server_url: &str, owner: &str, repo: &str, run_id: u64) -> String {
    format!(
        "{}/{owner}/{repo}/actions/runs/{run_id}",
        server_url.trim_end_matches('/')
    )
}

/// Appends the failure-log link to a failure message.
pub fn render_failure_comment(message: &str, run_url: &str) -> String {
    format!("{message}\n\n[View Failure Log Here]({run_url})")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{
        render_failure_comment, render_group_list_message, render_runner_token_message,
        workflow_run_url, RunnerTokenKind,
    };

    #[test]
    fn unit_render_group_list_message_marks_empty_sections() {
        let rendered = render_group_list_message(&[], &[]);
        assert_eq!(
            rendered,
            "The following repos and runners are assigned to the runner group:\n\n```\nRepos:\nNone\n\n\nRunners:\nNone\n```"
        );
    }

    #[test]
    fn functional_render_group_list_message_lists_each_name_on_its_own_line() {
        let rendered = render_group_list_message(
            &["svc-a".to_string(), "svc-b".to_string()],
            &["runner-1".to_string()],
        );
        assert!(rendered.contains("Repos:\nsvc-a\nsvc-b\n"));
        assert!(rendered.contains("Runners:\nrunner-1\n```"));
    }

    #[test]
    fn functional_render_runner_token_message_uses_kind_specific_command() {
        let expires_at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let registration = render_runner_token_message(
            RunnerTokenKind::Registration,
            "AABBCC",
            &expires_at,
            "https://github.com/",
            "acme",
        );
        assert!(registration.starts_with("Created registration token"));
        assert!(registration.contains("Expiration: `2026-01-02T03:04:05Z`"));
        assert!(registration.contains("./config.sh --url https://github.com/acme --token AABBCC"));

        let removal = render_runner_token_message(
            RunnerTokenKind::Removal,
            "DDEEFF",
            &expires_at,
            "https://github.com",
            "acme",
        );
        assert!(removal.starts_with("Created removal token"));
        assert!(removal.contains("./config.sh remove --token DDEEFF"));
    }

    #[test]
    fn unit_render_failure_comment_appends_run_link() {
        let url = workflow_run_url("https://github.com/", "acme", "runner-requests", 42);
        assert_eq!(
            url,
            "https://github.com/acme/runner-requests/actions/runs/42"
        );
        assert_eq!(
            render_failure_comment("Team is not private", &url),
            "Team is not private\n\n[View Failure Log Here](https://github.com/acme/runner-requests/actions/runs/42)"
        );
    }
}
