use ghm_issues::RunnerGroupAction;
use ghm_runtime::{
    ActionOutcome, CommandStatus, GithubApiClient, ManagerError, RunnerGroupCommand,
    RunnerGroupManager,
};
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;

const RUN_LINK: &str =
    "\\n\\n[View Failure Log Here](https://github.com/acme/runner-requests/actions/runs/9001)";

fn command(action: RunnerGroupAction, body: &str) -> RunnerGroupCommand {
    RunnerGroupCommand {
        action,
        actor: "alice".to_string(),
        org: "acme".to_string(),
        repo: "runner-requests".to_string(),
        issue_number: 31,
        workflow_run_id: 9001,
        body: body.to_string(),
        authorized_team_slug: "runner-admins".to_string(),
    }
}

fn manager(
    server: &MockServer,
    action: RunnerGroupAction,
    body: &str,
) -> RunnerGroupManager<GithubApiClient> {
    let client =
        GithubApiClient::new(&server.base_url(), "ghs_integration", 5_000).expect("client");
    RunnerGroupManager::new(client, command(action, body)).with_server_url("https://github.com")
}

fn mock_requester_members<'a>(server: &'a MockServer, logins: &[&str]) -> Mock<'a> {
    let members = logins
        .iter()
        .map(|login| json!({ "login": login }))
        .collect::<Vec<_>>();
    server.mock(|when, then| {
        when.method(GET)
            .path("/orgs/acme/teams/runner-admins/members")
            .header("authorization", "Bearer ghs_integration");
        then.status(200).json_body(json!(members));
    })
}

fn mock_secret_team(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/orgs/acme/teams/platform-infra");
        then.status(200)
            .json_body(json!({ "slug": "platform-infra", "privacy": "secret" }));
    })
}

fn mock_membership<'a>(server: &'a MockServer, role: &str) -> Mock<'a> {
    let role = role.to_string();
    server.mock(move |when, then| {
        when.method(GET)
            .path("/orgs/acme/teams/platform-infra/memberships/alice");
        then.status(200)
            .json_body(json!({ "role": role, "state": "active" }));
    })
}

fn mock_comment<'a>(server: &'a MockServer, body_fragment: &str) -> Mock<'a> {
    let fragment = body_fragment.to_string();
    server.mock(move |when, then| {
        when.method(POST)
            .path("/repos/acme/runner-requests/issues/31/comments")
            .body_includes(fragment.as_str());
        then.status(201).json_body(json!({ "id": 1 }));
    })
}

fn mock_close(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(PATCH)
            .path("/repos/acme/runner-requests/issues/31")
            .body_includes("\"state\":\"closed\"");
        then.status(200).json_body(json!({ "number": 31, "state": "closed" }));
    })
}

#[test]
fn integration_group_create_creates_group_comments_and_closes_issue() {
    let server = MockServer::start();
    let members = mock_requester_members(&server, &["bob", "alice"]);
    let team = mock_secret_team(&server);
    let membership = mock_membership(&server, "maintainer");
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/orgs/acme/actions/runner-groups")
            .body_includes("\"name\":\"ghm-platform-infra\"")
            .body_includes("\"visibility\":\"selected\"")
            .body_includes("\"allows_public_repositories\":false");
        then.status(201).json_body(json!({
            "id": 42,
            "name": "ghm-platform-infra",
            "visibility": "selected"
        }));
    });
    let comment = mock_comment(&server, "Created runner group.");
    let close = mock_close(&server);

    let mut manager = manager(&server, RunnerGroupAction::GroupCreate, "Team: platform-infra");
    let report = manager.run();

    assert_eq!(report.status, CommandStatus::Succeeded);
    assert_eq!(report.exit_code(), 0);
    assert!(matches!(
        report.outcome,
        Some(ActionOutcome::GroupCreated { ref group }) if group.id == 42
    ));
    members.assert_calls(1);
    team.assert_calls(1);
    membership.assert_calls(1);
    create.assert_calls(1);
    comment.assert_calls(1);
    close.assert_calls(1);
}

#[test]
fn integration_repos_add_aborts_on_unassigned_repo_and_reports_failure() {
    let server = MockServer::start();
    mock_requester_members(&server, &["alice"]);
    mock_secret_team(&server);
    mock_membership(&server, "maintainer");
    let groups = server.mock(|when, then| {
        when.method(GET).path("/orgs/acme/actions/runner-groups");
        then.status(200).json_body(json!({
            "total_count": 2,
            "runner_groups": [
                { "id": 1, "name": "Default" },
                { "id": 7, "name": "ghm-platform-infra" }
            ]
        }));
    });
    let team_repos = server.mock(|when, then| {
        when.method(GET).path("/orgs/acme/teams/platform-infra/repos");
        then.status(200)
            .json_body(json!([{ "id": 11, "name": "svc-a" }]));
    });
    let svc_a = server.mock(|when, then| {
        when.method(GET).path("/repos/acme/svc-a");
        then.status(200).json_body(json!({ "id": 11, "name": "svc-a" }));
    });
    let svc_b = server.mock(|when, then| {
        when.method(GET).path("/repos/acme/svc-b");
        then.status(200).json_body(json!({ "id": 12, "name": "svc-b" }));
    });
    let add_svc_a = server.mock(|when, then| {
        when.method(PUT)
            .path("/orgs/acme/actions/runner-groups/7/repositories/11");
        then.status(204);
    });
    let expected_comment = format!("Repo **** is not assigned to team{RUN_LINK}");
    let comment = mock_comment(&server, &expected_comment);
    let close = mock_close(&server);

    let mut manager = manager(
        &server,
        RunnerGroupAction::ReposAdd,
        "Team: platform-infra\n###\nRepos: svc-a, svc-b",
    );
    let report = manager.run();

    assert_eq!(report.status, CommandStatus::Failed);
    assert_ne!(report.exit_code(), 0);
    assert!(matches!(report.error, Some(ManagerError::Authorization { .. })));
    groups.assert_calls(1);
    team_repos.assert_calls(2);
    svc_a.assert_calls(1);
    svc_b.assert_calls(0);
    add_svc_a.assert_calls(0);
    comment.assert_calls(1);
    close.assert_calls(0);
}

#[test]
fn integration_non_maintainer_gets_failure_comment_and_issue_stays_open() {
    let server = MockServer::start();
    mock_requester_members(&server, &["alice"]);
    mock_secret_team(&server);
    mock_membership(&server, "member");
    let groups = server.mock(|when, then| {
        when.method(GET).path("/orgs/acme/actions/runner-groups");
        then.status(200).json_body(json!({ "runner_groups": [] }));
    });
    let expected_comment =
        format!("Unable to verify you are a maintainer of this team{RUN_LINK}");
    let comment = mock_comment(&server, &expected_comment);
    let close = mock_close(&server);

    let mut manager = manager(&server, RunnerGroupAction::GroupList, "Team: platform-infra");
    let report = manager.run();

    assert_eq!(report.status, CommandStatus::Failed);
    assert_ne!(report.exit_code(), 0);
    groups.assert_calls(0);
    comment.assert_calls(1);
    close.assert_calls(0);
}

#[test]
fn integration_unauthorized_requester_short_circuits_silently() {
    let server = MockServer::start();
    let members = mock_requester_members(&server, &["bob"]);
    let team = mock_secret_team(&server);
    let membership = mock_membership(&server, "maintainer");
    let any_comment = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/acme/runner-requests/issues/31/comments");
        then.status(201).json_body(json!({ "id": 1 }));
    });

    let mut manager = manager(&server, RunnerGroupAction::GroupDelete, "Team: platform-infra");
    let report = manager.run();

    assert_eq!(report.status, CommandStatus::Rejected);
    assert_ne!(report.exit_code(), 0);
    members.assert_calls(1);
    team.assert_calls(0);
    membership.assert_calls(0);
    any_comment.assert_calls(0);
}

#[test]
fn integration_missing_team_marker_makes_no_remote_call() {
    let server = MockServer::start();
    let members = mock_requester_members(&server, &["alice"]);
    let create = server.mock(|when, then| {
        when.method(POST).path("/orgs/acme/actions/runner-groups");
        then.status(201)
            .json_body(json!({ "id": 42, "name": "ghm-platform-infra" }));
    });

    let mut manager = manager(&server, RunnerGroupAction::GroupCreate, "no marker here");
    let report = manager.run();

    assert_eq!(report.status, CommandStatus::Rejected);
    assert!(matches!(report.error, Some(ManagerError::Parse(_))));
    members.assert_calls(0);
    create.assert_calls(0);
}

#[test]
fn integration_repos_set_sends_one_replace_call_across_paged_team_repos() {
    let server = MockServer::start();
    mock_requester_members(&server, &["alice"]);
    mock_secret_team(&server);
    mock_membership(&server, "maintainer");
    server.mock(|when, then| {
        when.method(GET).path("/orgs/acme/actions/runner-groups");
        then.status(200).json_body(json!({
            "runner_groups": [{ "id": 7, "name": "ghm-platform-infra" }]
        }));
    });
    let team_repos_first = server.mock(|when, then| {
        when.method(GET)
            .path("/orgs/acme/teams/platform-infra/repos")
            .query_param("page", "1");
        then.status(200)
            .header(
                "link",
                "<https://api.github.com/organizations/1/team/2/repos?per_page=100&page=2>; rel=\"next\"",
            )
            .json_body(json!([{ "id": 11, "name": "svc-a" }]));
    });
    let team_repos_second = server.mock(|when, then| {
        when.method(GET)
            .path("/orgs/acme/teams/platform-infra/repos")
            .query_param("page", "2");
        then.status(200)
            .json_body(json!([{ "id": 12, "name": "svc-b" }]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/svc-a");
        then.status(200).json_body(json!({ "id": 11, "name": "svc-a" }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/svc-b");
        then.status(200).json_body(json!({ "id": 12, "name": "svc-b" }));
    });
    let replace = server.mock(|when, then| {
        when.method(PUT)
            .path("/orgs/acme/actions/runner-groups/7/repositories")
            .body_includes("\"selected_repository_ids\":[11,12]");
        then.status(204);
    });
    let comment = mock_comment(&server, "Replaced repos in runner group");
    let close = mock_close(&server);

    let mut manager = manager(
        &server,
        RunnerGroupAction::ReposSet,
        "Team: platform-infra\r\n###\r\nRepos: svc-a, svc-b\r\n",
    );
    let report = manager.run();

    assert!(report.is_success());
    // svc-a is found on page 1; svc-b needs both pages.
    team_repos_first.assert_calls(2);
    team_repos_second.assert_calls(1);
    replace.assert_calls(1);
    comment.assert_calls(1);
    close.assert_calls(1);
}
