use std::time::Duration;

use ghm_issues::github_transport_helpers::{
    parse_link_header_next_page, truncate_for_error, GITHUB_PAGE_SIZE,
};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::platform::{
    CreateRunnerGroupRequest, GithubRepository, GithubTeam, GithubTeamMembership, GithubUser,
    IssueCommentCreated, IssueTarget, Page, PlatformError, PlatformResult, RunnerGroup,
    RunnerGroupPlatform, RunnerToken, SelfHostedRunner,
};

const ERROR_BODY_MAX_CHARS: usize = 800;

#[derive(Deserialize)]
struct RunnerGroupsEnvelope {
    runner_groups: Vec<RunnerGroup>,
}

#[derive(Deserialize)]
struct RepositoriesEnvelope {
    repositories: Vec<GithubRepository>,
}

#[derive(Deserialize)]
struct RunnersEnvelope {
    runners: Vec<SelfHostedRunner>,
}

/// Blocking GitHub REST client. Every call issues exactly one request; there
/// is no retry and the only timeout is the per-request one set here.
#[derive(Clone)]
pub struct GithubApiClient {
    http: Client,
    api_base: Url,
}

impl GithubApiClient {
    pub fn new(api_base: &str, token: &str, request_timeout_ms: u64) -> PlatformResult<Self> {
        let api_base = Url::parse(api_base.trim()).map_err(|error| {
            PlatformError::Configuration(format!("invalid api base '{api_base}': {error}"))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(PlatformError::Configuration(format!(
                "api base '{api_base}' cannot carry a request path"
            )));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("ghm-runner-group-manager"),
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
        let mut auth_value = reqwest::header::HeaderValue::from_str(&auth_header).map_err(|_| {
            PlatformError::Configuration("invalid github authorization header".to_string())
        })?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .map_err(|source| PlatformError::Transport {
                operation: "client setup".to_string(),
                source,
            })?;
        Ok(Self { http, api_base })
    }

    fn endpoint(&self, segments: &[&str]) -> PlatformResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                PlatformError::Configuration(format!(
                    "api base '{}' cannot carry a request path",
                    self.api_base
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, operation: &str, request: RequestBuilder) -> PlatformResult<Response> {
        let response = request.send().map_err(|source| PlatformError::Transport {
            operation: operation.to_string(),
            source,
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(PlatformError::HttpStatus {
            operation: operation.to_string(),
            status: status.as_u16(),
            body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
        })
    }

    fn request_json<T>(&self, operation: &str, request: RequestBuilder) -> PlatformResult<T>
    where
        T: DeserializeOwned,
    {
        self.send(operation, request)?
            .json::<T>()
            .map_err(|source| PlatformError::Decode {
                operation: operation.to_string(),
                source,
            })
    }

    fn request_empty(&self, operation: &str, request: RequestBuilder) -> PlatformResult<()> {
        self.send(operation, request).map(|_| ())
    }

    fn request_page<R, T, F>(
        &self,
        operation: &str,
        url: Url,
        page: u32,
        extract: F,
    ) -> PlatformResult<Page<T>>
    where
        R: DeserializeOwned,
        F: FnOnce(R) -> Vec<T>,
    {
        let request = self.http.get(url).query(&[
            ("per_page", GITHUB_PAGE_SIZE.to_string()),
            ("page", page.max(1).to_string()),
        ]);
        let response = self.send(operation, request)?;
        let next_page = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_link_header_next_page);
        let payload = response
            .json::<R>()
            .map_err(|source| PlatformError::Decode {
                operation: operation.to_string(),
                source,
            })?;
        Ok(Page {
            items: extract(payload),
            next_page,
        })
    }
}

impl RunnerGroupPlatform for GithubApiClient {
    fn list_team_members(
        &self,
        org: &str,
        team_slug: &str,
        page: u32,
    ) -> PlatformResult<Page<GithubUser>> {
        let url = self.endpoint(&["orgs", org, "teams", team_slug, "members"])?;
        self.request_page("list team members", url, page, |users: Vec<GithubUser>| users)
    }

    fn get_team(&self, org: &str, team_slug: &str) -> PlatformResult<GithubTeam> {
        let url = self.endpoint(&["orgs", org, "teams", team_slug])?;
        self.request_json("get team", self.http.get(url))
    }

    fn get_team_membership(
        &self,
        org: &str,
        team_slug: &str,
        username: &str,
    ) -> PlatformResult<GithubTeamMembership> {
        let url = self.endpoint(&["orgs", org, "teams", team_slug, "memberships", username])?;
        self.request_json("get team membership", self.http.get(url))
    }

    fn list_team_repos(
        &self,
        org: &str,
        team_slug: &str,
        page: u32,
    ) -> PlatformResult<Page<GithubRepository>> {
        let url = self.endpoint(&["orgs", org, "teams", team_slug, "repos"])?;
        self.request_page("list team repos", url, page, |repos: Vec<GithubRepository>| {
            repos
        })
    }

    fn get_repository(&self, owner: &str, name: &str) -> PlatformResult<GithubRepository> {
        let url = self.endpoint(&["repos", owner, name])?;
        self.request_json("get repository", self.http.get(url))
    }

    fn list_runner_groups(&self, org: &str, page: u32) -> PlatformResult<Page<RunnerGroup>> {
        let url = self.endpoint(&["orgs", org, "actions", "runner-groups"])?;
        self.request_page(
            "list runner groups",
            url,
            page,
            |envelope: RunnerGroupsEnvelope| envelope.runner_groups,
        )
    }

    fn create_runner_group(
        &self,
        org: &str,
        request: &CreateRunnerGroupRequest,
    ) -> PlatformResult<RunnerGroup> {
        let url = self.endpoint(&["orgs", org, "actions", "runner-groups"])?;
        self.request_json("create runner group", self.http.post(url).json(request))
    }

    fn delete_runner_group(&self, org: &str, group_id: u64) -> PlatformResult<()> {
        let group_id = group_id.to_string();
        let url = self.endpoint(&["orgs", org, "actions", "runner-groups", &group_id])?;
        self.request_empty("delete runner group", self.http.delete(url))
    }

    fn list_runner_group_repos(
        &self,
        org: &str,
        group_id: u64,
        page: u32,
    ) -> PlatformResult<Page<GithubRepository>> {
        let group_id = group_id.to_string();
        let url = self.endpoint(&[
            "orgs",
            org,
            "actions",
            "runner-groups",
            &group_id,
            "repositories",
        ])?;
        self.request_page(
            "list runner group repos",
            url,
            page,
            |envelope: RepositoriesEnvelope| envelope.repositories,
        )
    }

    fn list_runner_group_runners(
        &self,
        org: &str,
        group_id: u64,
        page: u32,
    ) -> PlatformResult<Page<SelfHostedRunner>> {
        let group_id = group_id.to_string();
        let url = self.endpoint(&["orgs", org, "actions", "runner-groups", &group_id, "runners"])?;
        self.request_page(
            "list runner group runners",
            url,
            page,
            |envelope: RunnersEnvelope| envelope.runners,
        )
    }

    fn add_runner_group_repo(
        &self,
        org: &str,
        group_id: u64,
        repo_id: u64,
    ) -> PlatformResult<()> {
        let group_id = group_id.to_string();
        let repo_id = repo_id.to_string();
        let url = self.endpoint(&[
            "orgs",
            org,
            "actions",
            "runner-groups",
            &group_id,
            "repositories",
            &repo_id,
        ])?;
        self.request_empty("add runner group repo", self.http.put(url))
    }

    fn remove_runner_group_repo(
        &self,
        org: &str,
        group_id: u64,
        repo_id: u64,
    ) -> PlatformResult<()> {
        let group_id = group_id.to_string();
        let repo_id = repo_id.to_string();
        let url = self.endpoint(&[
            "orgs",
            org,
            "actions",
            "runner-groups",
            &group_id,
            "repositories",
            &repo_id,
        ])?;
        self.request_empty("remove runner group repo", self.http.delete(url))
    }

    fn set_runner_group_repos(
        &self,
        org: &str,
        group_id: u64,
        repo_ids: &[u64],
    ) -> PlatformResult<()> {
        let group_id = group_id.to_string();
        let url = self.endpoint(&[
            "orgs",
            org,
            "actions",
            "runner-groups",
            &group_id,
            "repositories",
        ])?;
        let payload = json!({ "selected_repository_ids": repo_ids });
        self.request_empty("set runner group repos", self.http.put(url).json(&payload))
    }

    fn create_registration_token(&self, org: &str) -> PlatformResult<RunnerToken> {
        let url = self.endpoint(&["orgs", org, "actions", "runners", "registration-token"])?;
        self.request_json("create registration token", self.http.post(url))
    }

    fn create_removal_token(&self, org: &str) -> PlatformResult<RunnerToken> {
        let url = self.endpoint(&["orgs", org, "actions", "runners", "remove-token"])?;
        self.request_json("create removal token", self.http.post(url))
    }

    fn create_issue_comment(
        &self,
        issue: &IssueTarget,
        body: &str,
    ) -> PlatformResult<IssueCommentCreated> {
        let number = issue.number.to_string();
        let url = self.endpoint(&[
            "repos",
            &issue.owner,
            &issue.repo,
            "issues",
            &number,
            "comments",
        ])?;
        let payload = json!({ "body": body });
        self.request_json("create issue comment", self.http.post(url).json(&payload))
    }

    fn close_issue(&self, issue: &IssueTarget) -> PlatformResult<()> {
        let number = issue.number.to_string();
        let url = self.endpoint(&["repos", &issue.owner, &issue.repo, "issues", &number])?;
        let payload = json!({ "state": "closed" });
        self.request_empty("close issue", self.http.patch(url).json(&payload))
    }
}
