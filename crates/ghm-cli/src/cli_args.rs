use clap::{ArgAction, Parser};
use ghm_issues::RunnerGroupAction;
use ghm_runtime::manager_runtime::DEFAULT_SERVER_URL;

const DEFAULT_API_BASE: &str = "https://api.github.com";

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .trim()
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_non_empty(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Parser)]
#[command(
    name = "ghm",
    about = "Reconcile self-hosted runner groups from issue commands",
    version
)]
/// Workflow inputs for one runner-group command.
pub struct Cli {
    #[arg(
        long,
        env = "INPUT_ACTION",
        help = "Action to perform: group-create, group-delete, group-list, repos-add, repos-remove, repos-set, token-register, token-remove"
    )]
    pub action: RunnerGroupAction,

    #[arg(
        long,
        env = "INPUT_ACTOR",
        value_parser = parse_non_empty,
        help = "Login of the user who opened the request issue"
    )]
    pub actor: String,

    #[arg(
        long = "authorized-team",
        env = "INPUT_AUTHORIZED_TEAM",
        value_parser = parse_non_empty,
        help = "Slug of the team whose members may submit requests"
    )]
    pub authorized_team: String,

    #[arg(
        long,
        env = "INPUT_BODY",
        default_value = "",
        help = "Raw issue body carrying the Team and Repos fields"
    )]
    pub body: String,

    #[arg(
        long,
        env = "INPUT_ORG",
        value_parser = parse_non_empty,
        help = "Organization that owns the runner groups"
    )]
    pub org: String,

    #[arg(
        long,
        env = "INPUT_REPO",
        value_parser = parse_non_empty,
        help = "Repository holding the request issue"
    )]
    pub repo: String,

    #[arg(
        long,
        env = "INPUT_TOKEN",
        hide_env_values = true,
        value_parser = parse_non_empty,
        help = "Token used for every API call"
    )]
    pub token: String,

    #[arg(
        long = "issue-number",
        env = "INPUT_ISSUE_NUMBER",
        value_parser = parse_positive_u64,
        help = "Number of the request issue"
    )]
    pub issue_number: u64,

    #[arg(
        long = "workflow-run-id",
        env = "INPUT_WORKFLOW_RUN_ID",
        value_parser = parse_positive_u64,
        help = "Workflow run id linked from failure comments"
    )]
    pub workflow_run_id: u64,

    #[arg(
        long = "api-base",
        env = "GITHUB_API_URL",
        default_value = DEFAULT_API_BASE,
        help = "Base URL of the GitHub REST API"
    )]
    pub api_base: String,

    #[arg(
        long = "server-url",
        env = "GITHUB_SERVER_URL",
        default_value = DEFAULT_SERVER_URL,
        help = "Base URL of the GitHub web UI, used for run links and runner configuration"
    )]
    pub server_url: String,

    #[arg(
        long = "request-timeout-ms",
        env = "INPUT_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Per-request timeout for API calls in milliseconds"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "emit-workflow-masks",
        env = "INPUT_EMIT_WORKFLOW_MASKS",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Print ::add-mask:: workflow commands for every discovered sensitive value"
    )]
    pub emit_workflow_masks: bool,
}
