mod bootstrap_helpers;
mod cli_args;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ghm_runtime::{
    CommandReport, CommandStatus, GithubApiClient, RunnerGroupCommand, RunnerGroupManager,
};
use tracing::{error, info};

use crate::bootstrap_helpers::{init_tracing, WorkflowMaskSink};
use crate::cli_args::Cli;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(report) => {
            log_report(&report);
            ExitCode::from(report.exit_code())
        }
        Err(bootstrap_error) => {
            error!(error = %format!("{bootstrap_error:#}"), "runner group manager failed to start");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<CommandReport> {
    let client = GithubApiClient::new(&cli.api_base, &cli.token, cli.request_timeout_ms)
        .context("failed to configure github api client")?;
    let command = command_from_cli(&cli);

    let mut manager = RunnerGroupManager::new(client, command).with_server_url(&cli.server_url);
    if cli.emit_workflow_masks {
        manager = manager.with_secret_sink(Box::new(WorkflowMaskSink));
    }
    Ok(manager.run())
}

fn command_from_cli(cli: &Cli) -> RunnerGroupCommand {
    RunnerGroupCommand {
        action: cli.action,
        actor: cli.actor.clone(),
        org: cli.org.clone(),
        repo: cli.repo.clone(),
        issue_number: cli.issue_number,
        workflow_run_id: cli.workflow_run_id,
        body: cli.body.clone(),
        authorized_team_slug: cli.authorized_team.clone(),
    }
}

fn log_report(report: &CommandReport) {
    match report.status {
        CommandStatus::Succeeded => info!(action = %report.action, "Action completed"),
        CommandStatus::Failed => error!(
            action = %report.action,
            kind = report.error.as_ref().map_or("unknown", |error| error.kind()),
            "Action failed, requester notified"
        ),
        CommandStatus::Rejected => error!(
            action = %report.action,
            kind = report.error.as_ref().map_or("unknown", |error| error.kind()),
            "Request rejected"
        ),
    }
    if let Some(detail) = report
        .feedback
        .as_ref()
        .and_then(|feedback| feedback.delivery_error.as_deref())
    {
        error!(error = %detail, "issue feedback was not delivered");
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use ghm_issues::RunnerGroupAction;

    use super::command_from_cli;
    use crate::cli_args::Cli;

    #[test]
    fn unit_command_from_cli_copies_workflow_inputs() {
        let cli = Cli::try_parse_from([
            "ghm",
            "--action=token-remove",
            "--actor=alice",
            "--authorized-team=runner-admins",
            "--org=acme",
            "--repo=runner-requests",
            "--token=ghs_example",
            "--issue-number=31",
            "--workflow-run-id=9001",
            "--body=Team: platform-infra",
        ])
        .expect("parse");
        let command = command_from_cli(&cli);
        assert_eq!(command.action, RunnerGroupAction::TokenRemove);
        assert_eq!(command.authorized_team_slug, "runner-admins");
        assert_eq!(command.body, "Team: platform-infra");
        assert_eq!(command.issue_target().number, 31);
    }
}
