//! Shared helpers for the runner-group issue command flow.
//! This crate provides the command/action model, issue body parsing, secret
//! redaction, comment rendering, and transport helpers consumed by the
//! runtime crate. Nothing here performs I/O.

pub mod github_transport_helpers;
pub mod issue_command_parser;
pub mod issue_comment;
pub mod runner_group_action;
pub mod secret_redactor;
pub mod workflow_commands;

pub use issue_command_parser::{
    normalize_issue_body, parse_repo_list, parse_team_slug, CommandParseError,
};
pub use runner_group_action::{runner_group_name, RunnerGroupAction, RUNNER_GROUP_PREFIX};
pub use secret_redactor::{NoopSecretSink, SecretSet, SecretSink, REDACTION_MASK};
