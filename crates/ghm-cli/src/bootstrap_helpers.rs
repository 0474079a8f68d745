use std::io::Write;

use ghm_issues::workflow_commands::render_add_mask_command;
use ghm_issues::SecretSink;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub(crate) fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Forwards every sensitive value to the Actions runner as an `::add-mask::`
/// command on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct WorkflowMaskSink;

impl SecretSink for WorkflowMaskSink {
    fn secret_registered(&self, value: &str) {
        let mut stdout = std::io::stdout().lock();
        // best effort
        let _ = writeln!(stdout, "{}", render_add_mask_command(value));
        let _ = stdout.flush();
    }
}
