//! GitHub Actions workflow-command rendering.

fn escape_workflow_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// `::add-mask::` makes the runner scrub `value` from every later log line.
pub fn render_add_mask_command(value: &str) -> String {
    format!("::add-mask::{}", escape_workflow_data(value))
}

#[cfg(test)]
mod tests {
    use super::render_add_mask_command;

    #[test]
    fn unit_render_add_mask_command_formats_plain_value() {
        assert_eq!(
            render_add_mask_command("ghm-platform-infra"),
            "::add-mask::ghm-platform-infra"
        );
    }

    #[test]
    fn regression_render_add_mask_command_escapes_line_breaks_and_percent() {
        assert_eq!(
            render_add_mask_command("50%\r\nrepo"),
            "::add-mask::50%25%0D%0Arepo"
        );
    }
}
