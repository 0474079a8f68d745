//! Single emission point for issue feedback. Every outbound comment passes
//! through [`SecretSet::redact`] here and nowhere else.

use ghm_issues::issue_comment::render_failure_comment;
use ghm_issues::SecretSet;
use tracing::{error, info, warn};

use crate::platform::{IssueTarget, RunnerGroupPlatform};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Public struct `FeedbackDelivery` describing what reached the issue.
pub struct FeedbackDelivery {
    pub body: String,
    pub comment_posted: bool,
    pub issue_closed: bool,
    pub delivery_error: Option<String>,
}

pub struct FeedbackReporter<'a, P: ?Sized> {
    platform: &'a P,
    issue: &'a IssueTarget,
    run_url: &'a str,
    secrets: &'a SecretSet,
}

impl<'a, P> FeedbackReporter<'a, P>
where
    P: RunnerGroupPlatform + ?Sized,
{
    pub fn new(
        platform: &'a P,
        issue: &'a IssueTarget,
        run_url: &'a str,
        secrets: &'a SecretSet,
    ) -> Self {
        Self {
            platform,
            issue,
            run_url,
            secrets,
        }
    }

    /// Posts the redacted success message and closes the issue. An issue
    /// that no longer exists is logged, not escalated.
    pub fn succeed(&self, message: &str) -> FeedbackDelivery {
        let body = self.secrets.redact(message);
        info!(message = %body, "Sending message");
        let mut delivery = FeedbackDelivery {
            body,
            ..FeedbackDelivery::default()
        };
        match self.platform.create_issue_comment(self.issue, &delivery.body) {
            Ok(_) => delivery.comment_posted = true,
            Err(post_error) if post_error.is_not_found() => {
                let detail = self.secrets.redact(&post_error.to_string());
                error!(error = %detail, "Unable to send message, issue not found");
                delivery.delivery_error = Some(detail);
                return delivery;
            }
            Err(post_error) => {
                let detail = self.secrets.redact(&post_error.to_string());
                error!(error = %detail, "Unable to send message");
                delivery.delivery_error = Some(detail);
            }
        }

        info!(issue = self.issue.number, "Closing issue");
        match self.platform.close_issue(self.issue) {
            Ok(()) => delivery.issue_closed = true,
            Err(close_error) => {
                let detail = self.secrets.redact(&close_error.to_string());
                error!(error = %detail, "Unable to close issue");
            }
        }
        delivery
    }

    /// Posts the redacted failure message with the run-log link. The issue
    /// stays open; an undeliverable comment is surfaced in the delivery.
    pub fn fail(&self, message: &str) -> FeedbackDelivery {
        let body = self
            .secrets
            .redact(&render_failure_comment(message, self.run_url));
        warn!(message = %body, "Sending failure notification");
        let mut delivery = FeedbackDelivery {
            body,
            ..FeedbackDelivery::default()
        };
        match self.platform.create_issue_comment(self.issue, &delivery.body) {
            Ok(_) => delivery.comment_posted = true,
            Err(post_error) => {
                let detail = self.secrets.redact(&post_error.to_string());
                if post_error.is_not_found() {
                    error!(error = %detail, "Unable to send message, issue not found");
                } else {
                    error!(error = %detail, "Unable to send message");
                }
                delivery.delivery_error = Some(detail);
            }
        }
        delivery
    }
}

#[cfg(test)]
mod tests {
    use ghm_issues::SecretSet;

    use super::FeedbackReporter;
    use crate::platform::IssueTarget;
    use crate::tests::ScriptedPlatform;

    const RUN_URL: &str = "https://github.com/acme/requests/actions/runs/77";

    fn issue() -> IssueTarget {
        IssueTarget {
            owner: "acme".to_string(),
            repo: "requests".to_string(),
            number: 12,
        }
    }

    fn secrets() -> SecretSet {
        let mut secrets = SecretSet::new();
        secrets.register("platform-infra");
        secrets.register("ghm-platform-infra");
        secrets
    }

    #[test]
    fn functional_succeed_redacts_posts_and_closes() {
        let platform = ScriptedPlatform::default();
        let issue = issue();
        let secrets = secrets();
        let delivery = FeedbackReporter::new(&platform, &issue, RUN_URL, &secrets)
            .succeed("Created ghm-platform-infra for platform-infra");
        assert_eq!(delivery.body, "Created **** for ****");
        assert!(delivery.comment_posted);
        assert!(delivery.issue_closed);
        assert_eq!(platform.comments(), vec!["Created **** for ****".to_string()]);
        assert_eq!(platform.count_calls("close_issue"), 1);
    }

    #[test]
    fn functional_fail_appends_run_link_and_leaves_issue_open() {
        let platform = ScriptedPlatform::default();
        let issue = issue();
        let secrets = secrets();
        let delivery = FeedbackReporter::new(&platform, &issue, RUN_URL, &secrets)
            .fail("Repo svc-a is not assigned to platform-infra");
        assert_eq!(
            delivery.body,
            format!("Repo svc-a is not assigned to ****\n\n[View Failure Log Here]({RUN_URL})")
        );
        assert!(delivery.comment_posted);
        assert!(!delivery.issue_closed);
        assert_eq!(platform.count_calls("close_issue"), 0);
    }

    #[test]
    fn regression_succeed_skips_close_when_issue_is_gone() {
        let platform = ScriptedPlatform::default().failing("create_issue_comment", 404);
        let issue = issue();
        let secrets = secrets();
        let delivery =
            FeedbackReporter::new(&platform, &issue, RUN_URL, &secrets).succeed("Deleted runner group");
        assert!(!delivery.comment_posted);
        assert!(!delivery.issue_closed);
        assert!(delivery.delivery_error.is_some());
        assert_eq!(platform.count_calls("close_issue"), 0);
    }

    #[test]
    fn regression_succeed_still_closes_after_other_comment_errors() {
        let platform = ScriptedPlatform::default().failing("create_issue_comment", 502);
        let issue = issue();
        let secrets = secrets();
        let delivery =
            FeedbackReporter::new(&platform, &issue, RUN_URL, &secrets).succeed("Deleted runner group");
        assert!(!delivery.comment_posted);
        assert!(delivery.issue_closed);
    }

    #[test]
    fn regression_fail_surfaces_undeliverable_comment() {
        let platform = ScriptedPlatform::default().failing("create_issue_comment", 404);
        let issue = issue();
        let secrets = secrets();
        let delivery =
            FeedbackReporter::new(&platform, &issue, RUN_URL, &secrets).fail("Team is not private");
        assert!(!delivery.comment_posted);
        assert!(delivery
            .delivery_error
            .as_deref()
            .is_some_and(|detail| detail.contains("404")));
    }
}
