#![no_main]

use ghm_issues::{normalize_issue_body, parse_repo_list, parse_team_slug, SecretSet};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let body = normalize_issue_body(&raw);
    assert!(!body.contains('\r'));

    let mut literals = Vec::new();
    if let Ok(slug) = parse_team_slug(&body) {
        assert!(!slug.is_empty());
        assert_eq!(slug.trim(), slug);
        literals.push(slug);
    }
    if let Ok(repos) = parse_repo_list(&body) {
        assert!(!repos.is_empty());
        literals.extend(repos);
    }

    // Literals containing the mask character can be rebuilt from masked text.
    if literals.iter().any(|literal| literal.contains('*')) {
        return;
    }
    let mut secrets = SecretSet::new();
    for literal in &literals {
        secrets.register(literal.clone());
    }
    let redacted = secrets.redact(&body);
    assert_eq!(secrets.redact(&redacted), redacted);
    for literal in literals.iter().filter(|literal| !literal.is_empty()) {
        assert!(!redacted.contains(literal.as_str()));
    }
});
