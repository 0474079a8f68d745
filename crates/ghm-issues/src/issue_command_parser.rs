//! Line-oriented parser for the labelled sections of a runner-group request.
//!
//! A request body carries two labelled fields in fixed order:
//!
//! ```text
//! Team: platform-infra
//! ###
//! Repos: svc-a, svc-b
//! ```
//!
//! Issue-form layouts (`### Team`, blank line, value) are accepted as well.
//! Away from the start of a line a label needs a colon (`- Team: x`,
//! `... ### Repos: y`) and must not be glued to a preceding letter or digit.
//! Only the first occurrence of each label is considered.

use thiserror::Error;

const TEAM_LABEL: &str = "Team";
const REPOS_LABEL: &str = "Repos";
const SECTION_DELIMITER: &str = "###";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enumerates supported `CommandParseError` values.
pub enum CommandParseError {
    #[error("unable to parse team from issue body")]
    MissingTeam,
    #[error("team slug '{slug}' may only contain letters, digits, '_', '.' and '-'")]
    InvalidTeamSlug { slug: String },
    #[error("unable to parse repos from issue body")]
    MissingRepos,
}

/// Strips carriage returns so CRLF bodies parse like LF bodies.
pub fn normalize_issue_body(body: &str) -> String {
    body.replace('\r', "")
}

pub fn parse_team_slug(body: &str) -> Result<String, CommandParseError> {
    let value = find_field_value(body, TEAM_LABEL).ok_or(CommandParseError::MissingTeam)?;
    if !is_valid_team_slug(value) {
        return Err(CommandParseError::InvalidTeamSlug {
            slug: value.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Splits the `Repos` field on `,`. Empty elements are kept as empty strings;
/// they fail later at the repository lookup.
pub fn parse_repo_list(body: &str) -> Result<Vec<String>, CommandParseError> {
    let value = find_field_value(body, REPOS_LABEL).ok_or(CommandParseError::MissingRepos)?;
    Ok(value
        .split(',')
        .map(|repo| trim_field(repo).to_string())
        .collect())
}

pub fn is_valid_team_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'))
}

fn find_field_value<'a>(body: &'a str, label: &str) -> Option<&'a str> {
    let mut lines = body.lines();
    while let Some(line) = lines.next() {
        let Some(rest) = locate_field_label(line, label) else {
            continue;
        };
        let value = clean_field_value(rest);
        if !value.is_empty() {
            return Some(value);
        }
        for next in lines.by_ref() {
            let candidate = next.trim();
            if candidate.is_empty() {
                continue;
            }
            if candidate.starts_with('#') {
                return None;
            }
            let value = clean_field_value(candidate);
            return (!value.is_empty()).then_some(value);
        }
        return None;
    }
    None
}

fn locate_field_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    if let Some(rest) = strip_leading_label(line, label) {
        return Some(rest);
    }
    let mut previous: Option<char> = None;
    for (index, ch) in line.char_indices() {
        if index > 0 && !previous.is_some_and(char::is_alphanumeric) {
            if let Some(rest) = strip_inline_label(&line[index..], label) {
                return Some(rest);
            }
        }
        previous = Some(ch);
    }
    None
}

fn strip_inline_label<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let head = text.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let rest = text[label.len()..].trim_start_matches([' ', '\t']);
    rest.starts_with(':').then_some(rest)
}

fn strip_leading_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let content = line.trim_start().trim_start_matches('#').trim_start();
    let head = content.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let rest = &content[label.len()..];
    match rest.chars().next() {
        None => Some(rest),
        Some(ch) if ch == ':' || ch.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

fn clean_field_value(rest: &str) -> &str {
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    let rest = match rest.find(SECTION_DELIMITER) {
        Some(index) => &rest[..index],
        None => rest,
    };
    trim_field(rest)
}

fn trim_field(raw: &str) -> &str {
    raw.trim_matches(|ch: char| ch.is_whitespace() || ch.is_control() || ch == '#')
}
