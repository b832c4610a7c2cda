use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{BranchSuggestion, CommitSuggestion, CommitType};

static PREAMBLE_HERE_ARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^Here are.*?suggestions?:?\s*").unwrap());
static PREAMBLE_ILL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^I'll.*?suggestions?:?\s*").unwrap());
static PREAMBLE_BASED_ON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^Based on.*?:\s*").unwrap());

/// First `[` through the last `]`, newlines included. Intentionally greedy:
/// providers are tuned against this exact match, so a narrower one would
/// change which array gets picked up.
static JSON_ARRAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[\s\S]*\]").unwrap());

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").unwrap());

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.|^-|^\*").unwrap());
static LIST_MARKER_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*|^-\s*|^\*\s*").unwrap());

/// Reduce a raw model response to its most JSON-looking substring.
///
/// Conversational preambles are stripped first, then a bracketed array wins
/// over a fenced code block since models sometimes wrap an array in both.
pub fn normalize(raw: &str) -> String {
    let mut cleaned = raw.trim().to_string();

    cleaned = PREAMBLE_HERE_ARE.replace(&cleaned, "").into_owned();
    cleaned = PREAMBLE_ILL.replace(&cleaned, "").into_owned();
    cleaned = PREAMBLE_BASED_ON.replace(&cleaned, "").into_owned();

    if let Some(m) = JSON_ARRAY.find(&cleaned) {
        return m.as_str().to_string();
    }

    if let Some(caps) = CODE_FENCE.captures(&cleaned) {
        return caps[1].to_string();
    }

    cleaned
}

/// Normalize and parse a branch-name response, degrading to line extraction
/// when the text is not structurally valid JSON.
pub fn branch_suggestions(raw: &str) -> Vec<BranchSuggestion> {
    let cleaned = normalize(raw);
    match parse_json_suggestions(&cleaned) {
        Some(list) => list,
        None => {
            log::warn!("failed to parse JSON response, attempting fallback parsing");
            fallback_branch(&cleaned)
        }
    }
}

/// Normalize and parse a commit-message response, degrading to line
/// extraction when the text is not structurally valid JSON.
pub fn commit_suggestions(raw: &str) -> Vec<CommitSuggestion> {
    let cleaned = normalize(raw);
    match parse_json_suggestions(&cleaned) {
        Some(list) => list,
        None => {
            log::warn!("failed to parse JSON response, attempting fallback parsing");
            fallback_commit(&cleaned)
        }
    }
}

/// Strict JSON interpretation: an array is taken as-is, an object holding a
/// `suggestions` or `results` array contributes that array, and any other
/// value is wrapped as a single suggestion.
fn parse_json_suggestions<T: DeserializeOwned>(text: &str) -> Option<Vec<T>> {
    let value: Value = serde_json::from_str(text).ok()?;

    let sequence = match value {
        Value::Array(_) => value,
        Value::Object(ref map) if map.contains_key("suggestions") => map["suggestions"].clone(),
        Value::Object(ref map) if map.contains_key("results") => map["results"].clone(),
        other => Value::Array(vec![other]),
    };

    serde_json::from_value(sequence).ok()
}

/// Line-heuristic branch extraction. Never returns an empty list.
fn fallback_branch(response: &str) -> Vec<BranchSuggestion> {
    let suggestions: Vec<BranchSuggestion> = response
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| {
            LIST_MARKER.is_match(line) || line.contains("feature/") || line.contains("fix/")
        })
        .take(5)
        .enumerate()
        .map(|(index, line)| BranchSuggestion {
            name: extract_branch_name(line),
            description: Some(format!("Generated suggestion {}", index + 1)),
        })
        .collect();

    if suggestions.is_empty() {
        return vec![BranchSuggestion {
            name: "feature/update".to_string(),
            description: Some("Generated suggestion 1".to_string()),
        }];
    }

    suggestions
}

/// Line-heuristic commit extraction. Never returns an empty list.
fn fallback_commit(response: &str) -> Vec<CommitSuggestion> {
    let suggestions: Vec<CommitSuggestion> = response
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| line.len() > 10 && !line.contains("```"))
        .take(4)
        .map(|line| CommitSuggestion {
            message: clean_commit_message(line),
            body: None,
            kind: Some(detect_commit_type(line)),
        })
        .collect();

    if suggestions.is_empty() {
        return vec![CommitSuggestion {
            message: "chore: update files".to_string(),
            body: None,
            kind: Some(CommitType::Chore),
        }];
    }

    suggestions
}

/// Strip a leading list marker and keep the first whitespace-delimited token.
pub(crate) fn extract_branch_name(line: &str) -> String {
    let cleaned = LIST_MARKER_STRIP.replace(line, "");
    let cleaned = cleaned.trim();
    match cleaned.split(' ').next() {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => cleaned.to_string(),
    }
}

/// Strip marker and surrounding quote characters, cap at 72 characters.
pub(crate) fn clean_commit_message(line: &str) -> String {
    let stripped = LIST_MARKER_STRIP.replace(line, "");
    let quotes = ['\'', '"', '`'];
    let unquoted = stripped.as_ref();
    let unquoted = unquoted.strip_prefix(quotes).unwrap_or(unquoted);
    let unquoted = unquoted.strip_suffix(quotes).unwrap_or(unquoted);
    unquoted.trim().chars().take(72).collect()
}

/// Classify a commit line against the conventional-commit vocabulary, then
/// against secondary keyword groups. Order matters.
pub(crate) fn detect_commit_type(message: &str) -> CommitType {
    let lower = message.to_lowercase();

    for kind in CommitType::ALL {
        if lower.contains(kind.as_str()) {
            return kind;
        }
    }

    if lower.contains("add") || lower.contains("new") {
        return CommitType::Feat;
    }
    if lower.contains("fix") || lower.contains("bug") {
        return CommitType::Fix;
    }
    if lower.contains("update") || lower.contains("change") {
        return CommitType::Chore;
    }
    if lower.contains("remove") || lower.contains("delete") {
        return CommitType::Chore;
    }
    if lower.contains("test") {
        return CommitType::Test;
    }
    if lower.contains("doc") {
        return CommitType::Docs;
    }

    CommitType::Feat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_array_passes_through_unchanged() {
        let raw = r#"[{"name":"feature/login","description":"add login"},{"name":"fix/session"}]"#;
        let parsed = branch_suggestions(raw);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "feature/login");
        assert_eq!(parsed[0].description.as_deref(), Some("add login"));
        assert_eq!(parsed[1].name, "fix/session");
        assert_eq!(parsed[1].description, None);
    }

    #[test]
    fn prose_preamble_is_stripped_before_parsing() {
        let raw = "Here are suggestions:\n[{\"name\":\"feature/login\",\"description\":\"add login\"}]";
        assert_eq!(
            normalize(raw),
            r#"[{"name":"feature/login","description":"add login"}]"#
        );

        let parsed = branch_suggestions(raw);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "feature/login");
    }

    #[test]
    fn code_fence_wrapping_is_invariant() {
        let plain = r#"[{"name":"feature/cache","description":"cache layer"}]"#;
        let fenced = format!("```json\n{plain}\n```");
        let bare_fence = format!("```\n{plain}\n```");

        assert_eq!(branch_suggestions(plain), branch_suggestions(&fenced));
        assert_eq!(branch_suggestions(plain), branch_suggestions(&bare_fence));
    }

    #[test]
    fn bracket_span_wins_over_code_fence() {
        // Models sometimes fence the array; the array itself must still win.
        let raw = "I'll generate suggestions:\n```json\n[{\"name\":\"feature/a\"}]\n```";
        assert_eq!(normalize(raw), r#"[{"name":"feature/a"}]"#);
    }

    #[test]
    fn object_with_suggestions_key_is_unwrapped() {
        let raw = r#"{"suggestions":[{"message":"feat: add cache","type":"feat"}]}"#;
        let parsed = commit_suggestions(raw);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].message, "feat: add cache");
        assert_eq!(parsed[0].kind, Some(CommitType::Feat));
    }

    #[test]
    fn object_with_results_key_is_unwrapped() {
        let raw = r#"{"results":[{"name":"fix/leak"}]}"#;
        let parsed = branch_suggestions(raw);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "fix/leak");
    }

    #[test]
    fn single_object_is_wrapped() {
        let raw = r#"{"name":"feature/single","description":"only one"}"#;
        let parsed = branch_suggestions(raw);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "feature/single");
    }

    #[test]
    fn heuristic_branch_extraction_caps_at_five() {
        let raw = "1. feature/one something\n2. feature/two\n- feature/three\n* feature/four\n5. feature/five\n6. feature/six";
        let parsed = branch_suggestions(raw);
        assert_eq!(parsed.len(), 5);
        assert!(parsed.iter().all(|s| !s.name.is_empty()));
        assert_eq!(parsed[0].name, "feature/one");
        assert_eq!(parsed[0].description.as_deref(), Some("Generated suggestion 1"));
    }

    #[test]
    fn heuristic_branch_never_returns_empty() {
        let parsed = branch_suggestions("nothing usable here at all");
        assert_eq!(parsed.len(), 1);
        assert!(!parsed[0].name.is_empty());
    }

    #[test]
    fn heuristic_commit_skips_fences_and_short_lines() {
        let raw = "```\nshort\n- feat: add caching layer for sessions\nAnother change to the parser here";
        let parsed = commit_suggestions(raw);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].message, "feat: add caching layer for sessions");
        assert_eq!(parsed[0].kind, Some(CommitType::Feat));
    }

    #[test]
    fn heuristic_commit_never_returns_empty() {
        let parsed = commit_suggestions("short");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].message, "chore: update files");
        assert_eq!(parsed[0].kind, Some(CommitType::Chore));
    }

    #[test]
    fn commit_lines_are_cleaned_and_capped() {
        let long = format!("- \"{}\"", "x".repeat(100));
        let cleaned = clean_commit_message(&long);
        assert_eq!(cleaned.chars().count(), 72);
        assert!(!cleaned.starts_with('"'));
    }

    #[test]
    fn commit_type_detection_is_deterministic() {
        assert_eq!(detect_commit_type("fix the login bug"), CommitType::Fix);
        assert_eq!(detect_commit_type("add new widget"), CommitType::Feat);
        assert_eq!(detect_commit_type("refactor session handling"), CommitType::Refactor);
        assert_eq!(detect_commit_type("update dependencies"), CommitType::Chore);
        assert_eq!(detect_commit_type("remove dead branch"), CommitType::Chore);
        assert_eq!(detect_commit_type("cover parser with more cases"), CommitType::Feat);
    }

    #[test]
    fn branch_name_is_first_token_after_marker() {
        assert_eq!(extract_branch_name("1. feature/login-form adds the form"), "feature/login-form");
        assert_eq!(extract_branch_name("- fix/overflow"), "fix/overflow");
        assert_eq!(extract_branch_name("* feature/api"), "feature/api");
    }
}
