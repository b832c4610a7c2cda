//! Rule-based suggestions used when no AI provider can answer. Purely a
//! function of the change list / repository snapshot, no external calls.

use crate::git::{DiffStatus, FileChange, RepositoryInfo};
use crate::provider::{BranchSuggestion, CommitSuggestion, CommitType};

/// Build a single conventional commit subject from the staged change list.
pub fn commit_fallback(changes: &[FileChange]) -> Vec<CommitSuggestion> {
    if changes.is_empty() {
        return vec![CommitSuggestion {
            message: "chore: update files".to_string(),
            body: None,
            kind: Some(CommitType::Chore),
        }];
    }

    let mut kind = CommitType::Chore;
    let mut action = "update";

    if changes.iter().all(|c| c.status == DiffStatus::Added) {
        kind = CommitType::Feat;
        action = "add";
    } else if changes.iter().all(|c| c.status == DiffStatus::Deleted) {
        action = "remove";
    }

    let target = if changes.len() == 1 {
        changes[0].file.clone()
    } else {
        format!("{} files", changes.len())
    };

    let message: String = format!("{kind}: {action} {target}").chars().take(72).collect();

    vec![CommitSuggestion {
        message,
        body: None,
        kind: Some(kind),
    }]
}

/// Build a single branch name from the detected prefix convention and the
/// most recent commit subject.
pub fn branch_fallback(repo: &RepositoryInfo) -> Vec<BranchSuggestion> {
    let prefix = repo
        .branch_pattern
        .prefixes
        .first()
        .map(String::as_str)
        .unwrap_or("feature");

    let base = repo
        .recent_commits
        .first()
        .map(|commit| slug(&commit.message, 30))
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| "new-branch".to_string());

    let name: String = format!("{prefix}/{base}").chars().take(50).collect();

    vec![BranchSuggestion {
        name,
        description: Some("Basic branch name suggestion".to_string()),
    }]
}

/// Lowercase, collapse non-alphanumeric runs to `-`, trim dashes, cap length.
fn slug(text: &str, max_len: usize) -> String {
    let mut out = String::new();
    let mut last_dash = false;

    for ch in text.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_dash = false;
        } else if !last_dash && !out.is_empty() {
            out.push('-');
            last_dash = true;
        }
    }

    let trimmed: String = out.trim_end_matches('-').chars().take(max_len).collect();
    trimmed.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{BranchPattern, CommitInfo};

    fn change(status: DiffStatus, file: &str) -> FileChange {
        FileChange {
            status,
            file: file.to_string(),
        }
    }

    #[test]
    fn all_added_files_become_a_feat() {
        let suggestions = commit_fallback(&[
            change(DiffStatus::Added, "a.ts"),
            change(DiffStatus::Added, "b.ts"),
        ]);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].message, "feat: add 2 files");
        assert_eq!(suggestions[0].kind, Some(CommitType::Feat));
    }

    #[test]
    fn single_file_is_named_directly() {
        let suggestions = commit_fallback(&[change(DiffStatus::Modified, "src/parser.rs")]);
        assert_eq!(suggestions[0].message, "chore: update src/parser.rs");
    }

    #[test]
    fn all_deleted_files_are_removed_as_chore() {
        let suggestions = commit_fallback(&[
            change(DiffStatus::Deleted, "old.rs"),
            change(DiffStatus::Deleted, "older.rs"),
        ]);
        assert_eq!(suggestions[0].message, "chore: remove 2 files");
        assert_eq!(suggestions[0].kind, Some(CommitType::Chore));
    }

    #[test]
    fn empty_change_list_still_yields_a_message() {
        let suggestions = commit_fallback(&[]);
        assert_eq!(suggestions[0].message, "chore: update files");
    }

    #[test]
    fn long_targets_are_capped_at_72() {
        let suggestions = commit_fallback(&[change(DiffStatus::Modified, &"d/".repeat(60))]);
        assert_eq!(suggestions[0].message.chars().count(), 72);
    }

    #[test]
    fn branch_name_uses_prefix_and_recent_commit() {
        let repo = RepositoryInfo {
            current_branch: "main".to_string(),
            recent_commits: vec![CommitInfo {
                hash: "abc".to_string(),
                message: "Fix: Session Timeout!".to_string(),
                author: "dev".to_string(),
            }],
            branch_pattern: BranchPattern {
                has_prefix: true,
                prefixes: vec!["fix".to_string()],
                separator: '/',
                has_ticket_numbers: false,
                conventions: vec![],
            },
            files_changed: 0,
            ahead: 0,
            behind: 0,
        };
        let suggestions = branch_fallback(&repo);
        assert_eq!(suggestions[0].name, "fix/fix-session-timeout");
    }

    #[test]
    fn branch_name_defaults_without_history() {
        let repo = RepositoryInfo {
            current_branch: "main".to_string(),
            recent_commits: vec![],
            branch_pattern: BranchPattern::default(),
            files_changed: 0,
            ahead: 0,
            behind: 0,
        };
        let suggestions = branch_fallback(&repo);
        assert_eq!(suggestions[0].name, "feature/new-branch");
    }
}
