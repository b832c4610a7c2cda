use crate::config::ContextFile;
use crate::git::{CommitInfo, FileChange, RepositoryInfo};

use super::prompts;

const DIFF_EXCERPT_LIMIT: usize = 2000;

/// Assemble the branch-name prompt from the repository snapshot and an
/// optional context file.
pub fn branch_prompt(repo: &RepositoryInfo, context: Option<&ContextFile>) -> String {
    let commits = repo
        .recent_commits
        .iter()
        .take(5)
        .map(|commit| format!("- {} ({})", commit.message, commit.author))
        .collect::<Vec<_>>()
        .join("\n");

    let pattern = &repo.branch_pattern;
    let mut prompt = format!(
        "Generate a branch name based on the following repository information:\n\n\
         REPOSITORY CONTEXT:\n\
         - Current branch: {current}\n\n\
         RECENT COMMITS:\n{commits}\n\n\
         BRANCH NAMING PATTERNS:\n\
         - Has prefixes: {has_prefix}\n\
         - Common prefixes: {prefixes}\n\
         - Separator: {separator}\n\
         - Uses ticket numbers: {tickets}\n\
         - Conventions: {conventions}\n\n\
         CURRENT STATUS:\n\
         - Files changed: {files}\n\
         - Branch ahead: {ahead}\n\
         - Branch behind: {behind}",
        current = repo.current_branch,
        commits = commits,
        has_prefix = pattern.has_prefix,
        prefixes = join_or_none(&pattern.prefixes),
        separator = pattern.separator,
        tickets = pattern.has_ticket_numbers,
        conventions = join_or_none(&pattern.conventions),
        files = repo.files_changed,
        ahead = repo.ahead,
        behind = repo.behind,
    );

    push_context(&mut prompt, context);
    prompt.push_str("\n\n");
    prompt.push_str(prompts::BRANCH_REQUEST);
    prompt
}

/// Assemble the commit-message prompt from staged changes, a capped diff
/// excerpt, and recent history.
pub fn commit_prompt(
    staged: &[FileChange],
    diff: &str,
    recent: &[CommitInfo],
    context: Option<&ContextFile>,
) -> String {
    let changes = staged
        .iter()
        .map(|change| format!("- {}: {}", change.status.as_str(), change.file))
        .collect::<Vec<_>>()
        .join("\n");

    let history = recent
        .iter()
        .map(|commit| format!("- {}", commit.message))
        .collect::<Vec<_>>()
        .join("\n");

    let (excerpt, truncated) = truncate_chars(diff, DIFF_EXCERPT_LIMIT);
    let marker = if truncated { "\n... (truncated)" } else { "" };

    let mut prompt = format!(
        "Generate a commit message based on the following staged changes:\n\n\
         STAGED CHANGES:\n{changes}\n\n\
         DETAILED DIFF:\n```diff\n{excerpt}{marker}\n```\n\n\
         RECENT COMMIT HISTORY (for style reference):\n{history}",
    );

    push_context(&mut prompt, context);
    prompt.push_str("\n\n");
    prompt.push_str(prompts::COMMIT_REQUEST);
    prompt
}

fn push_context(prompt: &mut String, context: Option<&ContextFile>) {
    if let Some(context) = context {
        prompt.push_str(&format!(
            "\n\nADDITIONAL CONTEXT (from {}):\n{}",
            context.path.display(),
            context.content
        ));
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Cap at a character count without splitting a code point.
fn truncate_chars(text: &str, limit: usize) -> (&str, bool) {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => (&text[..byte_index], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{BranchPattern, CommitInfo, DiffStatus, FileChange, RepositoryInfo};

    fn sample_repo() -> RepositoryInfo {
        RepositoryInfo {
            current_branch: "main".to_string(),
            recent_commits: vec![CommitInfo {
                hash: "abc123".to_string(),
                message: "feat: add login".to_string(),
                author: "dev".to_string(),
            }],
            branch_pattern: BranchPattern {
                has_prefix: true,
                prefixes: vec!["feature".to_string()],
                separator: '/',
                has_ticket_numbers: false,
                conventions: vec!["feature".to_string()],
            },
            files_changed: 2,
            ahead: 1,
            behind: 0,
        }
    }

    #[test]
    fn branch_prompt_carries_repo_facts_and_instruction() {
        let prompt = branch_prompt(&sample_repo(), None);
        assert!(prompt.contains("Current branch: main"));
        assert!(prompt.contains("- feat: add login (dev)"));
        assert!(prompt.contains("Common prefixes: feature"));
        assert!(prompt.contains("Files changed: 2"));
        assert!(prompt.contains("3-5 branch name suggestions"));
    }

    #[test]
    fn commit_prompt_truncates_long_diffs() {
        let staged = vec![FileChange {
            status: DiffStatus::Modified,
            file: "src/main.rs".to_string(),
        }];
        let diff = "x".repeat(3000);
        let prompt = commit_prompt(&staged, &diff, &[], None);
        assert!(prompt.contains("... (truncated)"));
        assert!(prompt.contains("- modified: src/main.rs"));
        assert!(!prompt.contains(&"x".repeat(2001)));
    }

    #[test]
    fn short_diff_is_not_marked_truncated() {
        let prompt = commit_prompt(&[], "tiny diff", &[], None);
        assert!(!prompt.contains("(truncated)"));
    }

    #[test]
    fn context_file_content_is_appended() {
        let context = ContextFile {
            path: "docs/COMMITTER.md".into(),
            content: "This repo uses trunk-based development.".to_string(),
        };
        let prompt = branch_prompt(&sample_repo(), Some(&context));
        assert!(prompt.contains("ADDITIONAL CONTEXT"));
        assert!(prompt.contains("trunk-based development"));
    }
}
