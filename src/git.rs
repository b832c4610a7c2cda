use anyhow::{Context, Result, anyhow};
use std::process::Command as GitCommand;

/// Closed set of `git diff --name-status` codes, with an explicit catch-all
/// for anything git emits that we do not map (score-suffixed rename/copy
/// codes like `R100` land there on purpose).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Unmerged,
    Typechange,
    Unknown,
}

impl DiffStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "A" => DiffStatus::Added,
            "M" => DiffStatus::Modified,
            "D" => DiffStatus::Deleted,
            "R" => DiffStatus::Renamed,
            "C" => DiffStatus::Copied,
            "U" => DiffStatus::Unmerged,
            "T" => DiffStatus::Typechange,
            _ => DiffStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiffStatus::Added => "added",
            DiffStatus::Modified => "modified",
            DiffStatus::Deleted => "deleted",
            DiffStatus::Renamed => "renamed",
            DiffStatus::Copied => "copied",
            DiffStatus::Unmerged => "unmerged",
            DiffStatus::Typechange => "typechange",
            DiffStatus::Unknown => "unknown",
        }
    }
}

/// One staged or unstaged file change.
#[derive(Debug, Clone)]
pub struct FileChange {
    pub status: DiffStatus,
    pub file: String,
}

/// A recent commit, subject line only.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
    pub author: String,
}

/// Naming habits observed across local branches.
#[derive(Debug, Clone, Default)]
pub struct BranchPattern {
    pub has_prefix: bool,
    pub prefixes: Vec<String>,
    pub separator: char,
    pub has_ticket_numbers: bool,
    pub conventions: Vec<String>,
}

/// Everything the branch prompt needs about the repository.
#[derive(Debug, Clone)]
pub struct RepositoryInfo {
    pub current_branch: String,
    pub recent_commits: Vec<CommitInfo>,
    pub branch_pattern: BranchPattern,
    pub files_changed: usize,
    pub ahead: usize,
    pub behind: usize,
}

/// Run a git command and capture stdout as String.
pub fn git_output(args: &[&str]) -> Result<String> {
    let output = GitCommand::new("git")
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {:?}", args))?;

    if !output.status.success() {
        return Err(anyhow!(
            "git {:?} exited with status {:?}",
            args,
            output.status.code()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Get the current branch name.
pub fn current_branch() -> Result<String> {
    let name = git_output(&["rev-parse", "--abbrev-ref", "HEAD"])?
        .trim()
        .to_string();
    Ok(name)
}

/// Full diff text, staged or working tree.
pub fn detailed_diff(staged: bool) -> Result<String> {
    if staged {
        git_output(&["diff", "--cached"])
    } else {
        git_output(&["diff"])
    }
}

/// Name-status list of staged changes.
pub fn staged_changes() -> Result<Vec<FileChange>> {
    let output = git_output(&["diff", "--cached", "--name-status"])?;
    Ok(parse_name_status(&output))
}

/// Name-status list of unstaged changes.
pub fn unstaged_changes() -> Result<Vec<FileChange>> {
    let output = git_output(&["diff", "--name-status"])?;
    Ok(parse_name_status(&output))
}

/// Stage all new, modified, and deleted files.
pub fn stage_all() -> Result<()> {
    log::warn!("Staging all changes");
    git_output(&["add", "-A"])?;
    Ok(())
}

/// Most recent commits, newest first.
pub fn recent_commits(count: usize) -> Result<Vec<CommitInfo>> {
    let count_arg = count.to_string();
    let log_output = git_output(&["log", "-n", &count_arg, "--pretty=format:%H%x09%s%x09%an"])?;

    let commits = log_output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut parts = line.splitn(3, '\t');
            CommitInfo {
                hash: parts.next().unwrap_or("").to_string(),
                message: parts.next().unwrap_or("").to_string(),
                author: parts.next().unwrap_or("").to_string(),
            }
        })
        .collect();

    Ok(commits)
}

/// Analyze naming conventions across local branches other than the current.
pub fn branch_pattern() -> Result<BranchPattern> {
    let current = current_branch()?;
    let output = git_output(&["branch", "--format=%(refname:short)"])?;
    let branches: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != current)
        .collect();

    Ok(analyze_branch_pattern(&branches))
}

fn analyze_branch_pattern(branches: &[&str]) -> BranchPattern {
    let mut pattern = BranchPattern {
        separator: '/',
        ..BranchPattern::default()
    };

    for branch in branches {
        if let Some((prefix, _)) = branch.split_once('/') {
            pattern.has_prefix = true;
            if !pattern.prefixes.iter().any(|p| p == prefix) {
                pattern.prefixes.push(prefix.to_string());
            }
        }

        if branch.contains('-') {
            pattern.separator = '-';
        }

        if branch.chars().any(|c| c.is_ascii_digit()) {
            pattern.has_ticket_numbers = true;
        }

        let convention = if branch.starts_with("feature/") || branch.starts_with("feat/") {
            Some("feature")
        } else if branch.starts_with("fix/") || branch.starts_with("bugfix/") {
            Some("fix")
        } else if branch.starts_with("hotfix/") {
            Some("hotfix")
        } else if branch.starts_with("release/") {
            Some("release")
        } else if branch.starts_with("develop") || branch.starts_with("dev/") {
            Some("develop")
        } else {
            None
        };

        if let Some(name) = convention {
            if !pattern.conventions.iter().any(|c| c == name) {
                pattern.conventions.push(name.to_string());
            }
        }
    }

    pattern
}

/// Count of changed paths reported by `git status --porcelain`.
fn files_changed() -> Result<usize> {
    let output = git_output(&["status", "--porcelain"])?;
    Ok(output.lines().filter(|line| !line.trim().is_empty()).count())
}

/// Ahead/behind counts against the upstream; zero when no upstream is set.
fn ahead_behind() -> (usize, usize) {
    let Ok(output) = git_output(&["rev-list", "--left-right", "--count", "@{upstream}...HEAD"])
    else {
        return (0, 0);
    };

    let mut parts = output.split_whitespace();
    let behind = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
    let ahead = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
    (ahead, behind)
}

/// Gather the repository snapshot fed into branch prompts.
pub fn repository_info() -> Result<RepositoryInfo> {
    let current_branch = current_branch()?;
    let recent_commits = recent_commits(5)?;
    let branch_pattern = branch_pattern()?;
    let files_changed = files_changed()?;
    let (ahead, behind) = ahead_behind();

    Ok(RepositoryInfo {
        current_branch,
        recent_commits,
        branch_pattern,
        files_changed,
        ahead,
        behind,
    })
}

fn parse_name_status(diff: &str) -> Vec<FileChange> {
    diff.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut parts = line.splitn(2, '\t');
            let status = parts.next().unwrap_or("").trim();
            let file = parts.next().unwrap_or("").to_string();
            FileChange {
                status: DiffStatus::from_code(status),
                file,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_status_lines_parse_into_changes() {
        let diff = "A\tsrc/new.rs\nM\tsrc/main.rs\nD\told.txt\n";
        let changes = parse_name_status(diff);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].status, DiffStatus::Added);
        assert_eq!(changes[0].file, "src/new.rs");
        assert_eq!(changes[2].status, DiffStatus::Deleted);
    }

    #[test]
    fn scored_rename_codes_are_unknown() {
        let changes = parse_name_status("R100\told.rs\tnew.rs\n");
        assert_eq!(changes[0].status, DiffStatus::Unknown);
        assert_eq!(changes[0].file, "old.rs\tnew.rs");
    }

    #[test]
    fn empty_diff_yields_no_changes() {
        assert!(parse_name_status("").is_empty());
        assert!(parse_name_status("  \n").is_empty());
    }

    #[test]
    fn branch_pattern_detects_prefixes_and_conventions() {
        let pattern = analyze_branch_pattern(&[
            "feature/login-form",
            "feature/api",
            "fix/overflow",
            "release/1.2",
        ]);
        assert!(pattern.has_prefix);
        assert_eq!(pattern.prefixes, vec!["feature", "fix", "release"]);
        assert_eq!(pattern.separator, '-');
        assert!(pattern.has_ticket_numbers);
        assert_eq!(pattern.conventions, vec!["feature", "fix", "release"]);
    }

    #[test]
    fn branch_pattern_defaults_on_empty_input() {
        let pattern = analyze_branch_pattern(&[]);
        assert!(!pattern.has_prefix);
        assert_eq!(pattern.separator, '/');
        assert!(pattern.conventions.is_empty());
    }
}
