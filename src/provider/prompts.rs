/// Appended to every branch-name prompt regardless of backend.
pub const BRANCH_JSON_INSTRUCTION: &str =
    "\n\nRespond only with valid JSON array format containing branch name suggestions.";

/// Appended to every commit-message prompt regardless of backend.
pub const COMMIT_JSON_INSTRUCTION: &str =
    "\n\nRespond only with valid JSON array format containing commit message suggestions.";

/// System role content for chat-completion style HTTP backends.
pub const API_SYSTEM_PROMPT: &str = "You are a helpful assistant that generates git branch \
names and commit messages. Always respond with valid JSON arrays.";

pub const BRANCH_REQUEST: &str = r#"Please generate 3-5 branch name suggestions that:
1. Follow the existing naming conventions from this repository
2. Are descriptive but concise (max 50 characters)
3. Use appropriate prefixes if the repo uses them
4. Include ticket numbers if that's the pattern
5. Are lowercase with appropriate separators

Return as JSON array with objects containing 'name' and 'description' fields."#;

pub const COMMIT_REQUEST: &str = r#"Please generate 3-4 commit message suggestions that:
1. Follow conventional commit format if the repo uses it
2. Are concise but descriptive (max 72 characters for subject)
3. Match the style of recent commits in this repository
4. Accurately describe what was changed and why
5. Use appropriate commit types (feat, fix, docs, style, refactor, test, chore)

Return as JSON array with objects containing:
- 'message': the commit subject line
- 'body': optional longer description (if needed)
- 'type': the commit type used"#;
