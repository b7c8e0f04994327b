/// Instructions placed ahead of the diff
const COMMIT_INSTRUCTIONS: &str = r#"You are a git commit message generator.

Rules:
- Use conventional commits: type(scope): description
- First line max 72 chars
- Common types: feat, fix, docs, style, refactor, test, chore
- Output ONLY the commit message, no explanation, no quotes, no code fences"#;

/// Pick a fence longer than any backtick run inside the diff
fn fence_for(diff: &str) -> String {
    let longest_run = diff
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest_run.max(2) + 1)
}

/// Build the generation prompt with the diff embedded verbatim
pub fn build_commit_prompt(diff: &str) -> String {
    let fence = fence_for(diff);
    let prompt = format!(
        "{COMMIT_INSTRUCTIONS}\n\nStaged changes:\n{fence}diff\n{diff}\n{fence}\n\nCommit message:"
    );
    tracing::debug!("Commit prompt built ({} chars)", prompt.len());
    prompt
}
