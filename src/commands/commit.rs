use crate::commands::CommitOptions;
use crate::config::AppConfig;
use crate::error::Result;
use crate::git::diff::parse_diff_stats;
use crate::git::repository::GitRepository;
use crate::git::{GitOperations, collect_staged_diff};
use crate::llm::ModelService;
use crate::llm::generation::generate;
use crate::llm::model::resolve_model;
use crate::llm::ollama::OllamaClient;
use crate::llm::parser::ParserChain;
use crate::ui::{self, Confirmer, TerminalConfirmer, is_affirmative};

const CONFIRM_QUESTION: &str = "Commit with this message? [y/N]";

/// How the commit flow ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    Cancelled,
    /// `--dry-run`: the message was printed, nothing was asked or committed
    Printed,
}

/// Run the commit flow against the current repository and configured server
pub async fn run(
    options: &CommitOptions,
    config: &AppConfig,
    parsers: &ParserChain,
) -> Result<CommitOutcome> {
    let repo = GitRepository::open()?;
    let client = OllamaClient::new(&config.ollama, &config.network)?;

    run_with_deps(options, config, &repo, &client, parsers, &TerminalConfirmer).await
}

/// Commit flow over injected dependencies
///
/// The staged diff is read before anything touches the network.
pub async fn run_with_deps(
    options: &CommitOptions,
    config: &AppConfig,
    git: &dyn GitOperations,
    service: &dyn ModelService,
    parsers: &ParserChain,
    confirmer: &dyn Confirmer,
) -> Result<CommitOutcome> {
    let colored = config.ui.colored;

    let diff = collect_staged_diff(git)?;
    if config.commit.show_diff_stats {
        let stats = parse_diff_stats(&diff);
        ui::step("1/3", &ui::format_diff_stats(&stats, colored), colored);
    }

    let spinner = ui::Spinner::new("Resolving model...", colored);
    let model = resolve_model(config.ollama.configured_model(), service).await?;
    spinner.set_message(&format!("Generating commit message with {}...", model));

    let timeout = config.network.generation_timeout();
    let message = generate(service, parsers, &model, &diff, timeout).await?;
    spinner.finish_and_clear();

    ui::step(
        "2/3",
        &format!("Generated with {} ({} parser)", model, message.stage.name()),
        colored,
    );
    if message.partial {
        ui::warning(
            &format!(
                "Generation timed out after {}s; the message may be incomplete",
                timeout.as_secs()
            ),
            colored,
        );
    }

    if options.dry_run {
        println!("{}", apply_prefix(&message.text, options.prefix.as_deref()));
        return Ok(CommitOutcome::Printed);
    }

    ui::step("3/3", "Confirm", colored);
    confirm_and_commit(
        &message.text,
        options.prefix.as_deref(),
        git,
        confirmer,
        colored,
    )
}

/// Show the final message, ask once, and commit only on `y`/`Y`
pub fn confirm_and_commit(
    message: &str,
    prefix: Option<&str>,
    git: &dyn GitOperations,
    confirmer: &dyn Confirmer,
    colored: bool,
) -> Result<CommitOutcome> {
    let full_message = apply_prefix(message, prefix);
    println!("{}", ui::commit_message(&full_message, colored));

    let answer = confirmer.ask(CONFIRM_QUESTION)?;
    if !answer.as_deref().is_some_and(is_affirmative) {
        tracing::debug!("Confirmation declined: {:?}", answer);
        ui::warning("Commit cancelled.", colored);
        return Ok(CommitOutcome::Cancelled);
    }

    git.commit(&full_message)?;
    ui::success("Commit created.", colored);
    Ok(CommitOutcome::Committed)
}

/// `"<prefix>: <message>"` for a non-blank prefix, the message otherwise
///
/// A trailing colon on the prefix is not doubled.
pub fn apply_prefix(message: &str, prefix: Option<&str>) -> String {
    match prefix.map(|p| p.trim().trim_end_matches(':').trim_end()) {
        Some(p) if !p.is_empty() => format!("{}: {}", p, message),
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcmError;
    use crate::git::MockGitOperations;
    use crate::ui::MockConfirmer;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn confirmer_answering(answer: Option<&'static str>) -> MockConfirmer {
        let mut confirmer = MockConfirmer::new();
        confirmer
            .expect_ask()
            .times(1)
            .returning(move |_| Ok(answer.map(str::to_string)));
        confirmer
    }

    #[test]
    fn test_apply_prefix() {
        assert_eq!(apply_prefix("typo", Some("fix")), "fix: typo");
        assert_eq!(apply_prefix("typo", Some("  fix  ")), "fix: typo");
        assert_eq!(apply_prefix("typo", Some("fix:")), "fix: typo");
        assert_eq!(apply_prefix("add x", Some("feat(ui)")), "feat(ui): add x");
        assert_eq!(apply_prefix("typo", Some("   ")), "typo");
        assert_eq!(apply_prefix("typo", None), "typo");
    }

    #[test]
    fn test_yes_commits_prefixed_message() {
        let mut git = MockGitOperations::new();
        git.expect_commit()
            .with(eq("fix: typo"))
            .times(1)
            .returning(|_| Ok(()));

        let outcome =
            confirm_and_commit("typo", Some("fix"), &git, &confirmer_answering(Some("y\n")), false)
                .unwrap();
        assert_eq!(outcome, CommitOutcome::Committed);
    }

    #[test]
    fn test_uppercase_yes_commits() {
        let mut git = MockGitOperations::new();
        git.expect_commit().times(1).returning(|_| Ok(()));

        let outcome =
            confirm_and_commit("typo", None, &git, &confirmer_answering(Some(" Y ")), false)
                .unwrap();
        assert_eq!(outcome, CommitOutcome::Committed);
    }

    #[test]
    fn test_other_answers_never_commit() {
        for answer in [Some(""), Some("n"), Some("yes"), Some("sure"), None] {
            let mut git = MockGitOperations::new();
            git.expect_commit().never();

            let outcome =
                confirm_and_commit("typo", None, &git, &confirmer_answering(answer), false)
                    .unwrap();
            assert_eq!(outcome, CommitOutcome::Cancelled, "answer {:?}", answer);
        }
    }

    #[test]
    fn test_commit_failure_propagates() {
        let mut git = MockGitOperations::new();
        git.expect_commit()
            .returning(|_| Err(OcmError::GitCommand("pre-commit hook failed".into())));

        let err = confirm_and_commit("typo", None, &git, &confirmer_answering(Some("y")), false)
            .unwrap_err();
        assert!(matches!(err, OcmError::GitCommand(_)));
    }
}
