//! Commit flow over mocked git, model service and confirmation
//!
//! Covers:
//! - nothing staged: fails before any network call
//! - model resolution: configured vs. first listed
//! - confirmation: only y/Y commits
//! - prefix handling and dry-run
//! - generation failures never reach git commit

use mockall::predicate::eq;
use ocm::commands::CommitOptions;
use ocm::commands::commit::{CommitOutcome, run_with_deps};
use ocm::config::AppConfig;
use ocm::error::{OcmError, Result};
use ocm::git::MockGitOperations;
use ocm::llm::parser::ParserChain;
use ocm::llm::{MockModelService, ModelInfo, RawResponse};
use ocm::ui::MockConfirmer;
use pretty_assertions::assert_eq;

const DIFF: &str = "diff --git a/README.md b/README.md\n\
--- a/README.md\n\
+++ b/README.md\n\
@@ -1 +1 @@\n\
-teh\n\
+the\n";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.ui.colored = false;
    config.commit.show_diff_stats = false;
    config
}

fn staged_git() -> MockGitOperations {
    let mut git = MockGitOperations::new();
    git.expect_get_staged_diff()
        .returning(|| Ok(DIFF.to_string()));
    git
}

fn streamed(lines: &[&str]) -> RawResponse {
    RawResponse::new(lines.iter().map(|l| l.to_string()).collect(), false)
}

fn service_answering(lines: &'static [&'static str]) -> MockModelService {
    let mut service = MockModelService::new();
    service.expect_list_models().returning(|| {
        Ok(vec![ModelInfo {
            name: "llama3.2".to_string(),
        }])
    });
    service
        .expect_generate_raw()
        .times(1)
        .returning(move |_, _| Ok(streamed(lines)));
    service
}

fn confirmer_answering(answer: &'static str) -> MockConfirmer {
    let mut confirmer = MockConfirmer::new();
    confirmer
        .expect_ask()
        .times(1)
        .returning(move |_| Ok(Some(answer.to_string())));
    confirmer
}

async fn run(
    options: &CommitOptions,
    config: &AppConfig,
    git: &MockGitOperations,
    service: &MockModelService,
    confirmer: &MockConfirmer,
) -> Result<CommitOutcome> {
    run_with_deps(
        options,
        config,
        git,
        service,
        &ParserChain::default(),
        confirmer,
    )
    .await
}

#[tokio::test]
async fn test_no_staged_changes_makes_no_network_call() {
    let mut git = MockGitOperations::new();
    git.expect_get_staged_diff().returning(|| Ok("  \n".to_string()));
    git.expect_commit().never();

    let mut service = MockModelService::new();
    service.expect_list_models().never();
    service.expect_generate_raw().never();

    let mut confirmer = MockConfirmer::new();
    confirmer.expect_ask().never();

    let err = run(
        &CommitOptions::default(),
        &test_config(),
        &git,
        &service,
        &confirmer,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OcmError::NoStagedChanges));
}

#[tokio::test]
async fn test_prefix_and_confirmation_commit() {
    let mut git = staged_git();
    git.expect_commit()
        .with(eq("fix: correct typo in readme"))
        .times(1)
        .returning(|_| Ok(()));

    let service = service_answering(&[
        r#"{"response":"correct typo","done":false}"#,
        r#"{"response":" in readme","done":true}"#,
    ]);

    let options = CommitOptions {
        prefix: Some("fix".to_string()),
        dry_run: false,
    };
    let outcome = run(
        &options,
        &test_config(),
        &git,
        &service,
        &confirmer_answering("y"),
    )
    .await
    .unwrap();
    assert_eq!(outcome, CommitOutcome::Committed);
}

#[tokio::test]
async fn test_declined_confirmation_never_commits() {
    for answer in ["n", "", "yes", "Y please"] {
        let mut git = staged_git();
        git.expect_commit().never();

        let service = service_answering(&[r#"{"response":"docs: fix typo","done":true}"#]);

        let outcome = run(
            &CommitOptions::default(),
            &test_config(),
            &git,
            &service,
            &confirmer_answering(answer),
        )
        .await
        .unwrap();
        assert_eq!(outcome, CommitOutcome::Cancelled, "answer {:?}", answer);
    }
}

#[tokio::test]
async fn test_interrupted_prompt_cancels() {
    let mut git = staged_git();
    git.expect_commit().never();

    let service = service_answering(&[r#"{"response":"docs: fix typo","done":true}"#]);
    let mut confirmer = MockConfirmer::new();
    confirmer.expect_ask().returning(|_| Ok(None));

    let outcome = run(
        &CommitOptions::default(),
        &test_config(),
        &git,
        &service,
        &confirmer,
    )
    .await
    .unwrap();
    assert_eq!(outcome, CommitOutcome::Cancelled);
}

#[tokio::test]
async fn test_configured_model_is_used_without_listing() {
    let mut git = staged_git();
    git.expect_commit().never();

    let mut service = MockModelService::new();
    service.expect_list_models().never();
    service
        .expect_generate_raw()
        .withf(|request, _| request.model() == "qwen2.5-coder:7b")
        .times(1)
        .returning(|_, _| Ok(streamed(&[r#"{"response":"docs: fix typo","done":true}"#])));

    let mut config = test_config();
    config.ollama.model = Some("qwen2.5-coder:7b".to_string());

    let mut confirmer = MockConfirmer::new();
    confirmer.expect_ask().never();

    let options = CommitOptions {
        prefix: None,
        dry_run: true,
    };
    let outcome = run(&options, &config, &git, &service, &confirmer)
        .await
        .unwrap();
    assert_eq!(outcome, CommitOutcome::Printed);
}

#[tokio::test]
async fn test_no_models_installed() {
    let mut git = staged_git();
    git.expect_commit().never();

    let mut service = MockModelService::new();
    service.expect_list_models().returning(|| Ok(Vec::new()));
    service.expect_generate_raw().never();

    let err = run(
        &CommitOptions::default(),
        &test_config(),
        &git,
        &service,
        &MockConfirmer::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OcmError::NoModelsInstalled));
}

#[tokio::test]
async fn test_stream_error_aborts_before_prompt() {
    let mut git = staged_git();
    git.expect_commit().never();

    let service = service_answering(&[r#"{"error":"model not found"}"#]);
    let mut confirmer = MockConfirmer::new();
    confirmer.expect_ask().never();

    let err = run(
        &CommitOptions::default(),
        &test_config(),
        &git,
        &service,
        &confirmer,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OcmError::GenerationError(ref m) if m == "model not found"));
}

#[tokio::test]
async fn test_partial_message_still_asks() {
    let mut git = staged_git();
    git.expect_commit()
        .with(eq("feat: add"))
        .times(1)
        .returning(|_| Ok(()));

    let mut service = MockModelService::new();
    service.expect_list_models().returning(|| {
        Ok(vec![ModelInfo {
            name: "deepseek-r1".to_string(),
        }])
    });
    service.expect_generate_raw().returning(|_, _| {
        Ok(RawResponse::new(
            vec![r#"{"response":"feat: add","done":false}"#.to_string()],
            true,
        ))
    });

    let outcome = run(
        &CommitOptions::default(),
        &test_config(),
        &git,
        &service,
        &confirmer_answering("Y"),
    )
    .await
    .unwrap();
    assert_eq!(outcome, CommitOutcome::Committed);
}
