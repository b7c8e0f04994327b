//! # ocm
//!
//! Commit messages for staged changes, generated by a model running on a
//! local [Ollama](https://ollama.com) server.
//!
//! ```bash
//! git add .
//! ocm            # propose a message, commit on "y"
//! ocm fix        # "fix: <message>"
//! ocm --dry-run  # print only
//! ```
//!
//! ## Flow
//! 1. [`git::collect_staged_diff`] reads the staged diff and fails fast when
//!    nothing is staged.
//! 2. [`llm::model::resolve_model`] picks the configured model or the first
//!    installed one.
//! 3. [`llm::generation::generate`] streams `/api/generate` under a deadline
//!    and assembles the text through the [`llm::parser::ParserChain`].
//! 4. [`commands::commit::confirm_and_commit`] asks once and runs
//!    `git commit`.
//!
//! ## Library use
//! ```no_run
//! use std::time::Duration;
//!
//! use ocm::config::{NetworkConfig, OllamaConfig};
//! use ocm::git::{GitOperations, repository::GitRepository};
//! use ocm::llm::{generation::generate, ollama::OllamaClient, parser::ParserChain};
//!
//! # async fn example() -> ocm::error::Result<()> {
//! let repo = GitRepository::open()?;
//! let diff = repo.get_staged_diff()?;
//!
//! let client = OllamaClient::new(&OllamaConfig::default(), &NetworkConfig::default())?;
//! let message = generate(
//!     &client,
//!     &ParserChain::default(),
//!     "llama3.2",
//!     &diff,
//!     Duration::from_secs(120),
//! )
//! .await?;
//! println!("{}", message.text);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//! `~/.config/ocm/config.toml` (platform equivalent elsewhere):
//! ```toml
//! [ollama]
//! endpoint = "http://localhost:11434"
//! model = "qwen2.5-coder"
//!
//! [network]
//! request_timeout = 120
//!
//! [parser]
//! stages = ["structured", "permissive", "pattern"]
//! ```
//! `OCM_MODEL`, `OCM_TIMEOUT` and `OLLAMA_HOST` override the file, and
//! command line flags override everything.

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod git;
pub mod llm;
pub mod ui;
