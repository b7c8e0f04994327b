//! Command implementations.
//!
//! ```text
//! main.rs
//!   └── commands/commit.rs
//!         ├── git::collect_staged_diff
//!         ├── llm::model::resolve_model
//!         ├── llm::generation::generate
//!         └── confirm_and_commit
//! ```

/// Commit message generation and confirmation flow.
pub mod commit;
/// Command option structs.
pub mod options;

pub use options::CommitOptions;
