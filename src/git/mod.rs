pub mod commit;
pub mod diff;
pub mod repository;

use crate::error::{OcmError, Result};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Version-control operations the commit flow depends on
///
/// Implemented by [`GitRepository`](repository::GitRepository); mocked in tests.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait GitOperations {
    /// Diff of the index against `HEAD`, equivalent to `git diff --cached`.
    ///
    /// May return an empty string.
    fn get_staged_diff(&self) -> Result<String>;

    /// Commit the staged changes with `message` as the sole commit text.
    ///
    /// Runs through the git CLI so hooks and signing configuration apply.
    fn commit(&self, message: &str) -> Result<()>;
}

/// Diff statistics
///
/// ```
/// use ocm::git::DiffStats;
///
/// let stats = DiffStats {
///     files_changed: vec!["src/main.rs".to_string()],
///     insertions: 3,
///     deletions: 1,
/// };
/// assert_eq!(stats.total_changes(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub files_changed: Vec<String>,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn total_changes(&self) -> usize {
        self.insertions + self.deletions
    }
}

/// Read the staged diff, failing fast when nothing is staged
///
/// A whitespace-only diff counts as empty.
pub fn collect_staged_diff(git: &dyn GitOperations) -> Result<String> {
    let diff = git.get_staged_diff()?;
    if diff.trim().is_empty() {
        return Err(OcmError::NoStagedChanges);
    }
    tracing::debug!("Collected staged diff ({} bytes)", diff.len());
    Ok(diff)
}
