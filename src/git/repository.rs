use git2::{DiffOptions, Repository};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::git::GitOperations;

pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open the repository containing the current directory
    pub fn open() -> Result<Self> {
        Self::discover(".")
    }

    /// Open the repository containing `path`, searching parent directories
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(Self { repo })
    }

    /// Working directory root (`None` for bare repositories)
    pub fn workdir(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }

    fn is_unborn(&self) -> Result<bool> {
        match self.repo.head() {
            Ok(_) => Ok(false),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    /// Render a git2 diff as patch text
    fn diff_to_string(diff: &git2::Diff) -> Result<String> {
        let mut output = Vec::new();
        diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            // content lines carry their marker in origin(); headers already include it
            let origin = line.origin();
            if matches!(origin, '+' | '-' | ' ') {
                let _ = output.write_all(&[origin as u8]);
            }
            let _ = output.write_all(line.content());
            true
        })?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

impl GitOperations for GitRepository {
    fn get_staged_diff(&self) -> Result<String> {
        let index = self.repo.index()?;
        let mut opts = DiffOptions::new();

        // unborn branch: compare the index against the empty tree
        let head_tree = if self.is_unborn()? {
            None
        } else {
            Some(self.repo.head()?.peel_to_tree()?)
        };

        let diff =
            self.repo
                .diff_tree_to_index(head_tree.as_ref(), Some(&index), Some(&mut opts))?;
        Self::diff_to_string(&diff)
    }

    fn commit(&self, message: &str) -> Result<()> {
        crate::git::commit::commit_changes(self.workdir().as_deref(), message)
    }
}
