use std::path::Path;
use std::process::Command;

use crate::error::{OcmError, Result};

/// Run `git commit -m <message>` inside `workdir`
///
/// The git CLI is used instead of git2 so that hooks, GPG signing and the
/// user's git config all apply.
pub fn commit_changes(workdir: Option<&Path>, message: &str) -> Result<()> {
    let mut cmd = Command::new("git");
    if let Some(dir) = workdir {
        cmd.current_dir(dir);
    }
    cmd.args(["commit", "-m", message]);

    tracing::debug!("Running git commit ({} chars)", message.len());
    let output = cmd.output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // some failures (e.g. "nothing to commit") are reported on stdout
        let error_msg = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        return Err(OcmError::GitCommand(error_msg));
    }

    Ok(())
}
