//! Command option structures, built from parsed CLI arguments.

use crate::cli::Cli;

/// Options of the commit flow
///
/// ```
/// use ocm::commands::CommitOptions;
///
/// let options = CommitOptions {
///     prefix: Some("fix".to_string()),
///     dry_run: true,
/// };
/// assert_eq!(options.prefix.as_deref(), Some("fix"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOptions {
    /// Free-text prefix, rendered as `<prefix>: <message>`
    pub prefix: Option<String>,

    /// Print the message and stop before the confirmation prompt
    pub dry_run: bool,
}

impl CommitOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            prefix: cli.prefix_text(),
            dry_run: cli.dry_run,
        }
    }
}
