//! Top-level application configuration and the small command sections.

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::network::NetworkConfig;
use super::ollama::OllamaConfig;
use super::parser::ParserConfig;

/// Application configuration.
///
/// Effective configuration is merged from multiple sources (low to high):
/// 1. Rust defaults (`Default` + `serde(default)`)
/// 2. User-level config file (platform-specific config directory)
/// 3. `OCM__*` environment variables
/// 4. Shorthand variables (`OCM_MODEL`, `OCM_TIMEOUT`, `OLLAMA_HOST`)
/// 5. Command line flags
///
/// # Configuration File Locations
/// - Linux: `~/.config/ocm/config.toml`
/// - macOS: `~/Library/Application Support/ocm/config.toml`
/// - Windows: `%APPDATA%\ocm\config\config.toml`
///
/// # Example
/// ```toml
/// [ollama]
/// endpoint = "http://localhost:11434"
/// model = "llama3.2"
///
/// [network]
/// request_timeout = 180
///
/// [parser]
/// stages = ["structured", "permissive", "pattern"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Generation service location and model choice.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// HTTP timeouts.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Response parser fallback chain.
    #[serde(default)]
    pub parser: ParserConfig,

    /// Commit flow behavior.
    #[serde(default)]
    pub commit: CommitConfig,

    /// Terminal UI behavior.
    #[serde(default)]
    pub ui: UIConfig,
}

impl AppConfig {
    /// Validates configuration consistency.
    pub fn validate(&self) -> Result<()> {
        self.ollama.validate()?;
        self.network.validate()?;
        self.parser.validate()?;
        Ok(())
    }
}

/// Commit flow configuration.
///
/// ```toml
/// [commit]
/// show_diff_stats = true
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommitConfig {
    /// Print a files/insertions/deletions summary before generating.
    #[serde(default = "default_true")]
    pub show_diff_stats: bool,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            show_diff_stats: true,
        }
    }
}

/// UI configuration.
///
/// # Fields
/// - `colored`: enable colored output (default: `true`)
/// - `verbose`: enable debug logging (default: `false`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UIConfig {
    /// Whether to enable color output.
    #[serde(default = "default_true")]
    pub colored: bool,

    /// Whether to log at debug level.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            colored: true,
            verbose: false,
        }
    }
}

fn default_true() -> bool {
    true
}
