// Configuration loading
//
// Loads configuration from the config file and environment variables.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use super::structs::AppConfig;
use crate::error::{OcmError, Result};

/// Shorthand variable for the model name
pub const MODEL_ENV: &str = "OCM_MODEL";

/// Shorthand variable for the generation timeout in seconds
pub const TIMEOUT_ENV: &str = "OCM_TIMEOUT";

/// Server address variable shared with the Ollama CLI
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

/// Load application configuration
///
/// Priority (high to low):
/// 1. Shorthand variables (`OCM_MODEL`, `OCM_TIMEOUT`, `OLLAMA_HOST`)
/// 2. Environment variables (`OCM__` prefix, double underscore for nesting)
///    - e.g. `OCM__NETWORK__CONNECT_TIMEOUT=5`
///    - e.g. `OCM__UI__COLORED=false`
/// 3. Config file (`~/.config/ocm/config.toml`)
/// 4. Defaults
pub fn load_config() -> Result<AppConfig> {
    load_config_from(get_config_path().as_deref())
}

/// Load configuration using an explicit config file path
pub fn load_config_from(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path
        && path.exists()
    {
        tracing::debug!("Loading config file: {}", path.display());
        builder = builder.add_source(File::from(path.to_path_buf()));
    }

    // OCM__NETWORK__REQUEST_TIMEOUT -> network.request_timeout
    builder = builder.add_source(
        Environment::with_prefix("OCM")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let mut app_config: AppConfig = config.try_deserialize()?;

    apply_env_overrides(&mut app_config)?;

    Ok(app_config)
}

/// Apply the shorthand environment variables
///
/// Empty values are ignored so `OCM_MODEL=` behaves like an unset variable.
fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Some(model) = non_empty_var(MODEL_ENV) {
        config.ollama.model = Some(model);
    }

    if let Some(timeout) = non_empty_var(TIMEOUT_ENV) {
        config.network.request_timeout = timeout.trim().parse().map_err(|_| {
            OcmError::Config(format!(
                "{} must be a whole number of seconds, got '{}'",
                TIMEOUT_ENV, timeout
            ))
        })?;
    }

    if let Some(host) = non_empty_var(OLLAMA_HOST_ENV) {
        config.ollama.endpoint = normalize_host(&host);
    }

    Ok(())
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Turn an `OLLAMA_HOST` style value into a base URL
///
/// Ollama accepts bare `host:port`; a missing scheme defaults to `http`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

/// Get the config file path
///
/// Returns ~/.config/ocm/config.toml
pub fn get_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ocm").map(|dirs| dirs.config_dir().join("config.toml"))
}
