//! Network and HTTP configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OcmError, Result};

/// Network configuration.
///
/// # Fields
/// - `request_timeout`: deadline for the whole generation exchange in seconds (default: `120`)
/// - `connect_timeout`: HTTP connect timeout in seconds (default: `10`)
/// - `list_timeout`: deadline for the model listing request in seconds (default: `15`)
///
/// # Example
/// ```toml
/// [network]
/// request_timeout = 300
/// connect_timeout = 5
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Generation deadline in seconds. Output collected before it elapses is kept.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// HTTP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Model listing deadline in seconds.
    #[serde(default = "default_list_timeout")]
    pub list_timeout: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            list_timeout: default_list_timeout(),
        }
    }
}

impl NetworkConfig {
    /// Validates network configuration.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout == 0 {
            return Err(OcmError::Config(
                "network.request_timeout cannot be 0".into(),
            ));
        }
        if self.connect_timeout == 0 {
            return Err(OcmError::Config(
                "network.connect_timeout cannot be 0".into(),
            ));
        }
        if self.list_timeout == 0 {
            return Err(OcmError::Config("network.list_timeout cannot be 0".into()));
        }
        Ok(())
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

fn default_request_timeout() -> u64 {
    120
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_list_timeout() -> u64 {
    15
}
