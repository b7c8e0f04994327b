//! Configuration management
//!
//! Configuration is loaded once at startup and passed to every component.

mod loader;
mod structs;


pub use loader::{
    MODEL_ENV, OLLAMA_HOST_ENV, TIMEOUT_ENV, get_config_path, load_config, load_config_from,
    normalize_host,
};
pub use structs::*;
