//! Global constants

/// Maximum length of raw-response previews in error messages
pub const PREVIEW_LENGTH: usize = 500;

/// Ollama API paths
pub mod api {
    /// Model listing
    pub const TAGS_PATH: &str = "/api/tags";

    /// Text generation
    pub const GENERATE_PATH: &str = "/api/generate";
}
