mod app;
mod network;
mod ollama;
mod parser;

pub use app::{AppConfig, CommitConfig, UIConfig};
pub use network::NetworkConfig;
pub use ollama::OllamaConfig;
pub use parser::ParserConfig;
