use clap::{Parser, builder::styling};

const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::Green.on_default().bold())
    .usage(styling::AnsiColor::Green.on_default().bold())
    .literal(styling::AnsiColor::Cyan.on_default().bold())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Generate a commit message for the staged changes with a local Ollama model
#[derive(Parser, Debug)]
#[command(name = "ocm")]
#[command(author, version, about, long_about = None)]
#[command(styles = STYLES)]
pub struct Cli {
    /// Model to generate with (default: first installed model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Generation timeout in seconds; output received before it elapses is kept
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Ollama server URL (default: http://localhost:11434)
    #[arg(short, long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Print the generated message without committing
    #[arg(short, long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Prefix for the message, e.g. `ocm fix` gives "fix: <message>"
    #[arg(trailing_var_arg = true, value_name = "PREFIX")]
    pub prefix: Vec<String>,
}

impl Cli {
    /// Prefix words joined by a space, `None` when blank
    pub fn prefix_text(&self) -> Option<String> {
        let joined = self.prefix.join(" ");
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}
