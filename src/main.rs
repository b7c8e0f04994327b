use ocm::*;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use ocm::config::AppConfig;
use llm::parser::ParserChain;

fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let colored_hint = !cli.no_color;
    let config = match load_effective_config(&cli) {
        Ok(config) => config,
        Err(e) => exit_with_error(&e, colored_hint),
    };

    let log_level = if config.ui.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .init();

    let parsers = ParserChain::new(&config.parser.stages);
    tracing::debug!("Parser stages: {:?}", parsers.stage_names());

    let options = commands::CommitOptions::from_cli(&cli);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match runtime.block_on(commands::commit::run(&options, &config, &parsers)) {
        Ok(outcome) => {
            tracing::debug!("Finished: {:?}", outcome);
            Ok(())
        }
        Err(e) => exit_with_error(&e, config.ui.colored),
    }
}

/// Configuration file and environment, then command line flags on top
fn load_effective_config(cli: &Cli) -> error::Result<AppConfig> {
    let mut config = config::load_config()?;

    if let Some(model) = &cli.model {
        config.ollama.model = Some(model.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.network.request_timeout = timeout;
    }
    if let Some(endpoint) = &cli.endpoint {
        config.ollama.endpoint = config::normalize_host(endpoint);
    }
    if cli.verbose {
        config.ui.verbose = true;
    }
    if cli.no_color {
        config.ui.colored = false;
    }

    config.validate()?;
    Ok(config)
}

fn exit_with_error(e: &error::OcmError, colored: bool) -> ! {
    ui::error(&e.to_string(), colored);
    if let Some(suggestion) = e.suggestion() {
        eprintln!();
        eprintln!("{}", ui::info(suggestion, colored));
    }
    std::process::exit(1);
}
