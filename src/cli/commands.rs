//! CLI command implementations

use anyhow::{bail, Context, Result};

use crate::config::SimulatorConfig;
use crate::model::ApiConfiguration;
use crate::VERSION;

use super::{Cli, Commands, ConfigAction, ConfigCommand, ServeCommand};

/// Execute the CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = if let Some(path) = &cli.config {
        SimulatorConfig::from_file(path)?
    } else {
        SimulatorConfig::from_env()?
    };

    config.telemetry.log_level = cli.log_level.clone();
    config.telemetry.json_logs = cli.json_logs;

    match cli.command {
        Commands::Serve(cmd) => execute_serve(cmd, config).await,
        Commands::Config(cmd) => execute_config(cmd),
        Commands::Version => execute_version(),
    }
}

async fn execute_serve(cmd: ServeCommand, mut config: SimulatorConfig) -> Result<()> {
    if let Some(simulation) = cmd.simulation {
        config.simulation.config_file = Some(simulation);
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(timeout) = cmd.timeout {
        config.server.request_timeout_secs = timeout;
    }
    if cmd.no_prefetch {
        config.simulation.prefetch_on_startup = false;
    }

    if config.simulation.config_file.is_none() {
        bail!("No simulation configuration given; pass --simulation <file>");
    }

    config.validate().context("Configuration validation failed")?;

    crate::run_server(config).await
}

fn execute_config(cmd: ConfigCommand) -> Result<()> {
    match cmd.action {
        ConfigAction::Validate { file } => {
            let config = ApiConfiguration::from_file(&file)
                .with_context(|| format!("{} is not a valid simulation configuration", file.display()))?;
            println!(
                "{} is valid: {} path(s), {} example(s)",
                file.display(),
                config.paths.len(),
                config.example_count()
            );
            Ok(())
        }
        ConfigAction::Show { file } => {
            let config = ApiConfiguration::from_file(&file)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn execute_version() -> Result<()> {
    println!("api-simulator {}", VERSION);
    Ok(())
}
