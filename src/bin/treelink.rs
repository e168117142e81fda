//! treelink CLI Binary
//!
//! Command-line interface for hosting and syncing directory trees.

use clap::Parser;
use std::process;
use treelink::cli::{Cli, RunContext};
use treelink::config::ConfigLoader;
use treelink::logging::{init_logging, LoggingConfig};
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("treelink starting");

    let context = match RunContext::new(cli.workdir.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", treelink::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", treelink::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workdir)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };
    // Without --verbose only warnings and errors are shown, unless the
    // configuration chose a level
    if !cli.verbose {
        config = config.with_default_level("warn");
    }

    // Override with CLI arguments (highest priority)
    if let Some(ref level) = cli.log_level {
        config.level = Some(level.clone());
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
