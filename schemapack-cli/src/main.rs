// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! SchemaPack CLI entry point

use clap::Parser;

mod cli;
use cli::{Cli, Commands};

/// Exit status of a failed compile
const FAILURE_EXIT: i32 = -1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments first to get log level
    let cli = Cli::parse();

    // Determine log level from CLI args or environment variable
    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // Default to Warn (can still be overridden by RUST_LOG env var)
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let args = match cli.command {
        Some(Commands::Inspect { archive, format }) => {
            return cli::handle_inspect(&archive, format);
        }
        Some(Commands::Compile(args)) => args,
        None => cli.compile,
    };

    if !cli::handle_compile(args)? {
        std::process::exit(FAILURE_EXIT);
    }
    Ok(())
}
