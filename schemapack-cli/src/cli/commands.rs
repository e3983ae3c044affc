// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command line definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "schemapack")]
#[command(version, about = "Compile a project descriptor into a catalog archive")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub compile: CompileArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (overridden by --verbose)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a project (same as the bare form)
    Compile(CompileArgs),

    /// List the entries, tables and procedures of a compiled archive
    Inspect {
        archive: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct CompileArgs {
    /// Project descriptor
    pub project: Option<PathBuf>,

    /// Archive to write
    pub output: Option<PathBuf>,

    /// Extra classpath roots (directories or jars); may be repeated
    #[arg(long, value_delimiter = ',')]
    pub classpath: Vec<PathBuf>,

    /// Treat descriptor warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// JSON file describing class-based procedures
    #[arg(long)]
    pub procedures: Option<PathBuf>,

    /// Default row count assumed for every table when costing statements
    #[arg(long)]
    pub estimates_default: Option<i64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
