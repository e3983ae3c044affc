// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for SchemaPack

use colored::Colorize;
use std::path::Path;

use super::commands::{CompileArgs, OutputFormat};
use super::output::{ArchiveReport, SummaryFormatter};
use schemapack::procedure::{DatabaseEstimates, ProcedureRegistry};
use schemapack::{Archive, Catalog, CompilerConfig, ProjectCompiler};

/// Handle a compile request
///
/// Returns whether the compile succeeded; only argument and I/O problems of
/// the front end itself are errors.
pub fn handle_compile(args: CompileArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let (Some(project), Some(output)) = (args.project.as_ref(), args.output.as_ref()) else {
        return Err("usage: schemapack <project-file> <output-archive>".into());
    };

    let mut config = if args.strict {
        CompilerConfig::strict()
    } else {
        CompilerConfig::default()
    };
    let env = CompilerConfig::from_env();
    config = config
        .with_classpath(env.classpath)
        .with_classpath(args.classpath.iter().cloned());

    if let Some(path) = &args.procedures {
        config = config.with_procedures(load_procedures(path)?);
    }
    if let Some(tuples) = args.estimates_default {
        config.estimates = DatabaseEstimates::with_default(tuples);
    }

    let mut compiler = ProjectCompiler::new(config);
    let success = compiler.compile(project, output);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Json => SummaryFormatter::write_json(&compiler.summary(), &mut out)?,
        OutputFormat::Text if success => compiler.summarize_success(&mut out)?,
        OutputFormat::Text => compiler.summarize_errors(&mut out)?,
    }
    Ok(success)
}

fn load_procedures(path: &Path) -> Result<ProcedureRegistry, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Unable to read {}: {}", path.display(), e))?;
    let registry = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid procedure file {}: {}", path.display(), e))?;
    Ok(registry)
}

/// Handle the inspect command
pub fn handle_inspect(archive: &Path, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let contents = Archive::read_from(archive)
        .map_err(|e| format!("Unable to open {}: {}", archive.display(), e))?;
    let catalog = match contents.get_str(schemapack::artifact::CATALOG_ENTRY) {
        Some(text) => Some(Catalog::parse(text)?),
        None => {
            println!("{}", "Archive has no catalog.txt".yellow());
            None
        }
    };

    let report = ArchiveReport::build(&contents, catalog.as_ref());
    match format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
